// Building scopes and the archetype buildings representing them.

use crate::config::{ExtrapolationMapping, ProcessingConfig};
use crate::core::geometry::{building_frame_depth, window_to_wall_ratio};
use crate::core::units::round_to_nearest_half;
use crate::dataset::AbmDataset;
use crate::errors::AbmError;
use crate::extrapolation::{extrapolate, tagged_building_stock, Extrapolate};
use crate::records::{BuildingPeriod, ProcessedRecord};
use chrono::NaiveDate;
use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Serialize, Serializer};
use tracing::{info, instrument};

const MINIMUM_NUMBER_OF_STOREYS: f64 = 0.5;

fn serialize_joined<S: Serializer>(values: &[String], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&values.join(";"))
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BuildingScope {
    pub building_scope: String,
    pub building_stock: String,
    #[serde(serialize_with = "serialize_joined")]
    pub building_types: Vec<String>,
    #[serde(serialize_with = "serialize_joined")]
    pub heat_sources: Vec<String>,
    pub location_id: String,
    pub scope_period_start_year: i32,
    pub scope_period_end_year: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BuildingArchetype {
    pub building_archetype: String,
    pub building_scope: String,
    pub building_fabrics: String,
    pub building_loads: String,
    pub location_id: String,
    pub building_frame_depth_m: f64,
    pub number_of_storeys: f64,
    pub room_height_m: f64,
    pub window_area_to_external_wall_ratio_m2_m2: f64,
    pub floor_area_m2: f64,
    pub wall_area_m2: f64,
    pub window_area_m2: f64,
    pub roof_area_m2: f64,
    pub weather_start: NaiveDate,
    pub weather_end: NaiveDate,
}

/// The building scopes and archetypes of a dataset.
#[derive(Clone, Debug, PartialEq)]
pub struct AbmDefinitions {
    pub building_scopes: Vec<BuildingScope>,
    pub building_archetypes: Vec<BuildingArchetype>,
}

/// Grouping key of the reference buildings pooled into the same scope.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
struct ScopeKey {
    location_id: String,
    /// Building type, or building stock when aggregating over building types.
    building_category: String,
    building_period: BuildingPeriod,
}

impl ScopeKey {
    fn name(&self) -> String {
        scope_name(&self.location_id, &self.building_category, &self.building_period)
    }
}

fn scope_name(location_id: &str, building_category: &str, building_period: &BuildingPeriod) -> String {
    format!("{location_id}-{building_category}-{building_period}")
}

/// Rename a scope of the source location of `mapping` for its target location.
fn retarget_scope_name(name: &str, mapping: &ExtrapolationMapping) -> String {
    match name.strip_prefix(mapping.source.as_str()) {
        Some(rest) => format!("{}{rest}", mapping.target),
        None => format!("{}-{name}", mapping.target),
    }
}

impl AbmDefinitions {
    #[instrument(skip_all)]
    pub fn from_dataset(dataset: &AbmDataset, config: &ProcessingConfig) -> Result<Self, AbmError> {
        let assumptions = dataset.assumptions();
        let scopes = scope_records(dataset.records(), config, |building_type| {
            assumptions.building_stock_for(building_type).map(str::to_string)
        })?;

        let mut building_scopes = vec![];
        let mut building_archetypes = vec![];
        for (key, records) in &scopes {
            let building_stock = if config.aggregates_building_types() {
                key.building_category.clone()
            } else {
                assumptions
                    .building_stock_for(&key.building_category)?
                    .to_string()
            };
            building_scopes.push(building_scope(key, &building_stock, records));
            building_archetypes.push(building_archetype(
                key,
                &building_stock,
                records,
                dataset,
                config,
            )?);
        }

        let tag = dataset.extrapolation_tag();
        let definitions = Self {
            building_scopes: extrapolate(&building_scopes, dataset.extrapolation(), tag),
            building_archetypes: extrapolate(&building_archetypes, dataset.extrapolation(), tag),
        };
        info!(
            building_scopes = definitions.building_scopes.len(),
            "Assembled building archetypes"
        );
        Ok(definitions)
    }
}

/// Group the records into scopes, pooling building types and periods as configured.
fn scope_records<'a>(
    records: &'a [ProcessedRecord],
    config: &ProcessingConfig,
    building_stock_for: impl Fn(&str) -> Result<String, AbmError>,
) -> Result<IndexMap<ScopeKey, Vec<&'a ProcessedRecord>>, AbmError> {
    let mut keyed = vec![];
    for record in records {
        let building_category = if config.aggregates_building_types() {
            building_stock_for(&record.raw.building_type)?
        } else {
            record.raw.building_type.clone()
        };
        keyed.push((
            ScopeKey {
                location_id: record.raw.location_id.clone(),
                building_category,
                building_period: record.building_period,
            },
            record,
        ));
    }

    if config.aggregates_building_periods() {
        let mut spans: IndexMap<(String, String), BuildingPeriod> = IndexMap::new();
        for (key, _) in &keyed {
            spans
                .entry((key.location_id.clone(), key.building_category.clone()))
                .and_modify(|span| *span = span.union(&key.building_period))
                .or_insert(key.building_period);
        }
        for (key, _) in keyed.iter_mut() {
            key.building_period = spans[&(key.location_id.clone(), key.building_category.clone())];
        }
    }

    let mut scopes: IndexMap<ScopeKey, Vec<&ProcessedRecord>> = IndexMap::new();
    for (key, record) in keyed {
        scopes.entry(key).or_default().push(record);
    }
    scopes.sort_keys();
    Ok(scopes)
}

fn building_scope(key: &ScopeKey, building_stock: &str, records: &[&ProcessedRecord]) -> BuildingScope {
    BuildingScope {
        building_scope: key.name(),
        building_stock: building_stock.to_string(),
        building_types: records
            .iter()
            .map(|record| record.raw.building_type.clone())
            .unique()
            .sorted()
            .collect(),
        heat_sources: records
            .iter()
            .flat_map(|record| &record.heating_systems)
            .filter(|system| system.prevalence.is_finite() && system.prevalence > 0.)
            .filter_map(|system| system.heat_source().map(str::to_string))
            .unique()
            .sorted()
            .collect(),
        location_id: key.location_id.clone(),
        scope_period_start_year: key.building_period.start,
        scope_period_end_year: key.building_period.end,
    }
}

/// Normalise the ground floor areas of the records of a scope into weights.
fn weights_within_scope(scope: &str, records: &[&ProcessedRecord]) -> Result<Vec<f64>, AbmError> {
    let areas = records
        .iter()
        .map(|record| record.raw.ground_floor_area_m2)
        .map(|area| if area.is_finite() && area > 0. { area } else { 0. })
        .collect_vec();
    let total: f64 = areas.iter().sum();
    if total <= 0. {
        return Err(AbmError::EmptyScope(scope.to_string()));
    }
    let weights = areas.iter().map(|area| area / total).collect_vec();
    debug_assert!(is_close!(weights.iter().sum::<f64>(), 1., rel_tol = 1e-9));
    Ok(weights)
}

fn building_archetype(
    key: &ScopeKey,
    building_stock: &str,
    records: &[&ProcessedRecord],
    dataset: &AbmDataset,
    config: &ProcessingConfig,
) -> Result<BuildingArchetype, AbmError> {
    let name = key.name();
    let weights = weights_within_scope(&name, records)?;
    let weighted = |value: fn(&ProcessedRecord) -> f64| -> f64 {
        records
            .iter()
            .zip(&weights)
            .map(|(record, weight)| weight * value(*record))
            .sum()
    };

    let floor_area = weighted(|record| record.raw.ground_floor_area_m2);
    let wall_area = weighted(|record| record.raw.wall_area_m2);
    let window_area = weighted(|record| record.raw.window_area_m2);
    let roof_area = weighted(|record| record.raw.roof_area_m2);
    let number_of_storeys = round_to_nearest_half(weighted(|record| record.raw.number_of_storeys))
        .max(MINIMUM_NUMBER_OF_STOREYS);

    let template = dataset.assumptions().building_fabric_template(building_stock)?;
    Ok(BuildingArchetype {
        building_archetype: name.clone(),
        building_scope: name,
        building_fabrics: template.building_fabrics.clone(),
        building_loads: template.building_loads.clone(),
        location_id: key.location_id.clone(),
        building_frame_depth_m: building_frame_depth(
            wall_area + window_area,
            floor_area,
            number_of_storeys,
            config.room_height_m,
        ),
        number_of_storeys,
        room_height_m: config.room_height_m,
        window_area_to_external_wall_ratio_m2_m2: window_to_wall_ratio(window_area, wall_area),
        floor_area_m2: floor_area,
        wall_area_m2: wall_area,
        window_area_m2: window_area,
        roof_area_m2: roof_area,
        weather_start: config.weather_start,
        weather_end: config.weather_end,
    })
}

impl Extrapolate for BuildingScope {
    fn location_id(&self) -> &str {
        &self.location_id
    }

    fn extrapolated(&self, mapping: &ExtrapolationMapping, tag: &str) -> Self {
        Self {
            building_scope: retarget_scope_name(&self.building_scope, mapping),
            building_stock: tagged_building_stock(&self.building_stock, tag),
            location_id: mapping.target.clone(),
            ..self.clone()
        }
    }
}

impl Extrapolate for BuildingArchetype {
    fn location_id(&self) -> &str {
        &self.location_id
    }

    fn extrapolated(&self, mapping: &ExtrapolationMapping, _tag: &str) -> Self {
        Self {
            building_archetype: retarget_scope_name(&self.building_archetype, mapping),
            building_scope: retarget_scope_name(&self.building_scope, mapping),
            location_id: mapping.target.clone(),
            ..self.clone()
        }
    }
}
