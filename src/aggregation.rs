// Aggregation of the weighted per-record contributions into the building stock, structure,
// and ventilation and fenestration statistics.

use crate::core::fabric::structure_type::{HeatCoupling, StructureTypeSpec};
use crate::core::fabric::thermal_properties::{effective_thermal_mass, u_values, UValues};
use crate::errors::AbmError;
use crate::input::Assumptions;
use crate::records::{ArchetypeKey, ProcessedRecord};
use crate::statistics::{any_non_finite, group_by, Mean, Reducer};
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, instrument};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BuildingStockStatistic {
    pub building_stock: String,
    pub building_type: String,
    pub building_period: String,
    pub location_id: String,
    pub heat_source: String,
    pub number_of_buildings: f64,
    pub average_gross_floor_area_m2_per_building: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StructureStatistic {
    pub building_type: String,
    pub building_period: String,
    pub location_id: String,
    pub structure_type: String,
    #[serde(rename = "design_U_value_W_m2K")]
    pub design_u_value: f64,
    #[serde(rename = "external_U_value_to_ambient_air_W_m2K")]
    pub external_u_value_to_ambient_air: f64,
    #[serde(rename = "external_U_value_to_ground_W_m2K")]
    pub external_u_value_to_ground: f64,
    #[serde(rename = "internal_U_value_to_structure_W_m2K")]
    pub internal_u_value_to_structure: f64,
    #[serde(rename = "effective_thermal_mass_J_m2K")]
    pub effective_thermal_mass: f64,
    #[serde(rename = "linear_thermal_bridges_W_mK")]
    pub linear_thermal_bridges: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VentilationFenestrationStatistic {
    pub building_type: String,
    pub building_period: String,
    pub location_id: String,
    #[serde(rename = "HRU_efficiency")]
    pub hru_efficiency: f64,
    pub infiltration_rate_1_h: f64,
    pub total_normal_solar_energy_transmittance: f64,
    pub ventilation_rate_1_h: f64,
    #[serde(rename = "window_U_value_W_m2K")]
    pub window_u_value: f64,
}

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
struct StockKey {
    building_stock: String,
    archetype: ArchetypeKey,
    heat_source: String,
}

struct StockContribution {
    key: StockKey,
    number_of_buildings: f64,
    floor_area: f64,
}

#[derive(Default)]
struct StockReducer {
    number_of_buildings: f64,
    floor_area: Mean,
}

impl Reducer<StockContribution> for StockReducer {
    fn accumulate(&mut self, item: &StockContribution) {
        self.number_of_buildings += item.number_of_buildings;
        self.floor_area.push(item.floor_area);
    }
}

/// Calculate the number of buildings and their average floor area per heat source.
///
/// Every heating system of every record contributes the number of buildings served by it.
/// Systems without a heat source, or with an invalid prevalence, are dropped.
#[instrument(skip_all)]
pub fn building_stock_statistics(
    records: &[ProcessedRecord],
    assumptions: &Assumptions,
) -> Result<Vec<BuildingStockStatistic>, AbmError> {
    let mut contributions = vec![];
    let mut dropped = 0;
    for record in records {
        let building_stock = assumptions.building_stock_for(&record.raw.building_type)?;
        assumptions.building_stock(building_stock)?;
        for system in &record.heating_systems {
            let number_of_buildings = record.raw.number_of_buildings * system.prevalence;
            let heat_source = match system.heat_source() {
                Some(heat_source) if number_of_buildings.is_finite() => heat_source,
                _ => {
                    dropped += 1;
                    continue;
                }
            };
            contributions.push(StockContribution {
                key: StockKey {
                    building_stock: building_stock.to_string(),
                    archetype: record.archetype_key(),
                    heat_source: heat_source.to_string(),
                },
                number_of_buildings,
                floor_area: record.raw.heated_floor_area_m2,
            });
        }
    }
    if dropped > 0 {
        debug!(dropped, "Dropped heating systems without heat source or prevalence");
    }

    let groups: IndexMap<StockKey, StockReducer> =
        group_by(contributions, |contribution| contribution.key.clone());
    Ok(groups
        .into_iter()
        .map(|(key, reducer)| BuildingStockStatistic {
            building_stock: key.building_stock,
            building_type: key.archetype.building_type,
            building_period: key.archetype.building_period.to_string(),
            location_id: key.archetype.location_id,
            heat_source: key.heat_source,
            number_of_buildings: reducer.number_of_buildings,
            average_gross_floor_area_m2_per_building: reducer.floor_area.value(),
        })
        .collect())
}

/// Weighted thermal properties of one structure type of one record.
#[derive(Clone, Debug, PartialEq)]
pub struct StructureContribution {
    pub archetype: ArchetypeKey,
    pub structure_type: String,
    pub coupling: HeatCoupling,
    pub u_values: UValues,
    pub effective_thermal_mass: f64,
    pub linear_thermal_bridges: f64,
}

impl StructureContribution {
    fn is_finite(&self) -> bool {
        self.u_values.is_finite()
            && !any_non_finite(&[self.effective_thermal_mass, self.linear_thermal_bridges])
    }

    fn values(&self) -> [f64; 6] {
        [
            self.u_values.exterior_air,
            self.u_values.exterior_ground,
            self.u_values.interior,
            self.u_values.total,
            self.effective_thermal_mass,
            self.linear_thermal_bridges,
        ]
    }
}

/// Calculate the contribution of a record to the statistics of a structure type, weighted
/// by its material combination weight.
///
/// Returns `None` if the record has no layers for the structure type.
pub fn structure_contribution(
    record: &ProcessedRecord,
    spec: &StructureTypeSpec,
    interior_node_depth: f64,
    period_of_variations: f64,
) -> Option<StructureContribution> {
    let layers = record.raw.structures.get(&spec.record_prefix)?;
    let weight = record.material_combination_weight;
    let u = u_values(layers, spec, interior_node_depth);
    Some(StructureContribution {
        archetype: record.archetype_key(),
        structure_type: spec.structure_type.clone(),
        coupling: spec.coupling(),
        u_values: UValues {
            exterior_air: weight * u.exterior_air,
            exterior_ground: weight * u.exterior_ground,
            interior: weight * u.interior,
            total: weight * u.total,
        },
        effective_thermal_mass: weight
            * effective_thermal_mass(layers, spec, period_of_variations),
        linear_thermal_bridges: weight * spec.linear_thermal_bridges,
    })
}

#[derive(Default)]
struct StructureReducer([f64; 6]);

impl Reducer<StructureContribution> for StructureReducer {
    fn accumulate(&mut self, item: &StructureContribution) {
        for (total, value) in self.0.iter_mut().zip(item.values()) {
            *total += value;
        }
    }
}

/// Calculate the weighted U-values, effective thermal mass and thermal bridging of every
/// structure type for every archetype.
#[instrument(skip_all)]
pub fn structure_statistics(
    records: &[ProcessedRecord],
    assumptions: &Assumptions,
    interior_node_depth: f64,
    period_of_variations: f64,
) -> Vec<StructureStatistic> {
    let specs: Vec<&StructureTypeSpec> = assumptions.structure_types().collect();
    let contributions: Vec<Option<StructureContribution>> = records
        .par_iter()
        .flat_map_iter(|record| {
            specs.iter().map(move |spec| {
                structure_contribution(record, spec, interior_node_depth, period_of_variations)
            })
        })
        .collect();

    let total = contributions.len();
    let valid: Vec<StructureContribution> = contributions
        .into_iter()
        .flatten()
        .filter(|contribution| {
            let is_finite = contribution.is_finite();
            if !is_finite {
                debug!(
                    location_id = %contribution.archetype.location_id,
                    structure_type = %contribution.structure_type,
                    coupling = %contribution.coupling,
                    "Non-physical structure properties"
                );
            }
            is_finite
        })
        .collect();
    if valid.len() < total {
        debug!(
            dropped = total - valid.len(),
            "Dropped structure contributions with missing layers or non-physical properties"
        );
    }

    let groups: IndexMap<(ArchetypeKey, String), StructureReducer> = group_by(valid, |c| {
        (c.archetype.clone(), c.structure_type.clone())
    });
    groups
        .into_iter()
        .map(|((archetype, structure_type), StructureReducer(sums))| {
            let [exterior_air, exterior_ground, interior, total, mass, bridges] = sums;
            StructureStatistic {
                building_type: archetype.building_type,
                building_period: archetype.building_period.to_string(),
                location_id: archetype.location_id,
                structure_type,
                design_u_value: total,
                external_u_value_to_ambient_air: exterior_air,
                external_u_value_to_ground: exterior_ground,
                internal_u_value_to_structure: interior,
                effective_thermal_mass: mass,
                linear_thermal_bridges: bridges,
            }
        })
        .collect()
}

struct VentilationContribution {
    archetype: ArchetypeKey,
    values: [f64; 5],
}

#[derive(Default)]
struct VentilationReducer([f64; 5]);

impl Reducer<VentilationContribution> for VentilationReducer {
    fn accumulate(&mut self, item: &VentilationContribution) {
        for (total, value) in self.0.iter_mut().zip(item.values) {
            *total += value;
        }
    }
}

/// Calculate the weighted ventilation, infiltration and fenestration properties of every
/// archetype.
#[instrument(skip_all)]
pub fn ventilation_and_fenestration_statistics(
    records: &[ProcessedRecord],
    assumptions: &Assumptions,
) -> Result<Vec<VentilationFenestrationStatistic>, AbmError> {
    let mut contributions = vec![];
    for record in records {
        let raw = &record.raw;
        let weight = record.material_combination_weight;
        let values = [
            assumptions.hru_efficiency(&raw.ventilation_system)?,
            raw.infiltration_rate_1_h,
            assumptions.solar_transmittance(&raw.glazing_type, &raw.window_coating)?,
            raw.ventilation_rate_1_h,
            raw.window_u_value,
        ]
        .map(|value| weight * value);
        if any_non_finite(&values) {
            debug!(
                reference_building = %raw.reference_building_code,
                "Dropped non-finite ventilation and fenestration properties"
            );
            continue;
        }
        contributions.push(VentilationContribution {
            archetype: record.archetype_key(),
            values,
        });
    }

    let groups: IndexMap<ArchetypeKey, VentilationReducer> =
        group_by(contributions, |contribution| contribution.archetype.clone());
    Ok(groups
        .into_iter()
        .map(|(archetype, VentilationReducer(sums))| {
            let [hru, infiltration, transmittance, ventilation, window_u] = sums;
            VentilationFenestrationStatistic {
                building_type: archetype.building_type,
                building_period: archetype.building_period.to_string(),
                location_id: archetype.location_id,
                hru_efficiency: hru,
                infiltration_rate_1_h: infiltration,
                total_normal_solar_energy_transmittance: transmittance,
                ventilation_rate_1_h: ventilation,
                window_u_value: window_u,
            }
        })
        .collect())
}
