// Extrapolation of the aggregated statistics onto locations missing from the sample, by
// cloning the rows of a sampled source location.

use crate::aggregation::{
    BuildingStockStatistic, StructureStatistic, VentilationFenestrationStatistic,
};
use crate::config::ExtrapolationMapping;
use crate::errors::AbmError;
use crate::input::BuildingStockDefinition;
use indexmap::IndexSet;
use itertools::Itertools;
use tracing::debug;

/// Rows that can be cloned from a sampled location onto an extrapolated one.
pub trait Extrapolate: Clone {
    fn location_id(&self) -> &str;

    /// Return a copy of this row for the target location of `mapping`.
    fn extrapolated(&self, mapping: &ExtrapolationMapping, tag: &str) -> Self;
}

/// Identifier of an extrapolated building stock.
pub fn tagged_building_stock(building_stock: &str, tag: &str) -> String {
    format!("{building_stock}_{tag}")
}

/// Check the mappings before anything is cloned.
///
/// Sources must be sampled locations, so an extrapolated location is never cloned again.
/// Targets must not be any location already present, sampled or extrapolated.
pub fn validate_mappings<'a>(
    mappings: &[ExtrapolationMapping],
    sampled_locations: impl IntoIterator<Item = &'a str>,
    existing_locations: impl IntoIterator<Item = &'a str>,
) -> Result<(), AbmError> {
    let sampled: IndexSet<&str> = sampled_locations.into_iter().collect();
    let existing: IndexSet<&str> = existing_locations.into_iter().collect();
    let mut targets: IndexSet<&str> = IndexSet::new();
    for mapping in mappings {
        if !sampled.contains(mapping.source.as_str()) {
            return Err(AbmError::UnknownExtrapolationSource {
                source_location: mapping.source.clone(),
                target_location: mapping.target.clone(),
            });
        }
        if existing.contains(mapping.target.as_str()) {
            return Err(AbmError::ExtrapolationTargetExists(mapping.target.clone()));
        }
        if !targets.insert(mapping.target.as_str()) {
            return Err(AbmError::DuplicateExtrapolationTarget(mapping.target.clone()));
        }
        if !mapping.coefficient.is_finite() || mapping.coefficient < 0. {
            return Err(AbmError::InvalidExtrapolationCoefficient {
                target_location: mapping.target.clone(),
                coefficient: mapping.coefficient,
            });
        }
    }
    Ok(())
}

/// Return the rows followed by their clones for every mapping, in mapping order.
pub fn extrapolate<T: Extrapolate>(
    rows: &[T],
    mappings: &[ExtrapolationMapping],
    tag: &str,
) -> Vec<T> {
    let mut extended = rows.to_vec();
    for mapping in mappings {
        let before = extended.len();
        extended.extend(
            rows.iter()
                .filter(|row| row.location_id() == mapping.source)
                .map(|row| row.extrapolated(mapping, tag)),
        );
        debug!(
            source = %mapping.source,
            target = %mapping.target,
            rows = extended.len() - before,
            "Extrapolated rows"
        );
    }
    extended
}

/// Append a tagged definition for every building stock referenced by extrapolated rows,
/// unless one is already defined.
pub fn extrapolate_building_stocks(
    stocks: &[BuildingStockDefinition],
    extrapolated_statistics: &[BuildingStockStatistic],
    tag: &str,
) -> Vec<BuildingStockDefinition> {
    let referenced: IndexSet<&str> = extrapolated_statistics
        .iter()
        .map(|statistic| statistic.building_stock.as_str())
        .collect();
    let existing: IndexSet<&str> = stocks
        .iter()
        .map(|stock| stock.building_stock.as_str())
        .collect();
    let clones = stocks
        .iter()
        .filter(|stock| {
            let tagged = tagged_building_stock(&stock.building_stock, tag);
            referenced.contains(tagged.as_str()) && !existing.contains(tagged.as_str())
        })
        .map(|stock| BuildingStockDefinition {
            building_stock: tagged_building_stock(&stock.building_stock, tag),
            building_stock_year: stock.building_stock_year,
            notes: format!("{} ({tag})", stock.notes).trim().to_string(),
        })
        .collect_vec();
    stocks.iter().cloned().chain(clones).collect()
}

impl Extrapolate for BuildingStockStatistic {
    fn location_id(&self) -> &str {
        &self.location_id
    }

    fn extrapolated(&self, mapping: &ExtrapolationMapping, tag: &str) -> Self {
        Self {
            building_stock: tagged_building_stock(&self.building_stock, tag),
            location_id: mapping.target.clone(),
            number_of_buildings: self.number_of_buildings * mapping.coefficient,
            ..self.clone()
        }
    }
}

impl Extrapolate for StructureStatistic {
    fn location_id(&self) -> &str {
        &self.location_id
    }

    fn extrapolated(&self, mapping: &ExtrapolationMapping, _tag: &str) -> Self {
        Self {
            location_id: mapping.target.clone(),
            ..self.clone()
        }
    }
}

impl Extrapolate for VentilationFenestrationStatistic {
    fn location_id(&self) -> &str {
        &self.location_id
    }

    fn extrapolated(&self, mapping: &ExtrapolationMapping, _tag: &str) -> Self {
        Self {
            location_id: mapping.target.clone(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn stock_statistic(location_id: &str, heat_source: &str, count: f64) -> BuildingStockStatistic {
        BuildingStockStatistic {
            building_stock: "residential".to_string(),
            building_type: "SFH".to_string(),
            building_period: "1946-1969".to_string(),
            location_id: location_id.to_string(),
            heat_source: heat_source.to_string(),
            number_of_buildings: count,
            average_gross_floor_area_m2_per_building: 120.,
        }
    }

    #[fixture]
    fn statistics() -> Vec<BuildingStockStatistic> {
        vec![
            stock_statistic("SE", "Boiler", 1000.),
            stock_statistic("FI", "District", 400.),
            stock_statistic("SE", "Heat pump", 250.),
        ]
    }

    #[rstest]
    fn should_scale_cloned_building_counts(statistics: Vec<BuildingStockStatistic>) {
        let mappings = [ExtrapolationMapping::new("SE", "NO", 0.5)];
        let extended = extrapolate(&statistics, &mappings, "extrapolated");

        assert_eq!(extended[..3], statistics[..]);
        assert_eq!(
            extended[3..],
            [
                BuildingStockStatistic {
                    building_stock: "residential_extrapolated".to_string(),
                    location_id: "NO".to_string(),
                    number_of_buildings: 500.,
                    ..stock_statistic("SE", "Boiler", 1000.)
                },
                BuildingStockStatistic {
                    building_stock: "residential_extrapolated".to_string(),
                    location_id: "NO".to_string(),
                    number_of_buildings: 125.,
                    ..stock_statistic("SE", "Heat pump", 250.)
                },
            ]
        );
    }

    #[rstest]
    fn should_clone_for_every_mapping_in_one_pass(statistics: Vec<BuildingStockStatistic>) {
        let mappings = [
            ExtrapolationMapping::new("SE", "NO", 0.5),
            ExtrapolationMapping::new("FI", "EE", 0.25),
            ExtrapolationMapping::new("SE", "DK", 1.),
        ];
        let extended = extrapolate(&statistics, &mappings, "x");
        let locations = extended.iter().map(|s| s.location_id.as_str()).collect_vec();
        assert_eq!(
            locations,
            vec!["SE", "FI", "SE", "NO", "NO", "EE", "DK", "DK"]
        );
    }

    #[rstest]
    fn should_leave_rows_untouched_without_mappings(statistics: Vec<BuildingStockStatistic>) {
        assert_eq!(extrapolate(&statistics, &[], "extrapolated"), statistics);
    }

    #[rstest]
    #[case(ExtrapolationMapping::new("DE", "NO", 0.5), "'DE'")]
    #[case(ExtrapolationMapping::new("SE", "FI", 0.5), "'FI' already exists")]
    #[case(ExtrapolationMapping::new("SE", "NO", f64::NAN), "coefficient for 'NO'")]
    #[case(ExtrapolationMapping::new("SE", "NO", -0.1), "coefficient for 'NO'")]
    fn should_reject_malformed_mapping(#[case] mapping: ExtrapolationMapping, #[case] message: &str) {
        let error = validate_mappings(&[mapping], ["SE", "FI"], ["SE", "FI"]).unwrap_err();
        assert!(error.to_string().contains(message), "{error}");
    }

    #[rstest]
    fn should_only_accept_sampled_locations_as_source() {
        let mapping = ExtrapolationMapping::new("NO", "DK", 0.5);
        assert!(matches!(
            validate_mappings(&[mapping], ["SE", "FI"], ["SE", "FI", "NO"]),
            Err(AbmError::UnknownExtrapolationSource { source_location, .. }) if source_location == "NO"
        ));
    }

    #[rstest]
    fn should_reject_target_extrapolated_before() {
        let mapping = ExtrapolationMapping::new("FI", "NO", 0.5);
        assert!(matches!(
            validate_mappings(&[mapping], ["SE", "FI"], ["SE", "FI", "NO"]),
            Err(AbmError::ExtrapolationTargetExists(target)) if target == "NO"
        ));
    }

    #[rstest]
    fn should_reject_duplicate_targets() {
        let mappings = [
            ExtrapolationMapping::new("SE", "NO", 0.5),
            ExtrapolationMapping::new("FI", "NO", 0.5),
        ];
        assert!(matches!(
            validate_mappings(&mappings, ["SE", "FI"], ["SE", "FI"]),
            Err(AbmError::DuplicateExtrapolationTarget(target)) if target == "NO"
        ));
    }

    #[rstest]
    fn should_add_tagged_building_stocks(statistics: Vec<BuildingStockStatistic>) {
        let stocks = vec![
            BuildingStockDefinition {
                building_stock: "residential".to_string(),
                building_stock_year: 2020,
                notes: "sampled".to_string(),
            },
            BuildingStockDefinition {
                building_stock: "non-residential".to_string(),
                building_stock_year: 2020,
                notes: String::new(),
            },
        ];
        let extended = extrapolate(&statistics, &[ExtrapolationMapping::new("SE", "NO", 0.5)], "extrapolated");
        let with_clones = extrapolate_building_stocks(&stocks, &extended, "extrapolated");
        assert_eq!(with_clones.len(), 3);
        assert_eq!(with_clones[2].building_stock, "residential_extrapolated");
        assert_eq!(with_clones[2].notes, "sampled (extrapolated)");
    }
}
