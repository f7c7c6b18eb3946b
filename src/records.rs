// Preprocessing of the raw reference building records: building periods, normalised
// heating system prevalences and material combination weights.

use crate::core::heating_systems::{normalize_prevalences, HeatingSystem};
use crate::input::RawBuildingRecord;
use crate::statistics::{group_by, Sum};
use indexmap::IndexMap;
use itertools::Itertools;
use serde::Serialize;
use std::fmt::{Display, Formatter};
use tracing::warn;

/// Construction period of a reference building, shown as "start-end".
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct BuildingPeriod {
    pub start: i32,
    pub end: i32,
}

impl BuildingPeriod {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    /// Return the period spanning both periods.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl Display for BuildingPeriod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BuildingPeriodRow {
    pub building_period: String,
    pub period_start: i32,
    pub period_end: i32,
}

impl From<BuildingPeriod> for BuildingPeriodRow {
    fn from(period: BuildingPeriod) -> Self {
        Self {
            building_period: period.to_string(),
            period_start: period.start,
            period_end: period.end,
        }
    }
}

/// Key shared by the material combinations of the same archetype.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ArchetypeKey {
    pub building_type: String,
    pub building_period: BuildingPeriod,
    pub location_id: String,
}

/// A raw record with the fields derived during preprocessing attached.
#[derive(Clone, Debug, PartialEq)]
pub struct ProcessedRecord {
    pub raw: RawBuildingRecord,
    pub building_period: BuildingPeriod,
    /// Heating systems with prevalences rescaled to sum to one.
    pub heating_systems: Vec<HeatingSystem>,
    /// Share of the heated floor area of this record among the records of its archetype.
    pub material_combination_weight: f64,
}

impl ProcessedRecord {
    pub fn archetype_key(&self) -> ArchetypeKey {
        archetype_key_for(&self.raw)
    }
}

fn archetype_key_for(record: &RawBuildingRecord) -> ArchetypeKey {
    ArchetypeKey {
        building_type: record.building_type.clone(),
        building_period: building_period_for(record),
        location_id: record.location_id.clone(),
    }
}

fn building_period_for(record: &RawBuildingRecord) -> BuildingPeriod {
    BuildingPeriod::new(record.construction_year_low, record.construction_year_high)
}

/// Calculate the share of each item's area of the total area of its group.
pub fn material_combination_weights<K>(keyed_areas: &[(K, f64)]) -> Vec<f64>
where
    K: Clone + std::hash::Hash + Eq + Ord,
{
    let totals: IndexMap<K, Sum> = group_by(keyed_areas.iter().cloned(), |(key, _)| key.clone());
    keyed_areas
        .iter()
        .map(|(key, area)| area / totals[key].0)
        .collect()
}

/// Attach the building period, normalised prevalences and material combination weights.
pub fn preprocess(records: Vec<RawBuildingRecord>) -> Vec<ProcessedRecord> {
    let keyed_areas: Vec<(ArchetypeKey, f64)> = records
        .iter()
        .map(|record| (archetype_key_for(record), record.heated_floor_area_m2))
        .collect();
    let weights = material_combination_weights(&keyed_areas);

    records
        .into_iter()
        .zip(weights)
        .map(|(raw, material_combination_weight)| {
            let heating_systems = normalize_prevalences(&raw.heating_systems);
            if heating_systems.iter().any(|system| system.prevalence.is_nan()) {
                warn!(
                    reference_building = %raw.reference_building_code,
                    "Heating system prevalences sum to zero, the record won't count towards the building stock"
                );
            }
            ProcessedRecord {
                building_period: building_period_for(&raw),
                heating_systems,
                material_combination_weight,
                raw,
            }
        })
        .collect()
}

/// Unique building periods of the records, in order of first appearance.
pub fn building_periods(records: &[ProcessedRecord]) -> Vec<BuildingPeriodRow> {
    records
        .iter()
        .map(|record| record.building_period)
        .unique()
        .map(BuildingPeriodRow::from)
        .collect()
}
