use crate::core::units::{DAYS_PER_WEEK, SECONDS_PER_DAY};
use crate::errors::AbmError;
use bitflags::bitflags;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_valid::Validate;
use std::io::Read;

pub const DEFAULT_INTERIOR_NODE_DEPTH: f64 = 0.1;
pub const DEFAULT_PERIOD_OF_VARIATIONS_S: f64 = (2 * DAYS_PER_WEEK * SECONDS_PER_DAY) as f64;
pub const DEFAULT_ROOM_HEIGHT_M: f64 = 2.6;
pub const DEFAULT_EXTRAPOLATION_TAG: &str = "extrapolated";

bitflags! {
    /// Dimensions over which reference buildings are pooled into a single building scope.
    #[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
    #[serde(transparent)]
    pub struct AggregationFlags: u8 {
        const BUILDING_TYPES = 0b01;
        const BUILDING_PERIODS = 0b10;
    }
}

/// Clone the statistics of a sampled location onto a location missing from the sample,
/// scaling the number of buildings by `coefficient`.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ExtrapolationMapping {
    pub source: String,
    pub target: String,
    #[validate(minimum = 0.)]
    pub coefficient: f64,
}

impl ExtrapolationMapping {
    pub fn new(source: &str, target: &str, coefficient: f64) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            coefficient,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Depth of the structural temperature nodes, as a fraction of the thermal resistance of
    /// the structure from its interior surface up to the middle of its insulation.
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub interior_node_depth: f64,
    /// Period of variations for the effective thickness method, in seconds.
    #[validate(exclusive_minimum = 0.)]
    pub period_of_variations_s: f64,
    #[validate(exclusive_minimum = 0.)]
    pub room_height_m: f64,
    pub aggregation: AggregationFlags,
    pub weather_start: NaiveDate,
    pub weather_end: NaiveDate,
    #[validate]
    pub extrapolation: Vec<ExtrapolationMapping>,
    pub extrapolation_tag: String,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            interior_node_depth: DEFAULT_INTERIOR_NODE_DEPTH,
            period_of_variations_s: DEFAULT_PERIOD_OF_VARIATIONS_S,
            room_height_m: DEFAULT_ROOM_HEIGHT_M,
            aggregation: AggregationFlags::empty(),
            weather_start: NaiveDate::from_ymd_opt(2010, 1, 1).expect("valid calendar date"),
            weather_end: NaiveDate::from_ymd_opt(2010, 12, 31).expect("valid calendar date"),
            extrapolation: vec![],
            extrapolation_tag: DEFAULT_EXTRAPOLATION_TAG.to_string(),
        }
    }
}

impl ProcessingConfig {
    pub fn from_json(json: impl Read) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_reader(json)?;
        Ok(config.validated()?)
    }

    pub fn validated(self) -> Result<Self, AbmError> {
        self.validate()
            .map_err(|errors| AbmError::InvalidConfiguration(errors.to_string()))?;
        if self.weather_start > self.weather_end {
            return Err(AbmError::InvalidConfiguration(format!(
                "weather_start {} is after weather_end {}",
                self.weather_start, self.weather_end
            )));
        }
        if self.extrapolation_tag.is_empty() && !self.extrapolation.is_empty() {
            return Err(AbmError::InvalidConfiguration(
                "extrapolation_tag must not be empty when extrapolating".to_string(),
            ));
        }
        Ok(self)
    }

    pub fn aggregates_building_types(&self) -> bool {
        self.aggregation.contains(AggregationFlags::BUILDING_TYPES)
    }

    pub fn aggregates_building_periods(&self) -> bool {
        self.aggregation.contains(AggregationFlags::BUILDING_PERIODS)
    }
}
