use thiserror::Error;

#[derive(Debug, Error)]
pub enum AbmError {
    #[error("No entry for '{key}' was found in the '{table}' assumptions")]
    MissingAssumption { table: &'static str, key: String },
    #[error("Invalid processing configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Extrapolation to '{target_location}' refers to source location '{source_location}', which is not a sampled location")]
    UnknownExtrapolationSource {
        source_location: String,
        target_location: String,
    },
    #[error("Extrapolation target location '{0}' already exists in the data")]
    ExtrapolationTargetExists(String),
    #[error("Extrapolation target location '{0}' is mapped more than once")]
    DuplicateExtrapolationTarget(String),
    #[error("Extrapolation coefficient for '{target_location}' was {coefficient}, expected a finite non-negative number")]
    InvalidExtrapolationCoefficient {
        target_location: String,
        coefficient: f64,
    },
    #[error("Building scope '{0}' has no reference buildings with a positive floor area")]
    EmptyScope(String),
}

impl AbmError {
    pub(crate) fn missing_assumption(table: &'static str, key: impl Into<String>) -> Self {
        Self::MissingAssumption {
            table,
            key: key.into(),
        }
    }
}
