//! Error types for the simulation engine

use thiserror::Error;

/// Top-level error type for simulation runs
#[derive(Debug, Error)]
pub enum SimError {
    #[error("Invalid configuration: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Worker pool error: {0}")]
    WorkerPool(String),
}

/// Errors detected while constructing or validating simulation parameters
///
/// These are fatal and reported before any frame is simulated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("nslots ({nslots}) is not a multiple of n_time_slots ({n_time_slots})")]
    SlotsNotMultiple { nslots: usize, n_time_slots: usize },

    #[error("max_replicas ({max_replicas}) exceeds the available {available} {unit}")]
    TooManyReplicas {
        max_replicas: usize,
        available: usize,
        unit: &'static str,
    },

    #[error("nslots is mandatory for slot-based schemes")]
    MissingSlots,

    #[error("nslots must not be set for RA4Step, the slot space is derived from msg1 occasions")]
    SlotsForbidden,

    #[error("no default PLR curve for coderate {coderate} and modulation order {modulation_order}; supply a PLR model")]
    UnsupportedCoderate { coderate: f64, modulation_order: u32 },

    #[error("Invalid value for field '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("Invalid distribution: {0}")]
    InvalidDistribution(String),
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_converts_into_sim_error() {
        let err: SimError = ConfigError::MissingSlots.into();
        assert!(matches!(err, SimError::Configuration(ConfigError::MissingSlots)));
        assert_eq!(
            err.to_string(),
            "Invalid configuration: nslots is mandatory for slot-based schemes"
        );
    }

    #[test]
    fn test_slots_not_multiple_message() {
        let err = ConfigError::SlotsNotMultiple {
            nslots: 10,
            n_time_slots: 3,
        };
        assert_eq!(
            err.to_string(),
            "nslots (10) is not a multiple of n_time_slots (3)"
        );
    }
}
