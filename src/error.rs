//! Unified error hierarchy for VitalRS
//!
//! The scoring engine itself is total: it never fails for a well-typed snapshot.
//! Errors only arise at the edges, when a caller hands over a structurally broken
//! snapshot, loads an inconsistent configuration, or reads/writes files.

use thiserror::Error;

/// Top-level error type for all VitalRS operations
#[derive(Debug, Error)]
pub enum VitalRsError {
    /// Snapshot validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] SnapshotError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Problems found in a metric snapshot
///
/// `MissingSubjectId` is the only structural error and makes a snapshot unusable.
/// The remaining variants describe individual fields the engine will treat as
/// "not computable" rather than reject.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SnapshotError {
    /// Subject identifier is empty or whitespace
    #[error("Snapshot has no subject id")]
    MissingSubjectId,

    /// A numeric field holds a negative value
    #[error("Negative value for {field}: {value}")]
    NegativeValue { field: &'static str, value: f64 },

    /// A percentage field lies outside 0-100
    #[error("{field} out of range: {value}% (valid range: 0-100%)")]
    PercentOutOfRange { field: &'static str, value: f64 },

    /// A sleep stage is longer than the total sleep time
    #[error("{stage} sleep of {minutes} min exceeds total sleep of {total} min")]
    StageExceedsTotal {
        stage: &'static str,
        minutes: u32,
        total: u32,
    },

    /// Deep and REM sleep together are longer than the total sleep time
    #[error("deep ({deep} min) and REM ({rem} min) sleep together exceed total sleep of {total} min")]
    StagesExceedTotal { deep: u32, rem: u32, total: u32 },

    /// Total sleep is longer than a day
    #[error("Total sleep of {minutes} min is longer than a day")]
    SleepExceedsDay { minutes: u32 },

    /// A numeric field is NaN or infinite
    #[error("Non-finite value for {field}")]
    NonFinite { field: &'static str },
}

impl SnapshotError {
    /// Whether the snapshot must be rejected before scoring
    pub fn is_structural(&self) -> bool {
        matches!(self, SnapshotError::MissingSubjectId)
    }
}

/// Engine configuration errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A weight set does not sum to 1.0
    #[error("{set} weights sum to {sum}, expected 1.0")]
    WeightSum { set: &'static str, sum: f64 },

    /// A single weight is negative or non-finite
    #[error("Invalid weight for {set}.{factor}: {value}")]
    InvalidWeight {
        set: &'static str,
        factor: &'static str,
        value: f64,
    },

    /// A threshold or baseline parameter is out of range
    #[error("Invalid parameter {parameter}={value}")]
    InvalidParameter { parameter: &'static str, value: f64 },
}

/// Result type alias for VitalRS operations
pub type Result<T> = std::result::Result<T, VitalRsError>;

impl VitalRsError {
    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            VitalRsError::Validation(_) => ErrorSeverity::Warning,
            VitalRsError::Configuration(_) => ErrorSeverity::Error,
            VitalRsError::Io(_) => ErrorSeverity::Error,
            VitalRsError::Serialization(_) => ErrorSeverity::Error,
            VitalRsError::Internal(_) => ErrorSeverity::Critical,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            VitalRsError::Validation(SnapshotError::MissingSubjectId) => {
                "The daily metrics are not attached to a subject and cannot be scored.".to_string()
            }
            VitalRsError::Configuration(ConfigError::WeightSum { set, .. }) => {
                format!(
                    "The {} weights in your configuration must add up to 1.0.",
                    set
                )
            }
            VitalRsError::Serialization(e) => {
                format!("Could not read the metrics data: {}", e)
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Critical system error requiring immediate attention
    Critical,
    /// Error that prevents operation but system can continue
    Error,
    /// Warning that doesn't prevent operation
    Warning,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Critical => tracing::Level::ERROR,
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_severity() {
        let err = VitalRsError::Validation(SnapshotError::MissingSubjectId);
        assert_eq!(err.severity(), ErrorSeverity::Warning);

        let err = VitalRsError::Internal("test".to_string());
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(err.severity().to_tracing_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_structural_errors() {
        assert!(SnapshotError::MissingSubjectId.is_structural());
        assert!(!SnapshotError::NegativeValue {
            field: "steps",
            value: -1.0
        }
        .is_structural());
    }

    #[test]
    fn test_user_messages() {
        let err = VitalRsError::from(SnapshotError::MissingSubjectId);
        assert!(err.user_message().contains("not attached to a subject"));

        let err = VitalRsError::from(ConfigError::WeightSum {
            set: "recovery",
            sum: 0.9,
        });
        assert!(err.user_message().contains("recovery"));
    }

    #[test]
    fn test_error_display() {
        let err = SnapshotError::StageExceedsTotal {
            stage: "deep",
            minutes: 500,
            total: 400,
        };
        assert_eq!(
            err.to_string(),
            "deep sleep of 500 min exceeds total sleep of 400 min"
        );
    }
}
