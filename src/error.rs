//! Unified error hierarchy for paceplan
//!
//! Load failures are fatal to a planning run, validation failures on custom
//! marker rows are recovered by discarding the row. An invalid race start
//! fails the run before any clock time is assigned.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for all planning operations
#[derive(Debug, Error)]
pub enum PlannerError {
    /// Track file could not be loaded
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Input validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Race start could not be interpreted as a time of day
    #[error("Invalid start time: {0}")]
    InvalidStartTime(#[from] InvalidStartTimeError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Export errors
    #[error("Export error: {0}")]
    Export(#[from] crate::export::ExportError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Track loading errors
#[derive(Debug, Error)]
pub enum LoadError {
    /// File not found at specified path
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// File exists but is not a readable track
    #[error("Could not parse track: {reason}")]
    Parse { reason: String },

    /// Track parsed but contains no points
    #[error("Track contains no points")]
    EmptyTrack,

    /// No importer handles this file
    #[error("Unsupported track format: {path}")]
    UnsupportedFormat { path: PathBuf },
}

/// Validation errors for custom markers and planning parameters
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Marker distance must be positive, got {value}")]
    NonPositiveDistance { value: f64 },

    #[error("Marker nickname must not be empty")]
    EmptyNickname,

    #[error("Cutoff time is not HH:MM:SS or HH:MM: {value}")]
    InvalidCutoff { value: String },

    #[error("Loop count must be at least 1, got {value}")]
    InvalidLoopCount { value: u32 },

    #[error("Base pace must be a positive number of minutes, got {value}")]
    InvalidBasePace { value: f64 },
}

impl ValidationError {
    /// Marker row errors are dropped locally; parameter errors stop the run
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ValidationError::NonPositiveDistance { .. }
                | ValidationError::EmptyNickname
                | ValidationError::InvalidCutoff { .. }
        )
    }
}

/// Race start value that is not a time of day
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("race start must be HH:MM:SS or HH:MM, got {value:?}")]
pub struct InvalidStartTimeError {
    pub value: String,
}

/// Result type alias for planning operations
pub type Result<T> = std::result::Result<T, PlannerError>;

impl PlannerError {
    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            PlannerError::Validation(err) if err.is_recoverable() => ErrorSeverity::Warning,
            PlannerError::InvalidStartTime(_) => ErrorSeverity::Warning,
            PlannerError::Load(LoadError::FileNotFound { .. }) => ErrorSeverity::Error,
            PlannerError::Configuration(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            PlannerError::Load(LoadError::FileNotFound { path }) => {
                format!("Could not find track file: {}", path.display())
            }
            PlannerError::Load(LoadError::EmptyTrack) => {
                "The track file has no track points to plan against.".to_string()
            }
            PlannerError::Load(LoadError::Parse { reason }) => {
                format!("Track file is corrupted: {}", reason)
            }
            PlannerError::InvalidStartTime(err) => format!(
                "Race start {:?} is not a time of day. Use HH:MM or HH:MM:SS.",
                err.value
            ),
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Unusable configuration
    Critical,
    /// Error that prevents the planning run
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
        let err = PlannerError::Load(LoadError::EmptyTrack);
        assert_eq!(err.severity(), ErrorSeverity::Error);

        let err = PlannerError::Validation(ValidationError::EmptyNickname);
        assert_eq!(err.severity(), ErrorSeverity::Warning);

        let err = PlannerError::Validation(ValidationError::InvalidLoopCount { value: 0 });
        assert_eq!(err.severity(), ErrorSeverity::Error);

        let err = PlannerError::Configuration("bad".to_string());
        assert_eq!(err.severity().to_tracing_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_recoverable_validation() {
        assert!(ValidationError::NonPositiveDistance { value: -1.0 }.is_recoverable());
        assert!(!ValidationError::InvalidBasePace { value: 0.0 }.is_recoverable());
    }

    #[test]
    fn test_user_messages() {
        let err = PlannerError::Load(LoadError::FileNotFound {
            path: PathBuf::from("route.gpx"),
        });
        assert!(err.user_message().contains("Could not find"));

        let err = PlannerError::InvalidStartTime(InvalidStartTimeError {
            value: "noon".to_string(),
        });
        assert!(err.user_message().contains("noon"));
    }
}
