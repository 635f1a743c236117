//! # Error Types
//!
//! Domain-specific error types for pillmom-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  pillmom-core errors (this file)                                       │
//! │  ├── CoreError        - Schedule / timestamp parse failures            │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  pillmom-db errors                                                     │
//! │  └── DbError          - Store failures (wraps ValidationError)         │
//! │                                                                         │
//! │  pillmom-sync errors                                                   │
//! │  └── SyncError        - Lifecycle / replica failures                   │
//! │                                                                         │
//! │  pillmom-ffi errors                                                    │
//! │  └── BridgeError      - Collapsed to -1 / NULL at the C boundary       │
//! │                                                                         │
//! │  Flow: ValidationError → DbError → SyncError → BridgeError → host      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A `days` string could not be understood.
    #[error("Invalid day schedule '{value}': {reason}")]
    InvalidSchedule { value: String, reason: String },

    /// A stored timestamp could not be parsed.
    #[error("Invalid timestamp '{0}'")]
    InvalidTimestamp(String),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before a record is written so the store never sees a row that
/// breaks a field rule.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Invalid format (e.g., "25:00" for a time of day).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    pub(crate) fn required(field: &str) -> Self {
        ValidationError::Required {
            field: field.to_string(),
        }
    }

    pub(crate) fn invalid_format(field: &str, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::required("name");
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::invalid_format("time", "expected HH:MM");
        assert_eq!(err.to_string(), "time has invalid format: expected HH:MM");
    }

    #[test]
    fn test_core_errors_come_from_parsing() {
        let err = "Mon,Funday".parse::<crate::DaySchedule>().unwrap_err();
        assert!(matches!(err, CoreError::InvalidSchedule { .. }));

        let err = crate::parse_timestamp("yesterday").unwrap_err();
        assert!(matches!(err, CoreError::InvalidTimestamp(_)));
    }
}
