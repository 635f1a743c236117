//! # Validation Module
//!
//! Field rules checked by the repositories before any write.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Host app                                                     │
//! │  └── Form checks, immediate feedback                                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Repository (Rust)                                            │
//! │  └── THIS MODULE: name / time / days rules                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database                                                     │
//! │  ├── NOT NULL constraints                                              │
//! │  └── Foreign key (reminders.medication_id)                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveTime;

use crate::error::ValidationError;
use crate::types::{DaySchedule, Medication, Reminder};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 200;
const MAX_TEXT_LEN: usize = 2000;

/// Validates a medication name.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - At most 200 characters
///
/// ## Example
/// ```rust
/// use pillmom_core::validation::validate_name;
///
/// assert!(validate_name("Aspirin").is_ok());
/// assert!(validate_name("   ").is_err());
/// ```
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required("name"));
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

fn validate_free_text(field: &str, value: &str) -> ValidationResult<()> {
    if value.chars().count() > MAX_TEXT_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_TEXT_LEN,
        });
    }
    Ok(())
}

/// Validates a time of day in `"HH:MM"` (24-hour) form.
///
/// ## Example
/// ```rust
/// use pillmom_core::validation::validate_time;
///
/// assert!(validate_time("09:00").is_ok());
/// assert!(validate_time("23:59").is_ok());
/// assert!(validate_time("9:00").is_err());
/// assert!(validate_time("24:00").is_err());
/// ```
pub fn validate_time(time: &str) -> ValidationResult<()> {
    if time.is_empty() {
        return Err(ValidationError::required("time"));
    }

    // Exactly five characters keeps "9:00" and "09:00:00" out.
    if time.len() != 5 || NaiveTime::parse_from_str(time, "%H:%M").is_err() {
        return Err(ValidationError::invalid_format("time", "expected HH:MM"));
    }

    Ok(())
}

/// Validates a reminder day selector. See [`DaySchedule`] for the grammar.
pub fn validate_days(days: &str) -> ValidationResult<()> {
    if days.trim().is_empty() {
        return Err(ValidationError::required("days"));
    }

    days.parse::<DaySchedule>()
        .map(|_| ())
        .map_err(|e| ValidationError::invalid_format("days", e.to_string()))
}

/// Validates every writable field of a medication.
pub fn validate_medication(medication: &Medication) -> ValidationResult<()> {
    validate_name(&medication.name)?;
    validate_free_text("dosage", &medication.dosage)?;
    validate_free_text("description", &medication.description)?;
    Ok(())
}

/// Validates every writable field of a reminder.
pub fn validate_reminder(reminder: &Reminder) -> ValidationResult<()> {
    if reminder.medication_id <= 0 {
        return Err(ValidationError::required("medication_id"));
    }
    validate_time(&reminder.time)?;
    validate_days(&reminder.days)?;
    Ok(())
}
