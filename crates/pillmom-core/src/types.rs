//! # Domain Types
//!
//! The two records PillMom persists, plus the parsed form of a reminder's
//! day selector.
//!
//! ## Relationship
//! ```text
//! ┌──────────────────────────┐ 1      * ┌──────────────────────────┐
//! │ Medication               │──────────│ Reminder                 │
//! │  id                      │          │  id                      │
//! │  name (required)         │          │  medication_id ──► FK    │
//! │  dosage                  │          │  time   "HH:MM"          │
//! │  description             │          │  days   "Mon,Wed" | Daily│
//! │  created/updated/deleted │          │  is_active (default on)  │
//! │  reminders: Vec<..>      │          │  medication: Option<..>  │
//! └──────────────────────────┘          └──────────────────────────┘
//! ```
//!
//! ## Identity
//! `id == 0` means "not yet stored". The store assigns ids on create.
//!
//! ## Soft Deletion
//! `deleted_at == None` means the row is live. Repositories never return
//! rows with a deletion marker.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};
use crate::DAILY;

// =============================================================================
// Medication
// =============================================================================

/// A medication the user takes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Medication {
    /// Store-assigned identifier (0 until created).
    #[serde(default)]
    pub id: i64,

    /// Display name, e.g. "Aspirin". Must not be empty.
    pub name: String,

    /// Free-text dosage, e.g. "100mg".
    #[serde(default)]
    pub dosage: String,

    /// Free-text notes.
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub updated_at: DateTime<Utc>,

    /// Soft-deletion marker. `None` = live.
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,

    /// Live reminders owned by this medication (loaded on reads).
    #[serde(default)]
    pub reminders: Vec<Reminder>,
}

impl Medication {
    /// Creates an unsaved medication.
    pub fn new(
        name: impl Into<String>,
        dosage: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Medication {
            name: name.into(),
            dosage: dosage.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    /// Returns true if the record has not been soft-deleted.
    pub fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }
}

// =============================================================================
// Reminder
// =============================================================================

/// A time of day at which a medication should be taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    /// Store-assigned identifier (0 until created).
    #[serde(default)]
    pub id: i64,

    /// Owning medication.
    pub medication_id: i64,

    /// Time of day, `"HH:MM"` (24-hour).
    pub time: String,

    /// `"Mon,Wed,Fri"` or `"Daily"`. See [`DaySchedule`].
    #[serde(default)]
    pub days: String,

    #[serde(default = "default_active")]
    pub is_active: bool,

    #[serde(default)]
    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,

    /// Owning medication (loaded on single and list reads).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medication: Option<Box<Medication>>,
}

fn default_active() -> bool {
    true
}

impl Default for Reminder {
    fn default() -> Self {
        Reminder {
            id: 0,
            medication_id: 0,
            time: String::new(),
            days: String::new(),
            is_active: true,
            created_at: DateTime::default(),
            updated_at: DateTime::default(),
            deleted_at: None,
            medication: None,
        }
    }
}

impl Reminder {
    /// Creates an unsaved, active reminder.
    pub fn new(medication_id: i64, time: impl Into<String>, days: impl Into<String>) -> Self {
        Reminder {
            medication_id,
            time: time.into(),
            days: days.into(),
            ..Default::default()
        }
    }

    /// Returns true if the record has not been soft-deleted.
    pub fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }

    /// Parses the `days` field.
    pub fn schedule(&self) -> CoreResult<DaySchedule> {
        self.days.parse()
    }
}

// =============================================================================
// Day Schedule
// =============================================================================

/// Parsed form of a reminder's `days` string.
///
/// ## Accepted Input
/// ```text
/// "Daily"          → DaySchedule::Daily
/// "Mon,Wed,Fri"    → DaySchedule::Days([Mon, Wed, Fri])
/// "mon, wed"       → DaySchedule::Days([Mon, Wed])   (case/space tolerant)
/// ""               → error
/// "Mon,,Fri"       → error (empty entry)
/// "Mon,Mon"        → error (duplicate)
/// "Monday"         → error (three-letter abbreviations only)
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DaySchedule {
    Daily,
    Days(Vec<Weekday>),
}

impl DaySchedule {
    /// Returns true if a reminder with this schedule fires on `day`.
    pub fn fires_on(&self, day: Weekday) -> bool {
        match self {
            DaySchedule::Daily => true,
            DaySchedule::Days(days) => days.contains(&day),
        }
    }
}

impl FromStr for DaySchedule {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = |reason: &str| CoreError::InvalidSchedule {
            value: s.to_string(),
            reason: reason.to_string(),
        };

        if trimmed.is_empty() {
            return Err(invalid("no days given"));
        }
        if trimmed.eq_ignore_ascii_case(DAILY) {
            return Ok(DaySchedule::Daily);
        }

        let mut days = Vec::new();
        for part in trimmed.split(',') {
            let part = part.trim();
            if part.is_empty() {
                return Err(invalid("empty entry"));
            }
            let day = parse_weekday(part)
                .ok_or_else(|| invalid(&format!("unknown day '{}'", part)))?;
            if days.contains(&day) {
                return Err(invalid(&format!("duplicate day '{}'", part)));
            }
            days.push(day);
        }

        Ok(DaySchedule::Days(days))
    }
}

impl fmt::Display for DaySchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DaySchedule::Daily => write!(f, "{}", DAILY),
            DaySchedule::Days(days) => {
                let names: Vec<String> = days.iter().map(|d| d.to_string()).collect();
                write!(f, "{}", names.join(","))
            }
        }
    }
}

/// Three-letter abbreviations only; chrono's own parser also takes full names.
fn parse_weekday(s: &str) -> Option<Weekday> {
    if s.len() != 3 {
        return None;
    }
    s.parse::<Weekday>().ok()
}

// =============================================================================
// Timestamps
// =============================================================================

/// Formats a timestamp the way it is stored (RFC 3339, UTC, microseconds).
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parses a stored timestamp.
///
/// Accepts RFC 3339 and SQLite's `datetime('now')` form
/// (`YYYY-MM-DD HH:MM:SS`, assumed UTC).
pub fn parse_timestamp(s: &str) -> CoreResult<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| CoreError::InvalidTimestamp(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_new_reminder_is_active() {
        let reminder = Reminder::new(1, "09:00", "Mon,Wed,Fri");
        assert!(reminder.is_active);
        assert_eq!(reminder.id, 0);
        assert!(reminder.is_live());
    }

    #[test]
    fn test_schedule_parsing() {
        assert_eq!("Daily".parse::<DaySchedule>().unwrap(), DaySchedule::Daily);
        assert_eq!("daily".parse::<DaySchedule>().unwrap(), DaySchedule::Daily);
        assert_eq!(
            "Mon, wed,FRI".parse::<DaySchedule>().unwrap(),
            DaySchedule::Days(vec![Weekday::Mon, Weekday::Wed, Weekday::Fri])
        );

        assert!("".parse::<DaySchedule>().is_err());
        assert!("Mon,,Fri".parse::<DaySchedule>().is_err());
        assert!("Mon,Mon".parse::<DaySchedule>().is_err());
        assert!("Monday".parse::<DaySchedule>().is_err());
        assert!("Xyz".parse::<DaySchedule>().is_err());
    }

    #[test]
    fn test_schedule_display_is_canonical() {
        let schedule: DaySchedule = "tue, thu".parse().unwrap();
        assert_eq!(schedule.to_string(), "Tue,Thu");
        assert_eq!(DaySchedule::Daily.to_string(), "Daily");
    }

    #[test]
    fn test_fires_on() {
        let schedule: DaySchedule = "Sat,Sun".parse().unwrap();
        assert!(schedule.fires_on(Weekday::Sun));
        assert!(!schedule.fires_on(Weekday::Mon));
        assert!(DaySchedule::Daily.fires_on(Weekday::Mon));
    }

    #[test]
    fn test_timestamp_round_trip_and_sqlite_form() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        assert_eq!(parse_timestamp(&format_timestamp(&ts)).unwrap(), ts);
        assert_eq!(parse_timestamp("2024-03-01 09:30:00").unwrap(), ts);
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_json_shape() {
        let mut med = Medication::new("Aspirin", "100mg", "");
        med.id = 7;
        let json = serde_json::to_value(&med).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["name"], "Aspirin");
        assert!(json["deleted_at"].is_null());
        assert!(json["reminders"].as_array().unwrap().is_empty());

        // A reminder without a loaded medication omits the field.
        let reminder = Reminder::new(7, "08:00", "Daily");
        let json = serde_json::to_value(&reminder).unwrap();
        assert!(json.get("medication").is_none());
        assert_eq!(json["is_active"], true);

        // Missing is_active on input defaults to true.
        let parsed: Reminder =
            serde_json::from_str(r#"{"medication_id":7,"time":"08:00","days":"Daily"}"#).unwrap();
        assert!(parsed.is_active);
    }
}
