//! # Medication Repository
//!
//! Database operations for medications.
//!
//! ## Key Operations
//! - CRUD with soft deletion
//! - Reads load the medication's live reminders
//! - Delete cascades the soft delete to the reminders, atomically
//!
//! ## Soft Delete Cascade
//! ```text
//! delete(1)
//!    │
//!    ▼  one transaction
//! ┌──────────────────────────────────────────────────────────┐
//! │ UPDATE medications SET deleted_at=now WHERE id=1 (live)  │ 0 rows → NotFound
//! │ UPDATE reminders   SET deleted_at=now                    │
//! │        WHERE medication_id=1 (live)                      │
//! └──────────────────────────────────────────────────────────┘
//! Rows stay in the table; every read filters deleted_at IS NULL.
//! ```

use std::collections::HashMap;

use chrono::{DateTime, SubsecRound, Utc};
use libsql::Value;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::executor::{text, timestamp, Executor, FromRow, Row, Statement};
use crate::repository::reminder::SELECT_REMINDERS;
use pillmom_core::validation::validate_medication;
use pillmom_core::{Medication, Reminder};

pub(crate) const SELECT_MEDICATIONS: &str =
    "SELECT id, created_at, updated_at, deleted_at, name, dosage, description FROM medications";

impl FromRow for Medication {
    fn from_row(row: &Row) -> DbResult<Self> {
        Ok(Medication {
            id: row.get("id")?,
            name: row.get("name")?,
            dosage: row.get("dosage")?,
            description: row.get("description")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
            deleted_at: row.get("deleted_at")?,
            reminders: Vec::new(),
        })
    }
}

/// Current time at the precision timestamps are stored with.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Repository for medication database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.medications();
///
/// let mut med = Medication::new("Aspirin", "100mg", "");
/// let id = repo.create(&mut med).await?;
///
/// let med = repo.get(id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct MedicationRepository {
    executor: Executor,
}

impl MedicationRepository {
    pub fn new(executor: Executor) -> Self {
        MedicationRepository { executor }
    }

    /// Inserts a new medication.
    ///
    /// Fills in `id`, `created_at` and `updated_at` on success.
    ///
    /// ## Errors
    /// * `DbError::Validation` - empty name, oversize text
    pub async fn create(&self, medication: &mut Medication) -> DbResult<i64> {
        validate_medication(medication)?;

        let now = now();
        let row = self
            .executor
            .query_one(
                "INSERT INTO medications (created_at, updated_at, name, dosage, description) \
                 VALUES (?, ?, ?, ?, ?) RETURNING id",
                vec![
                    timestamp(&now),
                    timestamp(&now),
                    text(&medication.name),
                    text(&medication.dosage),
                    text(&medication.description),
                ],
            )
            .await?
            .ok_or_else(|| DbError::Internal("INSERT returned no id".to_string()))?;
        let id: i64 = row.get("id")?;

        medication.id = id;
        medication.created_at = now;
        medication.updated_at = now;
        medication.deleted_at = None;

        debug!(id, name = %medication.name, "Medication created");
        Ok(id)
    }

    /// Gets a live medication with its live reminders.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - unknown id or soft-deleted
    pub async fn get(&self, id: i64) -> DbResult<Medication> {
        debug!(id, "Getting medication");

        let mut medication: Medication = self
            .executor
            .fetch_optional(
                &format!("{} WHERE id = ? AND deleted_at IS NULL", SELECT_MEDICATIONS),
                vec![Value::Integer(id)],
            )
            .await?
            .ok_or_else(|| DbError::not_found("Medication", id))?;

        medication.reminders = self
            .executor
            .fetch_all(
                &format!(
                    "{} WHERE medication_id = ? AND deleted_at IS NULL ORDER BY id",
                    SELECT_REMINDERS
                ),
                vec![Value::Integer(id)],
            )
            .await?;

        Ok(medication)
    }

    /// Lists every live medication with its live reminders, by id.
    pub async fn get_all(&self) -> DbResult<Vec<Medication>> {
        let mut medications: Vec<Medication> = self
            .executor
            .fetch_all(
                &format!("{} WHERE deleted_at IS NULL ORDER BY id", SELECT_MEDICATIONS),
                Vec::new(),
            )
            .await?;

        let reminders: Vec<Reminder> = self
            .executor
            .fetch_all(
                &format!("{} WHERE deleted_at IS NULL ORDER BY id", SELECT_REMINDERS),
                Vec::new(),
            )
            .await?;

        let mut by_medication: HashMap<i64, Vec<Reminder>> = HashMap::new();
        for reminder in reminders {
            by_medication
                .entry(reminder.medication_id)
                .or_default()
                .push(reminder);
        }
        for medication in &mut medications {
            medication.reminders = by_medication.remove(&medication.id).unwrap_or_default();
        }

        debug!(count = medications.len(), "Listed medications");
        Ok(medications)
    }

    /// Overwrites name, dosage and description of a live medication.
    ///
    /// Whatever the passed record holds is written; there is no merge.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - no live medication with this id
    /// * `DbError::Validation` - empty name, oversize text
    pub async fn update(&self, medication: &mut Medication) -> DbResult<()> {
        validate_medication(medication)?;

        let now = now();
        let affected = self
            .executor
            .execute(
                "UPDATE medications SET name = ?, dosage = ?, description = ?, updated_at = ? \
                 WHERE id = ? AND deleted_at IS NULL",
                vec![
                    text(&medication.name),
                    text(&medication.dosage),
                    text(&medication.description),
                    timestamp(&now),
                    Value::Integer(medication.id),
                ],
            )
            .await?;

        if affected == 0 {
            return Err(DbError::not_found("Medication", medication.id));
        }

        medication.updated_at = now;
        debug!(id = medication.id, "Medication updated");
        Ok(())
    }

    /// Soft-deletes a medication and its live reminders.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - no live medication with this id
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let now = now();
        let counts = self
            .executor
            .atomic(vec![
                Statement::new(
                    "UPDATE medications SET deleted_at = ?, updated_at = ? \
                     WHERE id = ? AND deleted_at IS NULL",
                    vec![timestamp(&now), timestamp(&now), Value::Integer(id)],
                )
                .required(),
                Statement::new(
                    "UPDATE reminders SET deleted_at = ?, updated_at = ? \
                     WHERE medication_id = ? AND deleted_at IS NULL",
                    vec![timestamp(&now), timestamp(&now), Value::Integer(id)],
                ),
            ])
            .await?;

        if counts.first().copied().unwrap_or(0) == 0 {
            return Err(DbError::not_found("Medication", id));
        }

        debug!(
            id,
            reminders = counts.get(1).copied().unwrap_or(0),
            "Medication deleted"
        );
        Ok(())
    }

    /// Number of live medications.
    pub async fn count(&self) -> DbResult<i64> {
        self.executor
            .query_scalar(
                "SELECT count(*) FROM medications WHERE deleted_at IS NULL",
                Vec::new(),
            )
            .await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
