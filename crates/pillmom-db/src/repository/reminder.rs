//! # Reminder Repository
//!
//! Database operations for reminders.
//!
//! ## Key Operations
//! - CRUD with soft deletion
//! - Single and list reads load the owning medication
//! - Day-of-week filtering for "what is due today"

use std::collections::HashMap;

use chrono::Weekday;
use libsql::Value;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use crate::executor::{text, timestamp, Executor, FromRow, Row};
use crate::repository::medication::{now, SELECT_MEDICATIONS};
use pillmom_core::validation::validate_reminder;
use pillmom_core::{Medication, Reminder};

pub(crate) const SELECT_REMINDERS: &str = "SELECT id, created_at, updated_at, deleted_at, \
     medication_id, time, days, is_active FROM reminders";

impl FromRow for Reminder {
    fn from_row(row: &Row) -> DbResult<Self> {
        Ok(Reminder {
            id: row.get("id")?,
            medication_id: row.get("medication_id")?,
            time: row.get("time")?,
            days: row.get("days")?,
            is_active: row.get::<Option<bool>>("is_active")?.unwrap_or(true),
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
            deleted_at: row.get("deleted_at")?,
            medication: None,
        })
    }
}

/// Repository for reminder database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.reminders();
///
/// let mut reminder = Reminder::new(med_id, "09:00", "Mon,Wed,Fri");
/// repo.create(&mut reminder).await?;
///
/// let due = repo.get_active_for_day(Weekday::Mon).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ReminderRepository {
    executor: Executor,
}

impl ReminderRepository {
    pub fn new(executor: Executor) -> Self {
        ReminderRepository { executor }
    }

    /// Inserts a new reminder for a live medication.
    ///
    /// ## Errors
    /// * `DbError::Validation` - bad time (`HH:MM`) or day list
    /// * `DbError::NotFound` - medication unknown or soft-deleted
    pub async fn create(&self, reminder: &mut Reminder) -> DbResult<i64> {
        validate_reminder(reminder)?;

        let now = now();
        let row = self
            .executor
            .query_one(
                "INSERT INTO reminders (created_at, updated_at, medication_id, time, days, is_active) \
                 SELECT ?, ?, ?, ?, ?, ? \
                 WHERE EXISTS (SELECT 1 FROM medications WHERE id = ? AND deleted_at IS NULL) \
                 RETURNING id",
                vec![
                    timestamp(&now),
                    timestamp(&now),
                    Value::Integer(reminder.medication_id),
                    text(&reminder.time),
                    text(&reminder.days),
                    Value::Integer(reminder.is_active as i64),
                    Value::Integer(reminder.medication_id),
                ],
            )
            .await?
            .ok_or_else(|| DbError::not_found("Medication", reminder.medication_id))?;
        let id: i64 = row.get("id")?;

        reminder.id = id;
        reminder.created_at = now;
        reminder.updated_at = now;
        reminder.deleted_at = None;

        debug!(id, medication_id = reminder.medication_id, "Reminder created");
        Ok(id)
    }

    /// Gets a live reminder with its medication.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - unknown id or soft-deleted
    pub async fn get(&self, id: i64) -> DbResult<Reminder> {
        debug!(id, "Getting reminder");

        let reminder: Reminder = self
            .executor
            .fetch_optional(
                &format!("{} WHERE id = ? AND deleted_at IS NULL", SELECT_REMINDERS),
                vec![Value::Integer(id)],
            )
            .await?
            .ok_or_else(|| DbError::not_found("Reminder", id))?;

        let mut loaded = self.with_medications(vec![reminder]).await?;
        loaded
            .pop()
            .ok_or_else(|| DbError::Internal("reminder lost while loading".to_string()))
    }

    /// Lists every live reminder with its medication, by id.
    pub async fn get_all(&self) -> DbResult<Vec<Reminder>> {
        let reminders = self
            .executor
            .fetch_all(
                &format!("{} WHERE deleted_at IS NULL ORDER BY id", SELECT_REMINDERS),
                Vec::new(),
            )
            .await?;
        self.with_medications(reminders).await
    }

    /// Lists the live reminders of one medication, by id.
    ///
    /// An unknown medication yields an empty list.
    pub async fn get_by_medication(&self, medication_id: i64) -> DbResult<Vec<Reminder>> {
        self.executor
            .fetch_all(
                &format!(
                    "{} WHERE medication_id = ? AND deleted_at IS NULL ORDER BY id",
                    SELECT_REMINDERS
                ),
                vec![Value::Integer(medication_id)],
            )
            .await
    }

    /// Lists live, active reminders with their medications, by id.
    pub async fn get_active(&self) -> DbResult<Vec<Reminder>> {
        let reminders = self
            .executor
            .fetch_all(
                &format!(
                    "{} WHERE is_active = 1 AND deleted_at IS NULL ORDER BY id",
                    SELECT_REMINDERS
                ),
                Vec::new(),
            )
            .await?;
        self.with_medications(reminders).await
    }

    /// Lists live, active reminders that fire on `day`, by time of day.
    ///
    /// Rows whose `days` no longer parse are skipped with a warning.
    pub async fn get_active_for_day(&self, day: Weekday) -> DbResult<Vec<Reminder>> {
        let reminders: Vec<Reminder> = self
            .executor
            .fetch_all(
                &format!(
                    "{} WHERE is_active = 1 AND deleted_at IS NULL ORDER BY time, id",
                    SELECT_REMINDERS
                ),
                Vec::new(),
            )
            .await?;

        let due: Vec<Reminder> = reminders
            .into_iter()
            .filter(|r| match r.schedule() {
                Ok(schedule) => schedule.fires_on(day),
                Err(e) => {
                    warn!(id = r.id, days = %r.days, error = %e, "Skipping reminder with bad schedule");
                    false
                }
            })
            .collect();

        debug!(?day, count = due.len(), "Reminders due");
        self.with_medications(due).await
    }

    /// Overwrites medication_id, time, days and is_active of a live reminder.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - no live reminder with this id, or its
    ///   medication_id names no live medication
    /// * `DbError::Validation` - bad time or day list
    pub async fn update(&self, reminder: &mut Reminder) -> DbResult<()> {
        validate_reminder(reminder)?;

        let now = now();
        let affected = self
            .executor
            .execute(
                "UPDATE reminders SET medication_id = ?, time = ?, days = ?, is_active = ?, updated_at = ? \
                 WHERE id = ? AND deleted_at IS NULL \
                 AND EXISTS (SELECT 1 FROM medications WHERE id = ? AND deleted_at IS NULL)",
                vec![
                    Value::Integer(reminder.medication_id),
                    text(&reminder.time),
                    text(&reminder.days),
                    Value::Integer(reminder.is_active as i64),
                    timestamp(&now),
                    Value::Integer(reminder.id),
                    Value::Integer(reminder.medication_id),
                ],
            )
            .await?;

        if affected == 0 {
            return Err(self.explain_update_miss(reminder).await?);
        }

        reminder.updated_at = now;
        debug!(id = reminder.id, is_active = reminder.is_active, "Reminder updated");
        Ok(())
    }

    /// Soft-deletes a reminder.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - no live reminder with this id
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let now = now();
        let affected = self
            .executor
            .execute(
                "UPDATE reminders SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
                vec![timestamp(&now), timestamp(&now), Value::Integer(id)],
            )
            .await?;

        if affected == 0 {
            return Err(DbError::not_found("Reminder", id));
        }

        debug!(id, "Reminder deleted");
        Ok(())
    }

    /// Number of live reminders.
    pub async fn count(&self) -> DbResult<i64> {
        self.executor
            .query_scalar("SELECT count(*) FROM reminders WHERE deleted_at IS NULL", Vec::new())
            .await
    }

    /// Which side of a zero-row update was missing.
    async fn explain_update_miss(&self, reminder: &Reminder) -> DbResult<DbError> {
        let live_reminder = self
            .executor
            .query_scalar(
                "SELECT count(*) FROM reminders WHERE id = ? AND deleted_at IS NULL",
                vec![Value::Integer(reminder.id)],
            )
            .await?;
        if live_reminder == 0 {
            return Ok(DbError::not_found("Reminder", reminder.id));
        }
        Ok(DbError::not_found("Medication", reminder.medication_id))
    }

    /// Attaches each reminder's live medication (left `None` if deleted).
    async fn with_medications(&self, mut reminders: Vec<Reminder>) -> DbResult<Vec<Reminder>> {
        let mut ids: Vec<i64> = reminders.iter().map(|r| r.medication_id).collect();
        ids.sort_unstable();
        ids.dedup();
        if ids.is_empty() {
            return Ok(reminders);
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let medications: Vec<Medication> = self
            .executor
            .fetch_all(
                &format!(
                    "{} WHERE id IN ({}) AND deleted_at IS NULL",
                    SELECT_MEDICATIONS, placeholders
                ),
                ids.into_iter().map(Value::Integer).collect(),
            )
            .await?;

        let by_id: HashMap<i64, Medication> =
            medications.into_iter().map(|m| (m.id, m)).collect();
        for reminder in &mut reminders {
            reminder.medication = by_id.get(&reminder.medication_id).cloned().map(Box::new);
        }
        Ok(reminders)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn setup_with_medication() -> (Database, i64) {
        let db = Database::open(DbConfig::in_memory()).await.unwrap();
        let mut med = Medication::new("Aspirin", "100mg", "");
        let id = db.medications().create(&mut med).await.unwrap();
        (db, id)
    }

    #[tokio::test]
    async fn test_create_defaults_active_and_loads_medication() {
        let (db, med_id) = setup_with_medication().await;
        let repo = db.reminders();

        let mut reminder = Reminder::new(med_id, "09:00", "Mon,Wed,Fri");
        let id = repo.create(&mut reminder).await.unwrap();

        let fetched = repo.get(id).await.unwrap();
        assert!(fetched.is_active);
        assert_eq!(fetched.time, "09:00");
        assert_eq!(fetched.days, "Mon,Wed,Fri");
        assert_eq!(fetched.medication.as_ref().map(|m| m.name.as_str()), Some("Aspirin"));

        let med = db.medications().get(med_id).await.unwrap();
        assert_eq!(med.reminders.len(), 1);
        assert_eq!(med.reminders[0].id, id);
    }

    #[tokio::test]
    async fn test_create_for_missing_medication_fails() {
        let (db, _) = setup_with_medication().await;
        let mut reminder = Reminder::new(999, "09:00", "Daily");

        let err = db.reminders().create(&mut reminder).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { ref entity, .. } if entity == "Medication"));
        assert_eq!(reminder.id, 0);
    }

    #[tokio::test]
    async fn test_create_for_deleted_medication_fails() {
        let (db, med_id) = setup_with_medication().await;
        db.medications().delete(med_id).await.unwrap();

        let mut reminder = Reminder::new(med_id, "09:00", "Daily");
        let err = db.reminders().create(&mut reminder).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { ref entity, .. } if entity == "Medication"));
        assert!(db.reminders().get_all().await.unwrap().is_empty());
        assert_eq!(db.reminders().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_cannot_move_to_deleted_medication() {
        let (db, med_a) = setup_with_medication().await;
        let mut other = Medication::new("Ibuprofen", "200mg", "");
        let med_b = db.medications().create(&mut other).await.unwrap();
        db.medications().delete(med_b).await.unwrap();

        let repo = db.reminders();
        let mut reminder = Reminder::new(med_a, "09:00", "Daily");
        repo.create(&mut reminder).await.unwrap();

        reminder.medication_id = med_b;
        let err = repo.update(&mut reminder).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { ref entity, .. } if entity == "Medication"));

        let stored = repo.get(reminder.id).await.unwrap();
        assert_eq!(stored.medication_id, med_a);
        assert!(stored.medication.is_some());
    }

    #[tokio::test]
    async fn test_create_rejects_bad_time() {
        let (db, med_id) = setup_with_medication().await;
        let mut reminder = Reminder::new(med_id, "25:00", "Daily");

        let err = db.reminders().create(&mut reminder).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }

    #[tokio::test]
    async fn test_get_by_medication_returns_only_live_own_reminders() {
        let (db, med_a) = setup_with_medication().await;
        let mut other = Medication::new("Ibuprofen", "200mg", "");
        let med_b = db.medications().create(&mut other).await.unwrap();
        let repo = db.reminders();

        let mut r1 = Reminder::new(med_a, "08:00", "Daily");
        let mut r2 = Reminder::new(med_a, "20:00", "Daily");
        let mut r3 = Reminder::new(med_b, "12:00", "Daily");
        repo.create(&mut r1).await.unwrap();
        repo.create(&mut r2).await.unwrap();
        repo.create(&mut r3).await.unwrap();
        repo.delete(r2.id).await.unwrap();

        let for_a = repo.get_by_medication(med_a).await.unwrap();
        assert_eq!(for_a.iter().map(|r| r.id).collect::<Vec<_>>(), vec![r1.id]);
        assert!(repo.get_by_medication(4242).await.unwrap().is_empty());
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_get_active_and_update() {
        let (db, med_id) = setup_with_medication().await;
        let repo = db.reminders();

        let mut r1 = Reminder::new(med_id, "08:00", "Daily");
        let mut r2 = Reminder::new(med_id, "20:00", "Daily");
        repo.create(&mut r1).await.unwrap();
        repo.create(&mut r2).await.unwrap();

        r2.is_active = false;
        r2.time = "21:30".to_string();
        repo.update(&mut r2).await.unwrap();

        let active = repo.get_active().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, r1.id);
        assert!(active[0].medication.is_some());

        let all = repo.get_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].time, "21:30");
        assert!(!all[1].is_active);
    }

    #[tokio::test]
    async fn test_update_and_delete_missing() {
        let (db, med_id) = setup_with_medication().await;
        let repo = db.reminders();

        let mut ghost = Reminder::new(med_id, "08:00", "Daily");
        ghost.id = 77;
        assert!(repo.update(&mut ghost).await.unwrap_err().is_not_found());
        assert!(repo.delete(77).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_get_active_for_day() {
        let (db, med_id) = setup_with_medication().await;
        let repo = db.reminders();

        let mut evening = Reminder::new(med_id, "20:00", "Daily");
        let mut morning = Reminder::new(med_id, "08:00", "Mon,Wed,Fri");
        let mut weekend = Reminder::new(med_id, "10:00", "Sat,Sun");
        repo.create(&mut evening).await.unwrap();
        repo.create(&mut morning).await.unwrap();
        repo.create(&mut weekend).await.unwrap();

        let monday = repo.get_active_for_day(Weekday::Mon).await.unwrap();
        assert_eq!(
            monday.iter().map(|r| r.time.as_str()).collect::<Vec<_>>(),
            vec!["08:00", "20:00"]
        );

        let sunday = repo.get_active_for_day(Weekday::Sun).await.unwrap();
        assert_eq!(
            sunday.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![weekend.id, evening.id]
        );
    }

    #[tokio::test]
    async fn test_medication_delete_hides_reminders() {
        let (db, med_id) = setup_with_medication().await;
        let mut reminder = Reminder::new(med_id, "09:00", "Daily");
        db.reminders().create(&mut reminder).await.unwrap();

        db.medications().delete(med_id).await.unwrap();

        assert!(db.reminders().get_all().await.unwrap().is_empty());
        assert!(db.reminders().get_active().await.unwrap().is_empty());
        assert_eq!(db.reminders().count().await.unwrap(), 0);
    }
}
