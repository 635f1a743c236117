//! # Schema Migration
//!
//! Ensure-schema for PillMom. There are no numbered migration files: the
//! tables in [`crate::schema`] are the source of truth and the migrator
//! brings the store up to them.
//!
//! ## How It Works
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Ensure-Schema                                      │
//! │                                                                         │
//! │  Open / replica first sync                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  for table in [medications, reminders]                                 │
//! │       ├── missing?          CREATE TABLE + indexes                     │
//! │       ├── column missing?   ALTER TABLE ADD COLUMN                     │
//! │       └── index missing?    CREATE INDEX                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Nothing is ever dropped or rewritten                                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Running it on an up-to-date store changes nothing.

use tracing::info;

use crate::dialect::{Migrator, SqliteMigrator};
use crate::error::{DbError, DbResult};
use crate::executor::Executor;
use crate::schema::ALL_TABLES;

/// Brings the store's schema up to the current table declarations.
///
/// ## Example
/// ```rust,ignore
/// ensure_schema(db.executor()).await?;
/// ```
pub async fn ensure_schema(executor: &Executor) -> DbResult<()> {
    info!("Ensuring schema");

    SqliteMigrator::new(executor)
        .auto_migrate(&ALL_TABLES)
        .await
        .map_err(|e| match e {
            DbError::MigrationFailed(_) => e,
            other => DbError::MigrationFailed(other.to_string()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn schema_snapshot(executor: &Executor) -> Vec<String> {
        executor
            .query(
                "SELECT type || ':' || name FROM sqlite_master WHERE name NOT LIKE 'sqlite_%' ORDER BY name",
                Vec::new(),
            )
            .await
            .unwrap()
            .iter()
            .map(|row| row.get_at::<String>(0).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_ensure_schema_is_idempotent() {
        let db = Database::open(DbConfig::in_memory()).await.unwrap();
        let before = schema_snapshot(db.executor()).await;

        ensure_schema(db.executor()).await.unwrap();
        ensure_schema(db.executor()).await.unwrap();

        assert_eq!(schema_snapshot(db.executor()).await, before);
        assert_eq!(
            before,
            vec![
                "index:idx_medications_deleted_at",
                "index:idx_reminders_deleted_at",
                "table:medications",
                "table:reminders",
            ]
        );
    }
}
