//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  libsql::Error / ValidationError                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SyncError (pillmom-sync) ← Lifecycle context                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BridgeError (pillmom-ffi) ← Collapsed to -1 / NULL                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Categories
//! ```text
//! Connection  : ConnectionFailed, InvalidConfig, MigrationFailed
//! Write       : ForeignKeyViolation, ConstraintViolation, Validation
//! Read miss   : NotFound
//! Sync        : NotReplica, SyncFailed
//! Other       : QueryFailed, TransactionFailed, Decode, Internal
//! ```

use pillmom_core::ValidationError;
use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - ID doesn't exist
    /// - Soft-deleted record
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - A raw write references a medication row that does not exist
    ///   (repository writes check liveness first and report NotFound)
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// NOT NULL / CHECK constraint violation.
    #[error("Constraint violation: {message}")]
    ConstraintViolation { message: String },

    /// Record failed field validation before reaching the store.
    #[error("Invalid record: {0}")]
    Validation(#[from] ValidationError),

    /// Database could not be opened or reached.
    ///
    /// ## When This Occurs
    /// - File can't be created (permissions, missing directory)
    /// - File is not a database
    /// - Remote unreachable or token rejected
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Open parameters were rejected before any connection attempt.
    ///
    /// ## When This Occurs
    /// - Remote URL missing, unparseable or with an unsupported scheme
    /// - Sync interval below one second
    #[error("Invalid connection settings: {0}")]
    InvalidConfig(String),

    /// Ensure-schema migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Sync was requested on a store that is not an embedded replica.
    #[error("Database is not an embedded replica")]
    NotReplica,

    /// Replica sync with the remote failed.
    #[error("Sync failed: {0}")]
    SyncFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// A column value did not have the expected type.
    #[error("Cannot decode column '{column}': {reason}")]
    Decode { column: String, reason: String },

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub(crate) fn decode(column: &str, reason: impl Into<String>) -> Self {
        DbError::Decode {
            column: column.to_string(),
            reason: reason.into(),
        }
    }

    /// Returns true for read misses.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound { .. })
    }

    /// Returns true for failures caused by the record being written.
    pub fn is_write_error(&self) -> bool {
        matches!(
            self,
            DbError::ForeignKeyViolation { .. }
                | DbError::ConstraintViolation { .. }
                | DbError::Validation(_)
        )
    }
}

/// Convert libsql errors to DbError.
///
/// ## Error Mapping
/// ```text
/// "FOREIGN KEY constraint failed"              → DbError::ForeignKeyViolation
/// "NOT NULL" / "CHECK" / "UNIQUE ..."         → DbError::ConstraintViolation
/// Other                                        → DbError::QueryFailed
/// ```
impl From<libsql::Error> for DbError {
    fn from(err: libsql::Error) -> Self {
        let msg = err.to_string();

        if msg.contains("FOREIGN KEY constraint failed") {
            DbError::ForeignKeyViolation { message: msg }
        } else if msg.contains("NOT NULL constraint failed")
            || msg.contains("CHECK constraint failed")
            || msg.contains("UNIQUE constraint failed")
        {
            DbError::ConstraintViolation { message: msg }
        } else {
            DbError::QueryFailed(msg)
        }
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert!(DbError::not_found("Medication", 3).is_not_found());
        assert!(DbError::ForeignKeyViolation {
            message: String::new()
        }
        .is_write_error());
        assert!(DbError::Validation(ValidationError::Required {
            field: "name".to_string()
        })
        .is_write_error());
        assert!(!DbError::NotReplica.is_write_error());
        assert!(!DbError::InvalidConfig("bad url".to_string()).is_write_error());
    }

    #[test]
    fn test_not_found_message() {
        let err = DbError::not_found("Reminder", 42);
        assert_eq!(err.to_string(), "Reminder not found: 42");
    }
}
