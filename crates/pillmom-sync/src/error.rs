//! # Sync Error Types
//!
//! Error types for the store lifecycle.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sync Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │   Lifecycle     │  │  Configuration  │  │     Database            │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │ NoActiveConn.   │  │  InvalidConfig  │  │  Db(DbError)            │ │
//! │  │ NotReplica      │  │                 │  │  (connect, schema,      │ │
//! │  │ AgentStopped    │  │                 │  │   sync, records)        │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use pillmom_db::DbError;
use thiserror::Error;

/// Result type alias for lifecycle operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Lifecycle error type.
#[derive(Debug, Error)]
pub enum SyncError {
    /// No store is open.
    ///
    /// ## When This Occurs
    /// - Any operation before the first open
    /// - Any operation after close
    #[error("no active database connector")]
    NoActiveConnection,

    /// Sync was requested on a local store.
    #[error("Database is not an embedded replica")]
    NotReplica,

    /// Invalid configuration (environment or arguments).
    #[error("Invalid sync configuration: {0}")]
    InvalidConfig(String),

    /// The background sync task is gone.
    #[error("Sync agent stopped: {0}")]
    AgentStopped(String),

    /// Store operation failed.
    #[error(transparent)]
    Db(#[from] DbError),
}

impl SyncError {
    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SyncError::InvalidConfig(_) | SyncError::Db(DbError::InvalidConfig(_))
        )
    }

    /// Returns true for read misses coming from the store.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SyncError::Db(e) if e.is_not_found())
    }
}
