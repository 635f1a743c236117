//! # Session
//!
//! The one explicitly owned handle to the store. Replaces a process-wide
//! "current connection": whoever owns the `Session` owns the store, and
//! every open/close goes through it.
//!
//! ## States
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │                 open_local                                              │
//! │  Uninitialized ─────────────► Local(Database)                          │
//! │       │                          │        ▲                             │
//! │       │ open_replica             │ close  │ open_local                  │
//! │       ▼                          ▼        │                             │
//! │  Replica{db, agent} ──close──► Closed ────┘                             │
//! │       ▲                          │                                      │
//! │       └──────open_replica────────┘                                      │
//! │                                                                         │
//! │  Opening while open closes the previous store first.                   │
//! │  close() on Uninitialized / Closed is a no-op.                         │
//! │  CRUD / sync outside Local|Replica → NoActiveConnection                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use pillmom_db::{
    Database, DatabaseKind, DbConfig, MedicationRepository, ReminderRepository, ReplicaConfig,
    SyncReport,
};
use tracing::{info, warn};

use crate::agent::SyncAgent;
use crate::error::{SyncError, SyncResult};

/// Store lifecycle state.
#[derive(Debug, Default)]
pub enum Session {
    /// Nothing opened yet.
    #[default]
    Uninitialized,

    /// Local file or in-memory store.
    Local(Database),

    /// Embedded replica with its background sync task.
    Replica { db: Database, agent: SyncAgent },

    /// Was open, now closed.
    Closed,
}

impl Session {
    pub fn new() -> Self {
        Session::default()
    }

    /// Opens a local store, closing any store already open.
    pub async fn open_local(&mut self, config: DbConfig) -> SyncResult<()> {
        self.close().await?;

        let db = Database::open(config).await?;
        info!(kind = ?db.kind(), path = %db.location().display(), "Session opened");
        *self = Session::Local(db);
        Ok(())
    }

    /// Opens an embedded replica and starts its background sync, closing
    /// any store already open.
    ///
    /// ## Steps
    /// 1. Close the previous store (stops its agent)
    /// 2. Open the replica: validate, initial sync, ensure-schema, sync
    /// 3. Spawn the agent with `config.sync_interval`
    pub async fn open_replica(&mut self, config: ReplicaConfig) -> SyncResult<()> {
        self.close().await?;

        let db = Database::open_replica(&config).await?;
        let agent = SyncAgent::spawn(db.clone(), config.sync_interval);
        info!(path = %db.location().display(), "Session opened (replica)");
        *self = Session::Replica { db, agent };
        Ok(())
    }

    /// Syncs the replica now, independent of the background period.
    ///
    /// ## Errors
    /// * `SyncError::NoActiveConnection` - nothing open
    /// * `SyncError::NotReplica` - local store
    /// * `SyncError::Db(DbError::SyncFailed)` - remote refused or unreachable
    pub async fn sync(&self) -> SyncResult<SyncReport> {
        match self {
            Session::Uninitialized | Session::Closed => Err(SyncError::NoActiveConnection),
            Session::Local(_) => Err(SyncError::NotReplica),
            Session::Replica { db, .. } => Ok(db.sync().await?),
        }
    }

    /// Closes the store and stops background sync. Idempotent.
    pub async fn close(&mut self) -> SyncResult<()> {
        match std::mem::take(self) {
            Session::Uninitialized => Ok(()),
            Session::Closed => {
                *self = Session::Closed;
                Ok(())
            }
            Session::Local(db) => {
                db.close();
                *self = Session::Closed;
                info!("Session closed");
                Ok(())
            }
            Session::Replica { db, agent } => {
                *self = Session::Closed;
                let stopped = agent.shutdown().await;
                if let Err(e) = &stopped {
                    warn!(error = %e, "Sync agent did not stop cleanly");
                }
                db.close();
                info!("Session closed");
                stopped
            }
        }
    }

    /// The open store.
    pub fn database(&self) -> SyncResult<&Database> {
        match self {
            Session::Local(db) | Session::Replica { db, .. } => Ok(db),
            Session::Uninitialized | Session::Closed => Err(SyncError::NoActiveConnection),
        }
    }

    pub fn medications(&self) -> SyncResult<MedicationRepository> {
        Ok(self.database()?.medications())
    }

    pub fn reminders(&self) -> SyncResult<ReminderRepository> {
        Ok(self.database()?.reminders())
    }

    pub fn is_open(&self) -> bool {
        self.database().is_ok()
    }

    /// Kind of the open store, if any.
    pub fn kind(&self) -> Option<DatabaseKind> {
        self.database().ok().map(Database::kind)
    }

    /// The background sync task, when a replica is open.
    pub fn agent(&self) -> Option<&SyncAgent> {
        match self {
            Session::Replica { agent, .. } => Some(agent),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pillmom_core::Medication;

    #[tokio::test]
    async fn test_uninitialized_has_no_connection() {
        let session = Session::new();
        assert!(!session.is_open());
        assert!(matches!(session.sync().await, Err(SyncError::NoActiveConnection)));
        assert!(matches!(session.medications(), Err(SyncError::NoActiveConnection)));
    }

    #[tokio::test]
    async fn test_local_lifecycle() {
        let mut session = Session::new();
        session.open_local(DbConfig::in_memory()).await.unwrap();
        assert_eq!(session.kind(), Some(DatabaseKind::InMemory));
        assert!(session.agent().is_none());

        let mut med = Medication::new("Aspirin", "100mg", "");
        session.medications().unwrap().create(&mut med).await.unwrap();

        assert!(matches!(session.sync().await, Err(SyncError::NotReplica)));

        session.close().await.unwrap();
        assert!(matches!(session, Session::Closed));
        assert!(matches!(session.sync().await, Err(SyncError::NoActiveConnection)));

        // Idempotent.
        session.close().await.unwrap();
        assert!(matches!(session, Session::Closed));
    }

    #[tokio::test]
    async fn test_reopen_replaces_previous_store() {
        let mut session = Session::new();
        session.open_local(DbConfig::in_memory()).await.unwrap();
        let mut med = Medication::new("Aspirin", "100mg", "");
        session.medications().unwrap().create(&mut med).await.unwrap();

        session.open_local(DbConfig::in_memory()).await.unwrap();
        assert_eq!(session.medications().unwrap().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_invalid_replica_config_leaves_session_closed() {
        let mut session = Session::new();
        session.open_local(DbConfig::in_memory()).await.unwrap();

        let err = session
            .open_replica(ReplicaConfig::new("ftp://nowhere", "t"))
            .await
            .unwrap_err();
        assert!(err.is_config_error());
        assert!(!session.is_open());
    }
}
