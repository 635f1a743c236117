//! # Database Handle
//!
//! Opening and configuring the store: a local file, an in-memory database
//! (tests), or an embedded replica of a remote libsql/Turso database.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Database Handle                                    │
//! │                                                                         │
//! │  DbConfig::new(path)            ReplicaConfig::new(url, token)         │
//! │       │                               │                                 │
//! │       ▼                               ▼                                 │
//! │  Database::open(config)         Database::open_replica(&config)        │
//! │       │                               │                                 │
//! │       │                               ├── validate url / interval      │
//! │       │                               ├── initial sync (pull)          │
//! │       ├── PRAGMA foreign_keys          │                                │
//! │       ├── PRAGMA journal_mode=WAL      │                                │
//! │       ▼                               ▼                                 │
//! │  ensure_schema ◄──────────────────────┤                                 │
//! │                                       └── sync again (push schema)     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │  Database                               │                           │
//! │  │  ├── libsql::Database  (Arc, shared)    │                           │
//! │  │  └── Executor (one libsql::Connection)  │                           │
//! │  └─────────────────────────────────────────┘                           │
//! │       │                                                                 │
//! │       ├── medications() → MedicationRepository                         │
//! │       ├── reminders()   → ReminderRepository                           │
//! │       └── sync()        → SyncReport (replica only)                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Embedded Replica
//! Reads are served from the local file. Writes go to the remote primary
//! and are visible locally at once. `sync()` pulls frames written by other
//! replicas.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use libsql::Builder;
use pillmom_core::{DEFAULT_DATABASE_FILE, DEFAULT_REPLICA_FILE, DEFAULT_SYNC_INTERVAL_SECS};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::executor::Executor;
use crate::migrations;
use crate::repository::medication::MedicationRepository;
use crate::repository::reminder::ReminderRepository;

/// URL schemes libsql accepts for a remote primary.
pub const REMOTE_SCHEMES: [&str; 5] = ["libsql", "https", "http", "wss", "ws"];

// =============================================================================
// Configuration
// =============================================================================

/// Local database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/pillmom.db").enable_wal(false);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the database file.
    pub database_path: PathBuf,

    /// Use a private in-memory database instead of a file.
    pub in_memory: bool,

    /// Switch the file to WAL journaling.
    /// Default: true
    pub enable_wal: bool,

    /// Enforce foreign keys (off by default in SQLite).
    /// Default: true
    pub foreign_keys: bool,

    /// Run ensure-schema on open.
    /// Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    /// Creates a configuration for a local file. Created if missing.
    ///
    /// An empty path means `pillmom.db` in the working directory.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let mut database_path: PathBuf = path.into();
        if database_path.as_os_str().is_empty() {
            database_path = PathBuf::from(DEFAULT_DATABASE_FILE);
        }
        DbConfig {
            database_path,
            in_memory: false,
            enable_wal: true,
            foreign_keys: true,
            run_migrations: true,
        }
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let db = Database::open(DbConfig::in_memory()).await?;
    /// // Isolated, gone when dropped
    /// ```
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            in_memory: true,
            enable_wal: false,
            foreign_keys: true,
            run_migrations: true,
        }
    }

    pub fn enable_wal(mut self, enable: bool) -> Self {
        self.enable_wal = enable;
        self
    }

    pub fn foreign_keys(mut self, enable: bool) -> Self {
        self.foreign_keys = enable;
        self
    }

    /// Sets whether to run ensure-schema on open.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        DbConfig::new(DEFAULT_DATABASE_FILE)
    }
}

/// Embedded replica configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = ReplicaConfig::new("libsql://my-db.turso.io", token)
///     .sync_interval(Duration::from_secs(5))
///     .local_path("/data/replica.db");
/// ```
#[derive(Clone)]
pub struct ReplicaConfig {
    /// Remote primary, e.g. `libsql://db-org.turso.io`.
    pub remote_url: String,

    /// Access token for the remote.
    pub auth_token: String,

    /// Local replica file.
    /// Default: `local_replica.db`
    pub local_path: PathBuf,

    /// Period of the background sync.
    /// Default: 60 seconds
    pub sync_interval: Duration,

    /// Run ensure-schema after the initial sync.
    /// Default: true
    pub run_migrations: bool,
}

// Keeps the token out of logs.
impl fmt::Debug for ReplicaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplicaConfig")
            .field("remote_url", &self.remote_url)
            .field("auth_token", &"***")
            .field("local_path", &self.local_path)
            .field("sync_interval", &self.sync_interval)
            .field("run_migrations", &self.run_migrations)
            .finish()
    }
}

impl ReplicaConfig {
    pub fn new(remote_url: impl Into<String>, auth_token: impl Into<String>) -> Self {
        ReplicaConfig {
            remote_url: remote_url.into(),
            auth_token: auth_token.into(),
            local_path: PathBuf::from(DEFAULT_REPLICA_FILE),
            sync_interval: Duration::from_secs(DEFAULT_SYNC_INTERVAL_SECS),
            run_migrations: true,
        }
    }

    /// Sets the replica file. An empty path keeps the default.
    pub fn local_path(mut self, path: impl Into<PathBuf>) -> Self {
        let path: PathBuf = path.into();
        if !path.as_os_str().is_empty() {
            self.local_path = path;
        }
        self
    }

    pub fn sync_interval(mut self, interval: Duration) -> Self {
        self.sync_interval = interval;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Checks the configuration before any connection attempt.
    ///
    /// ## Rules
    /// - `remote_url` parses and uses a libsql-compatible scheme
    /// - `sync_interval` is at least one second
    pub fn validate(&self) -> DbResult<()> {
        if self.remote_url.trim().is_empty() {
            return Err(DbError::InvalidConfig("remote_url is required".to_string()));
        }

        let parsed = url::Url::parse(&self.remote_url)
            .map_err(|e| DbError::InvalidConfig(format!("remote_url '{}': {}", self.remote_url, e)))?;

        if !REMOTE_SCHEMES.contains(&parsed.scheme()) {
            return Err(DbError::InvalidConfig(format!(
                "remote_url scheme '{}' is not one of {}",
                parsed.scheme(),
                REMOTE_SCHEMES.join(", ")
            )));
        }

        if self.sync_interval < Duration::from_secs(1) {
            return Err(DbError::InvalidConfig(
                "sync_interval must be at least one second".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Database
// =============================================================================

/// What kind of store a [`Database`] was opened as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseKind {
    InMemory,
    Local,
    Replica,
}

/// Outcome of one replica sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SyncReport {
    /// Latest frame applied locally, if any.
    pub frame_no: Option<u64>,
    /// Frames pulled by this sync.
    pub frames_synced: usize,
}

/// Open store handle providing repository access.
///
/// Cloning is cheap; clones share the same connection.
#[derive(Clone)]
pub struct Database {
    inner: Arc<libsql::Database>,
    executor: Executor,
    kind: DatabaseKind,
    location: PathBuf,
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("kind", &self.kind)
            .field("location", &self.location)
            .finish()
    }
}

impl Database {
    /// Opens a local (file or in-memory) database.
    ///
    /// ## What This Does
    /// 1. Creates the file if it doesn't exist
    /// 2. Enables foreign keys and WAL (file only), per config
    /// 3. Runs ensure-schema (if enabled)
    ///
    /// ## Example
    /// ```rust,ignore
    /// let db = Database::open(DbConfig::new("./pillmom.db")).await?;
    /// ```
    pub async fn open(config: DbConfig) -> DbResult<Self> {
        let kind = if config.in_memory {
            DatabaseKind::InMemory
        } else {
            DatabaseKind::Local
        };

        info!(
            path = %config.database_path.display(),
            ?kind,
            "Opening database"
        );

        let inner = Builder::new_local(&config.database_path)
            .build()
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;
        let conn = inner
            .connect()
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        let db = Database {
            inner: Arc::new(inner),
            executor: Executor::new(conn),
            kind,
            location: config.database_path.clone(),
        };

        // The first statements are the first to read the file, so a file
        // that is not a database fails here rather than in connect().
        db.configure(&config)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Opens an embedded replica of a remote database.
    ///
    /// ## What This Does
    /// 1. Validates the config
    /// 2. Builds the replica and pulls the remote state
    /// 3. Runs ensure-schema (if enabled), then syncs again
    ///
    /// Starting periodic sync is the caller's job (see `pillmom-sync`).
    pub async fn open_replica(config: &ReplicaConfig) -> DbResult<Self> {
        config.validate()?;

        info!(
            url = %config.remote_url,
            path = %config.local_path.display(),
            interval_secs = config.sync_interval.as_secs(),
            "Opening embedded replica"
        );

        let inner = Builder::new_remote_replica(
            &config.local_path,
            config.remote_url.clone(),
            config.auth_token.clone(),
        )
        .build()
        .await
        .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;
        let conn = inner
            .connect()
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        let db = Database {
            inner: Arc::new(inner),
            executor: Executor::new(conn),
            kind: DatabaseKind::Replica,
            location: config.local_path.clone(),
        };

        let report = db.sync().await?;
        debug!(frames = report.frames_synced, "Initial sync complete");

        if config.run_migrations {
            db.run_migrations().await?;
            db.sync().await?;
        }

        Ok(db)
    }

    async fn configure(&self, config: &DbConfig) -> DbResult<()> {
        if config.foreign_keys {
            self.executor.execute("PRAGMA foreign_keys = ON", Vec::new()).await?;
        }

        if config.enable_wal && self.kind == DatabaseKind::Local {
            // journal_mode answers with a row, so it has to go through query.
            let mode = self
                .executor
                .query_one("PRAGMA journal_mode = WAL", Vec::new())
                .await?
                .map(|row| row.get_at::<String>(0))
                .transpose()?
                .unwrap_or_default();
            if !mode.eq_ignore_ascii_case("wal") {
                warn!(mode = %mode, "WAL journaling not enabled");
            }
        }

        Ok(())
    }

    /// Runs ensure-schema.
    ///
    /// ## When To Call
    /// - Automatically called on open if `run_migrations` is true
    /// - Manually when migrations are disabled in config
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::ensure_schema(&self.executor).await?;
        info!("Schema up to date");
        Ok(())
    }

    /// Syncs the replica with the remote once.
    ///
    /// ## Returns
    /// * `Err(DbError::NotReplica)` - local or in-memory database
    /// * `Err(DbError::SyncFailed)` - remote unreachable or rejected
    pub async fn sync(&self) -> DbResult<SyncReport> {
        if self.kind != DatabaseKind::Replica {
            return Err(DbError::NotReplica);
        }

        let replicated = self
            .inner
            .sync()
            .await
            .map_err(|e| DbError::SyncFailed(e.to_string()))?;

        let report = SyncReport {
            frame_no: replicated.frame_no(),
            frames_synced: replicated.frames_synced(),
        };
        debug!(
            frame_no = ?report.frame_no,
            frames_synced = report.frames_synced,
            "Replica synced"
        );
        Ok(report)
    }

    pub fn kind(&self) -> DatabaseKind {
        self.kind
    }

    pub fn is_replica(&self) -> bool {
        self.kind == DatabaseKind::Replica
    }

    /// Path of the local file (`:memory:` for in-memory).
    pub fn location(&self) -> &PathBuf {
        &self.location
    }

    /// Statement executor shared by the repositories.
    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    /// Raw connection, for queries not covered by repositories.
    pub fn connection(&self) -> &libsql::Connection {
        self.executor.connection()
    }

    /// Returns the medication repository.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let all = db.medications().get_all().await?;
    /// ```
    pub fn medications(&self) -> MedicationRepository {
        MedicationRepository::new(self.executor.clone())
    }

    /// Returns the reminder repository.
    pub fn reminders(&self) -> ReminderRepository {
        ReminderRepository::new(self.executor.clone())
    }

    /// Checks if the database can execute queries.
    pub async fn health_check(&self) -> bool {
        self.executor.query_scalar("SELECT 1", Vec::new()).await.is_ok()
    }

    /// Releases this handle.
    ///
    /// The store is closed once the last clone is gone.
    pub fn close(self) {
        info!(kind = ?self.kind, path = %self.location.display(), "Closing database");
        drop(self);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = Database::open(DbConfig::in_memory()).await.unwrap();

        assert!(db.health_check().await);
        assert_eq!(db.kind(), DatabaseKind::InMemory);
        assert!(!db.is_replica());
    }

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("/tmp/test.db")
            .enable_wal(false)
            .run_migrations(false);

        assert!(!config.enable_wal);
        assert!(!config.run_migrations);
        assert!(config.foreign_keys);

        assert_eq!(DbConfig::new("").database_path, PathBuf::from("pillmom.db"));
    }

    #[tokio::test]
    async fn test_sync_on_local_is_not_replica() {
        let db = Database::open(DbConfig::in_memory()).await.unwrap();
        assert!(matches!(db.sync().await, Err(DbError::NotReplica)));
    }

    #[tokio::test]
    async fn test_file_database_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pillmom.db");

        let db = Database::open(DbConfig::new(&path)).await.unwrap();
        assert_eq!(db.kind(), DatabaseKind::Local);
        let mut med = pillmom_core::Medication::new("Aspirin", "100mg", "");
        db.medications().create(&mut med).await.unwrap();

        let mode = db
            .executor()
            .query_one("PRAGMA journal_mode", Vec::new())
            .await
            .unwrap()
            .unwrap()
            .get_at::<String>(0)
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
        db.close();

        let db = Database::open(DbConfig::new(&path)).await.unwrap();
        let all = db.medications().get_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Aspirin");
    }

    #[test]
    fn test_replica_config_validation() {
        let ok = ReplicaConfig::new("libsql://db-org.turso.io", "token");
        assert!(ok.validate().is_ok());
        assert_eq!(ok.local_path, PathBuf::from("local_replica.db"));
        assert_eq!(ok.sync_interval, Duration::from_secs(60));

        let rejected = [
            ReplicaConfig::new("", "t"),
            ReplicaConfig::new("not a url", "t"),
            ReplicaConfig::new("ftp://host", "t"),
            ReplicaConfig::new("https://host", "t").sync_interval(Duration::from_millis(10)),
        ];
        for config in &rejected {
            let err = config.validate().unwrap_err();
            assert!(matches!(err, DbError::InvalidConfig(_)), "{:?}", err);
            assert!(!err.is_write_error());
        }

        // Empty path keeps the default.
        let config = ReplicaConfig::new("wss://host", "t").local_path("");
        assert_eq!(config.local_path, PathBuf::from("local_replica.db"));
    }

    #[tokio::test]
    async fn test_open_replica_rejects_bad_url_before_connecting() {
        let dir = tempfile::tempdir().unwrap();
        let config = ReplicaConfig::new("not a url", "token").local_path(dir.path().join("r.db"));

        let err = Database::open_replica(&config).await.unwrap_err();
        assert!(matches!(err, DbError::InvalidConfig(_)));
        assert!(!dir.path().join("r.db").exists());
    }

    #[tokio::test]
    async fn test_open_non_database_file_is_connection_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.db");
        std::fs::write(&path, [b'x'; 8192]).unwrap();

        let err = Database::open(DbConfig::new(&path)).await.unwrap_err();
        assert!(matches!(err, DbError::ConnectionFailed(_)), "{:?}", err);
    }

    #[tokio::test]
    async fn test_open_in_missing_directory_is_connection_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("pillmom.db");

        let err = Database::open(DbConfig::new(&path)).await.unwrap_err();
        assert!(matches!(err, DbError::ConnectionFailed(_)), "{:?}", err);
    }

    #[test]
    fn test_replica_config_debug_hides_token() {
        let config = ReplicaConfig::new("libsql://host", "secret-token");
        assert!(!format!("{:?}", config).contains("secret-token"));
    }
}
