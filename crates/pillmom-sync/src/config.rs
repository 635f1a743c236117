//! # Sync Configuration
//!
//! Environment-sourced settings for opening an embedded replica. Used by
//! the demo binary and the integration tests; hosts going through the C
//! bridge pass these values as arguments instead.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Process environment (highest priority)                             │
//! │  2. `.env` file in the working directory (loaded by dotenvy)           │
//! │  3. Default values (lowest priority)                                   │
//! │                                                                         │
//! │  TURSO_DATABASE_URL          required    libsql://db-org.turso.io      │
//! │  TURSO_AUTH_TOKEN            required                                   │
//! │  PILLMOM_SYNC_INTERVAL_SECS  60                                         │
//! │  PILLMOM_REPLICA_PATH        local_replica.db                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::time::Duration;

use pillmom_core::{DEFAULT_REPLICA_FILE, DEFAULT_SYNC_INTERVAL_SECS};
use pillmom_db::ReplicaConfig;
use tracing::{debug, warn};

use crate::error::{SyncError, SyncResult};

pub const ENV_DATABASE_URL: &str = "TURSO_DATABASE_URL";
pub const ENV_AUTH_TOKEN: &str = "TURSO_AUTH_TOKEN";
pub const ENV_SYNC_INTERVAL: &str = "PILLMOM_SYNC_INTERVAL_SECS";
pub const ENV_REPLICA_PATH: &str = "PILLMOM_REPLICA_PATH";

/// Remote replica settings.
#[derive(Clone)]
pub struct SyncConfig {
    pub remote_url: String,
    pub auth_token: String,
    pub sync_interval: Duration,
    pub replica_path: PathBuf,
}

impl std::fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncConfig")
            .field("remote_url", &self.remote_url)
            .field("auth_token", &"***")
            .field("sync_interval", &self.sync_interval)
            .field("replica_path", &self.replica_path)
            .finish()
    }
}

impl SyncConfig {
    /// Loads settings from the environment, reading `.env` first if present.
    ///
    /// ## Errors
    /// * `SyncError::InvalidConfig` - URL or token missing, bad interval
    pub fn from_env() -> SyncResult<Self> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "Loaded .env"),
            Err(e) if e.not_found() => {}
            Err(e) => warn!(error = %e, "Ignoring unreadable .env"),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> SyncResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let remote_url = non_empty(ENV_DATABASE_URL)
            .ok_or_else(|| SyncError::InvalidConfig(format!("{} is not set", ENV_DATABASE_URL)))?;
        let auth_token = non_empty(ENV_AUTH_TOKEN)
            .ok_or_else(|| SyncError::InvalidConfig(format!("{} is not set", ENV_AUTH_TOKEN)))?;

        let sync_interval = match non_empty(ENV_SYNC_INTERVAL) {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    SyncError::InvalidConfig(format!("{} must be whole seconds, got '{}'", ENV_SYNC_INTERVAL, raw))
                })?;
                if secs == 0 {
                    return Err(SyncError::InvalidConfig(format!(
                        "{} must be positive",
                        ENV_SYNC_INTERVAL
                    )));
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_SYNC_INTERVAL_SECS),
        };

        let replica_path = non_empty(ENV_REPLICA_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_REPLICA_FILE));

        Ok(SyncConfig {
            remote_url,
            auth_token,
            sync_interval,
            replica_path,
        })
    }

    /// Overrides the sync interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.sync_interval = interval;
        self
    }

    /// Overrides the replica file.
    pub fn with_replica_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.replica_path = path.into();
        self
    }

    /// Converts to the store-level replica configuration.
    pub fn to_replica_config(&self) -> ReplicaConfig {
        ReplicaConfig::new(self.remote_url.clone(), self.auth_token.clone())
            .sync_interval(self.sync_interval)
            .local_path(self.replica_path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = SyncConfig::from_lookup(lookup(&[
            (ENV_DATABASE_URL, "libsql://db-org.turso.io"),
            (ENV_AUTH_TOKEN, "tok"),
        ]))
        .unwrap();

        assert_eq!(config.sync_interval, Duration::from_secs(60));
        assert_eq!(config.replica_path, PathBuf::from("local_replica.db"));

        let replica = config.to_replica_config();
        assert_eq!(replica.remote_url, "libsql://db-org.turso.io");
        assert!(replica.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let config = SyncConfig::from_lookup(lookup(&[
            (ENV_DATABASE_URL, "https://db.example.com"),
            (ENV_AUTH_TOKEN, "tok"),
            (ENV_SYNC_INTERVAL, "5"),
            (ENV_REPLICA_PATH, "/tmp/replica.db"),
        ]))
        .unwrap();

        assert_eq!(config.sync_interval, Duration::from_secs(5));
        assert_eq!(config.replica_path, PathBuf::from("/tmp/replica.db"));
    }

    #[test]
    fn test_missing_or_bad_values() {
        assert!(SyncConfig::from_lookup(lookup(&[])).is_err());
        assert!(SyncConfig::from_lookup(lookup(&[(ENV_DATABASE_URL, "libsql://x")])).is_err());

        let err = SyncConfig::from_lookup(lookup(&[
            (ENV_DATABASE_URL, "libsql://x"),
            (ENV_AUTH_TOKEN, "tok"),
            (ENV_SYNC_INTERVAL, "soon"),
        ]))
        .unwrap_err();
        assert!(err.is_config_error());

        assert!(SyncConfig::from_lookup(lookup(&[
            (ENV_DATABASE_URL, "libsql://x"),
            (ENV_AUTH_TOKEN, "tok"),
            (ENV_SYNC_INTERVAL, "0"),
        ]))
        .is_err());
    }

    #[test]
    fn test_debug_hides_token() {
        let config = SyncConfig::from_lookup(lookup(&[
            (ENV_DATABASE_URL, "libsql://x"),
            (ENV_AUTH_TOKEN, "very-secret"),
        ]))
        .unwrap();
        assert!(!format!("{:?}", config).contains("very-secret"));
    }
}
