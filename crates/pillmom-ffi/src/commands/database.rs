//! # Lifecycle Functions
//!
//! Open / sync / close of the process-wide session.
//!
//! ```text
//! pillmom_init_database(path)                         local file
//! pillmom_init_remote(url, token)                     replica, 60 s, local_replica.db
//! pillmom_init_remote_with_sync(url, token, secs)     replica, local_replica.db
//! pillmom_init_remote_with_sync_and_path(.., path)    replica
//! pillmom_sync()                                      pull now
//! pillmom_close()                                     idempotent
//! ```
//! Any init while a store is open closes that store first.

use std::os::raw::c_char;
use std::time::Duration;

use pillmom_core::{DEFAULT_REPLICA_FILE, DEFAULT_SYNC_INTERVAL_SECS};
use pillmom_db::{DbConfig, ReplicaConfig};
use pillmom_sync::SyncError;
use tracing::info;

use crate::error::{self, BridgeError, BridgeResult};
use crate::state::{block_on, session};
use crate::strings;

/// Opens (creating if needed) a local database file.
///
/// NULL or `""` opens `pillmom.db` in the working directory.
///
/// # Safety
/// `path` must be NULL or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn pillmom_init_database(path: *const c_char) -> i32 {
    error::status(|| {
        let path = strings::or_empty(path, "path")?;
        block_on(async move {
            session().lock().await.open_local(DbConfig::new(path)).await?;
            Ok::<_, BridgeError>(())
        })
    })
}

/// Opens an embedded replica syncing every 60 seconds into `local_replica.db`.
///
/// # Safety
/// `url` and `auth_token` must be valid NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn pillmom_init_remote(url: *const c_char, auth_token: *const c_char) -> i32 {
    pillmom_init_remote_with_sync(url, auth_token, DEFAULT_SYNC_INTERVAL_SECS as i64)
}

/// Opens an embedded replica with a custom sync period, in `local_replica.db`.
///
/// # Safety
/// `url` and `auth_token` must be valid NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn pillmom_init_remote_with_sync(
    url: *const c_char,
    auth_token: *const c_char,
    sync_interval_secs: i64,
) -> i32 {
    pillmom_init_remote_with_sync_and_path(url, auth_token, sync_interval_secs, std::ptr::null())
}

/// Opens an embedded replica at `local_path` with a custom sync period.
///
/// NULL or `""` for `local_path` means `local_replica.db`.
///
/// # Safety
/// `url` and `auth_token` must be valid NUL-terminated strings; `local_path`
/// must be NULL or one.
#[no_mangle]
pub unsafe extern "C" fn pillmom_init_remote_with_sync_and_path(
    url: *const c_char,
    auth_token: *const c_char,
    sync_interval_secs: i64,
    local_path: *const c_char,
) -> i32 {
    error::status(|| {
        let url = strings::required(url, "url")?;
        let auth_token = strings::required(auth_token, "auth_token")?;
        let local_path = strings::optional(local_path, "local_path")?
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_REPLICA_FILE.to_string());
        let secs = u64::try_from(sync_interval_secs).map_err(|_| {
            SyncError::InvalidConfig(format!("sync interval must be positive, got {}", sync_interval_secs))
        })?;

        let config = ReplicaConfig::new(url, auth_token)
            .sync_interval(Duration::from_secs(secs))
            .local_path(local_path);

        block_on(async move {
            session().lock().await.open_replica(config).await?;
            Ok::<_, BridgeError>(())
        })
    })
}

/// Pulls remote changes into the replica now.
///
/// Fails if nothing is open or the store is not a replica.
#[no_mangle]
pub extern "C" fn pillmom_sync() -> i32 {
    error::status(|| {
        block_on(async {
            let report = session().lock().await.sync().await?;
            info!(frames_synced = report.frames_synced, "Sync requested by host");
            Ok::<_, BridgeError>(())
        })
    })
}

/// Closes the store and stops background sync. Safe to call repeatedly.
#[no_mangle]
pub extern "C" fn pillmom_close() -> i32 {
    error::status(close)
}

fn close() -> BridgeResult<()> {
    block_on(async {
        session().lock().await.close().await?;
        Ok::<_, BridgeError>(())
    })
}

/// Message of the last failed call on this thread, or NULL if none.
///
/// The caller frees the result with `pillmom_free_string`.
#[no_mangle]
pub extern "C" fn pillmom_last_error() -> *mut c_char {
    match error::last_error() {
        Some(message) => strings::into_raw(message),
        None => std::ptr::null_mut(),
    }
}
