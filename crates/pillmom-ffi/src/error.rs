//! # Bridge Error Type
//!
//! Everything that can go wrong inside an exported function, and how it is
//! collapsed into the C return conventions.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Host                         Rust                                      │
//! │  ────                         ────                                      │
//! │  pillmom_get_medication(7)                                              │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  BridgeResult<T>                                                 │  │
//! │  │    NULL argument      ── NullPointer ──┐                         │  │
//! │  │    bad UTF-8          ── InvalidUtf8 ──┤                         │  │
//! │  │    no session / sync  ── Sync ─────────┤                         │  │
//! │  │    store failure      ── Db ───────────┼──► last_error (thread)  │  │
//! │  │    JSON encode        ── Marshal ──────┤                         │  │
//! │  │    runtime / panic    ── Runtime ──────┘                         │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  status -1 / id -1 / NULL      pillmom_last_error() → message          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;
use std::panic::{self, AssertUnwindSafe};
use std::ptr;

use pillmom_db::DbError;
use pillmom_sync::SyncError;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

/// Result type for bridge internals.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Failure inside an exported function.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// A required pointer argument was NULL.
    #[error("argument '{0}' is null")]
    NullPointer(&'static str),

    /// A string argument was not valid UTF-8.
    #[error("argument '{0}' is not valid UTF-8")]
    InvalidUtf8(&'static str),

    /// A record could not be encoded as JSON.
    #[error("failed to encode result: {0}")]
    Marshal(#[from] serde_json::Error),

    /// The bridge's own machinery failed (runtime start, panic).
    #[error("bridge runtime error: {0}")]
    Runtime(String),

    /// Lifecycle failure (nothing open, not a replica, config).
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// Store failure.
    #[error(transparent)]
    Db(#[from] DbError),
}

impl BridgeError {
    /// Machine-readable category, used in logs.
    pub fn code(&self) -> &'static str {
        match self {
            BridgeError::NullPointer(_) | BridgeError::InvalidUtf8(_) => "INVALID_ARGUMENT",
            BridgeError::Marshal(_) => "MARSHAL_ERROR",
            BridgeError::Runtime(_) => "INTERNAL",
            BridgeError::Sync(SyncError::NoActiveConnection) => "NO_CONNECTION",
            BridgeError::Sync(SyncError::Db(e)) | BridgeError::Db(e) => db_code(e),
            BridgeError::Sync(SyncError::InvalidConfig(_)) => "INVALID_CONFIG",
            BridgeError::Sync(_) => "SYNC_ERROR",
        }
    }
}

fn db_code(err: &DbError) -> &'static str {
    if err.is_not_found() {
        "NOT_FOUND"
    } else if err.is_write_error() {
        "WRITE_ERROR"
    } else {
        match err {
            DbError::InvalidConfig(_) => "INVALID_CONFIG",
            DbError::ConnectionFailed(_) | DbError::MigrationFailed(_) => "CONNECTION_ERROR",
            DbError::NotReplica | DbError::SyncFailed(_) => "SYNC_ERROR",
            _ => "DATABASE_ERROR",
        }
    }
}

// =============================================================================
// Last Error
// =============================================================================

thread_local! {
    static LAST_ERROR: RefCell<Option<String>> = const { RefCell::new(None) };
}

fn record(err: &BridgeError) {
    warn!(code = err.code(), error = %err, "Bridge call failed");
    let message = err.to_string();
    LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(message));
}

/// Message of the last failure on this thread, if any.
pub(crate) fn last_error() -> Option<String> {
    LAST_ERROR.with(|slot| slot.borrow().clone())
}

// =============================================================================
// Return Conventions
// =============================================================================

fn guarded<T>(f: impl FnOnce() -> BridgeResult<T>) -> BridgeResult<T> {
    panic::catch_unwind(AssertUnwindSafe(f))
        .unwrap_or_else(|_| Err(BridgeError::Runtime("panic in bridge call".to_string())))
}

/// `0` on success, `-1` on failure.
pub(crate) fn status(f: impl FnOnce() -> BridgeResult<()>) -> i32 {
    match guarded(f) {
        Ok(()) => 0,
        Err(e) => {
            record(&e);
            -1
        }
    }
}

/// The id on success, `-1` on failure.
pub(crate) fn id_or_fail(f: impl FnOnce() -> BridgeResult<i64>) -> i64 {
    match guarded(f) {
        Ok(id) => id,
        Err(e) => {
            record(&e);
            -1
        }
    }
}

/// A JSON string the caller must free on success, NULL on failure.
pub(crate) fn json_or_null<T: Serialize>(f: impl FnOnce() -> BridgeResult<T>) -> *mut c_char {
    let encoded = guarded(f).and_then(|value| {
        let json = serde_json::to_string(&value)?;
        CString::new(json).map_err(|e| BridgeError::Runtime(e.to_string()))
    });
    match encoded {
        Ok(s) => s.into_raw(),
        Err(e) => {
            record(&e);
            ptr::null_mut()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_records_last_error() {
        assert_eq!(status(|| Ok(())), 0);
        assert_eq!(status(|| Err(BridgeError::NullPointer("name"))), -1);
        assert_eq!(last_error().as_deref(), Some("argument 'name' is null"));
    }

    #[test]
    fn test_panics_become_failures() {
        assert_eq!(id_or_fail(|| panic!("boom")), -1);
        assert_eq!(last_error().as_deref(), Some("bridge runtime error: panic in bridge call"));
    }

    #[test]
    fn test_codes() {
        assert_eq!(
            BridgeError::Sync(SyncError::NoActiveConnection).code(),
            "NO_CONNECTION"
        );
        assert_eq!(BridgeError::Db(DbError::not_found("Reminder", 1)).code(), "NOT_FOUND");
        assert_eq!(
            BridgeError::Sync(SyncError::Db(DbError::NotReplica)).code(),
            "SYNC_ERROR"
        );
        assert_eq!(
            BridgeError::Sync(SyncError::Db(DbError::InvalidConfig("bad url".into()))).code(),
            "INVALID_CONFIG"
        );
        assert_eq!(
            BridgeError::Db(DbError::ConnectionFailed("file is not a database".into())).code(),
            "CONNECTION_ERROR"
        );
    }

    #[test]
    fn test_json_or_null() {
        let ptr = json_or_null(|| Ok(vec![1, 2, 3]));
        assert!(!ptr.is_null());
        // SAFETY: produced by CString::into_raw above.
        let s = unsafe { CString::from_raw(ptr) };
        assert_eq!(s.to_str().unwrap(), "[1,2,3]");

        let ptr = json_or_null::<i32>(|| Err(BridgeError::Runtime("x".to_string())));
        assert!(ptr.is_null());
    }
}
