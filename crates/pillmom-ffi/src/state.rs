//! # Bridge State
//!
//! The two process-wide objects behind the C functions: the tokio runtime
//! every call blocks on, and the single [`Session`].
//!
//! ```text
//! host thread A ──┐                    ┌──────────────────────────────┐
//! host thread B ──┼─► runtime().block_on(async {                     │
//! host thread C ──┘        session().lock().await   ◄── one at a time │
//!                          ...repository call...                     │
//!                     })                                             │
//!                                      └──────────────────────────────┘
//! The SyncAgent of a replica session runs on the same runtime.
//! ```

use std::future::Future;
use std::sync::{Once, OnceLock};

use pillmom_sync::Session;
use tokio::runtime::{Builder, Runtime};
use tokio::sync::Mutex;
use tracing::info;

use crate::error::{BridgeError, BridgeResult};

static RUNTIME: OnceLock<Runtime> = OnceLock::new();
static SESSION: OnceLock<Mutex<Session>> = OnceLock::new();
static TRACING: Once = Once::new();

/// The bridge runtime, started on first use.
pub(crate) fn runtime() -> BridgeResult<&'static Runtime> {
    if let Some(rt) = RUNTIME.get() {
        return Ok(rt);
    }

    TRACING.call_once(|| {
        pillmom_sync::init_tracing();
    });

    let rt = Builder::new_multi_thread()
        .enable_all()
        .thread_name("pillmom")
        .build()
        .map_err(|e| BridgeError::Runtime(e.to_string()))?;

    // Two racing first calls both build one; the loser's runtime is dropped.
    if RUNTIME.set(rt).is_ok() {
        info!("Bridge runtime started");
    }
    RUNTIME
        .get()
        .ok_or_else(|| BridgeError::Runtime("runtime unavailable".to_string()))
}

/// The process-wide session.
pub(crate) fn session() -> &'static Mutex<Session> {
    SESSION.get_or_init(|| Mutex::new(Session::new()))
}

/// Runs a bridge operation to completion on the runtime.
pub(crate) fn block_on<T, F>(fut: F) -> BridgeResult<T>
where
    F: Future<Output = BridgeResult<T>>,
{
    runtime()?.block_on(fut)
}
