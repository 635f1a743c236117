//! # pillmom-sync: Store Lifecycle for PillMom
//!
//! Opens, syncs and closes the store. A [`Session`] owns whatever is open;
//! for embedded replicas it also owns the [`SyncAgent`] that pulls remote
//! changes on a fixed period.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Host / demo                                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌───────────────────────────────────────────┐                         │
//! │  │ Session                                   │                         │
//! │  │  open_local / open_replica / sync / close │                         │
//! │  └──────────┬───────────────────┬────────────┘                         │
//! │             │                   │ replica only                          │
//! │             ▼                   ▼                                       │
//! │     pillmom_db::Database   SyncAgent (tokio task)                      │
//! │             ▲                   │                                       │
//! │             └──── db.sync() ◄───┘ every sync_interval                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`session`] - `Session` state machine
//! - [`agent`] - Background sync task
//! - [`config`] - Environment-sourced replica settings
//! - [`error`] - Lifecycle error types

use tracing_subscriber::EnvFilter;

pub mod agent;
pub mod config;
pub mod error;
pub mod session;

pub use agent::{SyncAgent, SyncStats};
pub use config::SyncConfig;
pub use error::{SyncError, SyncResult};
pub use session::Session;

/// Default log filter when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "info,pillmom=debug,libsql=warn";

/// Installs the global tracing subscriber.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Everything, including each SQL statement
/// - `RUST_LOG=pillmom_db=debug` - Store operations only
/// - Default: [`DEFAULT_LOG_FILTER`]
///
/// Returns false if a subscriber was already installed.
pub fn init_tracing() -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}
