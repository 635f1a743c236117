//! # pillmom-core: Pure Model for PillMom
//!
//! Record types and validation rules shared by every other crate in the
//! workspace. Nothing here touches a database, a file or the network.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        PillMom Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Host App (Flutter / native)                     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ C ABI (pillmom-ffi)                    │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                Session (pillmom-sync)                           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │           Repositories + Dialect (pillmom-db)                   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ uses                                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ pillmom-core (THIS CRATE) ★                     │   │
//! │  │   Medication • Reminder • DaySchedule • validation              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - `Medication`, `Reminder`, `DaySchedule`
//! - [`validation`] - Field rules checked before any write
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use pillmom_core::{DaySchedule, Medication};
//! use chrono::Weekday;
//!
//! let med = Medication::new("Aspirin", "100mg", "Pain reliever");
//! assert_eq!(med.id, 0); // assigned by the store on create
//!
//! let schedule: DaySchedule = "Mon,Wed,Fri".parse().unwrap();
//! assert!(schedule.fires_on(Weekday::Wed));
//! assert!(!schedule.fires_on(Weekday::Tue));
//! ```

pub mod error;
pub mod types;
pub mod validation;

pub use error::{CoreError, CoreResult, ValidationError};
pub use types::*;

/// Database file used when the host passes no path.
pub const DEFAULT_DATABASE_FILE: &str = "pillmom.db";

/// Replica file used by the remote init variants that take no path.
pub const DEFAULT_REPLICA_FILE: &str = "local_replica.db";

/// Background sync interval used by the remote init variant that takes none.
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 60;

/// Literal `days` value meaning "every day of the week".
pub const DAILY: &str = "Daily";
