//! # pillmom-db: Database Layer for PillMom
//!
//! This crate provides database access for PillMom. It stores records in
//! libsql, either in a local SQLite file or in an embedded replica that
//! syncs with a remote Turso database.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        PillMom Data Flow                                │
//! │                                                                         │
//! │  Bridge call (pillmom_get_medication)                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    pillmom-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │   Dialect    │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  + Migrator  │  │   │
//! │  │   │               │    │ Medication    │    │              │  │   │
//! │  │   │ local/replica │◄───│ Reminder      │    │ ensure-schema│  │   │
//! │  │   │ sync()        │    │               │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │            │                   │                               │   │
//! │  │            └───── Executor (logs every statement) ─────┘       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │   pillmom.db  /  local_replica.db  ◄──sync──►  libsql://remote  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Opening local and replica stores, one-shot sync
//! - [`dialect`] - SQLite dialect and schema migrator
//! - [`schema`] - Table declarations
//! - [`migrations`] - Ensure-schema entry point
//! - [`executor`] - Statement execution and row decoding
//! - [`repository`] - Medication and reminder repositories
//! - [`error`] - Database error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pillmom_db::{Database, DbConfig};
//! use pillmom_core::Medication;
//!
//! let db = Database::open(DbConfig::new("pillmom.db")).await?;
//!
//! let mut med = Medication::new("Aspirin", "100mg", "");
//! let id = db.medications().create(&mut med).await?;
//! let med = db.medications().get(id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod dialect;
pub mod error;
pub mod executor;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod schema;

// =============================================================================
// Re-exports
// =============================================================================

pub use dialect::{Dialect, FieldKind, Migrator, SqliteDialect, SqliteMigrator};
pub use error::{DbError, DbResult};
pub use executor::{Executor, Row};
pub use pool::{Database, DatabaseKind, DbConfig, ReplicaConfig, SyncReport};

// Repository re-exports for convenience
pub use repository::medication::MedicationRepository;
pub use repository::reminder::ReminderRepository;
