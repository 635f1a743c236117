//! # Repository Module
//!
//! Record-level operations on top of the [`Executor`](crate::Executor).
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Bridge / Session                                                      │
//! │       │                                                                 │
//! │       │  db.medications().get(1)                                       │
//! │       ▼                                                                 │
//! │  MedicationRepository              ReminderRepository                  │
//! │  ├── create / get / get_all        ├── create / get / get_all          │
//! │  ├── update / delete / count       ├── get_by_medication / get_active  │
//! │  │                                 ├── get_active_for_day              │
//! │  │                                 └── update / delete / count         │
//! │       │                                                                 │
//! │       │  SQL (live rows only: deleted_at IS NULL)                      │
//! │       ▼                                                                 │
//! │  libsql                                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every call is one atomic unit. Reads never return soft-deleted rows.
//!
//! ## Available Repositories
//!
//! - [`MedicationRepository`](medication::MedicationRepository)
//! - [`ReminderRepository`](reminder::ReminderRepository)

pub mod medication;
pub mod reminder;
