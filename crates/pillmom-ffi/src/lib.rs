//! # pillmom-ffi: C Bridge for PillMom
//!
//! Exposes the store to a host app through plain C functions. Records are
//! marshaled as JSON; the store lives in one process-wide session that the
//! host opens and closes.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Host (Dart FFI / Swift / JNI)                                         │
//! │       │  pillmom_create_medication("Aspirin", "100mg", NULL) → 1        │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 pillmom-ffi (THIS CRATE)                         │   │
//! │  │                                                                 │   │
//! │  │  strings.rs   C string ⇄ String, pillmom_free_string            │   │
//! │  │  commands/    pillmom_* functions                              │   │
//! │  │  state.rs     tokio Runtime + Mutex<Session>                   │   │
//! │  │  error.rs     BridgeError → -1 / NULL + last error             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  pillmom-sync::Session → pillmom-db repositories                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example (C)
//! ```c
//! #include "pillmom.h"
//!
//! if (pillmom_init_database("pillmom.db") != 0) {
//!     char *err = pillmom_last_error();
//!     fprintf(stderr, "%s\n", err);
//!     pillmom_free_string(err);
//!     return 1;
//! }
//! int64_t id = pillmom_create_medication("Aspirin", "100mg", "");
//! pillmom_create_reminder(id, "09:00", "Mon,Wed,Fri");
//!
//! char *json = pillmom_get_medication(id);
//! /* {"id":1,"name":"Aspirin",...,"reminders":[{...}]} */
//! pillmom_free_string(json);
//! pillmom_close();
//! ```
//!
//! The header is maintained by hand in `include/pillmom.h`.

pub mod commands;
pub mod error;
mod state;
mod strings;

pub use commands::*;
pub use error::{BridgeError, BridgeResult};
pub use strings::pillmom_free_string;
