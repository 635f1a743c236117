//! # Exported Functions
//!
//! Every `pillmom_*` symbol lives here, grouped by what it touches.
//!
//! ## Conventions
//! ```text
//! status functions   int32_t   0 ok / -1 failed
//! create functions   int64_t   new id / -1 failed
//! read functions     char*     JSON (free with pillmom_free_string) / NULL
//! ```
//! After any failure, `pillmom_last_error()` returns the message.

pub mod database;
pub mod medication;
pub mod reminder;

pub use database::*;
pub use medication::*;
pub use reminder::*;
