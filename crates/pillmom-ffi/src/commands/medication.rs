//! # Medication Functions
//!
//! Records are returned as JSON objects (or arrays of them) in the shape
//! of [`pillmom_core::Medication`]; `reminders` holds the live reminders.

use std::os::raw::c_char;

use pillmom_core::Medication;

use crate::error::{self, BridgeError};
use crate::state::{block_on, session};
use crate::strings;

/// Creates a medication and returns its id, or `-1`.
///
/// `dosage` and `description` may be NULL (stored as empty).
///
/// # Safety
/// Each argument must be NULL or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn pillmom_create_medication(
    name: *const c_char,
    dosage: *const c_char,
    description: *const c_char,
) -> i64 {
    error::id_or_fail(|| {
        let mut medication = Medication::new(
            strings::required(name, "name")?,
            strings::or_empty(dosage, "dosage")?,
            strings::or_empty(description, "description")?,
        );
        block_on(async move {
            let id = session()
                .lock()
                .await
                .medications()?
                .create(&mut medication)
                .await?;
            Ok::<_, BridgeError>(id)
        })
    })
}

/// Returns one live medication as JSON, or NULL.
#[no_mangle]
pub extern "C" fn pillmom_get_medication(id: i64) -> *mut c_char {
    error::json_or_null(|| {
        block_on(async move {
            let medication = session().lock().await.medications()?.get(id).await?;
            Ok::<_, BridgeError>(medication)
        })
    })
}

/// Returns every live medication as a JSON array, or NULL.
#[no_mangle]
pub extern "C" fn pillmom_get_all_medications() -> *mut c_char {
    error::json_or_null(|| {
        block_on(async {
            let medications = session().lock().await.medications()?.get_all().await?;
            Ok::<_, BridgeError>(medications)
        })
    })
}

/// Replaces name, dosage and description of a live medication.
///
/// The stored record is fetched first, so its id and timestamps are kept.
///
/// # Safety
/// Each string argument must be NULL or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn pillmom_update_medication(
    id: i64,
    name: *const c_char,
    dosage: *const c_char,
    description: *const c_char,
) -> i32 {
    error::status(|| {
        let name = strings::required(name, "name")?;
        let dosage = strings::or_empty(dosage, "dosage")?;
        let description = strings::or_empty(description, "description")?;

        block_on(async move {
            let guard = session().lock().await;
            let repo = guard.medications()?;
            let mut medication = repo.get(id).await?;
            medication.name = name;
            medication.dosage = dosage;
            medication.description = description;
            repo.update(&mut medication).await?;
            Ok::<_, BridgeError>(())
        })
    })
}

/// Soft-deletes a medication and its reminders.
#[no_mangle]
pub extern "C" fn pillmom_delete_medication(id: i64) -> i32 {
    error::status(|| {
        block_on(async move {
            session().lock().await.medications()?.delete(id).await?;
            Ok::<_, BridgeError>(())
        })
    })
}
