//! # Reminder Functions
//!
//! Records are returned as JSON in the shape of [`pillmom_core::Reminder`].
//! Single, all and active reads include the owning `medication`.

use std::os::raw::c_char;

use pillmom_core::Reminder;

use crate::error::{self, BridgeError};
use crate::state::{block_on, session};
use crate::strings;

/// Creates an active reminder and returns its id, or `-1`.
///
/// `time` is `"HH:MM"`; `days` is `"Daily"` or e.g. `"Mon,Wed,Fri"`.
///
/// # Safety
/// `time` and `days` must be valid NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn pillmom_create_reminder(
    medication_id: i64,
    time: *const c_char,
    days: *const c_char,
) -> i64 {
    error::id_or_fail(|| {
        let mut reminder = Reminder::new(
            medication_id,
            strings::required(time, "time")?,
            strings::required(days, "days")?,
        );
        block_on(async move {
            let id = session()
                .lock()
                .await
                .reminders()?
                .create(&mut reminder)
                .await?;
            Ok::<_, BridgeError>(id)
        })
    })
}

/// Returns one live reminder as JSON, or NULL.
#[no_mangle]
pub extern "C" fn pillmom_get_reminder(id: i64) -> *mut c_char {
    error::json_or_null(|| {
        block_on(async move {
            let reminder = session().lock().await.reminders()?.get(id).await?;
            Ok::<_, BridgeError>(reminder)
        })
    })
}

/// Returns the live reminders of one medication as a JSON array, or NULL.
#[no_mangle]
pub extern "C" fn pillmom_get_reminders_by_medication(medication_id: i64) -> *mut c_char {
    error::json_or_null(|| {
        block_on(async move {
            let reminders = session()
                .lock()
                .await
                .reminders()?
                .get_by_medication(medication_id)
                .await?;
            Ok::<_, BridgeError>(reminders)
        })
    })
}

/// Returns every live reminder as a JSON array, or NULL.
#[no_mangle]
pub extern "C" fn pillmom_get_all_reminders() -> *mut c_char {
    error::json_or_null(|| {
        block_on(async {
            let reminders = session().lock().await.reminders()?.get_all().await?;
            Ok::<_, BridgeError>(reminders)
        })
    })
}

/// Returns live, active reminders as a JSON array, or NULL.
#[no_mangle]
pub extern "C" fn pillmom_get_active_reminders() -> *mut c_char {
    error::json_or_null(|| {
        block_on(async {
            let reminders = session().lock().await.reminders()?.get_active().await?;
            Ok::<_, BridgeError>(reminders)
        })
    })
}

/// Replaces time, days and the active flag of a live reminder.
///
/// `is_active` is a C boolean: zero is false, anything else true. The
/// stored record is fetched first, so its medication and timestamps are kept.
///
/// # Safety
/// `time` and `days` must be valid NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn pillmom_update_reminder(
    id: i64,
    time: *const c_char,
    days: *const c_char,
    is_active: i32,
) -> i32 {
    error::status(|| {
        let time = strings::required(time, "time")?;
        let days = strings::required(days, "days")?;

        block_on(async move {
            let guard = session().lock().await;
            let repo = guard.reminders()?;
            let mut reminder = repo.get(id).await?;
            reminder.time = time;
            reminder.days = days;
            reminder.is_active = is_active != 0;
            repo.update(&mut reminder).await?;
            Ok::<_, BridgeError>(())
        })
    })
}

/// Soft-deletes a reminder.
#[no_mangle]
pub extern "C" fn pillmom_delete_reminder(id: i64) -> i32 {
    error::status(|| {
        block_on(async move {
            session().lock().await.reminders()?.delete(id).await?;
            Ok::<_, BridgeError>(())
        })
    })
}
