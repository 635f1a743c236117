//! Drives the C surface the way a host app does.
//!
//! The bridge holds one process-wide session, so the whole flow runs as a
//! single sequential test.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use pillmom::*;
use serde_json::Value;

fn c(s: &str) -> CString {
    CString::new(s).unwrap()
}

/// Takes ownership of a returned string, frees it and returns a copy.
fn take(ptr: *mut c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    let s = unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string();
    unsafe { pillmom_free_string(ptr) };
    Some(s)
}

fn take_json(ptr: *mut c_char) -> Value {
    let s = take(ptr).expect("expected JSON, got NULL");
    serde_json::from_str(&s).unwrap()
}

fn last_error() -> String {
    take(pillmom_last_error()).unwrap_or_default()
}

#[test]
fn host_flow_against_local_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = c(dir.path().join("bridge.db").to_str().unwrap());

    assert_eq!(unsafe { pillmom_init_database(path.as_ptr()) }, 0);

    // Create
    let name = c("Aspirin");
    let dosage = c("100mg");
    let med_id = unsafe { pillmom_create_medication(name.as_ptr(), dosage.as_ptr(), std::ptr::null()) };
    assert_eq!(med_id, 1);

    let time = c("09:00");
    let days = c("Mon,Wed,Fri");
    let rem_id = unsafe { pillmom_create_reminder(med_id, time.as_ptr(), days.as_ptr()) };
    assert_eq!(rem_id, 1);

    let med = take_json(pillmom_get_medication(med_id));
    assert_eq!(med["name"], "Aspirin");
    assert_eq!(med["dosage"], "100mg");
    assert_eq!(med["description"], "");
    assert_eq!(med["reminders"].as_array().unwrap().len(), 1);
    assert_eq!(med["reminders"][0]["is_active"], true);

    let reminder = take_json(pillmom_get_reminder(rem_id));
    assert_eq!(reminder["medication"]["name"], "Aspirin");
    assert_eq!(take_json(pillmom_get_reminders_by_medication(med_id)).as_array().unwrap().len(), 1);
    assert_eq!(take_json(pillmom_get_all_reminders()).as_array().unwrap().len(), 1);

    // Update
    let new_name = c("Aspirin Forte");
    let new_dosage = c("500mg");
    let notes = c("after meals");
    assert_eq!(
        unsafe { pillmom_update_medication(med_id, new_name.as_ptr(), new_dosage.as_ptr(), notes.as_ptr()) },
        0
    );
    let all = take_json(pillmom_get_all_medications());
    assert_eq!(all.as_array().unwrap().len(), 1);
    assert_eq!(all[0]["name"], "Aspirin Forte");
    assert_eq!(all[0]["description"], "after meals");

    let evening = c("21:30");
    let daily = c("Daily");
    assert_eq!(unsafe { pillmom_update_reminder(rem_id, evening.as_ptr(), daily.as_ptr(), 0) }, 0);
    assert_eq!(take_json(pillmom_get_active_reminders()), Value::Array(vec![]));
    let reminder = take_json(pillmom_get_reminder(rem_id));
    assert_eq!(reminder["time"], "21:30");
    assert_eq!(reminder["medication_id"], med_id);

    // Failures
    assert_eq!(pillmom_sync(), -1);
    assert!(last_error().contains("not an embedded replica"));

    assert_eq!(unsafe { pillmom_create_medication(std::ptr::null(), std::ptr::null(), std::ptr::null()) }, -1);
    assert!(last_error().contains("'name' is null"));

    let empty = c("");
    assert_eq!(unsafe { pillmom_create_medication(empty.as_ptr(), std::ptr::null(), std::ptr::null()) }, -1);

    let bad_time = c("9am");
    assert_eq!(unsafe { pillmom_create_reminder(med_id, bad_time.as_ptr(), daily.as_ptr()) }, -1);

    assert!(pillmom_get_medication(999).is_null());
    assert!(last_error().contains("not found"));
    assert_eq!(pillmom_delete_reminder(999), -1);

    // Delete cascades to reminders
    assert_eq!(pillmom_delete_medication(med_id), 0);
    assert!(pillmom_get_medication(med_id).is_null());
    assert!(pillmom_get_reminder(rem_id).is_null());
    assert_eq!(take_json(pillmom_get_all_medications()), Value::Array(vec![]));
    assert_eq!(pillmom_delete_medication(med_id), -1);
    assert_eq!(unsafe { pillmom_create_reminder(med_id, time.as_ptr(), days.as_ptr()) }, -1);
    assert!(last_error().contains("Medication not found"));

    // Close
    assert_eq!(pillmom_close(), 0);
    assert_eq!(pillmom_close(), 0);
    assert!(pillmom_get_all_medications().is_null());
    assert!(last_error().contains("no active database connector"));
    assert_eq!(pillmom_sync(), -1);

    // Remote config is validated before any network access
    let bad_url = c("not a url");
    let token = c("token");
    assert_eq!(unsafe { pillmom_init_remote(bad_url.as_ptr(), token.as_ptr()) }, -1);
    assert!(last_error().contains("Invalid connection settings"));
    let url = c("libsql://example.turso.io");
    assert_eq!(unsafe { pillmom_init_remote_with_sync(url.as_ptr(), token.as_ptr(), -5) }, -1);
    assert!(last_error().contains("sync interval"));

    // Reopening the same file brings the data back
    assert_eq!(unsafe { pillmom_init_database(path.as_ptr()) }, 0);
    let mut ids = Vec::new();
    for n in ["Ibuprofen", "Vitamin D"] {
        let n = c(n);
        ids.push(unsafe { pillmom_create_medication(n.as_ptr(), std::ptr::null(), std::ptr::null()) });
    }
    assert_eq!(ids, vec![2, 3]);
    assert_eq!(pillmom_close(), 0);
}
