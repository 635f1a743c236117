//! C string conversion and release.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use crate::error::{BridgeError, BridgeResult};

/// Reads a required string argument.
///
/// # Safety
/// `ptr` must be NULL or point to a NUL-terminated string that stays valid
/// for the duration of the call.
pub(crate) unsafe fn required(ptr: *const c_char, arg: &'static str) -> BridgeResult<String> {
    optional(ptr, arg)?.ok_or(BridgeError::NullPointer(arg))
}

/// Reads an optional string argument; NULL gives `None`.
///
/// # Safety
/// Same as [`required`].
pub(crate) unsafe fn optional(ptr: *const c_char, arg: &'static str) -> BridgeResult<Option<String>> {
    if ptr.is_null() {
        return Ok(None);
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map(|s| Some(s.to_string()))
        .map_err(|_| BridgeError::InvalidUtf8(arg))
}

/// Reads an optional string argument; NULL gives `""`.
///
/// # Safety
/// Same as [`required`].
pub(crate) unsafe fn or_empty(ptr: *const c_char, arg: &'static str) -> BridgeResult<String> {
    Ok(optional(ptr, arg)?.unwrap_or_default())
}

/// Hands a string to the caller, who releases it with `pillmom_free_string`.
pub(crate) fn into_raw(s: String) -> *mut c_char {
    // Interior NULs would truncate the message on the C side anyway.
    let cleaned = s.replace('\0', " ");
    match CString::new(cleaned) {
        Ok(c) => c.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

/// Releases a string returned by any `pillmom_*` function.
///
/// # Safety
/// `s` must be NULL or a pointer returned by this library that has not been
/// freed yet.
#[no_mangle]
pub unsafe extern "C" fn pillmom_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argument_reading() {
        let name = CString::new("Aspirin").unwrap();
        unsafe {
            assert_eq!(required(name.as_ptr(), "name").unwrap(), "Aspirin");
            assert!(matches!(
                required(std::ptr::null(), "name"),
                Err(BridgeError::NullPointer("name"))
            ));
            assert_eq!(or_empty(std::ptr::null(), "dosage").unwrap(), "");
        }

        let bad = [0xffu8, 0xfe, 0x00];
        unsafe {
            assert!(matches!(
                required(bad.as_ptr() as *const c_char, "name"),
                Err(BridgeError::InvalidUtf8("name"))
            ));
        }
    }

    #[test]
    fn test_into_raw_and_free() {
        let ptr = into_raw("a\0b".to_string());
        assert!(!ptr.is_null());
        unsafe {
            assert_eq!(CStr::from_ptr(ptr).to_str().unwrap(), "a b");
            pillmom_free_string(ptr);
            pillmom_free_string(std::ptr::null_mut());
        }
    }
}
