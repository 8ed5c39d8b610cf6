//! Standardized error handling utilities for FFI functions.
//!
//! Every exported function follows the same shape: reset the error, reject
//! null pointers, run the body under `catch_unwind`, translate any
//! [`ForecastError`] into an [`ErrorCode`] plus message.

use crate::types::{ErrorCode, FuelcastError};
use fuelcast_core::ForecastError;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Initialize error output to success state.
///
/// # Safety
/// The error pointer must be valid if non-null.
#[inline]
pub unsafe fn init_error(out_error: *mut FuelcastError) {
    if !out_error.is_null() {
        *out_error = FuelcastError::success();
    }
}

/// Set an error on the output error pointer.
///
/// # Safety
/// The error pointer must be valid if non-null.
#[inline]
pub unsafe fn set_error(out_error: *mut FuelcastError, code: ErrorCode, message: &str) {
    if !out_error.is_null() {
        (*out_error).set_error(code, message);
    }
}

/// Check if any of the given pointers are null, and set an error if so.
///
/// # Safety
/// The error pointer must be valid if non-null.
#[inline]
pub unsafe fn check_null_pointers(
    out_error: *mut FuelcastError,
    ptrs: &[*const core::ffi::c_void],
) -> bool {
    for ptr in ptrs {
        if ptr.is_null() {
            set_error(out_error, ErrorCode::NullPointer, "Null pointer argument");
            return true;
        }
    }
    false
}

/// Run `f` with panics caught and core errors translated.
///
/// # Safety
/// The error pointer must be valid if non-null.
///
/// # Returns
/// `Some(value)` on success, `None` on error
pub unsafe fn ffi_try<F, T>(out_error: *mut FuelcastError, f: F) -> Option<T>
where
    F: FnOnce() -> Result<T, ForecastError>,
{
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Some(value),
        Ok(Err(e)) => {
            set_error(out_error, ErrorCode::from(&e), &e.to_string());
            None
        }
        Err(_) => {
            set_error(out_error, ErrorCode::PanicCaught, "Panic in Rust code");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_error() {
        let mut error = FuelcastError::default();
        error.set_error(ErrorCode::InvalidInput, "stale");
        unsafe {
            init_error(&mut error);
        }
        assert_eq!(error.code, ErrorCode::Success);
        assert_eq!(error.message[0], 0);
    }

    #[test]
    fn test_check_null_pointers() {
        let mut error = FuelcastError::default();
        let value = 1.0f64;
        let ok: &[*const core::ffi::c_void] = &[&value as *const f64 as *const _];
        let bad: &[*const core::ffi::c_void] = &[&value as *const f64 as *const _, std::ptr::null()];
        unsafe {
            assert!(!check_null_pointers(&mut error, ok));
            assert!(check_null_pointers(&mut error, bad));
        }
        assert_eq!(error.code, ErrorCode::NullPointer);
    }

    #[test]
    fn test_ffi_try_success() {
        let mut error = FuelcastError::default();
        let result = unsafe { ffi_try(&mut error, || Ok::<_, ForecastError>(42)) };
        assert_eq!(result, Some(42));
        assert_eq!(error.code, ErrorCode::Success);
    }

    #[test]
    fn test_ffi_try_maps_error_code() {
        let mut error = FuelcastError::default();
        let result = unsafe {
            ffi_try(&mut error, || {
                Err::<i32, _>(ForecastError::SingularMatrix { column: 2 })
            })
        };
        assert_eq!(result, None);
        assert_eq!(error.code, ErrorCode::SingularMatrix);
    }

    #[test]
    fn test_ffi_try_catches_panic() {
        let mut error = FuelcastError::default();
        let result: Option<i32> = unsafe {
            ffi_try(&mut error, || -> Result<i32, ForecastError> {
                panic!("boom")
            })
        };
        assert_eq!(result, None);
        assert_eq!(error.code, ErrorCode::PanicCaught);
    }
}
