//! Parameter conversion utilities for FFI functions.

use core::ffi::{c_double, c_int};
use fuelcast_core::{ForecastError, Result};

/// Borrow `len` doubles starting at `ptr`.
///
/// A zero length yields an empty slice without touching `ptr`, so callers may
/// pass null for empty inputs.
///
/// # Safety
/// If `len > 0`, `ptr` must point to `len` initialized doubles that outlive `'a`.
#[inline]
pub unsafe fn slice_from_raw<'a>(ptr: *const c_double, len: usize) -> &'a [f64] {
    if len == 0 || ptr.is_null() {
        &[]
    } else {
        std::slice::from_raw_parts(ptr, len)
    }
}

/// Convert a `c_int` count or index to `usize`, rejecting negatives.
#[inline]
pub fn to_usize(param: &str, value: c_int) -> Result<usize> {
    usize::try_from(value)
        .map_err(|_| ForecastError::invalid_parameter(param, value, "must not be negative"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_usize() {
        assert_eq!(to_usize("months", 5), Ok(5));
        assert_eq!(to_usize("months", 0), Ok(0));
        assert!(matches!(
            to_usize("months", -1),
            Err(ForecastError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_slice_from_raw() {
        let values = [1.0, 2.0, 3.0];
        unsafe {
            assert_eq!(slice_from_raw(values.as_ptr(), 3), &values[..]);
            assert!(slice_from_raw(std::ptr::null(), 0).is_empty());
        }
    }
}
