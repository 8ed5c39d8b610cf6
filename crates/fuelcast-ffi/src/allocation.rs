//! Memory allocation utilities for FFI functions.
//!
//! Arrays handed to C are allocated with `malloc` so the caller may release
//! them with the exported free functions (or plain `free`).

use crate::types::{ErrorCode, FuelcastError};
use std::ptr;

// Memory allocation - use libc on native, std::alloc on WASM
#[cfg(not(target_family = "wasm"))]
use libc::{free, malloc};

#[cfg(target_family = "wasm")]
unsafe fn malloc(size: usize) -> *mut core::ffi::c_void {
    use std::alloc::{alloc, Layout};
    match Layout::from_size_align(size, 8) {
        Ok(layout) => alloc(layout) as *mut core::ffi::c_void,
        Err(_) => ptr::null_mut(),
    }
}

#[cfg(target_family = "wasm")]
unsafe fn free(ptr: *mut core::ffi::c_void) {
    use std::alloc::{dealloc, Layout};
    if let Ok(layout) = Layout::from_size_align(1, 8) {
        dealloc(ptr as *mut u8, layout);
    }
}

/// Copy a Rust slice to a newly allocated C array.
///
/// # Safety
/// Returns null on allocation failure or if slice is empty.
pub unsafe fn slice_to_c_array<T: Copy>(slice: &[T]) -> *mut T {
    if slice.is_empty() {
        return ptr::null_mut();
    }

    let ptr = malloc(std::mem::size_of_val(slice)) as *mut T;
    if !ptr.is_null() {
        ptr::copy_nonoverlapping(slice.as_ptr(), ptr, slice.len());
    }
    ptr
}

/// Copy each slice into its own C array; all-or-nothing.
///
/// On allocation failure every array allocated so far is freed, the error is
/// set, and `None` is returned.
///
/// # Safety
/// The error pointer must be valid if non-null.
pub unsafe fn alloc_arrays<const N: usize>(
    slices: [&[f64]; N],
    out_error: *mut FuelcastError,
) -> Option<[*mut f64; N]> {
    let mut out = [ptr::null_mut(); N];
    for (i, slice) in slices.iter().enumerate() {
        let p = slice_to_c_array(slice);
        if p.is_null() && !slice.is_empty() {
            for allocated in &out[..i] {
                free_ptr(*allocated as *mut core::ffi::c_void);
            }
            if !out_error.is_null() {
                (*out_error).set_error(ErrorCode::AllocationError, "Memory allocation failed");
            }
            return None;
        }
        out[i] = p;
    }
    Some(out)
}

/// Free a C pointer using platform-appropriate free function.
///
/// # Safety
/// ptr must be either null or a valid pointer allocated by malloc.
#[inline]
pub unsafe fn free_ptr(ptr: *mut core::ffi::c_void) {
    if !ptr.is_null() {
        free(ptr);
    }
}

/// Macro to free multiple struct fields.
///
/// Usage:
/// ```ignore
/// free_fields!(result, field1, field2, field3);
/// ```
#[macro_export]
macro_rules! free_fields {
    ($result:expr, $($field:ident),+ $(,)?) => {{
        $(
            if !$result.$field.is_null() {
                $crate::allocation::free_ptr($result.$field as *mut core::ffi::c_void);
                $result.$field = std::ptr::null_mut();
            }
        )+
    }};
}
