//! FFI boundary layer for the fuelcast regression and forecasting engine.
//!
//! This crate provides C-compatible functions so a presentation layer in any
//! host language can fit trends and request forecasts with raw arrays. Each
//! function is a translation shim over `fuelcast_core`: results are
//! bit-identical to calling the core directly.
//!
//! Conventions shared by every function:
//! - returns `true` on success; on failure `out_error` carries a code and message
//! - input arrays may be null only when their length is 0
//! - output arrays are `malloc`'d and released with `fuelcast_free_*`

pub mod allocation;
pub mod conversion;
pub mod error_handling;
pub mod types;

use allocation::alloc_arrays;
use conversion::{slice_from_raw, to_usize};
use error_handling::{check_null_pointers, ffi_try, init_error};
use fuelcast_core::{ForecastPoint, Result};
use libc::{c_char, c_double, c_int, size_t};

pub use types::*;

// ============================================================================
// Helper Functions
// ============================================================================

/// Null-check the output pointer and every input array with a non-zero length.
unsafe fn check_args(
    out_error: *mut FuelcastError,
    out_result: *const core::ffi::c_void,
    inputs: &[(*const c_double, size_t)],
) -> bool {
    let mut ptrs = vec![out_result];
    ptrs.extend(
        inputs
            .iter()
            .filter(|(_, len)| *len > 0)
            .map(|(p, _)| *p as *const core::ffi::c_void),
    );
    !check_null_pointers(out_error, &ptrs)
}

/// Copy a core regression result into the C struct.
unsafe fn write_regression(
    fit: fuelcast_core::RegressionResult,
    out_result: *mut RegressionResult,
    out_error: *mut FuelcastError,
) -> bool {
    let Some([coefficients, predictions, residuals]) = alloc_arrays(
        [
            fit.coefficients.as_slice(),
            fit.predictions.as_slice(),
            fit.residuals.as_slice(),
        ],
        out_error,
    ) else {
        return false;
    };

    *out_result = RegressionResult {
        coefficients,
        n_coefficients: fit.coefficients.len(),
        predictions,
        residuals,
        n_observations: fit.predictions.len(),
        r_squared: fit.r_squared,
        rmse: fit.rmse,
        mae: fit.mae,
        mape: fit.mape,
    };
    true
}

/// Copy forecast points into parallel C arrays.
unsafe fn write_forecast(
    points: &[ForecastPoint],
    out_result: *mut ForecastResult,
    out_error: *mut FuelcastError,
) -> bool {
    let predicted: Vec<f64> = points.iter().map(|p| p.predicted).collect();
    let lower: Vec<f64> = points.iter().map(|p| p.lower95).collect();
    let upper: Vec<f64> = points.iter().map(|p| p.upper95).collect();

    let Some([predicted_ptr, lower_ptr, upper_ptr]) =
        alloc_arrays([predicted.as_slice(), lower.as_slice(), upper.as_slice()], out_error)
    else {
        return false;
    };

    *out_result = ForecastResult {
        predicted: predicted_ptr,
        lower95: lower_ptr,
        upper95: upper_ptr,
        n_points: points.len(),
    };
    true
}

// ============================================================================
// Regression
// ============================================================================

/// Ordinary least-squares line `y = b0 + b1 x`.
///
/// # Safety
/// `x` and `y` must point to `length` doubles; `out_result` must be valid.
#[no_mangle]
pub unsafe extern "C" fn fuelcast_linear_regression(
    x: *const c_double,
    y: *const c_double,
    length: size_t,
    out_result: *mut RegressionResult,
    out_error: *mut FuelcastError,
) -> bool {
    init_error(out_error);
    if !check_args(out_error, out_result as *const _, &[(x, length), (y, length)]) {
        return false;
    }

    let fit = ffi_try(out_error, || {
        fuelcast_core::linear_regression(slice_from_raw(x, length), slice_from_raw(y, length))
    });
    match fit {
        Some(fit) => write_regression(fit, out_result, out_error),
        None => false,
    }
}

/// Polynomial least squares of the given degree via the normal equations.
///
/// # Safety
/// `x` and `y` must point to `length` doubles; `out_result` must be valid.
#[no_mangle]
pub unsafe extern "C" fn fuelcast_polynomial_regression(
    x: *const c_double,
    y: *const c_double,
    length: size_t,
    degree: c_int,
    out_result: *mut RegressionResult,
    out_error: *mut FuelcastError,
) -> bool {
    init_error(out_error);
    if !check_args(out_error, out_result as *const _, &[(x, length), (y, length)]) {
        return false;
    }

    let fit = ffi_try(out_error, || {
        let degree = to_usize("degree", degree)?;
        fuelcast_core::polynomial_regression(
            slice_from_raw(x, length),
            slice_from_raw(y, length),
            degree,
        )
    });
    match fit {
        Some(fit) => write_regression(fit, out_result, out_error),
        None => false,
    }
}

/// Release the arrays of a [`RegressionResult`].
///
/// # Safety
/// The result pointer must be valid or null.
#[no_mangle]
pub unsafe extern "C" fn fuelcast_free_regression_result(result: *mut RegressionResult) {
    if result.is_null() {
        return;
    }
    let r = &mut *result;
    free_fields!(r, coefficients, predictions, residuals);
    r.n_coefficients = 0;
    r.n_observations = 0;
}

// ============================================================================
// Forecasting
// ============================================================================

/// Direct polynomial extrapolation at `future_x` with a widening band.
///
/// # Safety
/// Arrays must have the specified lengths; `out_result` must be valid.
#[no_mangle]
pub unsafe extern "C" fn fuelcast_forecast(
    coefficients: *const c_double,
    n_coefficients: size_t,
    future_x: *const c_double,
    n_future: size_t,
    out_result: *mut ForecastResult,
    out_error: *mut FuelcastError,
) -> bool {
    init_error(out_error);
    if !check_args(
        out_error,
        out_result as *const _,
        &[(coefficients, n_coefficients), (future_x, n_future)],
    ) {
        return false;
    }

    let points = ffi_try(out_error, || {
        fuelcast_core::forecast(
            slice_from_raw(coefficients, n_coefficients),
            slice_from_raw(future_x, n_future),
        )
    });
    match points {
        Some(points) => write_forecast(&points, out_result, out_error),
        None => false,
    }
}

/// Damped-trend seasonal forecast `months` steps past the history.
///
/// `seasonal_factors` must hold exactly 12 values.
///
/// # Safety
/// Arrays must have the specified lengths; `out_result` must be valid.
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn fuelcast_long_range_forecast(
    historical: *const c_double,
    n_historical: size_t,
    coefficients: *const c_double,
    n_coefficients: size_t,
    months: c_int,
    start_index: c_int,
    seasonal_factors: *const c_double,
    n_seasonal: size_t,
    out_result: *mut ForecastResult,
    out_error: *mut FuelcastError,
) -> bool {
    init_error(out_error);
    if !check_args(
        out_error,
        out_result as *const _,
        &[
            (historical, n_historical),
            (coefficients, n_coefficients),
            (seasonal_factors, n_seasonal),
        ],
    ) {
        return false;
    }

    let points = ffi_try(out_error, || -> Result<Vec<ForecastPoint>> {
        fuelcast_core::long_range_forecast(
            slice_from_raw(historical, n_historical),
            slice_from_raw(coefficients, n_coefficients),
            to_usize("months", months)?,
            to_usize("start_index", start_index)?,
            slice_from_raw(seasonal_factors, n_seasonal),
        )
    });
    match points {
        Some(points) => write_forecast(&points, out_result, out_error),
        None => false,
    }
}

/// Release the arrays of a [`ForecastResult`].
///
/// # Safety
/// The result pointer must be valid or null.
#[no_mangle]
pub unsafe extern "C" fn fuelcast_free_forecast_result(result: *mut ForecastResult) {
    if result.is_null() {
        return;
    }
    let r = &mut *result;
    free_fields!(r, predicted, lower95, upper95);
    r.n_points = 0;
}

// ============================================================================
// Metrics
// ============================================================================

/// Rounded R², RMSE, MAE and MAPE of `predicted` against `actual`.
///
/// # Safety
/// Both arrays must point to `length` doubles; `out_result` must be valid.
#[no_mangle]
pub unsafe extern "C" fn fuelcast_fit_metrics(
    actual: *const c_double,
    predicted: *const c_double,
    length: size_t,
    out_result: *mut FitMetricsResult,
    out_error: *mut FuelcastError,
) -> bool {
    init_error(out_error);
    if !check_args(
        out_error,
        out_result as *const _,
        &[(actual, length), (predicted, length)],
    ) {
        return false;
    }

    let metrics = ffi_try(out_error, || {
        fuelcast_core::fit_metrics(slice_from_raw(actual, length), slice_from_raw(predicted, length))
    });
    match metrics {
        Some(m) => {
            *out_result = m.into();
            true
        }
        None => false,
    }
}

// ============================================================================
// Version
// ============================================================================

#[no_mangle]
pub extern "C" fn fuelcast_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
