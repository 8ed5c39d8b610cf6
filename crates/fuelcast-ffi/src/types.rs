//! C-compatible type definitions for FFI boundary.
//!
//! Every array field is `malloc`'d by this crate and must be released with
//! the matching `fuelcast_free_*` function.

use fuelcast_core::ForecastError;
use libc::{c_char, c_double, size_t};

/// Error codes for FFI boundary.
///
/// Codes 2..=7 mirror [`ForecastError::to_code`].
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Success = 0,
    NullPointer = 1,
    InvalidInput = 2,
    ShapeMismatch = 3,
    InsufficientData = 4,
    DegenerateInput = 5,
    SingularMatrix = 6,
    InvalidParameter = 7,
    AllocationError = 8,
    PanicCaught = 9,
}

impl From<&ForecastError> for ErrorCode {
    fn from(err: &ForecastError) -> Self {
        match err {
            ForecastError::InvalidInput(_) => ErrorCode::InvalidInput,
            ForecastError::ShapeMismatch { .. } => ErrorCode::ShapeMismatch,
            ForecastError::InsufficientData { .. } => ErrorCode::InsufficientData,
            ForecastError::DegenerateInput(_) => ErrorCode::DegenerateInput,
            ForecastError::SingularMatrix { .. } => ErrorCode::SingularMatrix,
            ForecastError::InvalidParameter { .. } => ErrorCode::InvalidParameter,
        }
    }
}

/// Error structure with message buffer for FFI.
#[repr(C)]
pub struct FuelcastError {
    pub code: ErrorCode,
    pub message: [c_char; 256],
}

impl FuelcastError {
    /// Create a success error (no error).
    pub fn success() -> Self {
        Self {
            code: ErrorCode::Success,
            message: [0; 256],
        }
    }

    /// Set an error with code and message, truncated to 255 bytes.
    pub fn set_error(&mut self, code: ErrorCode, msg: &str) {
        self.code = code;
        let bytes = msg.as_bytes();
        let len = bytes.len().min(255);
        for (i, &b) in bytes[..len].iter().enumerate() {
            self.message[i] = b as c_char;
        }
        self.message[len] = 0; // Null terminator
    }
}

impl Default for FuelcastError {
    fn default() -> Self {
        Self::success()
    }
}

/// Least-squares fit result.
#[repr(C)]
pub struct RegressionResult {
    /// Coefficients in ascending power order (β₀ first)
    pub coefficients: *mut c_double,
    pub n_coefficients: size_t,
    /// In-sample predictions, one per observation
    pub predictions: *mut c_double,
    /// `y - prediction`, one per observation
    pub residuals: *mut c_double,
    pub n_observations: size_t,
    /// Rounded to 4 decimals
    pub r_squared: c_double,
    /// Rounded to 4 decimals
    pub rmse: c_double,
    /// Rounded to 4 decimals
    pub mae: c_double,
    /// Rounded to 2 decimals
    pub mape: c_double,
}

impl Default for RegressionResult {
    fn default() -> Self {
        Self {
            coefficients: std::ptr::null_mut(),
            n_coefficients: 0,
            predictions: std::ptr::null_mut(),
            residuals: std::ptr::null_mut(),
            n_observations: 0,
            r_squared: f64::NAN,
            rmse: f64::NAN,
            mae: f64::NAN,
            mape: f64::NAN,
        }
    }
}

/// Forecast steps as parallel arrays.
#[repr(C)]
pub struct ForecastResult {
    pub predicted: *mut c_double,
    pub lower95: *mut c_double,
    pub upper95: *mut c_double,
    pub n_points: size_t,
}

impl Default for ForecastResult {
    fn default() -> Self {
        Self {
            predicted: std::ptr::null_mut(),
            lower95: std::ptr::null_mut(),
            upper95: std::ptr::null_mut(),
            n_points: 0,
        }
    }
}

/// Rounded goodness-of-fit metrics.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitMetricsResult {
    pub r_squared: c_double,
    pub rmse: c_double,
    pub mae: c_double,
    pub mape: c_double,
}

impl Default for FitMetricsResult {
    fn default() -> Self {
        Self {
            r_squared: f64::NAN,
            rmse: f64::NAN,
            mae: f64::NAN,
            mape: f64::NAN,
        }
    }
}

impl From<fuelcast_core::FitMetrics> for FitMetricsResult {
    fn from(m: fuelcast_core::FitMetrics) -> Self {
        Self {
            r_squared: m.r_squared,
            rmse: m.rmse,
            mae: m.mae,
            mape: m.mape,
        }
    }
}
