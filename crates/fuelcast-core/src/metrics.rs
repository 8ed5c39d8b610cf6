//! Goodness-of-fit metrics for in-sample regression fits.
//!
//! This module provides the four metrics reported with every fit:
//!
//! - **R²**: proportion of variance explained
//! - **RMSE**: root mean squared error, in original units
//! - **MAE**: mean absolute error, in original units
//! - **MAPE**: mean absolute percentage error
//!
//! The raw metric functions return unrounded values. [`fit_metrics`] rounds
//! them the way they are reported: 4 decimals for R², RMSE and MAE, 2 for
//! MAPE.
//!
//! # Degenerate inputs
//!
//! | Case | Policy |
//! |------|--------|
//! | all actuals identical (SStot = 0) | R² = 1.0 if SSres = 0, else NaN |
//! | actual value equals 0 | point skipped by MAPE |
//! | every actual equals 0 | MAPE = NaN |

use crate::error::{ForecastError, Result};
use log::warn;

/// Decimal places used when reporting R², RMSE and MAE.
pub const FIT_DECIMALS: u32 = 4;
/// Decimal places used when reporting MAPE.
pub const MAPE_DECIMALS: u32 = 2;

/// Rounded fit metrics as reported alongside a regression.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct FitMetrics {
    pub r_squared: f64,
    pub rmse: f64,
    pub mae: f64,
    pub mape: f64,
}

/// Round half away from zero to `decimals` places. NaN and infinities pass through.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Calculates Mean Absolute Error between actual and predicted values.
///
/// MAE is the average miss in series units, ignoring direction.
///
/// # Arguments
/// * `actual` - Observed values
/// * `predicted` - Fitted or forecast values, same length as `actual`
///
/// # Returns
/// The mean absolute error, or an error if inputs are invalid
///
/// # Formula
/// MAE = (1/n) * Σ|actual_i - predicted_i|
///
/// # Example
/// ```
/// use fuelcast_core::metrics::mae;
/// let actual = vec![1.0, 2.0, 3.0];
/// let predicted = vec![1.1, 2.2, 2.8];
/// let error = mae(&actual, &predicted).unwrap();
/// assert!((error - 0.166).abs() < 0.01);
/// ```
pub fn mae(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    validate_inputs(actual, predicted)?;
    let sum: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).abs())
        .sum();
    Ok(sum / actual.len() as f64)
}

/// Calculates Mean Squared Error between actual and predicted values.
///
/// Squaring weights large misses more heavily than small ones.
///
/// # Arguments
/// * `actual` - Observed values
/// * `predicted` - Fitted or forecast values, same length as `actual`
///
/// # Returns
/// The mean squared error, or an error if inputs are invalid
///
/// # Formula
/// MSE = SSres / n = (1/n) * Σ(actual_i - predicted_i)²
pub fn mse(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    validate_inputs(actual, predicted)?;
    Ok(sum_squared_residuals(actual, predicted) / actual.len() as f64)
}

/// Calculates Root Mean Squared Error between actual and predicted values.
///
/// RMSE keeps the large-miss weighting of MSE but reports it in series units.
///
/// # Arguments
/// * `actual` - Observed values
/// * `predicted` - Fitted or forecast values, same length as `actual`
///
/// # Returns
/// The root mean squared error, or an error if inputs are invalid
///
/// # Formula
/// RMSE = √(SSres / n)
pub fn rmse(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    Ok(mse(actual, predicted)?.sqrt())
}

/// Calculates Mean Absolute Percentage Error.
///
/// MAPE expresses the average miss relative to the actual value, so fits of
/// differently priced series can be compared. Points whose actual value is
/// zero are skipped; the mean is taken over the remaining points.
///
/// # Arguments
/// * `actual` - Observed values
/// * `predicted` - Fitted or forecast values, same length as `actual`
///
/// # Returns
/// MAPE in percent, or NaN if every actual value is zero
///
/// # Formula
/// MAPE = (100/m) * Σ|(actual_i - predicted_i) / actual_i| over the m non-zero actuals
pub fn mape(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    validate_inputs(actual, predicted)?;
    let (sum, count) = actual
        .iter()
        .zip(predicted.iter())
        .filter(|(a, _)| a.abs() > f64::EPSILON)
        .fold((0.0, 0usize), |(sum, count), (a, p)| {
            (sum + ((a - p) / a).abs(), count + 1)
        });

    if count == 0 {
        warn!("MAPE undefined: all {} actual values are zero", actual.len());
        return Ok(f64::NAN);
    }
    if count < actual.len() {
        warn!(
            "MAPE skipped {} zero-valued observations",
            actual.len() - count
        );
    }
    Ok(sum / count as f64 * 100.0)
}

/// R-squared (Coefficient of Determination)
///
/// Share of the variance of `actual` explained by `predicted`. Invariant
/// under rescaling both series by the same factor.
///
/// # Arguments
/// * `actual` - Observed values
/// * `predicted` - Fitted values, same length as `actual`
///
/// # Returns
/// R² (1.0 is a perfect fit; negative when worse than the mean)
///
/// # Formula
/// R² = 1 - SSres / SStot
///
/// When every actual value is identical SStot is zero (up to round-off in
/// the mean); the result is 1.0 for a perfect fit and NaN otherwise.
pub fn r2(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    validate_inputs(actual, predicted)?;

    let n = actual.len() as f64;
    let mean: f64 = actual.iter().sum::<f64>() / n;
    let ss_res = sum_squared_residuals(actual, predicted);
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();

    // Round-off floor of SStot for a constant series: the mean is exact to
    // within n ulps of the largest magnitude.
    let max_abs = actual.iter().fold(0.0_f64, |m, a| m.max(a.abs()));
    let floor = n * (n * f64::EPSILON * max_abs).powi(2);

    if ss_tot <= floor {
        if ss_res <= floor {
            return Ok(1.0);
        }
        warn!("R² undefined: actual values have zero variance");
        return Ok(f64::NAN);
    }

    Ok(1.0 - ss_res / ss_tot)
}

/// Compute all four fit metrics, rounded for reporting.
///
/// # Returns
/// [`FitMetrics`] with R², RMSE and MAE at 4 decimals and MAPE at 2
pub fn fit_metrics(actual: &[f64], predicted: &[f64]) -> Result<FitMetrics> {
    Ok(FitMetrics {
        r_squared: round_to(r2(actual, predicted)?, FIT_DECIMALS),
        rmse: round_to(rmse(actual, predicted)?, FIT_DECIMALS),
        mae: round_to(mae(actual, predicted)?, FIT_DECIMALS),
        mape: round_to(mape(actual, predicted)?, MAPE_DECIMALS),
    })
}

fn sum_squared_residuals(actual: &[f64], predicted: &[f64]) -> f64 {
    actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum()
}

fn validate_inputs(actual: &[f64], predicted: &[f64]) -> Result<()> {
    if actual.len() != predicted.len() {
        return Err(ForecastError::ShapeMismatch {
            what: "actual and predicted",
            expected: actual.len(),
            got: predicted.len(),
        });
    }
    if actual.is_empty() {
        return Err(ForecastError::InsufficientData { needed: 1, got: 0 });
    }
    Ok(())
}
