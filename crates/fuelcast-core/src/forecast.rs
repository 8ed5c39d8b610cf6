//! Out-of-sample projection of a fitted polynomial.
//!
//! Two forecast modes, both pure functions of their inputs:
//!
//! - [`forecast`]: direct polynomial extrapolation with a linearly widening
//!   interval. The band is a fixed-width normal approximation, not a
//!   prediction interval derived from residual variance.
//! - [`long_range_forecast`]: damped trend from the polynomial's slope, an
//!   additive monthly seasonal adjustment, and an uncertainty band that
//!   grows with the square root of the horizon plus a linear
//!   model-uncertainty term.
//!
//! All emitted values are rounded to 2 decimals.

use crate::error::{ForecastError, Result};
use crate::metrics::round_to;
use crate::regression::{evaluate_polynomial, polynomial_slope};
use log::debug;
use statrs::distribution::{ContinuousCDF, Normal};

/// Two-sided 95% standard-normal quantile.
pub const Z_95: f64 = 1.96;

/// Base one-sigma price uncertainty at the first forecast step, in series units.
pub const BASE_UNCERTAINTY: f64 = 3.3;

/// Per-step relative widening of the direct forecast band.
pub const DIRECT_WIDENING_RATE: f64 = 0.12;

/// Per-step multiplicative decay of the trend slope (3% per month).
pub const DAMPING_RATE: f64 = 0.97;

/// Share of the historical mean that one unit of seasonal factor represents.
pub const SEASONAL_SCALE: f64 = 0.12;

/// Growth of the random-walk variance term per step: `sqrt(1 + i * TIME_GROWTH)`.
pub const TIME_GROWTH: f64 = 0.5;

/// Linear per-step growth of the model mis-specification term.
pub const MODEL_UNCERTAINTY: f64 = 0.8;

/// Number of seasonal factors (one per calendar month).
pub const SEASONAL_PERIOD: usize = 12;

/// Decimal places of every emitted forecast value.
pub const FORECAST_DECIMALS: u32 = 2;

/// A single projected step with its 95% band.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct ForecastPoint {
    pub predicted: f64,
    pub lower95: f64,
    pub upper95: f64,
}

impl ForecastPoint {
    /// Rounded point for step `step`; overflow to a non-finite value is an error.
    fn with_band(step: usize, predicted: f64, half_width: f64) -> Result<Self> {
        let point = Self {
            predicted: round_to(predicted, FORECAST_DECIMALS),
            lower95: round_to(predicted - half_width, FORECAST_DECIMALS),
            upper95: round_to(predicted + half_width, FORECAST_DECIMALS),
        };
        if [point.predicted, point.lower95, point.upper95]
            .iter()
            .all(|v| v.is_finite())
        {
            Ok(point)
        } else {
            Err(ForecastError::InvalidInput(format!(
                "forecast step {step} is not finite"
            )))
        }
    }

    /// Width of the band, `upper95 - lower95`.
    pub fn width(&self) -> f64 {
        self.upper95 - self.lower95
    }
}

/// Band configuration for [`forecast_with_options`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct IntervalOptions {
    /// One-sigma uncertainty at step 0
    pub base_uncertainty: f64,
    /// Relative widening per step: `base * (1 + idx * widening_rate)`
    pub widening_rate: f64,
    /// Standard-normal quantile of the band
    pub z_score: f64,
}

impl Default for IntervalOptions {
    fn default() -> Self {
        Self {
            base_uncertainty: BASE_UNCERTAINTY,
            widening_rate: DIRECT_WIDENING_RATE,
            z_score: Z_95,
        }
    }
}

impl IntervalOptions {
    /// Defaults with the z-score derived from a two-sided confidence level.
    pub fn with_confidence(level: f64) -> Result<Self> {
        Ok(Self {
            z_score: z_score_for(level)?,
            ..Self::default()
        })
    }

    pub fn validate(&self) -> Result<()> {
        check_non_negative("base_uncertainty", self.base_uncertainty)?;
        check_non_negative("widening_rate", self.widening_rate)?;
        check_positive("z_score", self.z_score)
    }
}

/// Configuration for [`long_range_forecast_with_options`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct LongRangeOptions {
    /// Slope multiplier per step, in (0, 1]
    pub damping_rate: f64,
    /// Seasonal adjustment = factor * historical mean * seasonal_scale
    pub seasonal_scale: f64,
    /// One-sigma uncertainty at step 0
    pub base_uncertainty: f64,
    /// Random-walk growth: `base * sqrt(1 + i * time_growth)`
    pub time_growth: f64,
    /// Linear growth: `model_uncertainty * i`
    pub model_uncertainty: f64,
    /// Standard-normal quantile of the band
    pub z_score: f64,
}

impl Default for LongRangeOptions {
    fn default() -> Self {
        Self {
            damping_rate: DAMPING_RATE,
            seasonal_scale: SEASONAL_SCALE,
            base_uncertainty: BASE_UNCERTAINTY,
            time_growth: TIME_GROWTH,
            model_uncertainty: MODEL_UNCERTAINTY,
            z_score: Z_95,
        }
    }
}

impl LongRangeOptions {
    /// Defaults with the z-score derived from a two-sided confidence level.
    pub fn with_confidence(level: f64) -> Result<Self> {
        Ok(Self {
            z_score: z_score_for(level)?,
            ..Self::default()
        })
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.damping_rate > 0.0 && self.damping_rate <= 1.0) {
            return Err(ForecastError::invalid_parameter(
                "damping_rate",
                self.damping_rate,
                "must be in (0, 1]",
            ));
        }
        if !self.seasonal_scale.is_finite() {
            return Err(ForecastError::invalid_parameter(
                "seasonal_scale",
                self.seasonal_scale,
                "must be finite",
            ));
        }
        check_non_negative("base_uncertainty", self.base_uncertainty)?;
        check_non_negative("time_growth", self.time_growth)?;
        check_non_negative("model_uncertainty", self.model_uncertainty)?;
        check_positive("z_score", self.z_score)
    }

    /// One-sigma uncertainty at step `i`: sqrt-of-time term plus linear term.
    pub fn uncertainty_at(&self, i: usize) -> f64 {
        let step = i as f64;
        self.base_uncertainty * (1.0 + step * self.time_growth).sqrt()
            + self.model_uncertainty * step
    }
}

/// Two-sided standard-normal quantile for a confidence level in (0, 1).
///
/// `z_score_for(0.95)` is 1.959964…; the defaults use the rounded [`Z_95`].
pub fn z_score_for(level: f64) -> Result<f64> {
    if !(level > 0.0 && level < 1.0) {
        return Err(ForecastError::invalid_parameter(
            "confidence_level",
            level,
            "must be strictly between 0 and 1",
        ));
    }
    let normal = Normal::new(0.0, 1.0).map_err(|e| {
        ForecastError::invalid_parameter("confidence_level", level, e.to_string())
    })?;
    Ok(normal.inverse_cdf(0.5 + level / 2.0))
}

/// Evaluate the polynomial at each future position with a linearly widening band.
///
/// Step `idx` has one-sigma uncertainty `3.3 * (1 + idx * 0.12)` and the band
/// is `predicted ± 1.96 * uncertainty`.
pub fn forecast(coefficients: &[f64], future_x: &[f64]) -> Result<Vec<ForecastPoint>> {
    forecast_with_options(coefficients, future_x, &IntervalOptions::default())
}

/// [`forecast`] with explicit band options.
pub fn forecast_with_options(
    coefficients: &[f64],
    future_x: &[f64],
    options: &IntervalOptions,
) -> Result<Vec<ForecastPoint>> {
    options.validate()?;
    validate_coefficients(coefficients)?;
    if let Some(i) = future_x.iter().position(|v| !v.is_finite()) {
        return Err(ForecastError::InvalidInput(format!(
            "future_x[{i}] is not finite"
        )));
    }
    debug!(
        "direct forecast: degree {}, {} steps",
        coefficients.len() - 1,
        future_x.len()
    );

    future_x
        .iter()
        .enumerate()
        .map(|(idx, &xi)| {
            let predicted = evaluate_polynomial(coefficients, xi);
            let uncertainty = options.base_uncertainty * (1.0 + idx as f64 * options.widening_rate);
            ForecastPoint::with_band(idx, predicted, options.z_score * uncertainty)
        })
        .collect()
}

/// Project `months` steps past the end of `historical_prices`.
///
/// 1. The trend slope is the polynomial's derivative at `start_index`.
/// 2. Starting from the last observed value, step `i` adds
///    `slope * 0.97^i` to a running level.
/// 3. A seasonal term `seasonal_factors[i % 12] * mean(history) * 0.12` is
///    added on top; step 0 is the month right after the last observation.
/// 4. The band is `± 1.96 * (3.3 * sqrt(1 + 0.5 i) + 0.8 i)`.
///
/// # Errors
/// * `InsufficientData` if the history is empty
/// * `ShapeMismatch` unless exactly 12 seasonal factors are given
/// * `InvalidInput` for empty or non-finite coefficients or history, or when
///   a projected value overflows
pub fn long_range_forecast(
    historical_prices: &[f64],
    coefficients: &[f64],
    months: usize,
    start_index: usize,
    seasonal_factors: &[f64],
) -> Result<Vec<ForecastPoint>> {
    long_range_forecast_with_options(
        historical_prices,
        coefficients,
        months,
        start_index,
        seasonal_factors,
        &LongRangeOptions::default(),
    )
}

/// [`long_range_forecast`] with explicit options.
pub fn long_range_forecast_with_options(
    historical_prices: &[f64],
    coefficients: &[f64],
    months: usize,
    start_index: usize,
    seasonal_factors: &[f64],
    options: &LongRangeOptions,
) -> Result<Vec<ForecastPoint>> {
    options.validate()?;
    validate_coefficients(coefficients)?;
    let last_price = match historical_prices.last() {
        Some(&p) => p,
        None => return Err(ForecastError::InsufficientData { needed: 1, got: 0 }),
    };
    if let Some(i) = historical_prices.iter().position(|v| !v.is_finite()) {
        return Err(ForecastError::InvalidInput(format!(
            "historical_prices[{i}] is not finite"
        )));
    }
    if seasonal_factors.len() != SEASONAL_PERIOD {
        return Err(ForecastError::ShapeMismatch {
            what: "seasonal factors",
            expected: SEASONAL_PERIOD,
            got: seasonal_factors.len(),
        });
    }
    if let Some(i) = seasonal_factors.iter().position(|v| !v.is_finite()) {
        return Err(ForecastError::InvalidInput(format!(
            "seasonal_factors[{i}] is not finite"
        )));
    }

    let trend_slope = polynomial_slope(coefficients, start_index as f64);
    let avg_price = historical_prices.iter().sum::<f64>() / historical_prices.len() as f64;
    let seasonal_amplitude = avg_price * options.seasonal_scale;
    debug!(
        "long-range forecast: {months} steps from index {start_index}, slope {trend_slope}, mean {avg_price}"
    );

    let mut level = last_price;
    // No up-front reservation: `months` is caller-controlled
    let mut points = Vec::new();
    for i in 0..months {
        level += trend_slope * options.damping_rate.powi(i as i32);

        let predicted = level + seasonal_factors[i % SEASONAL_PERIOD] * seasonal_amplitude;
        let half_width = options.z_score * options.uncertainty_at(i);
        points.push(ForecastPoint::with_band(i, predicted, half_width)?);
    }

    Ok(points)
}

fn validate_coefficients(coefficients: &[f64]) -> Result<()> {
    if coefficients.is_empty() {
        return Err(ForecastError::InvalidInput(
            "coefficient vector is empty".to_string(),
        ));
    }
    if let Some(i) = coefficients.iter().position(|v| !v.is_finite()) {
        return Err(ForecastError::InvalidInput(format!(
            "coefficients[{i}] is not finite"
        )));
    }
    Ok(())
}

fn check_non_negative(param: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ForecastError::invalid_parameter(
            param,
            value,
            "must be finite and non-negative",
        ))
    }
}

fn check_positive(param: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ForecastError::invalid_parameter(
            param,
            value,
            "must be finite and positive",
        ))
    }
}
