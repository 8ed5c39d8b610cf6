//! Core regression and forecasting library for fuelcast.
//!
//! This crate fits linear and polynomial trends to monthly price series,
//! reports goodness-of-fit metrics, and projects the fitted trend forward
//! with widening 95% bands (directly or with a damped, seasonal long-range
//! model).

pub mod calendar;
pub mod error;
pub mod forecast;
pub mod linalg;
pub mod metrics;
pub mod regression;
pub mod synthetic;

// Re-exports for convenience
pub use calendar::{label_forecast, yearly_summary, DatedForecastPoint, YearlySummary};
pub use error::{ForecastError, Result};
pub use forecast::{
    forecast, forecast_with_options, long_range_forecast, long_range_forecast_with_options,
    z_score_for, ForecastPoint, IntervalOptions, LongRangeOptions,
};
pub use linalg::{mat_mul, mat_vec_mul, solve_linear_system, transpose, Matrix};
pub use metrics::{fit_metrics, mae, mape, r2, rmse, round_to, FitMetrics};
pub use regression::{
    evaluate_polynomial, fit, fit_series, linear_regression, polynomial_regression,
    polynomial_slope, RegressionMethod, RegressionResult,
};
pub use synthetic::{Observation, ParkMiller, SyntheticSeries, YearlyAnchor, FUEL_SEASONAL_FACTORS};
