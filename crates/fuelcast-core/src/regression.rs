//! Least-squares regression over a positional series.
//!
//! Two estimators share one result type:
//!
//! - [`linear_regression`]: closed-form slope and intercept
//! - [`polynomial_regression`]: Vandermonde design matrix, normal equations
//!   `(XᵀX)β = Xᵀy`, solved with [`crate::linalg::solve_linear_system`]
//!
//! Metrics are computed in-sample over the full training series.

use crate::error::{ForecastError, Result};
use crate::linalg::{mat_mul, mat_vec_mul, solve_linear_system, transpose, Matrix};
use crate::metrics::{fit_metrics, FitMetrics};
use log::debug;
use std::str::FromStr;

/// Degree used when a polynomial method is requested without an explicit degree.
pub const DEFAULT_POLYNOMIAL_DEGREE: usize = 3;

/// Outcome of a least-squares fit.
///
/// `coefficients` are in ascending power order (β₀ first).
/// `predictions` and `residuals` are aligned with the input series.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct RegressionResult {
    pub coefficients: Vec<f64>,
    pub r_squared: f64,
    pub rmse: f64,
    pub mae: f64,
    pub mape: f64,
    pub predictions: Vec<f64>,
    pub residuals: Vec<f64>,
}

impl RegressionResult {
    fn from_fit(coefficients: Vec<f64>, y: &[f64], predictions: Vec<f64>) -> Result<Self> {
        let FitMetrics {
            r_squared,
            rmse,
            mae,
            mape,
        } = fit_metrics(y, &predictions)?;
        let residuals = y
            .iter()
            .zip(predictions.iter())
            .map(|(yi, pi)| yi - pi)
            .collect();

        Ok(Self {
            coefficients,
            r_squared,
            rmse,
            mae,
            mape,
            predictions,
            residuals,
        })
    }

    /// Polynomial degree of the fitted model.
    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    /// The rounded metrics as a standalone value.
    pub fn metrics(&self) -> FitMetrics {
        FitMetrics {
            r_squared: self.r_squared,
            rmse: self.rmse,
            mae: self.mae,
            mape: self.mape,
        }
    }
}

/// Regression family selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RegressionMethod {
    /// Straight line through closed-form normal equations
    Linear,
    /// Polynomial of the given degree through the normal equations
    Polynomial(usize),
}

impl Default for RegressionMethod {
    fn default() -> Self {
        Self::Polynomial(DEFAULT_POLYNOMIAL_DEGREE)
    }
}

impl FromStr for RegressionMethod {
    type Err = ForecastError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "linear" | "lin" => return Ok(Self::Linear),
            "polynomial" | "poly" => return Ok(Self::Polynomial(DEFAULT_POLYNOMIAL_DEGREE)),
            "quadratic" => return Ok(Self::Polynomial(2)),
            "cubic" => return Ok(Self::Polynomial(3)),
            _ => {}
        }

        // "poly2", "poly_4", "polynomial3"
        let digits = lower
            .strip_prefix("polynomial")
            .or_else(|| lower.strip_prefix("poly"))
            .map(|rest| rest.trim_start_matches('_'));
        match digits.map(str::parse::<usize>) {
            Some(Ok(degree)) if degree >= 1 => Ok(Self::Polynomial(degree)),
            _ => Err(ForecastError::invalid_parameter(
                "method",
                s,
                "expected 'linear', 'polynomial', 'quadratic', 'cubic' or 'polyN'",
            )),
        }
    }
}

impl std::fmt::Display for RegressionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Linear => write!(f, "linear"),
            Self::Polynomial(degree) => write!(f, "poly{degree}"),
        }
    }
}

/// Evaluate `Σ coefficients[j] · x^j`.
pub fn evaluate_polynomial(coefficients: &[f64], x: f64) -> f64 {
    coefficients
        .iter()
        .enumerate()
        .map(|(j, c)| c * x.powi(j as i32))
        .sum()
}

/// First derivative of the polynomial at `x`: `Σ_{j≥1} j · coefficients[j] · x^(j-1)`.
pub fn polynomial_slope(coefficients: &[f64], x: f64) -> f64 {
    coefficients
        .iter()
        .enumerate()
        .skip(1)
        .map(|(j, c)| j as f64 * c * x.powi(j as i32 - 1))
        .sum()
}

/// Build the n×(degree+1) Vandermonde design matrix: row i = [1, xᵢ, xᵢ², …, xᵢ^degree].
pub fn design_matrix(x: &[f64], degree: usize) -> Matrix {
    x.iter()
        .map(|&xi| (0..=degree).map(|j| xi.powi(j as i32)).collect())
        .collect()
}

/// Simple linear regression `y = b0 + b1·x`.
///
/// # Errors
/// * `ShapeMismatch` if `x` and `y` differ in length
/// * `InsufficientData` for fewer than 2 points
/// * `InvalidInput` for non-finite values
/// * `DegenerateInput` if every x is identical
///
/// # Example
/// ```
/// use fuelcast_core::linear_regression;
/// let fit = linear_regression(&[0.0, 1.0, 2.0, 3.0], &[1.0, 3.0, 5.0, 7.0]).unwrap();
/// assert!((fit.coefficients[0] - 1.0).abs() < 1e-9);
/// assert!((fit.coefficients[1] - 2.0).abs() < 1e-9);
/// assert_eq!(fit.r_squared, 1.0);
/// ```
pub fn linear_regression(x: &[f64], y: &[f64]) -> Result<RegressionResult> {
    validate_xy(x, y, 2)?;

    let n = x.len() as f64;
    let sum_x: f64 = x.iter().sum();
    let sum_y: f64 = y.iter().sum();
    let sum_xy: f64 = x.iter().zip(y).map(|(xi, yi)| xi * yi).sum();
    let sum_x2: f64 = x.iter().map(|xi| xi * xi).sum();

    let denominator = n * sum_x2 - sum_x * sum_x;
    if denominator.abs() <= f64::EPSILON * n * sum_x2 {
        return Err(ForecastError::DegenerateInput(
            "all x values are identical; slope is undefined".to_string(),
        ));
    }

    let b1 = (n * sum_xy - sum_x * sum_y) / denominator;
    let b0 = sum_y / n - b1 * (sum_x / n);
    debug!("linear fit over {} points: b0={b0}, b1={b1}", x.len());

    let predictions = x.iter().map(|xi| b0 + b1 * xi).collect();
    RegressionResult::from_fit(vec![b0, b1], y, predictions)
}

/// Polynomial regression of the given degree through the normal equations.
///
/// # Errors
/// * `InvalidParameter` if `degree == 0`
/// * `ShapeMismatch` if `x` and `y` differ in length
/// * `InsufficientData` unless `degree < n`
/// * `DegenerateInput` with fewer than `degree + 1` distinct x values
/// * `SingularMatrix` if the normal equations are numerically rank deficient
pub fn polynomial_regression(x: &[f64], y: &[f64], degree: usize) -> Result<RegressionResult> {
    if degree == 0 {
        return Err(ForecastError::invalid_parameter(
            "degree",
            degree,
            "must be at least 1",
        ));
    }
    validate_xy(x, y, degree + 1)?;

    let distinct = count_distinct(x);
    if distinct < degree + 1 {
        return Err(ForecastError::DegenerateInput(format!(
            "degree {degree} needs at least {} distinct x values, got {distinct}",
            degree + 1
        )));
    }

    let design = design_matrix(x, degree);
    let design_t = transpose(&design)?;
    let gram = mat_mul(&design_t, &design)?;
    let moment = mat_vec_mul(&design_t, y)?;
    let coefficients = solve_linear_system(&gram, &moment)?;
    debug!(
        "polynomial fit over {} points, degree {degree}: {:?}",
        x.len(),
        coefficients
    );

    let predictions = x
        .iter()
        .map(|&xi| evaluate_polynomial(&coefficients, xi))
        .collect();
    RegressionResult::from_fit(coefficients, y, predictions)
}

/// Fit with the chosen method.
pub fn fit(x: &[f64], y: &[f64], method: RegressionMethod) -> Result<RegressionResult> {
    match method {
        RegressionMethod::Linear => linear_regression(x, y),
        RegressionMethod::Polynomial(degree) => polynomial_regression(x, y, degree),
    }
}

/// Fit a series against its positions 0..n-1.
pub fn fit_series(values: &[f64], method: RegressionMethod) -> Result<RegressionResult> {
    fit(&positions(values.len()), values, method)
}

/// Positional x values 0, 1, …, n-1.
pub fn positions(n: usize) -> Vec<f64> {
    (0..n).map(|i| i as f64).collect()
}

fn validate_xy(x: &[f64], y: &[f64], needed: usize) -> Result<()> {
    if x.len() != y.len() {
        return Err(ForecastError::ShapeMismatch {
            what: "x and y",
            expected: x.len(),
            got: y.len(),
        });
    }
    if x.len() < needed {
        return Err(ForecastError::InsufficientData {
            needed,
            got: x.len(),
        });
    }
    if let Some(i) = x.iter().chain(y).position(|v| !v.is_finite()) {
        let (name, idx) = if i < x.len() {
            ("x", i)
        } else {
            ("y", i - x.len())
        };
        return Err(ForecastError::InvalidInput(format!(
            "{name}[{idx}] is not finite"
        )));
    }
    Ok(())
}

fn count_distinct(x: &[f64]) -> usize {
    let mut sorted = x.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted.dedup();
    sorted.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linear_regression_exact_line() {
        let fit = linear_regression(&[0.0, 1.0, 2.0, 3.0], &[1.0, 3.0, 5.0, 7.0]).unwrap();
        assert_relative_eq!(fit.coefficients[0], 1.0, epsilon = 1e-10);
        assert_relative_eq!(fit.coefficients[1], 2.0, epsilon = 1e-10);
        assert_eq!(fit.r_squared, 1.0);
        assert_eq!(fit.rmse, 0.0);
        assert_eq!(fit.degree(), 1);
    }

    #[test]
    fn test_linear_regression_residuals_sum_to_zero() {
        let x = positions(12);
        let y = vec![
            68.2, 71.5, 69.9, 74.1, 73.0, 77.8, 76.4, 75.1, 79.9, 78.3, 81.0, 80.2,
        ];
        let fit = linear_regression(&x, &y).unwrap();
        let sum: f64 = fit.residuals.iter().sum();
        assert_relative_eq!(sum, 0.0, epsilon = 1e-9);
        assert_eq!(fit.predictions.len(), y.len());
        assert_eq!(fit.residuals.len(), y.len());
    }

    #[test]
    fn test_r_squared_independent_of_units() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [1.0, 2.0, 3.0, 4.5];
        let unscaled = linear_regression(&x, &y).unwrap();
        assert_eq!(unscaled.r_squared, 0.9888);

        for scale in [1e-9, 1e9] {
            let scaled: Vec<f64> = y.iter().map(|v| v * scale).collect();
            let fit = linear_regression(&x, &scaled).unwrap();
            assert_eq!(fit.r_squared, unscaled.r_squared, "scale {scale}");
        }
    }

    #[test]
    fn test_linear_regression_constant_x() {
        let result = linear_regression(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0]);
        assert!(matches!(result, Err(ForecastError::DegenerateInput(_))));
    }

    #[test]
    fn test_linear_regression_single_point() {
        let result = linear_regression(&[0.0], &[1.0]);
        assert!(matches!(
            result,
            Err(ForecastError::InsufficientData { needed: 2, got: 1 })
        ));
    }

    #[test]
    fn test_linear_regression_length_mismatch() {
        let result = linear_regression(&[0.0, 1.0, 2.0], &[1.0, 2.0]);
        assert!(matches!(result, Err(ForecastError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_linear_regression_rejects_nan() {
        let result = linear_regression(&[0.0, 1.0, 2.0], &[1.0, f64::NAN, 2.0]);
        match result {
            Err(ForecastError::InvalidInput(msg)) => assert_eq!(msg, "y[1] is not finite"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_polynomial_regression_parabola_through_three_points() {
        let fit = polynomial_regression(&[0.0, 1.0, 2.0], &[1.0, 2.0, 5.0], 2).unwrap();
        // y = 1 + 0x + 1x²
        assert_relative_eq!(fit.coefficients[0], 1.0, epsilon = 1e-9);
        assert_relative_eq!(fit.coefficients[1], 0.0, epsilon = 1e-9);
        assert_relative_eq!(fit.coefficients[2], 1.0, epsilon = 1e-9);
        assert_eq!(fit.r_squared, 1.0);
        for r in &fit.residuals {
            assert_relative_eq!(*r, 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_polynomial_degree_one_matches_linear() {
        let x = positions(10);
        let y: Vec<f64> = x
            .iter()
            .map(|xi| 3.0 + 0.7 * xi + if (*xi as usize) % 2 == 0 { 0.4 } else { -0.3 })
            .collect();
        let lin = linear_regression(&x, &y).unwrap();
        let poly = polynomial_regression(&x, &y, 1).unwrap();
        assert_relative_eq!(lin.coefficients[0], poly.coefficients[0], epsilon = 1e-9);
        assert_relative_eq!(lin.coefficients[1], poly.coefficients[1], epsilon = 1e-9);
        assert_eq!(lin.r_squared, poly.r_squared);
    }

    #[test]
    fn test_polynomial_regression_cubic_long_series() {
        let x = positions(146);
        let y: Vec<f64> = x
            .iter()
            .map(|t| 60.0 + 0.5 * t - 0.01 * t * t + 0.00005 * t * t * t)
            .collect();
        let fit = polynomial_regression(&x, &y, 3).unwrap();
        assert_relative_eq!(fit.coefficients[0], 60.0, epsilon = 1e-5);
        assert_relative_eq!(fit.coefficients[1], 0.5, epsilon = 1e-6);
        assert_relative_eq!(fit.coefficients[2], -0.01, epsilon = 1e-8);
        assert_relative_eq!(fit.coefficients[3], 0.00005, epsilon = 1e-10);
        assert_eq!(fit.r_squared, 1.0);
    }

    #[test]
    fn test_polynomial_regression_degree_validation() {
        let x = [0.0, 1.0, 2.0];
        let y = [1.0, 2.0, 3.0];
        assert!(matches!(
            polynomial_regression(&x, &y, 0),
            Err(ForecastError::InvalidParameter { .. })
        ));
        assert!(matches!(
            polynomial_regression(&x, &y, 3),
            Err(ForecastError::InsufficientData { needed: 4, got: 3 })
        ));
    }

    #[test]
    fn test_polynomial_regression_repeated_x() {
        let x = [1.0, 1.0, 2.0, 2.0, 2.0];
        let y = [1.0, 1.5, 2.0, 2.5, 3.0];
        assert!(matches!(
            polynomial_regression(&x, &y, 2),
            Err(ForecastError::DegenerateInput(_))
        ));
    }

    #[test]
    fn test_evaluate_and_slope() {
        let coeffs = [1.0, 2.0, 3.0]; // 1 + 2x + 3x²
        assert_eq!(evaluate_polynomial(&coeffs, 2.0), 17.0);
        assert_eq!(polynomial_slope(&coeffs, 2.0), 14.0);
        assert_eq!(polynomial_slope(&[5.0], 10.0), 0.0);
    }

    #[test]
    fn test_design_matrix() {
        let dm = design_matrix(&[2.0, 3.0], 2);
        assert_eq!(dm, vec![vec![1.0, 2.0, 4.0], vec![1.0, 3.0, 9.0]]);
    }

    #[test]
    fn test_method_from_str() {
        assert_eq!(
            "linear".parse::<RegressionMethod>().unwrap(),
            RegressionMethod::Linear
        );
        assert_eq!(
            "Polynomial".parse::<RegressionMethod>().unwrap(),
            RegressionMethod::Polynomial(3)
        );
        assert_eq!(
            "quadratic".parse::<RegressionMethod>().unwrap(),
            RegressionMethod::Polynomial(2)
        );
        assert_eq!(
            "poly_4".parse::<RegressionMethod>().unwrap(),
            RegressionMethod::Polynomial(4)
        );
        assert!("poly0".parse::<RegressionMethod>().is_err());
        assert!("spline".parse::<RegressionMethod>().is_err());
        assert_eq!(RegressionMethod::Polynomial(2).to_string(), "poly2");
    }

    #[test]
    fn test_fit_series_dispatch() {
        let values = [10.0, 12.0, 14.0, 16.0];
        let fit = fit_series(&values, RegressionMethod::Linear).unwrap();
        assert_relative_eq!(fit.coefficients[1], 2.0, epsilon = 1e-10);

        let fit = fit_series(&values, RegressionMethod::Polynomial(2)).unwrap();
        assert_eq!(fit.coefficients.len(), 3);
        assert_relative_eq!(fit.coefficients[2], 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_idempotent() {
        let x = positions(20);
        let y: Vec<f64> = x.iter().map(|t| (t * 0.3).sin() * 5.0 + 70.0).collect();
        let a = polynomial_regression(&x, &y, 3).unwrap();
        let b = polynomial_regression(&x, &y, 3).unwrap();
        assert_eq!(a, b);
    }
}
