//! Error types for the regression and forecasting engine.

use thiserror::Error;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Error types for regression and forecast operations.
///
/// Every variant is a caller-input validation failure. None of them is
/// retryable: the call is rejected and the caller decides what to show.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Shape mismatch in {what}: expected {expected}, got {got}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Insufficient data: need at least {needed} observations, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    #[error("Singular normal-equations matrix: no usable pivot in column {column}")]
    SingularMatrix { column: usize },

    #[error("Invalid parameter '{param}' = '{value}': {reason}")]
    InvalidParameter {
        param: String,
        value: String,
        reason: String,
    },
}

impl ForecastError {
    /// Convert to an error code for FFI.
    pub fn to_code(&self) -> i32 {
        match self {
            ForecastError::InvalidInput(_) => 2,
            ForecastError::ShapeMismatch { .. } => 3,
            ForecastError::InsufficientData { .. } => 4,
            ForecastError::DegenerateInput(_) => 5,
            ForecastError::SingularMatrix { .. } => 6,
            ForecastError::InvalidParameter { .. } => 7,
        }
    }

    /// Shorthand for [`ForecastError::InvalidParameter`].
    pub fn invalid_parameter(
        param: &str,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        ForecastError::InvalidParameter {
            param: param.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_conversion() {
        // Each error variant should map to a unique code
        assert_eq!(ForecastError::InvalidInput("test".into()).to_code(), 2);
        assert_eq!(
            ForecastError::ShapeMismatch {
                what: "x and y",
                expected: 3,
                got: 2
            }
            .to_code(),
            3
        );
        assert_eq!(
            ForecastError::InsufficientData { needed: 4, got: 3 }.to_code(),
            4
        );
        assert_eq!(ForecastError::DegenerateInput("test".into()).to_code(), 5);
        assert_eq!(ForecastError::SingularMatrix { column: 1 }.to_code(), 6);
        assert_eq!(
            ForecastError::invalid_parameter("degree", 0, "must be at least 1").to_code(),
            7
        );
    }

    #[test]
    fn test_error_display() {
        let err = ForecastError::ShapeMismatch {
            what: "seasonal factors",
            expected: 12,
            got: 4,
        };
        assert_eq!(
            format!("{}", err),
            "Shape mismatch in seasonal factors: expected 12, got 4"
        );

        let err = ForecastError::InsufficientData { needed: 4, got: 3 };
        assert_eq!(
            format!("{}", err),
            "Insufficient data: need at least 4 observations, got 3"
        );

        let err = ForecastError::SingularMatrix { column: 2 };
        assert_eq!(
            format!("{}", err),
            "Singular normal-equations matrix: no usable pivot in column 2"
        );

        let err = ForecastError::invalid_parameter("damping_rate", 1.5, "must be in (0, 1]");
        assert_eq!(
            format!("{}", err),
            "Invalid parameter 'damping_rate' = '1.5': must be in (0, 1]"
        );
    }

    #[test]
    fn test_error_construction() {
        let err = ForecastError::InsufficientData { needed: 5, got: 2 };
        if let ForecastError::InsufficientData { needed, got } = err {
            assert_eq!(needed, 5);
            assert_eq!(got, 2);
        } else {
            panic!("Expected InsufficientData variant");
        }

        let err = ForecastError::invalid_parameter("degree", 0, "must be at least 1");
        if let ForecastError::InvalidParameter {
            param,
            value,
            reason,
        } = err
        {
            assert_eq!(param, "degree");
            assert_eq!(value, "0");
            assert_eq!(reason, "must be at least 1");
        } else {
            panic!("Expected InvalidParameter variant");
        }
    }
}
