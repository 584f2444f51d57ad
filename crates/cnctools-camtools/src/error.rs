//! Error types for the template generators.
//!
//! Generators validate their parameters up front and report what was wrong
//! through [`ParameterError`], wrapped in [`CamToolError`].

use thiserror::Error;

/// Errors that can occur while generating a template program.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CamToolError {
    /// A parameter validation error occurred.
    #[error("Parameter error: {0}")]
    Parameter(#[from] ParameterError),
}

/// Errors related to generator parameter validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    /// A parameter value is out of the valid range.
    #[error("Parameter '{name}' out of range: {value} (valid: {min}..{max})")]
    OutOfRange {
        name: String,
        value: f64,
        min: f64,
        max: f64,
    },

    /// A parameter value is invalid.
    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue { name: String, reason: String },

    /// Dimensions are invalid (zero or negative).
    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),
}

impl ParameterError {
    pub(crate) fn not_positive(name: &str, value: f64) -> Self {
        Self::InvalidValue {
            name: name.to_string(),
            reason: format!("must be a positive number, got {}", value),
        }
    }
}

/// Reject zero, negative and non-finite values.
pub(crate) fn require_positive(name: &str, value: f64) -> ParameterResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ParameterError::not_positive(name, value))
    }
}

/// Result type alias for generator operations.
pub type CamToolResult<T> = Result<T, CamToolError>;

/// Result type alias for parameter validation.
pub type ParameterResult<T> = Result<T, ParameterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_error_display() {
        let err = ParameterError::OutOfRange {
            name: "overlap".to_string(),
            value: 1.5,
            min: 0.0,
            max: 1.0,
        };
        assert_eq!(
            err.to_string(),
            "Parameter 'overlap' out of range: 1.5 (valid: 0..1)"
        );

        let err = ParameterError::InvalidDimensions("x_max must exceed 10".to_string());
        assert_eq!(err.to_string(), "Invalid dimensions: x_max must exceed 10");
    }

    #[test]
    fn test_require_positive() {
        assert!(require_positive("depth", 2.0).is_ok());
        assert!(require_positive("depth", 0.0).is_err());
        assert!(require_positive("depth", f64::NAN).is_err());
        assert_eq!(
            require_positive("feed_rate", -1.0).unwrap_err().to_string(),
            "Invalid value for 'feed_rate': must be a positive number, got -1"
        );
    }

    #[test]
    fn test_error_conversion() {
        let param_err = ParameterError::InvalidDimensions("empty".to_string());
        let cam_err: CamToolError = param_err.into();
        assert!(matches!(cam_err, CamToolError::Parameter(_)));
        assert_eq!(
            cam_err.to_string(),
            "Parameter error: Invalid dimensions: empty"
        );
    }
}
