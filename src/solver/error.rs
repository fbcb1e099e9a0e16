//! Error types for solver setup and step-size control
//!
//! Every fatal condition is reported synchronously, before any numerical
//! work starts, so a caller never observes a half-normalized problem.
//!
//! Degenerate numerical situations (vanishing derivatives, zero error
//! estimates) are NOT errors: the step-size controller handles them with
//! explicit fallback branches.

use thiserror::Error;

/// Result type for solver operations.
pub type SolverResult<T> = Result<T, SolverError>;

/// Errors raised by input validation, shape adaptation and evaluation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    /// An input violates a shape, dtype or ordering contract.
    ///
    /// `field` names the offending input (`t`, `y0`, `grid_points`, ...).
    #[error("invalid `{field}`: {message}")]
    Validation { field: String, message: String },

    /// A flat vector does not have the element count recorded in a
    /// shape descriptor (or two aligned sequences differ in length).
    #[error("shape mismatch: expected {expected} elements, found {found}")]
    ShapeMismatch { expected: usize, found: usize },

    /// A tunable parameter is outside its admissible range.
    #[error("invalid parameter '{parameter}': {message}")]
    InvalidParameter { parameter: String, message: String },

    /// A right-hand-side function reported a failure.
    #[error("right-hand side evaluation failed: {0}")]
    Evaluation(String),
}

impl SolverError {
    /// Shorthand for a [`SolverError::Validation`] error.
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Shorthand for a [`SolverError::InvalidParameter`] error.
    pub fn invalid_parameter(parameter: &str, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter: parameter.to_string(),
            message: message.into(),
        }
    }

    /// True for errors that come from caller input rather than evaluation.
    pub fn is_input_error(&self) -> bool {
        !matches!(self, Self::Evaluation(_))
    }
}
