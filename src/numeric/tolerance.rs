//! Tolerances, error tolerance and the RMS norm
//!
//! # Error Tolerance
//!
//! The tolerance a step must meet is built elementwise from the state at
//! both ends of the step:
//!
//! ```text
//! tol_i = atol_i + rtol_i * max(|y0_i|, |y1_i|)
//! ```
//!
//! `rtol` and `atol` are either one scalar for the whole state or one value
//! per element.

use nalgebra::DVector;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::numeric::parallel_threshold;
use crate::solver::{SolverError, SolverResult};

// =================================================================================================
// Tolerance
// =================================================================================================

/// Relative or absolute tolerance
#[derive(Debug, Clone, PartialEq)]
pub enum Tolerance {
    /// Same value for every element
    Scalar(f64),

    /// One value per state element
    PerElement(DVector<f64>),
}

impl Tolerance {
    /// Value for element `index`
    ///
    /// Callers check the length first with [`Tolerance::check_len`].
    pub fn at(&self, index: usize) -> f64 {
        match self {
            Tolerance::Scalar(value) => *value,
            Tolerance::PerElement(values) => values[index],
        }
    }

    /// Check that the tolerance broadcasts against a state of `len` elements
    pub fn check_len(&self, len: usize) -> SolverResult<()> {
        match self {
            Tolerance::PerElement(values) if values.len() != len => {
                Err(SolverError::ShapeMismatch { expected: len, found: values.len() })
            }
            _ => Ok(()),
        }
    }

    /// One value per element, broadcasting a scalar
    pub fn expand(&self, len: usize) -> SolverResult<DVector<f64>> {
        self.check_len(len)?;
        Ok(match self {
            Tolerance::Scalar(value) => DVector::from_element(len, *value),
            Tolerance::PerElement(values) => values.clone(),
        })
    }

    fn all(&self, predicate: impl Fn(f64) -> bool) -> bool {
        match self {
            Tolerance::Scalar(value) => predicate(*value),
            Tolerance::PerElement(values) => values.iter().all(|&v| predicate(v)),
        }
    }
}

impl From<f64> for Tolerance {
    fn from(value: f64) -> Self {
        Self::Scalar(value)
    }
}

impl From<DVector<f64>> for Tolerance {
    fn from(values: DVector<f64>) -> Self {
        Self::PerElement(values)
    }
}

impl From<Vec<f64>> for Tolerance {
    fn from(values: Vec<f64>) -> Self {
        Self::PerElement(DVector::from_vec(values))
    }
}

/// Relative and absolute tolerance of one problem
///
/// # Examples
///
/// ```rust
/// use adaptive_ode::numeric::TolerancePair;
///
/// let tolerance = TolerancePair::new(1e-6, vec![1e-9, 1e-12]);
/// assert!(tolerance.validate().is_ok());
/// assert!(tolerance.check_len(2).is_ok());
/// assert!(tolerance.check_len(3).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TolerancePair {
    /// Relative tolerance
    pub rtol: Tolerance,

    /// Absolute tolerance
    pub atol: Tolerance,
}

impl TolerancePair {
    /// Create a tolerance pair
    pub fn new(rtol: impl Into<Tolerance>, atol: impl Into<Tolerance>) -> Self {
        Self {
            rtol: rtol.into(),
            atol: atol.into(),
        }
    }

    /// Reject tolerances that are not finite and strictly positive
    ///
    /// Zero tolerances make every error ratio divide by zero; the numeric
    /// routines assume this check has been done.
    pub fn validate(&self) -> SolverResult<()> {
        for (name, tolerance) in [("rtol", &self.rtol), ("atol", &self.atol)] {
            if !tolerance.all(|v| v > 0.0 && v.is_finite()) {
                return Err(SolverError::invalid_parameter(
                    name,
                    "tolerances must be finite and strictly positive",
                ));
            }
        }
        Ok(())
    }

    /// Check both tolerances broadcast against a state of `len` elements
    pub fn check_len(&self, len: usize) -> SolverResult<()> {
        self.rtol.check_len(len)?;
        self.atol.check_len(len)
    }
}

impl Default for TolerancePair {
    fn default() -> Self {
        Self::new(1e-7, 1e-9)
    }
}

// =================================================================================================
// Norms
// =================================================================================================

/// Root-mean-square magnitude `sqrt(sum(x^2) / n)`
///
/// `x` must not be empty: the element count is the divisor.
pub fn rms_norm(x: &[f64]) -> f64 {
    debug_assert!(!x.is_empty(), "rms_norm of an empty slice is undefined");
    let sum_sq: f64 = x.iter().map(|v| v * v).sum();
    (sum_sq / x.len() as f64).sqrt()
}

/// Elementwise `atol + rtol * max(|y0|, |y1|)`
///
/// Symmetric in `y0` and `y1`, and never below `atol` for non-negative
/// tolerances.
///
/// # Errors
///
/// [`SolverError::ShapeMismatch`] when `y0`, `y1` or a per-element
/// tolerance differ in length.
pub fn error_tolerance(
    rtol: &Tolerance,
    atol: &Tolerance,
    y0: &DVector<f64>,
    y1: &DVector<f64>,
) -> SolverResult<DVector<f64>> {
    let n = y0.len();
    if y1.len() != n {
        return Err(SolverError::ShapeMismatch { expected: n, found: y1.len() });
    }
    rtol.check_len(n)?;
    atol.check_len(n)?;

    let fill = |(i, out): (usize, &mut f64)| {
        *out = atol.at(i) + rtol.at(i) * y0[i].abs().max(y1[i].abs());
    };

    let mut tolerance = DVector::zeros(n);
    if n > parallel_threshold() {
        #[cfg(feature = "parallel")]
        tolerance.as_mut_slice().par_iter_mut().enumerate().for_each(fill);
        #[cfg(not(feature = "parallel"))]
        tolerance.as_mut_slice().iter_mut().enumerate().for_each(fill);
    } else {
        tolerance.as_mut_slice().iter_mut().enumerate().for_each(fill);
    }
    Ok(tolerance)
}

// =================================================================================================
// Tests
// =================================================================================================
