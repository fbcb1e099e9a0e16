//! Right-hand-side traits and controller configuration
//!
//! # Design Philosophy
//!
//! The step-size controller only ever sees a [`RightHandSide`] over a single
//! state vector. Tuple states and backward integration are handled by
//! wrappers that implement the same trait and delegate to the caller's
//! function, so neither concern leaks into the numerical code.
//!
//! Both traits are implemented for plain closures. Annotate the reference
//! parameter so the closure is inferred as higher-ranked:
//!
//! ```rust
//! use adaptive_ode::solver::RightHandSide;
//! use nalgebra::DVector;
//!
//! let decay = |_t: f64, y: &DVector<f64>| -0.5 * y;
//! let dy = decay.evaluate(0.0, &DVector::from_vec(vec![2.0])).unwrap();
//! assert_eq!(dy[0], -1.0);
//! ```

use nalgebra::DVector;

use crate::solver::{SolverError, SolverResult};
use crate::state::StateData;

// =================================================================================================
// Right-hand sides
// =================================================================================================

/// Right-hand side `f(t, y)` of `dy/dt = f(t, y)` over a state vector
///
/// Implementations must be pure: the same `(t, y)` always yields the same
/// derivative, and `y` is never modified.
pub trait RightHandSide: Send + Sync {

    /// Evaluate the derivative at `(t, y)`
    fn evaluate(&self, t: f64, y: &DVector<f64>) -> SolverResult<DVector<f64>>;

    /// Name of the function (used for logging)
    fn name(&self) -> &str {
        "anonymous"
    }
}

impl<F> RightHandSide for F
where
    F: Fn(f64, &DVector<f64>) -> DVector<f64> + Send + Sync,
{
    fn evaluate(&self, t: f64, y: &DVector<f64>) -> SolverResult<DVector<f64>> {
        Ok(self(t, y))
    }
}

/// Right-hand side over a tuple of independently shaped components
///
/// The returned tuple must have the same component shapes as `y`.
pub trait TupleRightHandSide: Send + Sync {

    /// Evaluate the derivative of every component at `(t, y)`
    fn evaluate(&self, t: f64, y: &[StateData]) -> SolverResult<Vec<StateData>>;

    /// Name of the function (used for logging)
    fn name(&self) -> &str {
        "anonymous tuple"
    }
}

impl<F> TupleRightHandSide for F
where
    F: Fn(f64, &[StateData]) -> Vec<StateData> + Send + Sync,
{
    fn evaluate(&self, t: f64, y: &[StateData]) -> SolverResult<Vec<StateData>> {
        Ok(self(t, y))
    }
}

/// Caller-supplied right-hand side, matching the form of the initial state
pub enum RightHandSideFn {
    /// Function over a single state array
    Vector(Box<dyn RightHandSide>),

    /// Function over a tuple state
    Tuple(Box<dyn TupleRightHandSide>),
}

impl RightHandSideFn {
    /// Box a single-array right-hand side
    pub fn vector<F: RightHandSide + 'static>(f: F) -> Self {
        Self::Vector(Box::new(f))
    }

    /// Box a tuple right-hand side
    pub fn tuple<F: TupleRightHandSide + 'static>(f: F) -> Self {
        Self::Tuple(Box::new(f))
    }
}

impl std::fmt::Debug for RightHandSideFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RightHandSideFn::Vector(inner) => write!(f, "Vector({})", inner.name()),
            RightHandSideFn::Tuple(inner) => write!(f, "Tuple({})", inner.name()),
        }
    }
}

// =================================================================================================
// Step size factors
// =================================================================================================

/// Tunable factors of the elementary step-size controller
///
/// - `safety`: keeps the next trial step under the rejection boundary, in (0, 1)
/// - `ifactor`: largest growth per step, > 1
/// - `dfactor`: largest shrink per step, in (0, 1)
///
/// # Examples
///
/// ```rust
/// use adaptive_ode::solver::StepSizeFactors;
///
/// let factors = StepSizeFactors::default();
/// assert_eq!(factors.safety, 0.9);
/// assert!(factors.validate().is_ok());
///
/// let aggressive = StepSizeFactors::new(0.95, 5.0, 0.1);
/// assert!(aggressive.validate().is_ok());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepSizeFactors {
    /// Safety factor applied to the nominal step
    pub safety: f64,

    /// Maximum increase factor
    pub ifactor: f64,

    /// Maximum decrease factor
    pub dfactor: f64,
}

impl StepSizeFactors {
    /// Create a new set of factors
    pub fn new(safety: f64, ifactor: f64, dfactor: f64) -> Self {
        Self { safety, ifactor, dfactor }
    }

    /// Validate that the factors describe a sane controller
    pub fn validate(&self) -> SolverResult<()> {
        if !(self.safety > 0.0 && self.safety < 1.0) {
            return Err(SolverError::invalid_parameter(
                "safety",
                format!("must lie in (0, 1), got {}", self.safety),
            ));
        }
        if !(self.ifactor > 1.0 && self.ifactor.is_finite()) {
            return Err(SolverError::invalid_parameter(
                "ifactor",
                format!("must be a finite value greater than 1, got {}", self.ifactor),
            ));
        }
        if !(self.dfactor > 0.0 && self.dfactor < 1.0) {
            return Err(SolverError::invalid_parameter(
                "dfactor",
                format!("must lie in (0, 1), got {}", self.dfactor),
            ));
        }
        Ok(())
    }
}

impl Default for StepSizeFactors {
    fn default() -> Self {
        Self::new(0.9, 10.0, 0.2)
    }
}
