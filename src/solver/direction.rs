//! Time-direction normalization
//!
//! # Mathematical Background
//!
//! For a first-order system `dy/dt = f(t, y)` integrated backward from
//! `t_0` to `t_1 < t_0`, substituting `s = -t` gives
//!
//! ```text
//! dy/ds = -f(-s, y)        s from -t_0 up to -t_1
//! ```
//!
//! which is an ordinary forward problem. The controller therefore never sees
//! a negative step: a decreasing time grid is negated once at setup and the
//! right-hand side is wrapped in a [`ReverseFunction`]. Results belong to
//! the original times through `t_internal = -t_original`; the driver
//! integrates over the negated grid directly.

use nalgebra::DVector;

use crate::solver::{RightHandSide, SolverResult};

/// True when every consecutive pair satisfies `t[i+1] < t[i]`
///
/// Grids with fewer than two points have no direction and are reported as
/// not decreasing, so they are never reversed.
///
/// # Example
///
/// ```rust
/// use adaptive_ode::solver::is_decreasing;
///
/// assert!(is_decreasing(&[3.0, 2.0, 1.0]));
/// assert!(!is_decreasing(&[1.0, 2.0, 3.0]));
/// assert!(!is_decreasing(&[1.0, 1.0, 2.0]));
/// ```
pub fn is_decreasing(t: &[f64]) -> bool {
    t.len() >= 2 && t.windows(2).all(|pair| pair[1] < pair[0])
}

/// True when every consecutive pair satisfies `t[i+1] > t[i]`
pub fn is_increasing(t: &[f64]) -> bool {
    t.windows(2).all(|pair| pair[1] > pair[0])
}

/// Elementwise negation of a time grid
pub fn negate_grid(t: &DVector<f64>) -> DVector<f64> {
    -t
}

/// Right-hand side of the time-reversed problem: `(t, y) -> -f(-t, y)`
pub struct ReverseFunction {
    base: Box<dyn RightHandSide>,
}

impl ReverseFunction {
    /// Wrap `base`
    pub fn new(base: Box<dyn RightHandSide>) -> Self {
        Self { base }
    }
}

impl RightHandSide for ReverseFunction {
    fn evaluate(&self, t: f64, y: &DVector<f64>) -> SolverResult<DVector<f64>> {
        Ok(-self.base.evaluate(-t, y)?)
    }

    fn name(&self) -> &str {
        self.base.name()
    }
}

impl std::fmt::Debug for ReverseFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReverseFunction")
            .field("base", &self.base.name())
            .finish()
    }
}

/// Wrap a right-hand side for integration over a negated time axis
pub fn reverse_problem(base: Box<dyn RightHandSide>) -> ReverseFunction {
    ReverseFunction::new(base)
}
