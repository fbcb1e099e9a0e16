//! Mock right-hand sides for testing
//!
//! These systems have known analytical solutions, making them
//! ideal for validating step control end to end.

use adaptive_ode::solver::{RightHandSide, SolverResult, TupleRightHandSide};
use adaptive_ode::state::StateData;
use nalgebra::DVector;

// =================================================================================================
// Exponential Decay: dy/dt = -k*y
// =================================================================================================

/// Exponential decay: dy/dt = -k*y
///
/// Analytical solution: y(t) = y(t0) * exp(-k*(t - t0))
pub struct ExponentialDecay {
    pub decay_rate: f64,
}

impl ExponentialDecay {
    pub fn new(decay_rate: f64) -> Self {
        Self { decay_rate }
    }

    /// Compute analytical solution at time t, starting from y0 at t0
    pub fn analytical_solution(&self, t: f64, t0: f64, y0: f64) -> f64 {
        y0 * (-self.decay_rate * (t - t0)).exp()
    }
}

impl RightHandSide for ExponentialDecay {
    fn evaluate(&self, _t: f64, y: &DVector<f64>) -> SolverResult<DVector<f64>> {
        Ok(y * -self.decay_rate)
    }

    fn name(&self) -> &str {
        "Exponential Decay"
    }
}

// =================================================================================================
// Constant Growth: dy/dt = c
// =================================================================================================

/// Constant growth: dy/dt = c
///
/// Analytical solution: y(t) = y(t0) + c*(t - t0)
///
/// Second derivative is zero, useful for initial-step edge cases.
pub struct ConstantGrowth {
    pub rate: f64,
}

impl ConstantGrowth {
    pub fn new(rate: f64) -> Self {
        Self { rate }
    }

    pub fn analytical_solution(&self, t: f64, t0: f64, y0: f64) -> f64 {
        y0 + self.rate * (t - t0)
    }
}

impl RightHandSide for ConstantGrowth {
    fn evaluate(&self, _t: f64, y: &DVector<f64>) -> SolverResult<DVector<f64>> {
        Ok(DVector::from_element(y.len(), self.rate))
    }

    fn name(&self) -> &str {
        "Constant Growth"
    }
}

// =================================================================================================
// Harmonic Oscillator: x'' = -w^2 x as a (position, velocity) tuple
// =================================================================================================

/// Uncoupled harmonic oscillators with a tuple state `(x, v)`
///
/// ```text
/// dx/dt = v
/// dv/dt = -w^2 x
/// ```
///
/// Analytical solution: x(t) = x0 cos(w t) + v0/w sin(w t)
pub struct HarmonicOscillator {
    pub omega: f64,
}

impl HarmonicOscillator {
    pub fn new(omega: f64) -> Self {
        Self { omega }
    }

    /// Position and velocity at time t, starting from (x0, v0) at t = 0
    pub fn analytical_solution(&self, t: f64, x0: f64, v0: f64) -> (f64, f64) {
        let (s, c) = (self.omega * t).sin_cos();
        (
            x0 * c + v0 / self.omega * s,
            -x0 * self.omega * s + v0 * c,
        )
    }
}

impl TupleRightHandSide for HarmonicOscillator {
    fn evaluate(&self, _t: f64, y: &[StateData]) -> SolverResult<Vec<StateData>> {
        let position = y[0].clone();
        let velocity = y[1].clone();
        Ok(vec![velocity, position * -(self.omega * self.omega)])
    }

    fn name(&self) -> &str {
        "Harmonic Oscillator"
    }
}
