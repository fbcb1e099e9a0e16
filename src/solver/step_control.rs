//! Step-size control for adaptive explicit methods
//!
//! # Overview
//!
//! Three pure functions, called by the stepping loop:
//!
//! 1. [`select_initial_step`]: once, before the first step
//! 2. [`compute_error_ratio`]: after every attempted step, from the local
//!    error estimate and the error tolerance
//! 3. [`optimal_step_size`]: after every attempted step, from the error
//!    ratios; the step is accepted when the worst ratio is at most 1
//!
//! None of them keeps state between calls. The only quantity carried from
//! one step to the next is the step size itself, owned by the driver.
//!
//! # Components
//!
//! Norms are taken per state component, as described by a
//! [`ShapeDescriptor`]. For a single-array state the whole vector is one
//! component; for a tuple state every tuple entry is one, and the worst
//! component governs the step.
//!
//! # Example
//!
//! ```rust
//! use adaptive_ode::numeric::{error_tolerance, TolerancePair};
//! use adaptive_ode::solver::{
//!     compute_error_ratio, optimal_step_size, select_initial_step, StepSizeFactors,
//! };
//! use adaptive_ode::state::ShapeDescriptor;
//! use nalgebra::DVector;
//!
//! let decay = |_t: f64, y: &DVector<f64>| -y;
//! let y0 = DVector::from_vec(vec![1.0, 2.0]);
//! let tolerance = TolerancePair::new(1e-6, 1e-9);
//! let shapes = ShapeDescriptor::single();
//!
//! let h = select_initial_step(&decay, 0.0, &y0, 5.0, &tolerance, None, &shapes).unwrap();
//! assert!(h > 0.0);
//!
//! // ... the stepping formula produces y1 and an error estimate ...
//! let y1 = &y0 * (-h).exp();
//! let error = DVector::from_vec(vec![1e-10, 2e-10]);
//!
//! let tol = error_tolerance(&tolerance.rtol, &tolerance.atol, &y0, &y1).unwrap();
//! let ratios = compute_error_ratio(&error, &tol, &shapes).unwrap();
//! let next = optimal_step_size(h, &ratios, &StepSizeFactors::default(), 5.0);
//! assert!(next > 0.0);
//! ```

use log::{debug, trace};
use nalgebra::DVector;
use std::ops::Range;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::numeric::{TolerancePair, parallel_threshold, rms_norm};
use crate::solver::{RightHandSide, SolverError, SolverResult, StepSizeFactors};
use crate::state::ShapeDescriptor;

/// Below this scaled magnitude, `y0` or `f0` is treated as vanishing
const NEGLIGIBLE_SCALE: f64 = 1e-5;

/// At or below this, first and second derivative estimates are negligible
const NEGLIGIBLE_DERIVATIVE: f64 = 1e-15;

/// Trial step used when the scaled state or derivative vanishes
const FALLBACK_STEP: f64 = 1e-6;

// =================================================================================================
// Initial step
// =================================================================================================

/// Estimate a good first step size
///
/// Hairer, Nørsett & Wanner, *Solving Ordinary Differential Equations I*,
/// Sec. II.4. With `sc = atol + |y0| * rtol` per element and RMS norms taken
/// per component:
///
/// ```text
/// d0 = ‖y0 / sc‖        d1 = ‖f0 / sc‖
/// h0 = 0.01 * max(d0 / d1)              (1e-6 if d0 or d1 < 1e-5)
/// y1 = y0 + h0 * f0
/// d2 = ‖(f(t0 + h0, y1) - f0) / sc‖ / h0
/// h1 = (0.01 / max(d1, d2))^(1 / (order + 1))
///                                       (max(1e-6, h0 * 1e-3) if d1, d2 <= 1e-15)
/// h  = min(100 * h0, h1)
/// ```
///
/// Components whose derivative norm `d1` is exactly zero place no bound on
/// `h0`; when no component bounds it away from zero, `h0` falls back to 1e-6.
/// Empty components have zero norms. The estimate costs one
/// right-hand-side evaluation, two when `f0` is not supplied, and always
/// returns a strictly positive step for finite inputs.
///
/// # Errors
///
/// - [`SolverError::InvalidParameter`] for a non-positive `order`
/// - [`SolverError::ShapeMismatch`] when `f0`, a per-element tolerance, the
///   shape descriptor or a derivative returned by `rhs` disagree with `y0`
/// - any error returned by `rhs`
pub fn select_initial_step<F>(
    rhs: &F,
    t0: f64,
    y0: &DVector<f64>,
    order: f64,
    tolerance: &TolerancePair,
    f0: Option<&DVector<f64>>,
    shapes: &ShapeDescriptor,
) -> SolverResult<f64>
where
    F: RightHandSide + ?Sized,
{
    if !(order > 0.0) {
        return Err(SolverError::invalid_parameter(
            "order",
            format!("method order must be positive, got {}", order),
        ));
    }

    let n = y0.len();
    tolerance.check_len(n)?;
    let ranges = shapes.component_ranges(n)?;

    let f0 = match f0 {
        Some(f0) => f0.clone(),
        None => rhs.evaluate(t0, y0)?,
    };
    check_derivative_len(n, &f0)?;

    // sc = atol + |y0| * rtol
    let scale = DVector::from_fn(n, |i, _| {
        tolerance.atol.at(i) + y0[i].abs() * tolerance.rtol.at(i)
    });

    let d0 = component_norms(&y0.component_div(&scale), &ranges);
    let d1 = component_norms(&f0.component_div(&scale), &ranges);

    let h0 = if worst(&d0) < NEGLIGIBLE_SCALE || worst(&d1) < NEGLIGIBLE_SCALE {
        FALLBACK_STEP
    } else {
        let ratio = d0
            .iter()
            .zip(&d1)
            .filter(|&(_, &d1)| d1 > 0.0)
            .map(|(d0, d1)| d0 / d1)
            .fold(0.0, f64::max);
        // Every moving component may sit at zero, e.g. an oscillator at rest position
        if ratio > 0.0 && ratio.is_finite() { 0.01 * ratio } else { FALLBACK_STEP }
    };

    // Explicit Euler trial step
    let y1 = y0 + &f0 * h0;
    let f1 = rhs.evaluate(t0 + h0, &y1)?;
    check_derivative_len(n, &f1)?;

    let d2: Vec<f64> = component_norms(&(&f1 - &f0).component_div(&scale), &ranges)
        .into_iter()
        .map(|d| d / h0)
        .collect();

    let derivative_bound = worst(&d1).max(worst(&d2));
    let h1 = if worst(&d1) <= NEGLIGIBLE_DERIVATIVE && worst(&d2) <= NEGLIGIBLE_DERIVATIVE {
        FALLBACK_STEP.max(h0 * 1e-3)
    } else {
        (0.01 / derivative_bound).powf(1.0 / (order + 1.0))
    };

    let step = (100.0 * h0).min(h1);
    debug!(
        "initial step for '{}' at t = {}: h0 = {:.3e}, h1 = {:.3e}, selected {:.3e}",
        rhs.name(), t0, h0, h1, step
    );
    Ok(step)
}

// =================================================================================================
// Error ratio
// =================================================================================================

/// Mean squared error ratio of every state component
///
/// For each component, `mean((error_estimate / error_tol)^2)`. The values
/// are not reduced across components; [`optimal_step_size`] takes the worst.
/// An empty component carries no error and reports 0.
///
/// # Errors
///
/// [`SolverError::ShapeMismatch`] when the estimate, the tolerance and the
/// shape descriptor disagree in length.
pub fn compute_error_ratio(
    error_estimate: &DVector<f64>,
    error_tol: &DVector<f64>,
    shapes: &ShapeDescriptor,
) -> SolverResult<Vec<f64>> {
    let n = error_estimate.len();
    if error_tol.len() != n {
        return Err(SolverError::ShapeMismatch { expected: n, found: error_tol.len() });
    }
    let ranges = shapes.component_ranges(n)?;

    let mean_squared = |range: &Range<usize>| {
        if range.is_empty() {
            return 0.0;
        }
        let sum_sq: f64 = range
            .clone()
            .map(|i| {
                let ratio = error_estimate[i] / error_tol[i];
                ratio * ratio
            })
            .sum();
        sum_sq / range.len() as f64
    };

    if n > parallel_threshold() {
        #[cfg(feature = "parallel")]
        return Ok(ranges.par_iter().map(mean_squared).collect());
    }
    Ok(ranges.iter().map(mean_squared).collect())
}

// =================================================================================================
// Next step size
// =================================================================================================

/// Next step size from the current one and the per-component error ratios
///
/// Elementary controller:
///
/// ```text
/// r      = max(mean_error_ratios)          worst component
/// factor = min(ifactor, max(safety / sqrt(r)^(1/order), dfactor))
/// h_new  = h * factor
/// ```
///
/// - `r == 0` (exactly): no error detected, grow by `ifactor`
/// - `r < 1`: the step was accepted with margin, so `dfactor` is replaced
///   by 1 and the step never shrinks
/// - a NaN ratio leaves the nominal factor undefined, and the step shrinks
///   by `dfactor`
///
/// An empty ratio list behaves like a zero error.
pub fn optimal_step_size(
    last_step: f64,
    mean_error_ratios: &[f64],
    factors: &StepSizeFactors,
    order: f64,
) -> f64 {
    let worst_ratio = mean_error_ratios
        .iter()
        .copied()
        .fold(0.0, |acc: f64, r| if r.is_nan() || r > acc { r } else { acc });

    if worst_ratio == 0.0 {
        trace!("zero error ratio, growing step by {}", factors.ifactor);
        return last_step * factors.ifactor;
    }

    let dfactor = if worst_ratio < 1.0 { 1.0 } else { factors.dfactor };

    let error_ratio = worst_ratio.sqrt();
    let exponent = 1.0 / order;
    let factor = factors.ifactor.min((factors.safety / error_ratio.powf(exponent)).max(dfactor));

    trace!(
        "error ratio {:.3e}: step {:.3e} -> {:.3e} (factor {:.3})",
        error_ratio, last_step, last_step * factor, factor
    );
    last_step * factor
}

// =================================================================================================
// Helpers
// =================================================================================================

fn component_norms(scaled: &DVector<f64>, ranges: &[Range<usize>]) -> Vec<f64> {
    let values = scaled.as_slice();
    ranges
        .iter()
        .map(|range| if range.is_empty() { 0.0 } else { rms_norm(&values[range.clone()]) })
        .collect()
}

fn worst(norms: &[f64]) -> f64 {
    norms.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

fn check_derivative_len(n: usize, derivative: &DVector<f64>) -> SolverResult<()> {
    if derivative.len() != n {
        return Err(SolverError::ShapeMismatch { expected: n, found: derivative.len() });
    }
    Ok(())
}

// =================================================================================================
// Tests
// =================================================================================================
