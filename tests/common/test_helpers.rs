//! Helper functions for integration tests

use adaptive_ode::numeric::{TolerancePair, error_tolerance};
use adaptive_ode::solver::{
    SolverResult,
    StepSizeFactors,
    ValidatedProblem,
    compute_error_ratio,
    optimal_step_size,
    select_initial_step,
};
use nalgebra::DVector;

/// Assert that two vectors are close (within tolerance)
pub fn assert_vectors_close(
    actual: &DVector<f64>,
    expected: &DVector<f64>,
    tolerance: f64,
    message: &str,
) {
    assert_eq!(actual.len(), expected.len(), "{}: Dimension mismatch", message);

    for (i, (&a, &e)) in actual.iter().zip(expected.iter()).enumerate() {
        let diff = (a - e).abs();
        assert!(
            diff < tolerance,
            "{}: Element {} differs by {} (tolerance {})",
            message, i, diff, tolerance
        );
    }
}

/// Compute relative error: |actual - expected| / |expected|
pub fn relative_error(actual: f64, expected: f64) -> f64 {
    if expected.abs() < 1e-10 {
        (actual - expected).abs()
    } else {
        (actual - expected).abs() / expected.abs()
    }
}

// =================================================================================================
// Heun-Euler driver
// =================================================================================================

/// Output of [`heun_euler`]
#[derive(Debug)]
pub struct DriverOutput {
    /// State at every point of the canonical time grid
    pub states: Vec<DVector<f64>>,

    /// Canonical times of every accepted step end
    pub accepted_times: Vec<f64>,

    pub rejected: usize,
}

const MAX_STEPS: usize = 200_000;

/// Minimal adaptive driver over a validated problem
///
/// Heun's method (order 2) with the embedded Euler estimate:
///
/// ```text
/// k1 = f(t, y)
/// k2 = f(t + h, y + h k1)
/// y1 = y + h/2 (k1 + k2)
/// e  = h/2 (k2 - k1)
/// ```
///
/// Steps land exactly on every time-grid point and every break point.
pub fn heun_euler(
    problem: &ValidatedProblem<'_>,
    tolerance: &TolerancePair,
    factors: &StepSizeFactors,
) -> SolverResult<DriverOutput> {
    let rhs = problem.rhs.as_ref();
    let breaks = problem.options.grid_points_values().unwrap_or_default();

    let mut t = problem.t[0];
    let mut y = problem.y0.clone();
    let mut f = rhs.evaluate(t, &y)?;
    let mut h = select_initial_step(rhs, t, &y, 1.0, tolerance, Some(&f), &problem.shapes)?;

    let mut output = DriverOutput {
        states: vec![y.clone()],
        accepted_times: Vec::new(),
        rejected: 0,
    };

    for &t_target in problem.t.iter().skip(1) {
        while t < t_target {
            assert!(
                output.accepted_times.len() + output.rejected < MAX_STEPS,
                "driver exceeded {} steps",
                MAX_STEPS
            );

            let stop = breaks
                .iter()
                .copied()
                .filter(|&b| b > t && b < t_target)
                .fold(t_target, f64::min);
            let lands = h >= stop - t;
            let step = if lands { stop - t } else { h };

            let k2 = rhs.evaluate(t + step, &(&y + &f * step))?;
            let y1 = &y + (&f + &k2) * (step / 2.0);
            let error = (&k2 - &f) * (step / 2.0);

            let tol = error_tolerance(&tolerance.rtol, &tolerance.atol, &y, &y1)?;
            let ratios = compute_error_ratio(&error, &tol, &problem.shapes)?;
            let accepted = ratios.iter().all(|&r| r <= 1.0);

            h = optimal_step_size(step, &ratios, factors, 2.0);
            if accepted {
                t = if lands { stop } else { t + step };
                y = y1;
                f = rhs.evaluate(t, &y)?;
                output.accepted_times.push(t);
            } else {
                output.rejected += 1;
            }
        }
        output.states.push(y.clone());
    }
    Ok(output)
}
