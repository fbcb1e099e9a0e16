//! Inner products over sequences of state components

use crate::solver::{SolverError, SolverResult};
use crate::state::StateData;

/// False only for a scalar that is exactly zero
///
/// Arrays are always treated as possibly nonzero: deciding otherwise would
/// need a full scan, which is what the check exists to avoid.
pub fn possibly_nonzero(x: &StateData) -> bool {
    match x.try_as_scalar() {
        Some(value) => value != 0.0,
        None => true,
    }
}

/// `sum(scale * x_i * y_i)` over aligned component sequences
///
/// Pairs where both terms are zero scalars are skipped without allocating.
/// Skipping never changes the result. An empty (or fully skipped) sum is the
/// scalar zero.
///
/// # Errors
///
/// [`SolverError::ShapeMismatch`] when `xs` and `ys` differ in length, or a
/// validation error when a pair cannot be combined elementwise.
///
/// # Example
///
/// ```rust
/// use adaptive_ode::numeric::scaled_dot_product;
/// use adaptive_ode::state::StateData;
///
/// let xs = vec![StateData::Scalar(0.0), StateData::from_vec(vec![1.0, 2.0])];
/// let ys = vec![StateData::Scalar(0.0), StateData::from_vec(vec![3.0, 4.0])];
///
/// let result = scaled_dot_product(2.0, &xs, &ys).unwrap();
/// assert_eq!(result.to_flat_vec(), vec![6.0, 16.0]);
/// ```
pub fn scaled_dot_product(scale: f64, xs: &[StateData], ys: &[StateData]) -> SolverResult<StateData> {
    check_aligned(xs, ys)?;

    let mut total = StateData::Scalar(0.0);
    for (x, y) in xs.iter().zip(ys) {
        if possibly_nonzero(x) || possibly_nonzero(y) {
            let term = (x.clone() * scale).try_mul(y)?;
            total = total.try_add(&term)?;
        }
    }
    Ok(total)
}

/// `sum(x_i * y_i)` over aligned component sequences, without skipping
pub fn dot_product(xs: &[StateData], ys: &[StateData]) -> SolverResult<StateData> {
    check_aligned(xs, ys)?;

    let mut total = StateData::Scalar(0.0);
    for (x, y) in xs.iter().zip(ys) {
        total = total.try_add(&x.try_mul(y)?)?;
    }
    Ok(total)
}

fn check_aligned(xs: &[StateData], ys: &[StateData]) -> SolverResult<()> {
    if xs.len() != ys.len() {
        return Err(SolverError::ShapeMismatch { expected: xs.len(), found: ys.len() });
    }
    Ok(())
}
