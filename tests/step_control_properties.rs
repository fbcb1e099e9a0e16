//! Property tests for the step-size controller
//!
//! These tests check the controller's contracts over ranges of inputs
//! rather than single hand-computed values.

use adaptive_ode::numeric::{TolerancePair, error_tolerance};
use adaptive_ode::solver::{
    SolverError,
    StepSizeFactors,
    compute_error_ratio,
    optimal_step_size,
    select_initial_step,
};
use adaptive_ode::state::{ShapeDescriptor, StateData, flatten_to_vector};
use approx::assert_relative_eq;
use nalgebra::DVector;

mod common;
use common::{ConstantGrowth, ExponentialDecay};

fn ratios() -> Vec<f64> {
    (1..200).map(|i| i as f64 * 0.005).collect()
}

#[test]
fn test_accepted_steps_never_shrink() {
    let factors = StepSizeFactors::default();

    for order in [1.0, 2.0, 4.0, 5.0] {
        for r in ratios() {
            let next = optimal_step_size(0.1, &[r], &factors, order);
            assert!(next >= 0.1, "ratio {} order {} shrank the step to {}", r, order, next);
            assert!(next <= 0.1 * factors.ifactor);
        }
    }
}

#[test]
fn test_rejected_steps_bounded_by_dfactor() {
    let factors = StepSizeFactors::default();

    for r in (1..200).map(|i| 1.0 + i as f64 * 0.5) {
        let next = optimal_step_size(1.0, &[r], &factors, 5.0);
        assert!(next >= factors.dfactor - 1e-15);
        assert!(next <= factors.safety);
    }

    // Huge error: clamped at exactly dfactor
    assert_relative_eq!(optimal_step_size(1.0, &[1e30], &factors, 5.0), factors.dfactor);
}

#[test]
fn test_next_step_is_monotone_in_error() {
    let factors = StepSizeFactors::new(0.9, 10.0, 0.2);
    let mut previous = f64::INFINITY;

    for r in (1..400).map(|i| i as f64 * 0.01) {
        let next = optimal_step_size(1.0, &[r], &factors, 3.0);
        assert!(next <= previous + 1e-12, "non-monotone at ratio {}", r);
        previous = next;
    }
}

#[test]
fn test_worst_component_governs() {
    let factors = StepSizeFactors::default();
    let alone = optimal_step_size(0.5, &[2.5], &factors, 4.0);
    let mixed = optimal_step_size(0.5, &[0.01, 2.5, 0.3], &factors, 4.0);
    assert_eq!(alone, mixed);
}

#[test]
fn test_zero_error_grows_by_ifactor() {
    let factors = StepSizeFactors::new(0.8, 4.0, 0.5);
    assert_eq!(optimal_step_size(0.25, &[0.0, 0.0], &factors, 5.0), 1.0);
}

#[test]
fn test_error_ratio_over_tuple_components() {
    let components = vec![
        StateData::from_vec(vec![1.0, 1.0]),
        StateData::Scalar(1.0),
        StateData::uniform_matrix(2, 2, 1.0),
    ];
    let (_, shapes) = flatten_to_vector(&components);

    let error = DVector::from_vec(vec![1.0, 3.0, 2.0, 1.0, 1.0, 1.0, 1.0]);
    let tol = DVector::from_element(7, 1.0);

    let ratios = compute_error_ratio(&error, &tol, &shapes).unwrap();
    assert_eq!(ratios.len(), 3);
    assert_relative_eq!(ratios[0], 5.0);
    assert_relative_eq!(ratios[1], 4.0);
    assert_relative_eq!(ratios[2], 1.0);
}

#[test]
fn test_error_ratio_from_error_tolerance() {
    let tolerance = TolerancePair::new(1e-3, 1e-6);
    let y0 = DVector::from_vec(vec![2.0, -1.0]);
    let y1 = DVector::from_vec(vec![1.0, -3.0]);

    let tol = error_tolerance(&tolerance.rtol, &tolerance.atol, &y0, &y1).unwrap();
    // error exactly equal to the tolerance: ratio one, on the acceptance edge
    let ratios = compute_error_ratio(&tol, &tol, &ShapeDescriptor::single()).unwrap();

    assert_eq!(ratios.len(), 1);
    assert_relative_eq!(ratios[0], 1.0);
    // accepted, but without margin: the safety factor shrinks the next step
    let next = optimal_step_size(0.1, &ratios, &StepSizeFactors::default(), 2.0);
    assert_relative_eq!(next, 0.1 * 0.9);
}

#[test]
fn test_initial_step_tighter_tolerance_smaller_step() {
    let decay = ExponentialDecay::new(1.5);
    let y0 = DVector::from_vec(vec![1.0, 0.5, 2.0]);
    let shapes = ShapeDescriptor::single();

    let mut previous = f64::INFINITY;
    for exponent in 2..10 {
        let tol = 10f64.powi(-exponent);
        let tolerance = TolerancePair::new(tol, tol * 1e-3);
        let h = select_initial_step(&decay, 0.0, &y0, 4.0, &tolerance, None, &shapes).unwrap();

        assert!(h.is_finite() && h > 0.0);
        assert!(h <= previous * (1.0 + 1e-12), "tolerance {} gave a larger step {}", tol, h);
        previous = h;
    }
}

#[test]
fn test_initial_step_with_supplied_derivative() {
    let decay = ExponentialDecay::new(0.7);
    let y0 = DVector::from_vec(vec![3.0, -1.0]);
    let tolerance = TolerancePair::default();
    let shapes = ShapeDescriptor::single();

    let f0 = DVector::from_vec(vec![-2.1, 0.7]);
    let computed = select_initial_step(&decay, 0.0, &y0, 3.0, &tolerance, None, &shapes).unwrap();
    let supplied = select_initial_step(&decay, 0.0, &y0, 3.0, &tolerance, Some(&f0), &shapes).unwrap();

    assert_relative_eq!(computed, supplied, max_relative = 1e-12);
}

#[test]
fn test_initial_step_vanishing_problem() {
    // y0 = 0 and f = 0: every estimate falls back to 1e-6
    let growth = ConstantGrowth::new(0.0);
    let y0 = DVector::zeros(4);

    let h = select_initial_step(&growth, 0.0, &y0, 4.0, &TolerancePair::default(), None, &ShapeDescriptor::single())
        .unwrap();
    assert_relative_eq!(h, 1e-6);
}

#[test]
fn test_initial_step_constant_growth_from_zero() {
    // d0 = 0 gives h0 = 1e-6; d2 = 0, so h1 = (0.01 / d1)^(1/2) with d1 = 1 / atol
    let growth = ConstantGrowth::new(1.0);
    let y0 = DVector::zeros(2);
    let tolerance = TolerancePair::new(1e-6, 1e-9);

    let h = select_initial_step(&growth, 0.0, &y0, 1.0, &tolerance, None, &ShapeDescriptor::single()).unwrap();
    assert_relative_eq!(h, (1e-11f64).sqrt(), max_relative = 1e-9);
}

#[test]
fn test_initial_step_positive_for_resting_tuple_components() {
    // First component sits at zero but moves; second is nonzero but frozen:
    // dy/dt = (second, 0)
    for len in [1, 2, 3] {
        for magnitude in [1e-3, 1.0, 1e4] {
            let tuple = vec![StateData::uniform_vector(len, 0.0), StateData::uniform_vector(len, magnitude)];
            let (y0, shapes) = flatten_to_vector(&tuple);
            let shift = move |_t: f64, y: &DVector<f64>| {
                DVector::from_fn(2 * len, |i, _| if i < len { y[i + len] } else { 0.0 })
            };

            for order in [1.0, 2.0, 4.0, 5.0] {
                for tolerance in [TolerancePair::new(1e-3, 1e-6), TolerancePair::new(1e-8, 1e-12)] {
                    let h = select_initial_step(&shift, 0.0, &y0, order, &tolerance, None, &shapes).unwrap();
                    assert!(
                        h > 0.0 && h.is_finite(),
                        "len {} magnitude {} order {}: h = {}", len, magnitude, order, h
                    );
                }
            }
        }
    }
}

#[test]
fn test_initial_step_positive_with_zero_and_frozen_scalars() {
    // (zero state, zero derivative), (zero state, moving), (frozen, nonzero)
    let tuple = vec![StateData::Scalar(0.0), StateData::Scalar(0.0), StateData::Scalar(2.0)];
    let (y0, shapes) = flatten_to_vector(&tuple);
    let f = |_t: f64, y: &DVector<f64>| DVector::from_vec(vec![0.0, y[2], 0.0]);

    for order in [1.0, 3.0, 5.0] {
        let h = select_initial_step(&f, 0.0, &y0, order, &TolerancePair::default(), None, &shapes).unwrap();
        assert!(h > 0.0 && h.is_finite(), "order {}: h = {}", order, h);
    }
}

#[test]
fn test_initial_step_rejects_bad_inputs() {
    let decay = ExponentialDecay::new(1.0);
    let y0 = DVector::from_vec(vec![1.0, 2.0]);
    let shapes = ShapeDescriptor::single();

    let err = select_initial_step(&decay, 0.0, &y0, 0.0, &TolerancePair::default(), None, &shapes).unwrap_err();
    assert!(matches!(err, SolverError::InvalidParameter { .. }));

    let per_element = TolerancePair::new(1e-6, vec![1e-9, 1e-9, 1e-9]);
    let err = select_initial_step(&decay, 0.0, &y0, 2.0, &per_element, None, &shapes).unwrap_err();
    assert_eq!(err, SolverError::ShapeMismatch { expected: 2, found: 3 });

    let wrong_f0 = DVector::zeros(5);
    assert!(select_initial_step(&decay, 0.0, &y0, 2.0, &TolerancePair::default(), Some(&wrong_f0), &shapes).is_err());
}
