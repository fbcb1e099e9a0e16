//! Input normalization and step-size control
//!
//! This module holds everything an adaptive explicit Runge-Kutta driver needs
//! around its Butcher tableau: validated inputs in canonical form, a first
//! step size, and the accept/reject bookkeeping of every later step.
//!
//! # Core Concepts
//!
//! ## The Canonical Problem
//!
//! A driver always integrates `dy/dt = f(t, y)` forward in time over a single
//! state vector. [`check_inputs`] establishes this once, up front:
//!
//! 1. **Validation**: the time grid, the break-point grid and the initial
//!    state are checked against their contracts
//! 2. **Shape adaptation**: a tuple state is flattened, and the tuple
//!    right-hand side is wrapped to work on the flat vector
//! 3. **Direction normalization**: a decreasing grid is negated, and the
//!    right-hand side is wrapped as `-f(-t, y)`
//!
//! ## Step-Size Control
//!
//! Each step is judged by its error ratio, the mean squared ratio of the
//! error estimate to the error tolerance:
//!
//! ```text
//! ratio  < 1   accept, the next step never shrinks
//! ratio == 1   accept, the safety factor shrinks the next step
//! ratio  > 1   reject, retry with a smaller step
//! ```
//!
//! # Module Organization
//!
//! - **`error`**: [`SolverError`] and the [`SolverResult`] alias
//! - **`traits`**: [`RightHandSide`], [`TupleRightHandSide`] and [`StepSizeFactors`]
//! - **`direction`**: time-direction detection and [`ReverseFunction`]
//! - **`validation`**: [`check_inputs`], [`SolverOptions`] and [`ValidatedProblem`]
//! - **`step_control`**: [`select_initial_step`], [`compute_error_ratio`] and
//!   [`optimal_step_size`]
//!
//! # Workflow Diagram
//!
//! ```text
//! ┌──────────────────────┐
//! │ func, y0, t, options │  (caller's form)
//! └──────────┬───────────┘
//!            │
//! ┌──────────▼───────────┐
//! │ check_inputs         │ ← validate, flatten, reverse
//! └──────────┬───────────┘
//!            │
//! ┌──────────▼───────────┐
//! │ select_initial_step  │ ← h0
//! └──────────┬───────────┘
//!            │
//! ┌──────────▼───────────┐      ┌────────────────────┐
//! │ driver step (RK)     │ ───▶ │ compute_error_ratio│
//! └──────────▲───────────┘      └─────────┬──────────┘
//!            │                            │
//!            │            ┌───────────────▼────┐
//!            └─────────── │ optimal_step_size  │ ← next h
//!                         └────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use adaptive_ode::numeric::TolerancePair;
//! use adaptive_ode::solver::{
//!     check_inputs, select_initial_step, optimal_step_size,
//!     RightHandSideFn, SolverOptions, StepSizeFactors,
//! };
//! use adaptive_ode::state::{InitialState, InputArray};
//! use nalgebra::DVector;
//!
//! let rhs = RightHandSideFn::vector(|_t: f64, y: &DVector<f64>| -y);
//! let y0 = InitialState::Single(InputArray::from_f64_slice(&[1.0]));
//! let t = InputArray::from_f64_slice(&[0.0, 1.0]);
//! let options = SolverOptions::default();
//!
//! let problem = check_inputs(rhs, &y0, &t, &options)?;
//! let tolerance = TolerancePair::new(1e-6, 1e-9);
//!
//! let h0 = select_initial_step(
//!     problem.rhs.as_ref(), problem.t[0], &problem.y0, 5.0, &tolerance, None, &problem.shapes,
//! )?;
//! assert!(h0 > 0.0);
//!
//! // An accepted step with a tiny error grows the step size
//! let next = optimal_step_size(h0, &[1e-4], &StepSizeFactors::default(), 5.0);
//! assert!(next > h0);
//! # Ok::<(), adaptive_ode::solver::SolverError>(())
//! ```

// =================================================================================================
// Module Declarations
// =================================================================================================
mod error;
mod traits;
mod direction;
mod validation;
mod step_control;

// =================================================================================================
// Public API
// =================================================================================================

pub use error::{SolverError, SolverResult};

pub use traits::{RightHandSide, RightHandSideFn, StepSizeFactors, TupleRightHandSide};

pub use direction::{ReverseFunction, is_decreasing, is_increasing, negate_grid, reverse_problem};

pub use validation::{
    GRID_POINTS,
    SolutionState,
    SolverOptions,
    ValidatedProblem,
    check_inputs,
    warn_unused_options,
};

pub use step_control::{compute_error_ratio, optimal_step_size, select_initial_step};
