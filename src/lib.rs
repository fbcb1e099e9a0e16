//! adaptive-ode: building blocks for adaptive ODE integrators
//!
//! The numerical core shared by adaptive explicit Runge-Kutta drivers:
//! everything around the Butcher tableau, but not the tableau itself.
//!
//! # Architecture
//!
//! adaptive-ode is built on two core principles:
//!
//! 1. **One canonical problem**
//!    - Tuple states are flattened into a single state vector
//!    - Backward integration is rewritten as forward integration
//!    - Numerical code never sees either concern
//!
//! 2. **Pure step control**
//!    - Initial step, error ratio and next step are stateless functions
//!    - The driver owns the step size and the accept/reject decision
//!
//! # Quick Start
//!
//! ```rust
//! use adaptive_ode::prelude::*;
//! use nalgebra::DVector;
//!
//! # fn main() -> Result<(), SolverError> {
//! // 1. Normalize the problem: y' = -y integrated from t = 1 back to t = 0
//! let rhs = RightHandSideFn::vector(|_t: f64, y: &DVector<f64>| -y);
//! let y0 = InitialState::Single(InputArray::from_f64_slice(&[1.0]));
//! let t = InputArray::from_f64_slice(&[1.0, 0.0]);
//! let options = SolverOptions::default();
//!
//! let problem = check_inputs(rhs, &y0, &t, &options)?;
//! assert!(problem.reversed);
//!
//! // 2. Pick the first step
//! let tolerance = TolerancePair::new(1e-6, 1e-9);
//! let h = select_initial_step(
//!     problem.rhs.as_ref(), problem.t[0], &problem.y0, 2.0, &tolerance, None, &problem.shapes,
//! )?;
//!
//! // 3. After each step: error ratio, then next step size
//! let y1 = &problem.y0 * h.exp();
//! let error = DVector::from_vec(vec![1e-9]);
//! let tol = error_tolerance(&tolerance.rtol, &tolerance.atol, &problem.y0, &y1)?;
//! let ratios = compute_error_ratio(&error, &tol, &problem.shapes)?;
//! let next = optimal_step_size(h, &ratios, &StepSizeFactors::default(), 2.0);
//! assert!(next > 0.0);
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`numeric`]: inner products, tolerances and norms
//! - [`state`]: state representations and the tuple/vector adapter
//! - [`solver`]: input validation, time reversal and step-size control
//!
//! # Features
//!
//! - `parallel`: elementwise passes over large states run on Rayon

// Core modules
pub mod numeric;
pub mod state;
pub mod solver;

pub mod prelude {
    //! Convenient imports for common usage
    //!
    //! ```rust
    //!
    //! use adaptive_ode::prelude::*;
    //! ```
    pub use crate::numeric::{Tolerance,
                             TolerancePair,
                             error_tolerance,
                             rms_norm};
    pub use crate::state::{InitialState,
                           InputArray,
                           ShapeDescriptor,
                           StateData};
    pub use crate::solver::{RightHandSide,
                            RightHandSideFn,
                            TupleRightHandSide,
                            SolutionState,
                            SolverError,
                            SolverOptions,
                            SolverResult,
                            StepSizeFactors,
                            ValidatedProblem,
                            check_inputs,
                            compute_error_ratio,
                            optimal_step_size,
                            select_initial_step};
}
