//! Input validation and problem normalization
//!
//! [`check_inputs`] runs once, before integration starts. It enforces the
//! input contracts and rewrites the problem into its canonical form:
//!
//! - a single state vector (tuple states are flattened, and the right-hand
//!   side is wrapped in a [`TupleFunction`])
//! - a strictly increasing time grid (decreasing grids are negated, and the
//!   right-hand side is wrapped in a [`ReverseFunction`])
//!
//! Nothing is fixed up silently: every contract violation is reported as a
//! [`SolverError::Validation`].
//!
//! # Example
//!
//! ```rust
//! use adaptive_ode::solver::{check_inputs, RightHandSideFn, SolverOptions};
//! use adaptive_ode::state::{InitialState, InputArray};
//! use nalgebra::DVector;
//!
//! let rhs = RightHandSideFn::vector(|_t: f64, y: &DVector<f64>| -y);
//! let y0 = InitialState::Single(InputArray::from_f64_slice(&[1.0, 2.0]));
//! let t = InputArray::from_f64_slice(&[2.0, 1.0, 0.0]);
//! let options = SolverOptions::default();
//!
//! let problem = check_inputs(rhs, &y0, &t, &options).unwrap();
//! assert!(problem.reversed);
//! assert_eq!(problem.t.as_slice(), &[-2.0, -1.0, 0.0]);
//! ```

use log::{debug, warn};
use nalgebra::DVector;
use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::solver::direction::{is_decreasing, is_increasing, negate_grid};
use crate::solver::{ReverseFunction, RightHandSide, RightHandSideFn, SolverError, SolverResult};
use crate::state::{
    ComponentKind,
    DType,
    InitialState,
    InputArray,
    ShapeDescriptor,
    StateData,
    TupleFunction,
    flatten_to_vector,
    unflatten_from_vector,
};

/// Option name of the break-point grid
pub const GRID_POINTS: &str = "grid_points";

// =================================================================================================
// Solver options
// =================================================================================================

/// Options passed through to the stepping driver
///
/// The break-point grid is the only option this crate interprets. Every
/// other option is carried by name for the driver to consume.
///
/// # Examples
///
/// ```rust
/// use adaptive_ode::solver::SolverOptions;
/// use adaptive_ode::state::InputArray;
///
/// let options = SolverOptions::new()
///     .with_grid_points(InputArray::from_f64_slice(&[0.0, 0.5, 1.0]))
///     .with_option("first_step", 1e-3)
///     .with_option("typo_stepsize", 1.0);
///
/// assert_eq!(options.get("first_step"), Some(1e-3));
/// assert_eq!(options.unused(&["first_step"]), vec!["typo_stepsize".to_string()]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolverOptions {
    /// Ordered break points the driver must step onto exactly
    pub grid_points: Option<InputArray>,

    /// Named numeric options for the driver
    pub extra: BTreeMap<String, f64>,
}

impl SolverOptions {
    /// Empty options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the break-point grid
    pub fn with_grid_points(mut self, grid_points: InputArray) -> Self {
        self.grid_points = Some(grid_points);
        self
    }

    /// Set a named option
    pub fn with_option(mut self, name: &str, value: f64) -> Self {
        self.extra.insert(name.to_string(), value);
        self
    }

    /// Get a named option
    pub fn get(&self, name: &str) -> Option<f64> {
        self.extra.get(name).copied()
    }

    /// Break points as f64 values, if set and floating-point
    pub fn grid_points_values(&self) -> Option<Vec<f64>> {
        self.grid_points.as_ref().and_then(InputArray::to_f64_vec)
    }

    /// Names of every option that is set
    pub fn names(&self) -> Vec<String> {
        let grid = self.grid_points.as_ref().map(|_| GRID_POINTS.to_string());
        grid.into_iter().chain(self.extra.keys().cloned()).collect()
    }

    /// Options not in `recognized`
    ///
    /// The break-point grid is always recognized.
    pub fn unused(&self, recognized: &[&str]) -> Vec<String> {
        self.names()
            .into_iter()
            .filter(|name| name != GRID_POINTS && !recognized.contains(&name.as_str()))
            .collect()
    }
}

/// Report options that no consumer recognized
///
/// Advisory only: integration proceeds.
pub fn warn_unused_options(solver: &str, unused: &[String]) {
    if !unused.is_empty() {
        warn!("{}: Unexpected arguments {:?}", solver, unused);
    }
}

// =================================================================================================
// Validated problem
// =================================================================================================

/// State in the caller's original form
#[derive(Debug, Clone, PartialEq)]
pub enum SolutionState {
    Single(StateData),
    Tuple(Vec<StateData>),
}

/// Canonical forward-time, single-vector problem
pub struct ValidatedProblem<'a> {
    /// True when the caller supplied a single array
    pub tensor_input: bool,

    /// Component shapes of a tuple state, empty for a single array
    pub shapes: ShapeDescriptor,

    /// Right-hand side over the flattened state, on the canonical time axis
    pub rhs: Box<dyn RightHandSide>,

    /// Flattened initial state
    pub y0: DVector<f64>,

    /// Strictly increasing time grid (negated when `reversed`)
    pub t: DVector<f64>,

    /// Options, copied only when the break-point grid had to be negated
    pub options: Cow<'a, SolverOptions>,

    /// Element type of the caller's time grid
    pub time_dtype: DType,

    /// True when the caller's grid was decreasing
    pub reversed: bool,

    /// Shape of a single-array initial state
    single_shape: Vec<usize>,
}

impl ValidatedProblem<'_> {
    /// Present a flat state in the caller's original form
    pub fn restore_state(&self, y: &DVector<f64>) -> SolverResult<SolutionState> {
        if self.tensor_input {
            let component = StateData::from_flat(ComponentKind::Array, &self.single_shape, y.as_slice())?;
            Ok(SolutionState::Single(component))
        } else {
            Ok(SolutionState::Tuple(unflatten_from_vector(y, &self.shapes)?))
        }
    }

    /// Time in the caller's convention for a canonical time
    pub fn original_time(&self, t: f64) -> f64 {
        if self.reversed { -t } else { t }
    }
}

impl std::fmt::Debug for ValidatedProblem<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatedProblem")
            .field("tensor_input", &self.tensor_input)
            .field("shapes", &self.shapes)
            .field("rhs", &self.rhs.name())
            .field("y0", &self.y0.len())
            .field("t", &self.t.len())
            .field("options", &self.options)
            .field("time_dtype", &self.time_dtype)
            .field("reversed", &self.reversed)
            .finish()
    }
}

// =================================================================================================
// Validation
// =================================================================================================

/// Validate solver inputs and build the canonical problem
///
/// # Contracts
///
/// - `t` is one-dimensional, non-empty, floating-point, and strictly
///   increasing or strictly decreasing
/// - the break-point grid, if set, is one-dimensional, floating-point and
///   strictly increasing, whatever the direction of `t`
/// - `y0` is floating-point and holds at least one element; a tuple holds at
///   least one component and none of them is empty
/// - `rhs` takes the same form as `y0` (vector or tuple)
///
/// # Returns
///
/// The [`ValidatedProblem`]. `options` is borrowed unless the break-point
/// grid had to be negated, in which case it is a modified copy.
pub fn check_inputs<'a>(
    rhs: RightHandSideFn,
    y0: &InitialState,
    t: &InputArray,
    options: &'a SolverOptions,
) -> SolverResult<ValidatedProblem<'a>> {

    // ====== Time grid ======

    let t_values = float_grid("t", t)?;
    if t_values.is_empty() {
        return Err(SolverError::validation("t", "must contain at least one time point"));
    }
    let decreasing = is_decreasing(&t_values);
    if !decreasing && !is_increasing(&t_values) {
        return Err(SolverError::validation("t", "must be strictly increasing or decreasing"));
    }

    // ====== Break points ======

    if let Some(grid_points) = &options.grid_points {
        let values = float_grid(GRID_POINTS, grid_points)?;
        if !is_increasing(&values) {
            return Err(SolverError::validation(GRID_POINTS, "must be strictly increasing"));
        }
    }

    // ====== Initial state ======

    let (tensor_input, shapes, y0_vector, single_shape) = match y0 {
        InitialState::Single(array) => {
            let values = array.to_f64_vec().ok_or_else(|| not_floating("y0", array.dtype()))?;
            if values.is_empty() {
                return Err(SolverError::validation("y0", "must hold at least one element"));
            }
            (true, ShapeDescriptor::single(), DVector::from_vec(values), array.shape().to_vec())
        }
        InitialState::Tuple(arrays) => {
            if arrays.is_empty() {
                return Err(SolverError::validation("y0", "tuple state must hold at least one component"));
            }
            let components = arrays
                .iter()
                .enumerate()
                .map(|(i, array)| {
                    let field = format!("y0[{}]", i);
                    let component = array.to_state_data().ok_or_else(|| not_floating(&field, array.dtype()))?;
                    if component.is_empty() {
                        return Err(SolverError::validation(&field, "must hold at least one element"));
                    }
                    Ok(component)
                })
                .collect::<SolverResult<Vec<_>>>()?;
            let (vector, shapes) = flatten_to_vector(&components);
            (false, shapes, vector, Vec::new())
        }
    };

    let rhs: Box<dyn RightHandSide> = match (rhs, tensor_input) {
        (RightHandSideFn::Vector(f), true) => f,
        (RightHandSideFn::Tuple(f), false) => Box::new(TupleFunction::new(f, shapes.clone())),
        (RightHandSideFn::Vector(_), false) => {
            return Err(SolverError::validation("func", "tuple state needs a tuple right-hand side"));
        }
        (RightHandSideFn::Tuple(_), true) => {
            return Err(SolverError::validation("func", "single-array state needs a vector right-hand side"));
        }
    };

    // ====== Time direction ======

    let t_vector = DVector::from_vec(t_values);
    let (t_vector, rhs, options): (_, Box<dyn RightHandSide>, _) = if decreasing {
        debug!("decreasing time grid: integrating '{}' over negated time", rhs.name());
        let options = match &options.grid_points {
            Some(grid_points) => {
                let mut copy = options.clone();
                copy.grid_points = Some(negate_input(grid_points));
                Cow::Owned(copy)
            }
            None => Cow::Borrowed(options),
        };
        (negate_grid(&t_vector), Box::new(ReverseFunction::new(rhs)), options)
    } else {
        (t_vector, rhs, Cow::Borrowed(options))
    };

    Ok(ValidatedProblem {
        tensor_input,
        shapes,
        rhs,
        y0: y0_vector,
        t: t_vector,
        options,
        time_dtype: t.dtype(),
        reversed: decreasing,
        single_shape,
    })
}

fn float_grid(field: &str, grid: &InputArray) -> SolverResult<Vec<f64>> {
    if grid.ndim() != 1 {
        return Err(SolverError::validation(
            field,
            format!("must be one dimensional, got {} dimensions", grid.ndim()),
        ));
    }
    grid.to_f64_vec().ok_or_else(|| not_floating(field, grid.dtype()))
}

fn not_floating(field: &str, dtype: DType) -> SolverError {
    SolverError::validation(field, format!("must be floating point but is {}", dtype))
}

fn negate_input(array: &InputArray) -> InputArray {
    match array {
        InputArray::F64(values) => InputArray::F64(-values),
        InputArray::F32(values) => InputArray::F32(-values),
        other => other.clone(),
    }
}

// =================================================================================================
// Tests
// =================================================================================================
