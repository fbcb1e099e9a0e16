//! State representations
//!
//! An ODE state is held in one of two forms:
//!
//! - **State vector**: one contiguous `DVector<f64>`, the canonical form the
//!   step-size controller works on
//! - **Tuple state**: an ordered list of [`StateData`] components of
//!   arbitrary shapes, the natural form for many callers (positions and
//!   velocities, a field and a scalar parameter, ...)
//!
//! The [`shape`] module converts between the two without loss, and adapts
//! tuple right-hand sides into vector ones.
//!
//! # Example
//!
//! ```rust
//! use adaptive_ode::state::{flatten_to_vector, unflatten_from_vector, StateData};
//!
//! let tuple = vec![StateData::from_vec(vec![1.0, 2.0]), StateData::Scalar(3.0)];
//! let (vector, shapes) = flatten_to_vector(&tuple);
//! assert_eq!(vector.len(), 3);
//!
//! let rebuilt = unflatten_from_vector(&vector, &shapes).unwrap();
//! assert_eq!(rebuilt, tuple);
//! ```

pub mod data;
pub mod input;
pub mod shape;

pub use data::{ComponentKind, StateData};
pub use input::{DType, InitialState, InputArray};
pub use shape::{
    ComponentShape,
    ShapeDescriptor,
    TupleFunction,
    flatten_to_vector,
    unflatten_from_vector,
    wrap_tuple_function,
};
