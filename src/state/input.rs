//! Caller-facing input arrays
//!
//! Time grids and initial states arrive from callers that may hold data of
//! any element type. `InputArray` keeps the element type visible at runtime
//! so the validator can reject integer or boolean inputs with a typed error
//! instead of silently converting them.

use ndarray::{Array1, ArrayD};
use std::fmt;

use crate::state::StateData;

/// Element type of an input array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    F64,
    F32,
    I64,
    I32,
    Bool,
}

impl DType {
    /// Floating-point kinds are the only ones accepted for `t` and `y0`
    pub fn is_floating_point(&self) -> bool {
        matches!(self, DType::F64 | DType::F32)
    }

    /// Round an f64 value to this type's precision
    ///
    /// The step-size controller computes in f64; a driver integrating over an
    /// f32 time axis uses this to express a step in its own precision.
    ///
    /// Only defined for floating-point kinds. `check_inputs` rejects every
    /// other kind for `t`, so a validated problem never calls this on one.
    pub fn cast(&self, value: f64) -> f64 {
        debug_assert!(self.is_floating_point(), "cannot cast to {}", self);
        match self {
            DType::F32 => value as f32 as f64,
            _ => value,
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DType::F64 => "f64",
            DType::F32 => "f32",
            DType::I64 => "i64",
            DType::I32 => "i32",
            DType::Bool => "bool",
        };
        write!(f, "{}", name)
    }
}

/// Dtype-tagged n-dimensional input array
#[derive(Debug, Clone, PartialEq)]
pub enum InputArray {
    F64(ArrayD<f64>),
    F32(ArrayD<f32>),
    I64(ArrayD<i64>),
    I32(ArrayD<i32>),
    Bool(ArrayD<bool>),
}

impl InputArray {
    /// One-dimensional f64 array from a slice
    pub fn from_f64_slice(values: &[f64]) -> Self {
        Self::F64(Array1::from_vec(values.to_vec()).into_dyn())
    }

    /// One-dimensional f32 array from a slice
    pub fn from_f32_slice(values: &[f32]) -> Self {
        Self::F32(Array1::from_vec(values.to_vec()).into_dyn())
    }

    /// One-dimensional i64 array from a slice
    pub fn from_i64_slice(values: &[i64]) -> Self {
        Self::I64(Array1::from_vec(values.to_vec()).into_dyn())
    }

    /// Element type
    pub fn dtype(&self) -> DType {
        match self {
            InputArray::F64(_) => DType::F64,
            InputArray::F32(_) => DType::F32,
            InputArray::I64(_) => DType::I64,
            InputArray::I32(_) => DType::I32,
            InputArray::Bool(_) => DType::Bool,
        }
    }

    /// Number of dimensions
    pub fn ndim(&self) -> usize {
        match self {
            InputArray::F64(a) => a.ndim(),
            InputArray::F32(a) => a.ndim(),
            InputArray::I64(a) => a.ndim(),
            InputArray::I32(a) => a.ndim(),
            InputArray::Bool(a) => a.ndim(),
        }
    }

    /// Shape
    pub fn shape(&self) -> &[usize] {
        match self {
            InputArray::F64(a) => a.shape(),
            InputArray::F32(a) => a.shape(),
            InputArray::I64(a) => a.shape(),
            InputArray::I32(a) => a.shape(),
            InputArray::Bool(a) => a.shape(),
        }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.shape().iter().product()
    }

    /// Check emptiness
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Values widened to f64 in row-major order
    ///
    /// Returns `None` for non floating-point inputs.
    pub fn to_f64_vec(&self) -> Option<Vec<f64>> {
        match self {
            InputArray::F64(a) => Some(a.iter().copied().collect()),
            InputArray::F32(a) => Some(a.iter().map(|&x| x as f64).collect()),
            _ => None,
        }
    }

    /// Convert to a state component, keeping the input's shape
    ///
    /// Returns `None` for non floating-point inputs.
    pub fn to_state_data(&self) -> Option<StateData> {
        match self {
            InputArray::F64(a) => Some(StateData::Array(a.clone())),
            InputArray::F32(a) => Some(StateData::Array(a.mapv(|x| x as f64))),
            _ => None,
        }
    }
}

impl From<ArrayD<f64>> for InputArray {
    fn from(array: ArrayD<f64>) -> Self {
        Self::F64(array)
    }
}

impl From<ArrayD<f32>> for InputArray {
    fn from(array: ArrayD<f32>) -> Self {
        Self::F32(array)
    }
}

impl From<ArrayD<i64>> for InputArray {
    fn from(array: ArrayD<i64>) -> Self {
        Self::I64(array)
    }
}

/// Initial state as supplied by the caller
///
/// Either one array (integrated as is) or a tuple of independently shaped
/// arrays (flattened into one state vector before integration).
#[derive(Debug, Clone, PartialEq)]
pub enum InitialState {
    Single(InputArray),
    Tuple(Vec<InputArray>),
}
