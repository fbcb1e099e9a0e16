//! State component data
//!
//! A tuple state is an ordered list of independently shaped components.
//! Each component is stored in the container that fits its rank, from a
//! single scalar up to an n-dimensional array.

use nalgebra::{DMatrix, DVector};
use ndarray::{ArrayD, IxDyn};
use std::fmt;

use crate::solver::{SolverError, SolverResult};

/// Storage kind of a state component
///
/// Recorded in the shape descriptor so that a flattened component is
/// rebuilt in exactly the container it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Scalar,
    Vector,
    Matrix,
    Array,
}

/// One component of a tuple state
///
/// # Storage Types
///
/// - **Scalar**: Single value (rank 0)
/// - **Vector**: 1D array
/// - **Matrix**: 2D array
/// - **Array**: n-dimensional array (any rank)
///
/// # Flattening Order
///
/// Flattening is always row-major (last index fastest), whatever the
/// underlying storage. `DMatrix` is column-major internally, so matrices are
/// transposed on the way out and rebuilt with `from_row_slice` on the way in.
///
/// # Examples
///
/// ```rust
/// use ndarray::Array;
/// use adaptive_ode::state::StateData;
///
/// // positions of 4 bodies in 3D
/// let positions = StateData::from_array(Array::from_elem((4, 3), 0.5).into_dyn());
/// assert_eq!(positions.shape(), vec![4, 3]);
/// assert_eq!(positions.len(), 12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum StateData {
    /// Scalar value (rank 0)
    Scalar(f64),

    /// Vector (rank 1)
    Vector(DVector<f64>),

    /// Matrix (rank 2)
    Matrix(DMatrix<f64>),

    /// Multidimensional array
    Array(ArrayD<f64>),
}

impl StateData {
    /// Vector component from owned values
    pub fn from_vec(values: Vec<f64>) -> Self {
        Self::Vector(DVector::from_vec(values))
    }

    /// Matrix component
    pub fn from_matrix(matrix: DMatrix<f64>) -> Self {
        Self::Matrix(matrix)
    }

    /// n-d array component
    pub fn from_array(array: ArrayD<f64>) -> Self {
        Self::Array(array)
    }

    /// Vector component filled with `value`
    pub fn uniform_vector(len: usize, value: f64) -> Self {
        Self::Vector(DVector::from_element(len, value))
    }

    /// Matrix component filled with `value`
    pub fn uniform_matrix(nrows: usize, ncols: usize, value: f64) -> Self {
        Self::Matrix(DMatrix::from_element(nrows, ncols, value))
    }

    /// Rebuild a component of the given kind and shape from row-major values
    ///
    /// Fails with [`SolverError::ShapeMismatch`] when `values` does not hold
    /// exactly the number of elements the shape requires.
    pub fn from_flat(kind: ComponentKind, shape: &[usize], values: &[f64]) -> SolverResult<Self> {
        let expected: usize = shape.iter().product();
        if values.len() != expected {
            return Err(SolverError::ShapeMismatch { expected, found: values.len() });
        }

        match (kind, shape) {
            (ComponentKind::Scalar, []) => Ok(Self::Scalar(values[0])),
            (ComponentKind::Vector, [_]) => Ok(Self::Vector(DVector::from_column_slice(values))),
            (ComponentKind::Matrix, [rows, columns]) => {
                Ok(Self::Matrix(DMatrix::from_row_slice(*rows, *columns, values)))
            }
            (ComponentKind::Array, _) => ArrayD::from_shape_vec(IxDyn(shape), values.to_vec())
                .map(Self::Array)
                .map_err(|_| SolverError::ShapeMismatch { expected, found: values.len() }),
            (kind, shape) => Err(SolverError::validation(
                "shape",
                format!("{:?} component cannot have rank {}", kind, shape.len()),
            )),
        }
    }

    pub fn kind(&self) -> ComponentKind {
        match self {
            StateData::Scalar(_) => ComponentKind::Scalar,
            StateData::Vector(_) => ComponentKind::Vector,
            StateData::Matrix(_) => ComponentKind::Matrix,
            StateData::Array(_) => ComponentKind::Array,
        }
    }

    /// Rank: 0 for a scalar, 1 for a vector, 2 for a matrix
    pub fn ndim(&self) -> usize {
        match self {
            StateData::Scalar(_) => 0,
            StateData::Vector(_) => 1,
            StateData::Matrix(_) => 2,
            StateData::Array(a) => a.ndim(),
        }
    }

    /// Extents, outermost first (empty for a scalar)
    pub fn shape(&self) -> Vec<usize> {
        match self {
            StateData::Scalar(_) => Vec::new(),
            StateData::Vector(v) => vec![v.len()],
            StateData::Matrix(m) => vec![m.nrows(), m.ncols()],
            StateData::Array(a) => a.shape().to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            StateData::Scalar(_) => 1,
            StateData::Vector(v) => v.len(),
            StateData::Matrix(m) => m.len(),
            StateData::Array(a) => a.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The value of a scalar component
    pub fn try_as_scalar(&self) -> Option<f64> {
        if let StateData::Scalar(value) = self { Some(*value) } else { None }
    }

    pub fn try_as_matrix(&self) -> Option<&DMatrix<f64>> {
        if let StateData::Matrix(m) = self { Some(m) } else { None }
    }

    pub fn try_as_array(&self) -> Option<&ArrayD<f64>> {
        if let StateData::Array(a) = self { Some(a) } else { None }
    }

    /// Values in row-major order
    pub fn to_flat_vec(&self) -> Vec<f64> {
        match self {
            StateData::Scalar(value) => vec![*value],
            StateData::Vector(v) => v.as_slice().to_vec(),
            StateData::Matrix(m) => m.transpose().as_slice().to_vec(),
            StateData::Array(a) => a.iter().copied().collect(),
        }
    }

    /// Elementwise sum, broadcasting scalars
    pub fn try_add(&self, rhs: &Self) -> SolverResult<Self> {
        use StateData::*;
        match (self, rhs) {
            (Scalar(x), Scalar(y)) => Ok(Scalar(x + y)),
            (Scalar(x), Vector(y)) | (Vector(y), Scalar(x)) => Ok(Vector(y.map(|e| e + x))),
            (Scalar(x), Matrix(y)) | (Matrix(y), Scalar(x)) => Ok(Matrix(y.map(|e| e + x))),
            (Scalar(x), Array(y)) | (Array(y), Scalar(x)) => Ok(Array(y + *x)),
            (Vector(x), Vector(y)) if x.len() == y.len() => Ok(Vector(x + y)),
            (Matrix(x), Matrix(y)) if x.shape() == y.shape() => Ok(Matrix(x + y)),
            (Array(x), Array(y)) if x.shape() == y.shape() => Ok(Array(x + y)),
            (x, y) => Err(incompatible(x, y)),
        }
    }

    /// Elementwise product, broadcasting scalars
    pub fn try_mul(&self, rhs: &Self) -> SolverResult<Self> {
        use StateData::*;
        match (self, rhs) {
            (Scalar(x), Scalar(y)) => Ok(Scalar(x * y)),
            (Scalar(x), other) | (other, Scalar(x)) => Ok(other.clone() * *x),
            (Vector(x), Vector(y)) if x.len() == y.len() => Ok(Vector(x.component_mul(y))),
            (Matrix(x), Matrix(y)) if x.shape() == y.shape() => Ok(Matrix(x.component_mul(y))),
            (Array(x), Array(y)) if x.shape() == y.shape() => Ok(Array(x * y)),
            (x, y) => Err(incompatible(x, y)),
        }
    }
}

fn incompatible(x: &StateData, y: &StateData) -> SolverError {
    SolverError::validation(
        "operand",
        format!("cannot combine {} with {} elementwise", x, y),
    )
}

// =================================================================================================
// Operators
// =================================================================================================

impl std::ops::Mul<f64> for StateData {
    type Output = StateData;
    fn mul(self, scalar: f64) -> Self::Output {
        match self {
            StateData::Scalar(x) => StateData::Scalar(x * scalar),
            StateData::Vector(x) => StateData::Vector(x * scalar),
            StateData::Matrix(x) => StateData::Matrix(x * scalar),
            StateData::Array(x) => StateData::Array(x * scalar),
        }
    }
}

impl std::ops::Mul<StateData> for f64 {
    type Output = StateData;
    fn mul(self, rhs: StateData) -> Self::Output {
        rhs * self
    }
}

impl std::ops::Neg for StateData {
    type Output = StateData;
    fn neg(self) -> Self::Output {
        self * -1.0
    }
}

impl fmt::Display for StateData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateData::Scalar(value) => write!(f, "scalar {}", value),
            other => {
                let extents: Vec<String> = other.shape().iter().map(usize::to_string).collect();
                write!(f, "{:?} [{}]", other.kind(), extents.join("x"))
            }
        }
    }
}

// =================================================================================================
// Tests
// =================================================================================================
