//! State shape adapter
//!
//! Converts between a tuple state (ordered, independently shaped
//! components) and the single contiguous state vector the controller works
//! on. The conversion is a bijection given the [`ShapeDescriptor`]:
//!
//! ```text
//! ( [a b]   , c , [[d e f]  )   ──flatten──▶  [a b c d e f g h i]
//!                   [g h i]]    ◀─unflatten──
//! ```
//!
//! [`TupleFunction`] lifts a tuple right-hand side into a vector one, so the
//! rest of the crate never has to know the caller used a tuple.

use nalgebra::DVector;
use std::ops::Range;

use crate::solver::{RightHandSide, SolverError, SolverResult, TupleRightHandSide};
use crate::state::{ComponentKind, StateData};

// =================================================================================================
// Shape Descriptor
// =================================================================================================

/// Shape and storage kind of one tuple component
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComponentShape {
    /// Container the component is rebuilt into
    pub kind: ComponentKind,

    /// Extents, empty for a scalar
    pub dims: Vec<usize>,
}

impl ComponentShape {
    /// Record the shape of a component
    pub fn of(data: &StateData) -> Self {
        Self {
            kind: data.kind(),
            dims: data.shape(),
        }
    }

    /// Number of elements
    pub fn numel(&self) -> usize {
        self.dims.iter().product()
    }
}

/// Ordered per-component shapes of a tuple state
///
/// Empty when the caller supplied a single array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ShapeDescriptor {
    components: Vec<ComponentShape>,
}

impl ShapeDescriptor {
    /// Create from component shapes
    pub fn new(components: Vec<ComponentShape>) -> Self {
        Self { components }
    }

    /// Descriptor of a single-array state
    pub fn single() -> Self {
        Self::default()
    }

    /// Component shapes, in order
    pub fn components(&self) -> &[ComponentShape] {
        &self.components
    }

    /// Number of components
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// True for a single-array state
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Total number of elements over all components
    pub fn total_len(&self) -> usize {
        self.components.iter().map(ComponentShape::numel).sum()
    }

    /// Index ranges of every component inside a flat vector of `len` elements
    ///
    /// A single-array state is one component covering the whole vector.
    pub fn component_ranges(&self, len: usize) -> SolverResult<Vec<Range<usize>>> {
        if self.is_empty() {
            return Ok(vec![0..len]);
        }

        let expected = self.total_len();
        if len != expected {
            return Err(SolverError::ShapeMismatch { expected, found: len });
        }

        let mut ranges = Vec::with_capacity(self.len());
        let mut start = 0;
        for component in &self.components {
            let end = start + component.numel();
            ranges.push(start..end);
            start = end;
        }
        Ok(ranges)
    }
}

// =================================================================================================
// Flatten / unflatten
// =================================================================================================

/// Flatten a tuple state into one vector, recording each component's shape
///
/// Components are flattened row-major and concatenated in order.
pub fn flatten_to_vector(tuple_state: &[StateData]) -> (DVector<f64>, ShapeDescriptor) {
    let shapes = tuple_state.iter().map(ComponentShape::of).collect();
    (concatenate(tuple_state), ShapeDescriptor::new(shapes))
}

/// Rebuild a tuple state from a flat vector
///
/// # Errors
///
/// [`SolverError::ShapeMismatch`] when the vector length differs from the
/// total element count of `shapes`.
pub fn unflatten_from_vector(vector: &DVector<f64>, shapes: &ShapeDescriptor) -> SolverResult<Vec<StateData>> {
    let expected = shapes.total_len();
    if vector.len() != expected {
        return Err(SolverError::ShapeMismatch { expected, found: vector.len() });
    }

    let values = vector.as_slice();
    let mut tuple_state = Vec::with_capacity(shapes.len());
    let mut start = 0;
    for component in shapes.components() {
        let end = start + component.numel();
        tuple_state.push(StateData::from_flat(component.kind, &component.dims, &values[start..end])?);
        start = end;
    }
    Ok(tuple_state)
}

fn concatenate(tuple_state: &[StateData]) -> DVector<f64> {
    let total = tuple_state.iter().map(StateData::len).sum();
    let mut values = Vec::with_capacity(total);
    for component in tuple_state {
        values.extend(component.to_flat_vec());
    }
    DVector::from_vec(values)
}

// =================================================================================================
// Tuple function adapter
// =================================================================================================

/// Vector right-hand side built from a tuple right-hand side
///
/// Each evaluation unflattens `y`, calls the wrapped function and flattens
/// its result. The wrapped function is never modified.
pub struct TupleFunction {
    base: Box<dyn TupleRightHandSide>,
    shapes: ShapeDescriptor,
}

impl TupleFunction {
    /// Wrap `base` for states described by `shapes`
    pub fn new(base: Box<dyn TupleRightHandSide>, shapes: ShapeDescriptor) -> Self {
        Self { base, shapes }
    }

    /// Shapes the wrapped function expects
    pub fn shapes(&self) -> &ShapeDescriptor {
        &self.shapes
    }
}

impl RightHandSide for TupleFunction {
    fn evaluate(&self, t: f64, y: &DVector<f64>) -> SolverResult<DVector<f64>> {
        let tuple_y = unflatten_from_vector(y, &self.shapes)?;
        let tuple_dy = self.base.evaluate(t, &tuple_y)?;

        let dy = concatenate(&tuple_dy);
        if dy.len() != y.len() {
            return Err(SolverError::ShapeMismatch { expected: y.len(), found: dy.len() });
        }
        Ok(dy)
    }

    fn name(&self) -> &str {
        self.base.name()
    }
}

impl std::fmt::Debug for TupleFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TupleFunction")
            .field("base", &self.base.name())
            .field("shapes", &self.shapes)
            .finish()
    }
}

/// Wrap a tuple right-hand side as a vector right-hand side
pub fn wrap_tuple_function(base: Box<dyn TupleRightHandSide>, shapes: ShapeDescriptor) -> TupleFunction {
    TupleFunction::new(base, shapes)
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;
    use ndarray::Array;

    fn mixed_tuple() -> Vec<StateData> {
        vec![
            StateData::from_vec(vec![1.0, 2.0]),
            StateData::Scalar(3.0),
            StateData::from_matrix(DMatrix::from_row_slice(2, 3, &[4.0, 5.0, 6.0, 7.0, 8.0, 9.0])),
            StateData::from_array(Array::from_shape_fn((1, 2, 2), |(i, j, k)| 10.0 + (i + 2 * j + k) as f64).into_dyn()),
        ]
    }

    #[test]
    fn test_flatten_concatenates_in_order() {
        let (vector, shapes) = flatten_to_vector(&mixed_tuple());

        assert_eq!(vector.len(), 13);
        assert_eq!(
            vector.as_slice(),
            &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 13.0]
        );
        assert_eq!(shapes.len(), 4);
        assert_eq!(shapes.components()[1].dims, Vec::<usize>::new());
        assert_eq!(shapes.components()[2].kind, ComponentKind::Matrix);
        assert_eq!(shapes.total_len(), 13);
    }

    #[test]
    fn test_round_trip() {
        let tuple = mixed_tuple();
        let (vector, shapes) = flatten_to_vector(&tuple);
        let rebuilt = unflatten_from_vector(&vector, &shapes).unwrap();
        assert_eq!(rebuilt, tuple);
    }

    #[test]
    fn test_unflatten_length_mismatch() {
        let (_, shapes) = flatten_to_vector(&mixed_tuple());
        let short = DVector::zeros(12);

        let err = unflatten_from_vector(&short, &shapes).unwrap_err();
        assert_eq!(err, SolverError::ShapeMismatch { expected: 13, found: 12 });
    }

    #[test]
    fn test_component_ranges() {
        let (vector, shapes) = flatten_to_vector(&mixed_tuple());
        let ranges = shapes.component_ranges(vector.len()).unwrap();
        assert_eq!(ranges, vec![0..2, 2..3, 3..9, 9..13]);

        assert_eq!(ShapeDescriptor::single().component_ranges(5).unwrap(), vec![0..5]);
        assert!(shapes.component_ranges(7).is_err());
    }

    #[test]
    fn test_tuple_function_is_transparent() {
        let tuple = vec![StateData::from_vec(vec![1.0, -1.0]), StateData::Scalar(0.5)];
        let (y, shapes) = flatten_to_vector(&tuple);

        // d(position)/dt = velocity scale, d(scale)/dt = -scale
        let base = |_t: f64, y: &[StateData]| -> Vec<StateData> {
            let scale = y[1].try_as_scalar().unwrap_or(0.0);
            vec![y[0].clone() * scale, StateData::Scalar(-scale)]
        };

        let wrapped = wrap_tuple_function(Box::new(base), shapes);
        let dy = wrapped.evaluate(0.0, &y).unwrap();
        assert_eq!(dy.as_slice(), &[0.5, -0.5, -0.5]);
    }

    #[test]
    fn test_tuple_function_rejects_wrong_output_size() {
        let tuple = vec![StateData::from_vec(vec![1.0, 2.0])];
        let (y, shapes) = flatten_to_vector(&tuple);

        let base = |_t: f64, _y: &[StateData]| vec![StateData::Scalar(0.0)];
        let wrapped = TupleFunction::new(Box::new(base), shapes);

        let err = wrapped.evaluate(0.0, &y).unwrap_err();
        assert_eq!(err, SolverError::ShapeMismatch { expected: 2, found: 1 });
    }
}
