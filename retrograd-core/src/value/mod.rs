// src/value/mod.rs

use std::sync::Arc;

use crate::error::RetroGradError;
use crate::graph::backward::run_backward;
use crate::graph::{Graph, ValueId};
use crate::ops;
use crate::types::RetroNumeric;

pub mod create;

/// A handle to one node of a computation [`Graph`].
///
/// A `Value` is an index into the graph's arena plus a cheap clone of the
/// graph handle, per the arena design: values hold integer handles rather
/// than back-references to the records that produced them. Cloning a `Value`
/// clones the handle, never the data.
///
/// All arithmetic goes through the explicit builder functions in
/// [`crate::ops`]; the methods on `Value` are thin sugar that delegate to
/// them.
pub struct Value<T: RetroNumeric = f32> {
    graph: Graph<T>,
    id: ValueId,
}

impl<T: RetroNumeric> Value<T> {
    pub(crate) fn from_parts(graph: Graph<T>, id: ValueId) -> Self {
        Value { graph, id }
    }

    /// The arena index of this value inside its graph.
    pub fn id(&self) -> ValueId {
        self.id
    }

    /// The graph this value belongs to.
    pub fn graph(&self) -> &Graph<T> {
        &self.graph
    }

    /// Returns the owning graph if `other` lives in the same one, or a
    /// `GraphMismatch` error naming the offending operation.
    pub(crate) fn same_graph_as(
        &self,
        other: &Value<T>,
        operation: &str,
    ) -> Result<Graph<T>, RetroGradError> {
        if self.graph.same_graph(&other.graph) {
            Ok(self.graph.clone())
        } else {
            Err(RetroGradError::GraphMismatch {
                operation: operation.to_string(),
            })
        }
    }

    /// Returns a clone of the value's shape.
    pub fn shape(&self) -> Vec<usize> {
        self.graph.read_inner().node(self.id).shape.clone()
    }

    /// Returns the number of elements in the value.
    pub fn numel(&self) -> usize {
        self.graph.read_inner().node(self.id).numel()
    }

    /// Returns a copy of the value's data as a flat row-major vector.
    pub fn data(&self) -> Vec<T> {
        self.graph.read_inner().node(self.id).data.as_ref().clone()
    }

    /// Returns the single element of a scalar value.
    pub fn item(&self) -> Result<T, RetroGradError> {
        let inner = self.graph.read_inner();
        let node = inner.node(self.id);
        if node.numel() != 1 {
            return Err(RetroGradError::ShapeMismatch {
                expected: vec![1],
                actual: node.shape.clone(),
                operation: "item".to_string(),
            });
        }
        Ok(node.data[0])
    }

    /// Checks if the value requires gradient computation.
    pub fn requires_grad(&self) -> bool {
        self.graph.read_inner().node(self.id).requires_grad
    }

    /// Sets the `requires_grad` status of this value **in-place**.
    /// Only allowed on leaf values; flipping the flag off freezes the leaf
    /// for all *future* records without touching records already built.
    pub fn requires_grad_(&self, requires_grad: bool) -> Result<(), RetroGradError> {
        let mut inner = self.graph.write_inner();
        let node = inner.node_mut(self.id);
        if node.producer.is_some() {
            return Err(RetroGradError::RequiresGradOnNonLeaf);
        }
        node.requires_grad = requires_grad;
        Ok(())
    }

    /// Whether this value is a leaf (has no producing operation record).
    pub fn is_leaf(&self) -> bool {
        self.graph.read_inner().node(self.id).producer.is_none()
    }

    /// Returns a clone of the accumulated gradient, if any.
    pub fn grad(&self) -> Option<Vec<T>> {
        self.graph.read_inner().node(self.id).grad.clone()
    }

    /// Resets the gradient of this value to `None`.
    pub fn zero_grad(&self) {
        self.graph.write_inner().node_mut(self.id).grad = None;
    }

    /// Replaces the data buffer of a leaf value.
    ///
    /// Used for in-place parameter updates; the new data must have the same
    /// element count as the old.
    pub fn set_data(&self, data: Vec<T>) -> Result<(), RetroGradError> {
        let mut inner = self.graph.write_inner();
        let node = inner.node_mut(self.id);
        if node.producer.is_some() {
            return Err(RetroGradError::UnsupportedOperation(
                "set_data is only supported on leaf values".to_string(),
            ));
        }
        if data.len() != node.numel() {
            return Err(RetroGradError::ValueCreation {
                data_len: data.len(),
                shape: node.shape.clone(),
            });
        }
        node.data = Arc::new(data);
        Ok(())
    }

    /// Creates a new leaf that shares this value's data but is detached
    /// from the computation graph.
    pub fn detach(&self) -> Value<T> {
        let mut inner = self.graph.write_inner();
        let (data, shape) = {
            let node = inner.node(self.id);
            (Arc::clone(&node.data), node.shape.clone())
        };
        let id = inner.push_node(data, shape, false, None);
        drop(inner);
        Value::from_parts(self.graph.clone(), id)
    }

    /// Computes the gradients of this value w.r.t. the graph leaves.
    ///
    /// Requires a single-element root; the seed gradient defaults to one.
    /// Records visited by the pass are consumed; call
    /// [`Value::backward_with`] with `retain_graph=true` to keep them.
    pub fn backward(&self) -> Result<(), RetroGradError> {
        self.backward_with(None, false)
    }

    /// Computes gradients with an explicit seed and/or graph retention.
    ///
    /// # Arguments
    /// * `seed`: The upstream gradient at the root. Must match the root's
    ///   element count. `None` defaults to one and requires a
    ///   single-element root (`BackwardNonScalar` otherwise).
    /// * `retain_graph`: If `false` (default), the records traversed by this
    ///   pass are consumed and a later backward through them fails with
    ///   `GraphConsumed`. If `true`, the records stay alive and leaf
    ///   gradients accumulate across passes until explicitly cleared.
    pub fn backward_with(
        &self,
        seed: Option<&[T]>,
        retain_graph: bool,
    ) -> Result<(), RetroGradError> {
        let mut inner = self.graph.write_inner();
        run_backward(&mut inner, self.id, seed, retain_graph)
    }

    // --- Operator sugar ---
    // Explicit builder functions are the canonical operator surface; these
    // methods only forward to them.

    /// Elementwise addition.
    pub fn add(&self, other: &Value<T>) -> Result<Value<T>, RetroGradError> {
        ops::arithmetic::add_op(self, other)
    }

    /// Elementwise subtraction.
    pub fn sub(&self, other: &Value<T>) -> Result<Value<T>, RetroGradError> {
        ops::arithmetic::sub_op(self, other)
    }

    /// Elementwise multiplication.
    pub fn mul(&self, other: &Value<T>) -> Result<Value<T>, RetroGradError> {
        ops::arithmetic::mul_op(self, other)
    }

    /// Elementwise division.
    pub fn div(&self, other: &Value<T>) -> Result<Value<T>, RetroGradError> {
        ops::arithmetic::div_op(self, other)
    }

    /// Elementwise negation.
    pub fn neg(&self) -> Result<Value<T>, RetroGradError> {
        ops::arithmetic::neg_op(self)
    }

    /// Raises each element to the power of a scalar exponent.
    pub fn pow(&self, exponent: T) -> Result<Value<T>, RetroGradError> {
        ops::arithmetic::pow_op(self, exponent)
    }

    /// Adds a scalar to each element.
    pub fn add_scalar(&self, scalar: T) -> Result<Value<T>, RetroGradError> {
        ops::arithmetic::add_scalar_op(self, scalar)
    }

    /// Multiplies each element by a scalar.
    pub fn mul_scalar(&self, scalar: T) -> Result<Value<T>, RetroGradError> {
        ops::arithmetic::mul_scalar_op(self, scalar)
    }

    /// Rectified linear unit, elementwise.
    pub fn relu(&self) -> Result<Value<T>, RetroGradError> {
        ops::activation::relu_op(self)
    }

    /// Sum of all elements, producing a scalar.
    pub fn sum(&self) -> Result<Value<T>, RetroGradError> {
        ops::reduction::sum_op(self)
    }

    /// Mean of all elements, producing a scalar.
    pub fn mean(&self) -> Result<Value<T>, RetroGradError> {
        ops::reduction::mean_op(self)
    }

    /// 2-D matrix multiplication.
    pub fn matmul(&self, other: &Value<T>) -> Result<Value<T>, RetroGradError> {
        ops::linalg::matmul_op(self, other)
    }
}

impl<T: RetroNumeric> Clone for Value<T> {
    fn clone(&self) -> Self {
        Value {
            graph: self.graph.clone(), // Clone the handle, not the node
            id: self.id,
        }
    }
}

/// Value equality compares shape and data, not handle identity.
impl<T: RetroNumeric> PartialEq for Value<T> {
    fn eq(&self, other: &Self) -> bool {
        if self.graph.same_graph(&other.graph) {
            if self.id == other.id {
                return true;
            }
            let inner = self.graph.read_inner();
            let (a, b) = (inner.node(self.id), inner.node(other.id));
            a.shape == b.shape && a.data == b.data
        } else {
            // Two locks, taken strictly one after the other.
            let (shape, data) = (self.shape(), self.data());
            shape == other.shape() && data == other.data()
        }
    }
}

impl<T: RetroNumeric> std::fmt::Debug for Value<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.graph.read_inner();
        let node = inner.node(self.id);
        f.debug_struct("Value")
            .field("id", &self.id)
            .field("shape", &node.shape)
            .field("data", &node.data)
            .field("requires_grad", &node.requires_grad)
            .field("is_leaf", &node.producer.is_none())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::error::RetroGradError;
    use crate::graph::Graph;

    #[test]
    fn test_accessors() {
        let g: Graph<f32> = Graph::new();
        let v = g.leaf(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]).unwrap();
        assert_eq!(v.shape(), vec![2, 2]);
        assert_eq!(v.numel(), 4);
        assert_eq!(v.data(), vec![1.0, 2.0, 3.0, 4.0]);
        assert!(v.is_leaf());
        assert!(!v.requires_grad());
        assert!(v.grad().is_none());
    }

    #[test]
    fn test_item_on_non_scalar_fails() {
        let g: Graph<f32> = Graph::new();
        let v = g.leaf(vec![1.0, 2.0], vec![2]).unwrap();
        assert!(matches!(
            v.item(),
            Err(RetroGradError::ShapeMismatch { .. })
        ));
        let s = g.scalar(5.0).unwrap();
        assert_eq!(s.item().unwrap(), 5.0);
    }

    #[test]
    fn test_requires_grad_only_on_leaves() {
        let g: Graph<f32> = Graph::new();
        let a = g.leaf(vec![1.0], vec![1]).unwrap();
        a.requires_grad_(true).unwrap();
        let b = a.mul_scalar(2.0).unwrap();
        assert!(!b.is_leaf());
        assert_eq!(
            b.requires_grad_(false),
            Err(RetroGradError::RequiresGradOnNonLeaf)
        );
    }

    #[test]
    fn test_detach_shares_data_and_leaves_graph() {
        let g: Graph<f32> = Graph::new();
        let a = g.leaf(vec![1.0, 2.0], vec![2]).unwrap();
        a.requires_grad_(true).unwrap();
        let b = a.mul_scalar(3.0).unwrap();
        let d = b.detach();
        assert_eq!(d.data(), b.data());
        assert!(d.is_leaf());
        assert!(!d.requires_grad());
    }

    #[test]
    fn test_set_data_checks_length_and_leafness() {
        let g: Graph<f32> = Graph::new();
        let a = g.leaf(vec![1.0, 2.0], vec![2]).unwrap();
        a.set_data(vec![5.0, 6.0]).unwrap();
        assert_eq!(a.data(), vec![5.0, 6.0]);
        assert!(matches!(
            a.set_data(vec![1.0]),
            Err(RetroGradError::ValueCreation { .. })
        ));
        a.requires_grad_(true).unwrap();
        let c = a.mul_scalar(2.0).unwrap();
        assert!(matches!(
            c.set_data(vec![0.0, 0.0]),
            Err(RetroGradError::UnsupportedOperation(_))
        ));
    }

    #[test]
    fn test_graph_mismatch() {
        let g1: Graph<f32> = Graph::new();
        let g2: Graph<f32> = Graph::new();
        let a = g1.leaf(vec![1.0], vec![1]).unwrap();
        let b = g2.leaf(vec![2.0], vec![1]).unwrap();
        assert_eq!(
            a.add(&b),
            Err(RetroGradError::GraphMismatch {
                operation: "add".to_string()
            })
        );
    }

    #[test]
    fn test_value_equality_is_by_contents() {
        let g: Graph<f32> = Graph::new();
        let a = g.leaf(vec![1.0, 2.0], vec![2]).unwrap();
        let b = g.leaf(vec![1.0, 2.0], vec![2]).unwrap();
        let c = g.leaf(vec![1.0, 2.0], vec![1, 2]).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
