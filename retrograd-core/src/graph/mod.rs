// src/graph/mod.rs

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::graph::record::{GradientRule, OpKind, OpRecord};
use crate::types::RetroNumeric;

pub(crate) mod backward;
pub mod grad_check;
pub(crate) mod record;
pub(crate) mod topo;

/// Index of a value node inside a [`Graph`] arena.
pub type ValueId = usize;

/// Index of an operation record inside a [`Graph`] arena.
pub type OpId = usize;

/// Internal storage for a single value node.
///
/// Holds the data buffer, shape metadata and autograd state. The buffer is
/// wrapped in an `Arc` so gradient rules and detached values can share it
/// without copying.
#[derive(Debug)]
pub(crate) struct ValueNode<T: RetroNumeric> {
    /// Flattened row-major element buffer.
    pub(crate) data: Arc<Vec<T>>,
    /// The shape (dimensions) of the value. An empty shape is a scalar.
    pub(crate) shape: Vec<usize>,
    /// Flag indicating whether operations on this value are tracked.
    pub(crate) requires_grad: bool,
    /// Accumulated gradient, populated on leaves during the backward pass.
    pub(crate) grad: Option<Vec<T>>,
    /// The record that produced this value. Leaves have no producer.
    pub(crate) producer: Option<OpId>,
}

impl<T: RetroNumeric> ValueNode<T> {
    pub(crate) fn numel(&self) -> usize {
        self.data.len()
    }
}

/// The two arenas behind a [`Graph`]: value nodes and operation records.
///
/// Records are always pushed before the node they produce, so every record's
/// inputs have strictly smaller indices than its output, which is the acyclicity
/// invariant the backward engine relies on (and still defensively checks).
#[derive(Debug)]
pub(crate) struct GraphInner<T: RetroNumeric> {
    pub(crate) nodes: Vec<ValueNode<T>>,
    pub(crate) records: Vec<OpRecord<T>>,
}

impl<T: RetroNumeric> GraphInner<T> {
    pub(crate) fn node(&self, id: ValueId) -> &ValueNode<T> {
        self.nodes.get(id).expect("stale or foreign ValueId")
    }

    pub(crate) fn node_mut(&mut self, id: ValueId) -> &mut ValueNode<T> {
        self.nodes.get_mut(id).expect("stale or foreign ValueId")
    }

    pub(crate) fn push_node(
        &mut self,
        data: Arc<Vec<T>>,
        shape: Vec<usize>,
        requires_grad: bool,
        producer: Option<OpId>,
    ) -> ValueId {
        let id = self.nodes.len();
        self.nodes.push(ValueNode {
            data,
            shape,
            requires_grad,
            grad: None,
            producer,
        });
        id
    }

    pub(crate) fn push_record(
        &mut self,
        op: OpKind,
        inputs: Vec<ValueId>,
        rule: Box<dyn GradientRule<T>>,
    ) -> OpId {
        let id = self.records.len();
        self.records.push(OpRecord::new(op, inputs, rule));
        id
    }
}

/// A computation graph: an arena of value nodes and operation records.
///
/// `Graph` uses `Arc<RwLock<GraphInner>>` internally so that:
/// 1. **Shared ownership:** every [`crate::value::Value`] handle carries a
///    cheap clone of its graph.
/// 2. **Interior mutability:** forward evaluation appends nodes/records and
///    the backward pass writes gradients through shared handles; the `RwLock`
///    serializes those writes, which is all the synchronization gradient
///    accumulation needs.
///
/// All traced operators take value handles and return new handles into the
/// same graph; mixing handles from two graphs is a `GraphMismatch` error.
pub struct Graph<T: RetroNumeric = f32> {
    pub(crate) inner: Arc<RwLock<GraphInner<T>>>,
}

impl<T: RetroNumeric> Graph<T> {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Graph {
            inner: Arc::new(RwLock::new(GraphInner {
                nodes: Vec::new(),
                records: Vec::new(),
            })),
        }
    }

    /// Acquires a read lock on the graph arenas.
    /// Panics if the RwLock is poisoned.
    pub(crate) fn read_inner(&self) -> RwLockReadGuard<'_, GraphInner<T>> {
        self.inner.read().expect("RwLock poisoned")
    }

    /// Acquires a write lock on the graph arenas.
    /// Panics if the RwLock is poisoned.
    pub(crate) fn write_inner(&self) -> RwLockWriteGuard<'_, GraphInner<T>> {
        self.inner.write().expect("RwLock poisoned")
    }

    /// Returns `true` if `other` is a handle to the same underlying arena.
    pub(crate) fn same_graph(&self, other: &Graph<T>) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Number of value nodes currently in the graph.
    pub fn num_values(&self) -> usize {
        self.read_inner().nodes.len()
    }

    /// Number of operation records currently in the graph.
    ///
    /// Operators whose inputs all have `requires_grad=false` allocate no
    /// record, so this counts only traced operations.
    pub fn num_records(&self) -> usize {
        self.read_inner().records.len()
    }

    /// Clears the stored gradient of every value node in the graph.
    pub fn zero_gradients(&self) {
        let mut inner = self.write_inner();
        for node in inner.nodes.iter_mut() {
            node.grad = None;
        }
    }
}

impl<T: RetroNumeric> Default for Graph<T> {
    fn default() -> Self {
        Graph::new()
    }
}

impl<T: RetroNumeric> Clone for Graph<T> {
    fn clone(&self) -> Self {
        Graph {
            inner: Arc::clone(&self.inner), // Clone the Arc, not the arenas
        }
    }
}

impl<T: RetroNumeric> std::fmt::Debug for Graph<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.read_inner();
        f.debug_struct("Graph")
            .field("values", &inner.nodes.len())
            .field("records", &inner.records.len())
            .finish()
    }
}
