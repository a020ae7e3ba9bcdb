use std::sync::Arc;

use crate::error::RetroGradError;
use crate::graph::record::{GradientRule, OpKind};
use crate::types::RetroNumeric;
use crate::value::Value;

// --- Backward Operation Structure ---

/// Backward rule for elementwise addition: both inputs receive the output
/// gradient unchanged.
#[derive(Debug)]
struct AddBackward;

impl<T: RetroNumeric> GradientRule<T> for AddBackward {
    fn backward(&self, grad_output: &[T]) -> Result<Vec<Vec<T>>, RetroGradError> {
        Ok(vec![grad_output.to_vec(), grad_output.to_vec()])
    }
}

// --- Forward Operation ---

/// Elementwise addition of two values with identical shapes.
pub fn add_op<T: RetroNumeric>(a: &Value<T>, b: &Value<T>) -> Result<Value<T>, RetroGradError> {
    let graph = a.same_graph_as(b, "add")?;
    let mut inner = graph.write_inner();

    let (a_node, b_node) = (inner.node(a.id()), inner.node(b.id()));
    if a_node.shape != b_node.shape {
        return Err(RetroGradError::ShapeMismatch {
            expected: a_node.shape.clone(),
            actual: b_node.shape.clone(),
            operation: "add".to_string(),
        });
    }
    let out: Vec<T> = a_node
        .data
        .iter()
        .zip(b_node.data.iter())
        .map(|(&x, &y)| x + y)
        .collect();
    let shape = a_node.shape.clone();
    let requires_grad = a_node.requires_grad || b_node.requires_grad;

    // --- Autograd Linkage ---
    let producer = if requires_grad {
        Some(inner.push_record(OpKind::Add, vec![a.id(), b.id()], Box::new(AddBackward)))
    } else {
        None
    };
    let id = inner.push_node(Arc::new(out), shape, requires_grad, producer);
    drop(inner);
    Ok(Value::from_parts(graph, id))
}

// --- Tests ---
#[cfg(test)]
#[path = "add_test.rs"]
mod tests;
