use std::sync::Arc;

use crate::error::RetroGradError;
use crate::graph::record::{GradientRule, OpKind};
use crate::types::RetroNumeric;
use crate::value::Value;

// --- Backward Operation Structure ---

/// Backward rule for elementwise subtraction: the minuend receives the
/// output gradient, the subtrahend its negation.
#[derive(Debug)]
struct SubBackward;

impl<T: RetroNumeric> GradientRule<T> for SubBackward {
    fn backward(&self, grad_output: &[T]) -> Result<Vec<Vec<T>>, RetroGradError> {
        let grad_b: Vec<T> = grad_output.iter().map(|&g| -g).collect();
        Ok(vec![grad_output.to_vec(), grad_b])
    }
}

// --- Forward Operation ---

/// Elementwise subtraction of two values with identical shapes.
pub fn sub_op<T: RetroNumeric>(a: &Value<T>, b: &Value<T>) -> Result<Value<T>, RetroGradError> {
    let graph = a.same_graph_as(b, "sub")?;
    let mut inner = graph.write_inner();

    let (a_node, b_node) = (inner.node(a.id()), inner.node(b.id()));
    if a_node.shape != b_node.shape {
        return Err(RetroGradError::ShapeMismatch {
            expected: a_node.shape.clone(),
            actual: b_node.shape.clone(),
            operation: "sub".to_string(),
        });
    }
    let out: Vec<T> = a_node
        .data
        .iter()
        .zip(b_node.data.iter())
        .map(|(&x, &y)| x - y)
        .collect();
    let shape = a_node.shape.clone();
    let requires_grad = a_node.requires_grad || b_node.requires_grad;

    let producer = if requires_grad {
        Some(inner.push_record(OpKind::Sub, vec![a.id(), b.id()], Box::new(SubBackward)))
    } else {
        None
    };
    let id = inner.push_node(Arc::new(out), shape, requires_grad, producer);
    drop(inner);
    Ok(Value::from_parts(graph, id))
}

// --- Tests ---
#[cfg(test)]
#[path = "sub_test.rs"]
mod tests;
