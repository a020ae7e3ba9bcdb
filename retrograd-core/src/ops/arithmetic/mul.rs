use std::sync::Arc;

use crate::error::RetroGradError;
use crate::graph::record::{GradientRule, OpKind};
use crate::types::RetroNumeric;
use crate::value::Value;

// --- Backward Operation Structure ---

/// Backward rule for elementwise multiplication.
///
/// Captures `Arc` clones of both operand buffers at record-creation time:
/// for `c = a * b`, dc/da = b and dc/db = a.
#[derive(Debug)]
struct MulBackward<T: RetroNumeric> {
    a: Arc<Vec<T>>,
    b: Arc<Vec<T>>,
}

impl<T: RetroNumeric> GradientRule<T> for MulBackward<T> {
    fn backward(&self, grad_output: &[T]) -> Result<Vec<Vec<T>>, RetroGradError> {
        let grad_a: Vec<T> = grad_output
            .iter()
            .zip(self.b.iter())
            .map(|(&g, &y)| g * y)
            .collect();
        let grad_b: Vec<T> = grad_output
            .iter()
            .zip(self.a.iter())
            .map(|(&g, &x)| g * x)
            .collect();
        Ok(vec![grad_a, grad_b])
    }
}

// --- Forward Operation ---

/// Elementwise multiplication of two values with identical shapes.
pub fn mul_op<T: RetroNumeric>(a: &Value<T>, b: &Value<T>) -> Result<Value<T>, RetroGradError> {
    let graph = a.same_graph_as(b, "mul")?;
    let mut inner = graph.write_inner();

    let (a_node, b_node) = (inner.node(a.id()), inner.node(b.id()));
    if a_node.shape != b_node.shape {
        return Err(RetroGradError::ShapeMismatch {
            expected: a_node.shape.clone(),
            actual: b_node.shape.clone(),
            operation: "mul".to_string(),
        });
    }
    let out: Vec<T> = a_node
        .data
        .iter()
        .zip(b_node.data.iter())
        .map(|(&x, &y)| x * y)
        .collect();
    let shape = a_node.shape.clone();
    let requires_grad = a_node.requires_grad || b_node.requires_grad;
    let saved = if requires_grad {
        Some((Arc::clone(&a_node.data), Arc::clone(&b_node.data)))
    } else {
        None
    };

    let producer = match saved {
        Some((a_data, b_data)) => Some(inner.push_record(
            OpKind::Mul,
            vec![a.id(), b.id()],
            Box::new(MulBackward {
                a: a_data,
                b: b_data,
            }),
        )),
        None => None,
    };
    let id = inner.push_node(Arc::new(out), shape, requires_grad, producer);
    drop(inner);
    Ok(Value::from_parts(graph, id))
}

// --- Tests ---
#[cfg(test)]
#[path = "mul_test.rs"]
mod tests;
