use std::sync::Arc;

use crate::error::RetroGradError;
use crate::graph::record::{GradientRule, OpKind};
use crate::types::RetroNumeric;
use crate::value::Value;

/// Backward rule for the full sum: the scalar output gradient is broadcast
/// back to every input element.
#[derive(Debug)]
struct SumBackward {
    input_numel: usize,
}

impl<T: RetroNumeric> GradientRule<T> for SumBackward {
    fn backward(&self, grad_output: &[T]) -> Result<Vec<Vec<T>>, RetroGradError> {
        let g = grad_output.first().copied().ok_or_else(|| {
            RetroGradError::InternalError("empty gradient for sum output".to_string())
        })?;
        Ok(vec![vec![g; self.input_numel]])
    }
}

/// Sums all elements of the value into a scalar (empty shape).
pub fn sum_op<T: RetroNumeric>(input: &Value<T>) -> Result<Value<T>, RetroGradError> {
    let graph = input.graph().clone();
    let mut inner = graph.write_inner();

    let node = inner.node(input.id());
    let total: T = node.data.iter().copied().sum();
    let requires_grad = node.requires_grad;
    let input_numel = node.numel();

    let producer = if requires_grad {
        Some(inner.push_record(
            OpKind::Sum,
            vec![input.id()],
            Box::new(SumBackward { input_numel }),
        ))
    } else {
        None
    };
    let id = inner.push_node(Arc::new(vec![total]), vec![], requires_grad, producer);
    drop(inner);
    Ok(Value::from_parts(graph, id))
}

// --- Tests ---
#[cfg(test)]
#[path = "sum_test.rs"]
mod tests;
