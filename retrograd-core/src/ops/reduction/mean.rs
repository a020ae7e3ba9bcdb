use std::sync::Arc;

use crate::error::RetroGradError;
use crate::graph::record::{GradientRule, OpKind};
use crate::types::{count_to_element, RetroNumeric};
use crate::value::Value;

/// Backward rule for the full mean: every input element receives the scalar
/// output gradient scaled by 1/n. The scale is captured at record-creation
/// time so the rule needs no cast during backward.
#[derive(Debug)]
struct MeanBackward<T: RetroNumeric> {
    input_numel: usize,
    inv_count: T,
}

impl<T: RetroNumeric> GradientRule<T> for MeanBackward<T> {
    fn backward(&self, grad_output: &[T]) -> Result<Vec<Vec<T>>, RetroGradError> {
        let g = grad_output.first().copied().ok_or_else(|| {
            RetroGradError::InternalError("empty gradient for mean output".to_string())
        })?;
        Ok(vec![vec![g * self.inv_count; self.input_numel]])
    }
}

/// Averages all elements of the value into a scalar (empty shape).
pub fn mean_op<T: RetroNumeric>(input: &Value<T>) -> Result<Value<T>, RetroGradError> {
    let graph = input.graph().clone();
    let mut inner = graph.write_inner();

    let node = inner.node(input.id());
    let input_numel = node.numel();
    if input_numel == 0 {
        return Err(RetroGradError::DivisionByZero);
    }
    let count: T = count_to_element(input_numel)?;
    let inv_count = T::one() / count;
    let total: T = node.data.iter().copied().sum();
    let requires_grad = node.requires_grad;

    let producer = if requires_grad {
        Some(inner.push_record(
            OpKind::Mean,
            vec![input.id()],
            Box::new(MeanBackward {
                input_numel,
                inv_count,
            }),
        ))
    } else {
        None
    };
    let id = inner.push_node(
        Arc::new(vec![total * inv_count]),
        vec![],
        requires_grad,
        producer,
    );
    drop(inner);
    Ok(Value::from_parts(graph, id))
}

// --- Tests ---
#[cfg(test)]
#[path = "mean_test.rs"]
mod tests;
