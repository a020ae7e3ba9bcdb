use std::sync::Arc;

use crate::error::RetroGradError;
use crate::graph::record::{GradientRule, OpKind};
use crate::types::RetroNumeric;
use crate::value::Value;

/// Backward rule for ReLU: the gradient passes through where the input was
/// strictly positive and is zeroed elsewhere.
#[derive(Debug)]
struct ReluBackward<T: RetroNumeric> {
    input: Arc<Vec<T>>,
}

impl<T: RetroNumeric> GradientRule<T> for ReluBackward<T> {
    fn backward(&self, grad_output: &[T]) -> Result<Vec<Vec<T>>, RetroGradError> {
        let grad: Vec<T> = grad_output
            .iter()
            .zip(self.input.iter())
            .map(|(&g, &x)| if x > T::zero() { g } else { T::zero() })
            .collect();
        Ok(vec![grad])
    }
}

/// Rectified linear unit: `max(x, 0)` elementwise.
pub fn relu_op<T: RetroNumeric>(input: &Value<T>) -> Result<Value<T>, RetroGradError> {
    let graph = input.graph().clone();
    let mut inner = graph.write_inner();

    let node = inner.node(input.id());
    let out: Vec<T> = node.data.iter().map(|&x| x.max(T::zero())).collect();
    let shape = node.shape.clone();
    let requires_grad = node.requires_grad;
    let saved = if requires_grad {
        Some(Arc::clone(&node.data))
    } else {
        None
    };

    let producer = match saved {
        Some(input_data) => Some(inner.push_record(
            OpKind::Relu,
            vec![input.id()],
            Box::new(ReluBackward { input: input_data }),
        )),
        None => None,
    };
    let id = inner.push_node(Arc::new(out), shape, requires_grad, producer);
    drop(inner);
    Ok(Value::from_parts(graph, id))
}

// --- Tests ---
#[cfg(test)]
#[path = "relu_test.rs"]
mod tests;
