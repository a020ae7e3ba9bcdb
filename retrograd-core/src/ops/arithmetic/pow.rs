// src/ops/arithmetic/pow.rs

use std::sync::Arc;

use crate::error::RetroGradError;
use crate::graph::record::{GradientRule, OpKind};
use crate::types::RetroNumeric;
use crate::value::Value;

// --- Backward Operation ---

/// Backward rule for `c = base^n` with a scalar exponent:
/// dc/dbase = n * base^(n-1).
#[derive(Debug)]
struct PowBackward<T: RetroNumeric> {
    base: Arc<Vec<T>>,
    exponent: T,
}

impl<T: RetroNumeric> GradientRule<T> for PowBackward<T> {
    fn backward(&self, grad_output: &[T]) -> Result<Vec<Vec<T>>, RetroGradError> {
        let n = self.exponent;
        let grad: Vec<T> = grad_output
            .iter()
            .zip(self.base.iter())
            .map(|(&g, &x)| g * n * x.powf(n - T::one()))
            .collect();
        Ok(vec![grad])
    }
}

// --- Forward Operation ---

/// Raises each element of the value to the power of the given scalar
/// exponent.
pub fn pow_op<T: RetroNumeric>(base: &Value<T>, exponent: T) -> Result<Value<T>, RetroGradError> {
    let graph = base.graph().clone();
    let mut inner = graph.write_inner();

    let node = inner.node(base.id());
    let out: Vec<T> = node.data.iter().map(|&x| x.powf(exponent)).collect();
    let shape = node.shape.clone();
    let requires_grad = node.requires_grad;
    let saved = if requires_grad {
        Some(Arc::clone(&node.data))
    } else {
        None
    };

    let producer = match saved {
        Some(base_data) => Some(inner.push_record(
            OpKind::Pow,
            vec![base.id()],
            Box::new(PowBackward {
                base: base_data,
                exponent,
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
#[path = "pow_test.rs"]
mod tests;
