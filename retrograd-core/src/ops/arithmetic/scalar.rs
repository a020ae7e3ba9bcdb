//! Scalar-broadcast variants of the elementwise operators.
//!
//! Binary operators in this crate require identical shapes; combining a
//! value with a plain scalar goes through these dedicated ops instead of a
//! broadcasting rule.

use std::sync::Arc;

use crate::error::RetroGradError;
use crate::graph::record::{GradientRule, OpKind};
use crate::types::RetroNumeric;
use crate::value::Value;

/// Backward rule for scalar addition: the gradient flows through unchanged.
#[derive(Debug)]
struct AddScalarBackward;

impl<T: RetroNumeric> GradientRule<T> for AddScalarBackward {
    fn backward(&self, grad_output: &[T]) -> Result<Vec<Vec<T>>, RetroGradError> {
        Ok(vec![grad_output.to_vec()])
    }
}

/// Backward rule for scalar multiplication: the gradient is scaled by the
/// same constant.
#[derive(Debug)]
struct MulScalarBackward<T: RetroNumeric> {
    scalar: T,
}

impl<T: RetroNumeric> GradientRule<T> for MulScalarBackward<T> {
    fn backward(&self, grad_output: &[T]) -> Result<Vec<Vec<T>>, RetroGradError> {
        Ok(vec![grad_output.iter().map(|&g| g * self.scalar).collect()])
    }
}

/// Adds a scalar to each element of the value.
pub fn add_scalar_op<T: RetroNumeric>(
    input: &Value<T>,
    scalar: T,
) -> Result<Value<T>, RetroGradError> {
    let graph = input.graph().clone();
    let mut inner = graph.write_inner();

    let node = inner.node(input.id());
    let out: Vec<T> = node.data.iter().map(|&x| x + scalar).collect();
    let shape = node.shape.clone();
    let requires_grad = node.requires_grad;

    let producer = if requires_grad {
        Some(inner.push_record(
            OpKind::AddScalar,
            vec![input.id()],
            Box::new(AddScalarBackward),
        ))
    } else {
        None
    };
    let id = inner.push_node(Arc::new(out), shape, requires_grad, producer);
    drop(inner);
    Ok(Value::from_parts(graph, id))
}

/// Multiplies each element of the value by a scalar.
pub fn mul_scalar_op<T: RetroNumeric>(
    input: &Value<T>,
    scalar: T,
) -> Result<Value<T>, RetroGradError> {
    let graph = input.graph().clone();
    let mut inner = graph.write_inner();

    let node = inner.node(input.id());
    let out: Vec<T> = node.data.iter().map(|&x| x * scalar).collect();
    let shape = node.shape.clone();
    let requires_grad = node.requires_grad;

    let producer = if requires_grad {
        Some(inner.push_record(
            OpKind::MulScalar,
            vec![input.id()],
            Box::new(MulScalarBackward { scalar }),
        ))
    } else {
        None
    };
    let id = inner.push_node(Arc::new(out), shape, requires_grad, producer);
    drop(inner);
    Ok(Value::from_parts(graph, id))
}

// --- Tests ---
#[cfg(test)]
#[path = "scalar_test.rs"]
mod tests;
