use std::sync::Arc;

use crate::error::RetroGradError;
use crate::graph::record::{GradientRule, OpKind};
use crate::types::RetroNumeric;
use crate::value::Value;

/// Backward rule for negation: the input receives the negated output
/// gradient.
#[derive(Debug)]
struct NegBackward;

impl<T: RetroNumeric> GradientRule<T> for NegBackward {
    fn backward(&self, grad_output: &[T]) -> Result<Vec<Vec<T>>, RetroGradError> {
        Ok(vec![grad_output.iter().map(|&g| -g).collect()])
    }
}

/// Elementwise negation.
pub fn neg_op<T: RetroNumeric>(input: &Value<T>) -> Result<Value<T>, RetroGradError> {
    let graph = input.graph().clone();
    let mut inner = graph.write_inner();

    let node = inner.node(input.id());
    let out: Vec<T> = node.data.iter().map(|&x| -x).collect();
    let shape = node.shape.clone();
    let requires_grad = node.requires_grad;

    let producer = if requires_grad {
        Some(inner.push_record(OpKind::Neg, vec![input.id()], Box::new(NegBackward)))
    } else {
        None
    };
    let id = inner.push_node(Arc::new(out), shape, requires_grad, producer);
    drop(inner);
    Ok(Value::from_parts(graph, id))
}

// --- Tests ---
#[cfg(test)]
#[path = "neg_test.rs"]
mod tests;
