use std::sync::Arc;

use crate::error::RetroGradError;
use crate::graph::record::{GradientRule, OpKind};
use crate::types::RetroNumeric;
use crate::value::Value;

// --- Backward Operation Structure ---

/// Backward rule for 2-D matrix multiplication `c = a · b` with
/// `a: [m, k]`, `b: [k, n]`:
/// dc/da = grad · bᵀ and dc/db = aᵀ · grad.
#[derive(Debug)]
struct MatmulBackward<T: RetroNumeric> {
    a: Arc<Vec<T>>,
    b: Arc<Vec<T>>,
    m: usize,
    k: usize,
    n: usize,
}

impl<T: RetroNumeric> GradientRule<T> for MatmulBackward<T> {
    fn backward(&self, grad_output: &[T]) -> Result<Vec<Vec<T>>, RetroGradError> {
        let (m, k, n) = (self.m, self.k, self.n);

        // grad_a[i][p] = sum_j grad[i][j] * b[p][j]
        let mut grad_a = vec![T::zero(); m * k];
        for i in 0..m {
            for p in 0..k {
                let mut acc = T::zero();
                for j in 0..n {
                    acc += grad_output[i * n + j] * self.b[p * n + j];
                }
                grad_a[i * k + p] = acc;
            }
        }

        // grad_b[p][j] = sum_i a[i][p] * grad[i][j]
        let mut grad_b = vec![T::zero(); k * n];
        for p in 0..k {
            for j in 0..n {
                let mut acc = T::zero();
                for i in 0..m {
                    acc += self.a[i * k + p] * grad_output[i * n + j];
                }
                grad_b[p * n + j] = acc;
            }
        }

        Ok(vec![grad_a, grad_b])
    }
}

// --- Forward Operation ---

/// 2-D matrix multiplication: `[m, k] · [k, n] -> [m, n]`.
///
/// Both operands must be rank-2 with matching inner dimensions.
pub fn matmul_op<T: RetroNumeric>(a: &Value<T>, b: &Value<T>) -> Result<Value<T>, RetroGradError> {
    let graph = a.same_graph_as(b, "matmul")?;
    let mut inner = graph.write_inner();

    let (a_node, b_node) = (inner.node(a.id()), inner.node(b.id()));
    if a_node.shape.len() != 2 || b_node.shape.len() != 2 || a_node.shape[1] != b_node.shape[0] {
        return Err(RetroGradError::IncompatibleShapes {
            shape1: a_node.shape.clone(),
            shape2: b_node.shape.clone(),
        });
    }
    let (m, k, n) = (a_node.shape[0], a_node.shape[1], b_node.shape[1]);

    // Naive triple loop; the tensors in this crate are small.
    let mut out = vec![T::zero(); m * n];
    for i in 0..m {
        for p in 0..k {
            let lhs = a_node.data[i * k + p];
            for j in 0..n {
                out[i * n + j] += lhs * b_node.data[p * n + j];
            }
        }
    }

    let requires_grad = a_node.requires_grad || b_node.requires_grad;
    let saved = if requires_grad {
        Some((Arc::clone(&a_node.data), Arc::clone(&b_node.data)))
    } else {
        None
    };

    let producer = match saved {
        Some((a_data, b_data)) => Some(inner.push_record(
            OpKind::Matmul,
            vec![a.id(), b.id()],
            Box::new(MatmulBackward {
                a: a_data,
                b: b_data,
                m,
                k,
                n,
            }),
        )),
        None => None,
    };
    let id = inner.push_node(Arc::new(out), vec![m, n], requires_grad, producer);
    drop(inner);
    Ok(Value::from_parts(graph, id))
}

// --- Tests ---
#[cfg(test)]
#[path = "matmul_test.rs"]
mod tests;
