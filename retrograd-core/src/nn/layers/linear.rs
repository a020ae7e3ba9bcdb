use std::sync::Arc;

use crate::error::RetroGradError;
use crate::graph::record::{GradientRule, OpKind};
use crate::graph::Graph;
use crate::nn::init::uniform_fan_in;
use crate::nn::module::Module;
use crate::nn::parameter::Parameter;
use crate::ops::linalg::matmul_op;
use crate::types::RetroNumeric;
use crate::value::Value;

/// Applies a linear transformation to the incoming data: `y = x · W (+ b)`.
///
/// The weight is stored `[in_features, out_features]` so the forward pass is
/// a plain matmul; the optional bias `[out_features]` is added to every row.
#[derive(Debug)]
pub struct Linear<T: RetroNumeric = f32> {
    weight: Parameter<T>,
    bias: Option<Parameter<T>>,
    in_features: usize,
    out_features: usize,
}

impl<T: RetroNumeric> Linear<T> {
    /// Creates a new Linear layer with uniformly initialized weights.
    ///
    /// # Arguments
    /// * `graph` - The graph the parameters are created in.
    /// * `in_features` - Size of each input sample.
    /// * `out_features` - Size of each output sample.
    /// * `has_bias` - If `true`, the layer learns an additive bias.
    pub fn new(
        graph: &Graph<T>,
        in_features: usize,
        out_features: usize,
        has_bias: bool,
    ) -> Result<Self, RetroGradError> {
        let weight_value = uniform_fan_in(graph, in_features, &[in_features, out_features])?;
        let weight = Parameter::new(weight_value)?;
        let bias = if has_bias {
            Some(Parameter::new(graph.zeros(&[out_features])?)?)
        } else {
            None
        };
        Ok(Linear {
            weight,
            bias,
            in_features,
            out_features,
        })
    }

    pub fn in_features(&self) -> usize {
        self.in_features
    }

    pub fn out_features(&self) -> usize {
        self.out_features
    }

    /// The weight parameter, shaped `[in_features, out_features]`.
    pub fn weight(&self) -> &Parameter<T> {
        &self.weight
    }

    /// The bias parameter, if the layer has one.
    pub fn bias(&self) -> Option<&Parameter<T>> {
        self.bias.as_ref()
    }
}

impl<T: RetroNumeric> Module<T> for Linear<T> {
    fn forward(&self, input: &Value<T>) -> Result<Value<T>, RetroGradError> {
        let output = matmul_op(input, &self.weight)?;
        match &self.bias {
            Some(bias) => bias_add_op(&output, bias),
            None => Ok(output),
        }
    }

    fn parameters(&self) -> Vec<&Parameter<T>> {
        let mut params = Vec::with_capacity(2);
        params.push(&self.weight);
        if let Some(ref bias) = self.bias {
            params.push(bias);
        }
        params
    }
}

// --- Row-broadcast bias addition ---

/// Backward rule for the bias addition: the matrix input receives the
/// gradient unchanged, the bias the column sums over the batch axis.
#[derive(Debug)]
struct BiasAddBackward {
    rows: usize,
    cols: usize,
}

impl<T: RetroNumeric> GradientRule<T> for BiasAddBackward {
    fn backward(&self, grad_output: &[T]) -> Result<Vec<Vec<T>>, RetroGradError> {
        let mut grad_bias = vec![T::zero(); self.cols];
        for i in 0..self.rows {
            for j in 0..self.cols {
                grad_bias[j] += grad_output[i * self.cols + j];
            }
        }
        Ok(vec![grad_output.to_vec(), grad_bias])
    }
}

/// Adds a `[cols]` bias to every row of a `[rows, cols]` value.
fn bias_add_op<T: RetroNumeric>(
    input: &Value<T>,
    bias: &Value<T>,
) -> Result<Value<T>, RetroGradError> {
    let graph = input.same_graph_as(bias, "bias_add")?;
    let mut inner = graph.write_inner();

    let (input_node, bias_node) = (inner.node(input.id()), inner.node(bias.id()));
    if input_node.shape.len() != 2
        || bias_node.shape.len() != 1
        || input_node.shape[1] != bias_node.shape[0]
    {
        return Err(RetroGradError::IncompatibleShapes {
            shape1: input_node.shape.clone(),
            shape2: bias_node.shape.clone(),
        });
    }
    let (rows, cols) = (input_node.shape[0], input_node.shape[1]);

    let mut out = Vec::with_capacity(rows * cols);
    for i in 0..rows {
        for j in 0..cols {
            out.push(input_node.data[i * cols + j] + bias_node.data[j]);
        }
    }
    let requires_grad = input_node.requires_grad || bias_node.requires_grad;

    let producer = if requires_grad {
        Some(inner.push_record(
            OpKind::BiasAdd,
            vec![input.id(), bias.id()],
            Box::new(BiasAddBackward { rows, cols }),
        ))
    } else {
        None
    };
    let id = inner.push_node(Arc::new(out), vec![rows, cols], requires_grad, producer);
    drop(inner);
    Ok(Value::from_parts(graph, id))
}

// --- Tests ---
#[cfg(test)]
#[path = "linear_test.rs"]
mod tests;
