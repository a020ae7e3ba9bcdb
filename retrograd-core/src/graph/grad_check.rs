//! Finite-difference validation of analytic gradients.
//!
//! `check_grad` rebuilds a user-supplied forward expression on fresh graphs
//! with perturbed leaves and compares the central-difference quotient with
//! the gradient produced by the backward engine.

use approx::relative_eq;
use thiserror::Error;

use crate::error::RetroGradError;
use crate::graph::Graph;
use crate::types::RetroNumeric;
use crate::value::Value;

/// Error type specifically for gradient checking failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradCheckError {
    #[error("Gradient check failed for input {input_index}, element {element_index}: analytical {analytical:?} != numerical {numerical:?} (difference {difference:?})")]
    GradientMismatch {
        input_index: usize,
        element_index: usize,
        analytical: f64,
        numerical: f64,
        difference: f64,
    },

    #[error("Forward function execution failed during gradient check: {0}")]
    ForwardPassError(RetroGradError),

    #[error("Backward pass execution failed during gradient check: {0}")]
    BackwardPassError(RetroGradError),

    #[error("Forward function must produce a scalar output, got shape {shape:?}")]
    NonScalarOutput { shape: Vec<usize> },

    #[error("Input {input_index} requires grad but has no gradient after the backward pass.")]
    MissingAnalyticalGrad { input_index: usize },

    #[error("Numerical gradient is NaN or infinite for input {input_index}, element {element_index}.")]
    NumericalGradNotFinite {
        input_index: usize,
        element_index: usize,
    },
}

impl From<RetroGradError> for GradCheckError {
    fn from(err: RetroGradError) -> Self {
        GradCheckError::ForwardPassError(err)
    }
}

/// Checks analytical gradients against numerical gradients using central
/// finite differences.
///
/// `func` must build a scalar expression from the given leaves; it is
/// re-evaluated on a fresh graph for every perturbed element, so it should
/// be a pure function of its inputs.
///
/// # Arguments
/// * `func`: Builds the expression under test from leaf values.
/// * `inputs`: The leaf buffers and shapes, all of which are treated as
///   requiring gradients for the analytic pass.
/// * `epsilon`: Perturbation magnitude for the finite differences.
/// * `tolerance`: Maximum relative difference accepted between analytic and
///   numerical gradients.
pub fn check_grad<T, F>(
    func: F,
    inputs: &[(Vec<T>, Vec<usize>)],
    epsilon: T,
    tolerance: f64,
) -> Result<(), GradCheckError>
where
    T: RetroNumeric,
    F: Fn(&Graph<T>, &[Value<T>]) -> Result<Value<T>, RetroGradError>,
{
    // --- 1. Analytic pass ---
    let graph: Graph<T> = Graph::new();
    let leaves = inputs
        .iter()
        .map(|(data, shape)| {
            let leaf = graph.leaf(data.clone(), shape.clone())?;
            leaf.requires_grad_(true)?;
            Ok(leaf)
        })
        .collect::<Result<Vec<Value<T>>, RetroGradError>>()?;

    let output = func(&graph, &leaves).map_err(GradCheckError::ForwardPassError)?;
    if output.numel() != 1 {
        return Err(GradCheckError::NonScalarOutput {
            shape: output.shape(),
        });
    }
    output
        .backward()
        .map_err(GradCheckError::BackwardPassError)?;

    let analytic: Vec<Vec<T>> = leaves
        .iter()
        .enumerate()
        .map(|(input_index, leaf)| {
            leaf.grad()
                .ok_or(GradCheckError::MissingAnalyticalGrad { input_index })
        })
        .collect::<Result<_, _>>()?;

    // --- 2. Numerical pass, one element at a time ---
    let two_eps = epsilon.to_f64().unwrap_or(f64::NAN) * 2.0;
    for (input_index, (data, _)) in inputs.iter().enumerate() {
        for element_index in 0..data.len() {
            let loss_plus = eval_perturbed(&func, inputs, input_index, element_index, epsilon)?;
            let loss_minus = eval_perturbed(&func, inputs, input_index, element_index, -epsilon)?;
            let numerical = (loss_plus - loss_minus) / two_eps;
            if !numerical.is_finite() {
                return Err(GradCheckError::NumericalGradNotFinite {
                    input_index,
                    element_index,
                });
            }
            let analytical = analytic[input_index][element_index]
                .to_f64()
                .unwrap_or(f64::NAN);
            if !relative_eq!(
                analytical,
                numerical,
                epsilon = tolerance,
                max_relative = tolerance
            ) {
                return Err(GradCheckError::GradientMismatch {
                    input_index,
                    element_index,
                    analytical,
                    numerical,
                    difference: (analytical - numerical).abs(),
                });
            }
        }
    }
    Ok(())
}

/// Re-evaluates `func` on a fresh graph with one input element perturbed by
/// `delta`. No gradients are requested, so the evaluation allocates no
/// records.
fn eval_perturbed<T, F>(
    func: &F,
    inputs: &[(Vec<T>, Vec<usize>)],
    input_index: usize,
    element_index: usize,
    delta: T,
) -> Result<f64, GradCheckError>
where
    T: RetroNumeric,
    F: Fn(&Graph<T>, &[Value<T>]) -> Result<Value<T>, RetroGradError>,
{
    let graph: Graph<T> = Graph::new();
    let leaves = inputs
        .iter()
        .enumerate()
        .map(|(idx, (data, shape))| {
            let mut data = data.clone();
            if idx == input_index {
                data[element_index] = data[element_index] + delta;
            }
            graph.leaf(data, shape.clone())
        })
        .collect::<Result<Vec<Value<T>>, RetroGradError>>()?;

    let output = func(&graph, &leaves).map_err(GradCheckError::ForwardPassError)?;
    if output.numel() != 1 {
        return Err(GradCheckError::NonScalarOutput {
            shape: output.shape(),
        });
    }
    let value = output.item().map_err(GradCheckError::ForwardPassError)?;
    Ok(value.to_f64().unwrap_or(f64::NAN))
}
