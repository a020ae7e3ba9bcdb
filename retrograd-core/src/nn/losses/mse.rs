// src/nn/losses/mse.rs

use crate::error::RetroGradError;
use crate::ops::arithmetic::{mul_op, sub_op};
use crate::ops::reduction::{mean_op, sum_op};
use crate::types::RetroNumeric;
use crate::value::Value;

/// Specifies the reduction to apply to the squared errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    Mean,
    Sum,
}

/// Computes the Mean Squared Error (MSE) loss between input and target
/// values.
///
/// The loss is composed from the primitive traced operators, so the backward
/// pass needs no dedicated rule: `loss = reduce((input - target)^2)`.
#[derive(Debug, Clone)]
pub struct MseLoss {
    reduction: Reduction,
}

impl MseLoss {
    /// Creates a new `MseLoss` with the given reduction.
    pub fn new(reduction: Reduction) -> Self {
        MseLoss { reduction }
    }

    /// Computes the loss as a scalar value on the inputs' graph.
    pub fn calculate<T: RetroNumeric>(
        &self,
        input: &Value<T>,
        target: &Value<T>,
    ) -> Result<Value<T>, RetroGradError> {
        if input.shape() != target.shape() {
            return Err(RetroGradError::ShapeMismatch {
                expected: target.shape(),
                actual: input.shape(),
                operation: "mse_loss".to_string(),
            });
        }

        let diff = sub_op(input, target)?;
        let squared = mul_op(&diff, &diff)?;
        match self.reduction {
            Reduction::Mean => mean_op(&squared),
            Reduction::Sum => sum_op(&squared),
        }
    }
}

impl Default for MseLoss {
    fn default() -> Self {
        MseLoss::new(Reduction::Mean)
    }
}
