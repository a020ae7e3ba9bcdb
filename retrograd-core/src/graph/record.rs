use std::fmt::Debug;

use crate::error::RetroGradError;
use crate::graph::ValueId;
use crate::types::RetroNumeric;

/// Identifies the traced operator of an [`OpRecord`].
///
/// Only used for logging and error context; the gradient behavior of a record
/// lives in its [`GradientRule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OpKind {
    Add,
    Sub,
    Mul,
    Div,
    Neg,
    Pow,
    AddScalar,
    MulScalar,
    Relu,
    Sum,
    Mean,
    Matmul,
    BiasAdd,
}

/// Defines the local gradient rule of a traced operation.
///
/// Every operator that produces a grad-requiring value stores one
/// implementation of this trait in its [`OpRecord`]. During the backward pass
/// the engine hands the rule the gradient flowing into the operation's output
/// and expects one gradient contribution per recorded input, in the order the
/// inputs were recorded. Each contribution must have the same element count
/// as the corresponding input; the engine checks this before accumulating.
///
/// Rules capture whatever forward-pass state they need (typically `Arc`
/// clones of the operand buffers) at record-creation time, so they stay valid
/// even if `requires_grad` flags are toggled afterwards.
pub(crate) trait GradientRule<T: RetroNumeric>: Debug + Send + Sync {
    fn backward(&self, grad_output: &[T]) -> Result<Vec<Vec<T>>, RetroGradError>;
}

/// One node of the operation arena: the operator, its input values, and the
/// rule that propagates gradients through it.
///
/// `rule` is dropped (set to `None`) when a non-retaining backward pass
/// consumes the record; a consumed record cannot be traversed again.
#[derive(Debug)]
pub(crate) struct OpRecord<T: RetroNumeric> {
    pub(crate) op: OpKind,
    pub(crate) inputs: Vec<ValueId>,
    pub(crate) rule: Option<Box<dyn GradientRule<T>>>,
}

impl<T: RetroNumeric> OpRecord<T> {
    pub(crate) fn new(op: OpKind, inputs: Vec<ValueId>, rule: Box<dyn GradientRule<T>>) -> Self {
        OpRecord {
            op,
            inputs,
            rule: Some(rule),
        }
    }

    pub(crate) fn is_consumed(&self) -> bool {
        self.rule.is_none()
    }
}
