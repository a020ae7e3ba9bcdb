use thiserror::Error;

/// Custom error type for the RetroGrad engine.
#[derive(Error, Debug, PartialEq, Clone)] // PartialEq for easier testing
pub enum RetroGradError {
    #[error("Shape mismatch: expected {expected:?}, got {actual:?} during operation {operation}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
        operation: String,
    },

    #[error("Value creation error: data length {data_len} does not match shape {shape:?}")]
    ValueCreation { data_len: usize, shape: Vec<usize> },

    #[error("Incompatible shapes for operation: {shape1:?} and {shape2:?}")]
    IncompatibleShapes {
        shape1: Vec<usize>,
        shape2: Vec<usize>,
    },

    #[error("Backward called on non-scalar value without an explicit seed gradient.")]
    BackwardNonScalar,

    #[error("Backward requested through a value with no tracked path to a leaf requiring gradients.")]
    NoGradientPath,

    #[error("Backward called through records already consumed by a previous backward pass; pass retain_graph=true to traverse the graph again.")]
    GraphConsumed,

    #[error("Cycle detected in the computation graph during backward pass.")]
    CycleDetected,

    #[error("Values belong to different graphs during operation {operation}")]
    GraphMismatch { operation: String },

    #[error("Cannot change requires_grad on a non-leaf value.")]
    RequiresGradOnNonLeaf,

    #[error("Division by zero error")]
    DivisionByZero,

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}
