pub mod sgd;

pub use sgd::Sgd;

use crate::error::RetroGradError;
use crate::types::RetroNumeric;

/// Trait defining the common interface for optimizers.
///
/// Optimizers update parameters from their accumulated gradients.
pub trait Optimizer<T: RetroNumeric> {
    /// Performs a single optimization step over all managed parameters.
    fn step(&mut self) -> Result<(), RetroGradError>;

    /// Clears the gradients of all managed parameters.
    ///
    /// Typically called after each step so gradients do not carry over into
    /// the next iteration.
    fn zero_grad(&mut self);
}
