use std::fmt;
use std::ops::Deref;

use crate::error::RetroGradError;
use crate::types::RetroNumeric;
use crate::value::Value;

/// A wrapper around a leaf [`Value`] indicating it is a learnable parameter
/// of a [`crate::nn::Module`]. Parameters automatically have `requires_grad`
/// set to `true`.
pub struct Parameter<T: RetroNumeric = f32>(Value<T>);

impl<T: RetroNumeric> Parameter<T> {
    /// Creates a new Parameter from a leaf value, enabling gradient
    /// tracking on it.
    pub fn new(value: Value<T>) -> Result<Self, RetroGradError> {
        value.requires_grad_(true)?; // Fails on non-leaf values
        Ok(Parameter(value))
    }

    /// Consumes the Parameter and returns the underlying value handle.
    pub fn into_inner(self) -> Value<T> {
        self.0
    }

    /// Freezes or unfreezes the parameter. Frozen parameters stop acquiring
    /// gradients from subsequent backward passes.
    pub fn set_frozen(&self, frozen: bool) -> Result<(), RetroGradError> {
        self.0.requires_grad_(!frozen)
    }
}

// Allow accessing the underlying Value immutably via Deref.
impl<T: RetroNumeric> Deref for Parameter<T> {
    type Target = Value<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: RetroNumeric> fmt::Debug for Parameter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parameter({:?})", self.0)
    }
}

impl<T: RetroNumeric> Clone for Parameter<T> {
    /// Cloning a Parameter clones the underlying handle (shared node).
    fn clone(&self) -> Self {
        Parameter(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;

    #[test]
    fn test_parameter_requires_grad() {
        let g: Graph<f32> = Graph::new();
        let p = Parameter::new(g.zeros(&[2, 2]).unwrap()).unwrap();
        assert!(p.requires_grad());
    }

    #[test]
    fn test_parameter_rejects_non_leaf() {
        let g: Graph<f32> = Graph::new();
        let a = g.ones(&[2]).unwrap();
        a.requires_grad_(true).unwrap();
        let b = a.mul_scalar(2.0).unwrap();
        assert_eq!(
            Parameter::new(b).unwrap_err(),
            RetroGradError::RequiresGradOnNonLeaf
        );
    }

    #[test]
    fn test_parameter_freeze_toggle() {
        let g: Graph<f32> = Graph::new();
        let p = Parameter::new(g.ones(&[2]).unwrap()).unwrap();
        p.set_frozen(true).unwrap();
        assert!(!p.requires_grad());
        p.set_frozen(false).unwrap();
        assert!(p.requires_grad());
    }
}
