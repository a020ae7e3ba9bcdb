// src/value/create.rs

use std::sync::Arc;

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::error::RetroGradError;
use crate::graph::Graph;
use crate::types::RetroNumeric;
use crate::value::Value;

impl<T: RetroNumeric> Graph<T> {
    /// Creates a leaf value from raw data and a shape.
    ///
    /// This is the primary constructor. The data is flat, row-major; its
    /// length must equal the product of the shape dimensions. Leaves default
    /// to `requires_grad=false`; use [`Value::requires_grad_`] to track them.
    pub fn leaf(&self, data: Vec<T>, shape: Vec<usize>) -> Result<Value<T>, RetroGradError> {
        let numel: usize = shape.iter().product();
        if data.len() != numel {
            return Err(RetroGradError::ValueCreation {
                data_len: data.len(),
                shape,
            });
        }
        let mut inner = self.write_inner();
        let id = inner.push_node(Arc::new(data), shape, false, None);
        drop(inner);
        Ok(Value::from_parts(self.clone(), id))
    }

    /// Creates a scalar leaf (empty shape, one element).
    pub fn scalar(&self, value: T) -> Result<Value<T>, RetroGradError> {
        self.leaf(vec![value], vec![])
    }

    /// Creates a leaf filled with zeros.
    pub fn zeros(&self, shape: &[usize]) -> Result<Value<T>, RetroGradError> {
        let numel: usize = shape.iter().product();
        self.leaf(vec![T::zero(); numel], shape.to_vec())
    }

    /// Creates a leaf filled with ones.
    pub fn ones(&self, shape: &[usize]) -> Result<Value<T>, RetroGradError> {
        let numel: usize = shape.iter().product();
        self.leaf(vec![T::one(); numel], shape.to_vec())
    }

    /// Creates a leaf filled with a specific value.
    pub fn full(&self, shape: &[usize], value: T) -> Result<Value<T>, RetroGradError> {
        let numel: usize = shape.iter().product();
        self.leaf(vec![value; numel], shape.to_vec())
    }

    /// Creates a leaf with elements drawn uniformly from `[0, 1)`.
    pub fn rand_uniform(&self, shape: &[usize]) -> Result<Value<T>, RetroGradError> {
        let numel: usize = shape.iter().product();
        let mut rng = rand::thread_rng();
        let data = (0..numel)
            .map(|_| element_from_f64(rng.gen::<f64>()))
            .collect::<Result<Vec<T>, RetroGradError>>()?;
        self.leaf(data, shape.to_vec())
    }

    /// Creates a leaf with elements drawn from the standard normal
    /// distribution.
    pub fn randn(&self, shape: &[usize]) -> Result<Value<T>, RetroGradError> {
        let numel: usize = shape.iter().product();
        let mut rng = rand::thread_rng();
        let data = (0..numel)
            .map(|_| {
                let sample: f64 = StandardNormal.sample(&mut rng);
                element_from_f64(sample)
            })
            .collect::<Result<Vec<T>, RetroGradError>>()?;
        self.leaf(data, shape.to_vec())
    }
}

fn element_from_f64<T: RetroNumeric>(value: f64) -> Result<T, RetroGradError> {
    T::from(value).ok_or_else(|| {
        RetroGradError::InternalError(format!("cannot represent sample {} in element type", value))
    })
}
