use crate::error::RetroGradError;
use crate::nn::parameter::Parameter;
use crate::optim::Optimizer;
use crate::types::RetroNumeric;

/// Plain gradient descent: `w <- w - lr * grad`.
///
/// Parameters without a gradient (frozen, or untouched by the last backward
/// pass) are skipped.
#[derive(Debug)]
pub struct Sgd<T: RetroNumeric = f32> {
    params: Vec<Parameter<T>>,
    lr: T,
}

impl<T: RetroNumeric> Sgd<T> {
    /// Creates a new optimizer over the given parameters.
    pub fn new(params: Vec<Parameter<T>>, lr: T) -> Self {
        Sgd { params, lr }
    }

    pub fn lr(&self) -> T {
        self.lr
    }

    pub fn set_lr(&mut self, lr: T) {
        self.lr = lr;
    }
}

impl<T: RetroNumeric> Optimizer<T> for Sgd<T> {
    fn step(&mut self) -> Result<(), RetroGradError> {
        for param in self.params.iter() {
            if !param.requires_grad() {
                continue;
            }
            let grad = match param.grad() {
                Some(grad) => grad,
                None => continue,
            };
            let lr = self.lr;
            let updated: Vec<T> = param
                .data()
                .iter()
                .zip(grad.iter())
                .map(|(&w, &g)| w - lr * g)
                .collect();
            param.set_data(updated)?;
        }
        log::trace!("sgd: stepped {} parameter(s)", self.params.len());
        Ok(())
    }

    fn zero_grad(&mut self) {
        for param in self.params.iter() {
            param.zero_grad();
        }
    }
}

// --- Tests ---
#[cfg(test)]
#[path = "sgd_test.rs"]
mod tests;
