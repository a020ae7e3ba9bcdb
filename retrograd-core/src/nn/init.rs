use rand::Rng;

use crate::error::RetroGradError;
use crate::graph::Graph;
use crate::types::RetroNumeric;
use crate::value::Value;

/// Creates a leaf with elements drawn uniformly from `[-bound, bound]`
/// where `bound = 1/sqrt(fan_in)`.
///
/// This is the default weight initialization of the linear layer.
pub fn uniform_fan_in<T: RetroNumeric>(
    graph: &Graph<T>,
    fan_in: usize,
    shape: &[usize],
) -> Result<Value<T>, RetroGradError> {
    if fan_in == 0 {
        return Err(RetroGradError::UnsupportedOperation(
            "uniform_fan_in requires fan_in > 0".to_string(),
        ));
    }
    let bound = 1.0 / (fan_in as f64).sqrt();
    let numel: usize = shape.iter().product();
    let mut rng = rand::thread_rng();
    let data = (0..numel)
        .map(|_| {
            let sample = rng.gen_range(-bound..bound);
            T::from(sample).ok_or_else(|| {
                RetroGradError::InternalError(format!(
                    "cannot represent sample {} in element type",
                    sample
                ))
            })
        })
        .collect::<Result<Vec<T>, RetroGradError>>()?;
    graph.leaf(data, shape.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_fan_in_bounds() {
        let g: Graph<f32> = Graph::new();
        let w = uniform_fan_in(&g, 4, &[4, 8]).unwrap();
        assert_eq!(w.shape(), vec![4, 8]);
        // bound = 1/sqrt(4) = 0.5
        assert!(w.data().iter().all(|&x| x.abs() <= 0.5));
    }

    #[test]
    fn test_uniform_fan_in_rejects_zero_fan_in() {
        let g: Graph<f32> = Graph::new();
        assert!(uniform_fan_in(&g, 0, &[1]).is_err());
    }
}
