use retrograd_core::{Graph, Value};

/// Creates an f32 leaf for testing purposes.
#[allow(dead_code)]
pub fn leaf(graph: &Graph<f32>, data: Vec<f32>, shape: Vec<usize>) -> Value<f32> {
    graph.leaf(data, shape).expect("Failed to create test leaf")
}

/// Creates an f32 leaf that requires gradients for testing.
pub fn leaf_with_grad(graph: &Graph<f32>, data: Vec<f32>, shape: Vec<usize>) -> Value<f32> {
    let value = graph
        .leaf(data, shape)
        .expect("Failed to create test leaf with grad");
    value
        .requires_grad_(true)
        .expect("Failed to enable gradients on test leaf");
    value
}

/// Asserts two gradient buffers match within tolerance.
pub fn assert_grad_near(actual: &[f32], expected: &[f32], tolerance: f32) {
    assert_eq!(actual.len(), expected.len(), "Gradient length mismatch");
    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        assert!(
            (a - e).abs() <= tolerance,
            "Gradient mismatch at index {}: actual={}, expected={}",
            i,
            a,
            e
        );
    }
}
