use crate::error::RetroGradError;
use crate::graph::Graph;
use crate::ops::reduction::mean_op;

#[test]
fn test_mean_forward() {
    let g: Graph<f32> = Graph::new();
    let a = g.leaf(vec![1.0, 2.0, 3.0, 4.0], vec![4]).unwrap();
    let m = mean_op(&a).unwrap();
    assert_eq!(m.shape(), Vec::<usize>::new());
    assert!((m.item().unwrap() - 2.5).abs() < 1e-6);
}

#[test]
fn test_mean_of_empty_fails() {
    let g: Graph<f32> = Graph::new();
    let a = g.leaf(vec![], vec![0]).unwrap();
    assert_eq!(mean_op(&a), Err(RetroGradError::DivisionByZero));
}

#[test]
fn test_mean_backward() {
    let g: Graph<f32> = Graph::new();
    let a = g.leaf(vec![1.0, 2.0, 3.0, 4.0], vec![4]).unwrap();
    a.requires_grad_(true).unwrap();
    let m = mean_op(&a).unwrap();
    m.backward().unwrap();
    assert_eq!(a.grad().unwrap(), vec![0.25, 0.25, 0.25, 0.25]);
}
