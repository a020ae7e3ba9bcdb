use crate::error::RetroGradError;
use crate::graph::Graph;
use crate::ops::arithmetic::div_op;
use crate::utils::testing::check_value_near;

#[test]
fn test_div_values_ok() {
    let g: Graph<f32> = Graph::new();
    let a = g.leaf(vec![6.0, 9.0], vec![2]).unwrap();
    let b = g.leaf(vec![2.0, 3.0], vec![2]).unwrap();
    let result = div_op(&a, &b).unwrap();
    check_value_near(&result, &[2], &[3.0, 3.0], 1e-6);
}

#[test]
fn test_div_by_zero() {
    let g: Graph<f32> = Graph::new();
    let a = g.leaf(vec![1.0, 2.0], vec![2]).unwrap();
    let b = g.leaf(vec![1.0, 0.0], vec![2]).unwrap();
    assert_eq!(div_op(&a, &b), Err(RetroGradError::DivisionByZero));
}

#[test]
fn test_div_backward() {
    let g: Graph<f32> = Graph::new();
    let a = g.leaf(vec![6.0, 9.0], vec![2]).unwrap();
    a.requires_grad_(true).unwrap();
    let b = g.leaf(vec![2.0, 3.0], vec![2]).unwrap();
    b.requires_grad_(true).unwrap();
    let c = div_op(&a, &b).unwrap();
    c.sum().unwrap().backward().unwrap();

    // dc/da = 1/b, dc/db = -a/b^2
    let grad_a = a.grad().unwrap();
    let grad_b = b.grad().unwrap();
    assert!((grad_a[0] - 0.5).abs() < 1e-6);
    assert!((grad_a[1] - 1.0 / 3.0).abs() < 1e-6);
    assert!((grad_b[0] - (-1.5)).abs() < 1e-6);
    assert!((grad_b[1] - (-1.0)).abs() < 1e-6);
}
