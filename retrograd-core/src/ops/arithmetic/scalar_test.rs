use crate::graph::Graph;
use crate::ops::arithmetic::{add_scalar_op, mul_scalar_op};
use crate::utils::testing::check_value_near;

#[test]
fn test_add_scalar_forward() {
    let g: Graph<f32> = Graph::new();
    let a = g.leaf(vec![1.0, 2.0], vec![2]).unwrap();
    let result = add_scalar_op(&a, 5.0).unwrap();
    check_value_near(&result, &[2], &[6.0, 7.0], 0.0);
}

#[test]
fn test_mul_scalar_forward() {
    let g: Graph<f32> = Graph::new();
    let a = g.leaf(vec![1.0, 2.0], vec![2]).unwrap();
    let result = mul_scalar_op(&a, 3.0).unwrap();
    check_value_near(&result, &[2], &[3.0, 6.0], 0.0);
}

#[test]
fn test_scalar_backward() {
    let g: Graph<f32> = Graph::new();
    let a = g.leaf(vec![1.0, 2.0], vec![2]).unwrap();
    a.requires_grad_(true).unwrap();
    let shifted = add_scalar_op(&a, 10.0).unwrap();
    let scaled = mul_scalar_op(&shifted, 3.0).unwrap();
    scaled.sum().unwrap().backward().unwrap();

    // d(3*(x+10))/dx = 3
    assert_eq!(a.grad().unwrap(), vec![3.0, 3.0]);
}
