use crate::graph::Graph;
use crate::ops::arithmetic::neg_op;
use crate::utils::testing::check_value_near;

#[test]
fn test_neg_values_ok() {
    let g: Graph<f32> = Graph::new();
    let a = g.leaf(vec![1.0, -2.0, 0.0], vec![3]).unwrap();
    let result = neg_op(&a).unwrap();
    check_value_near(&result, &[3], &[-1.0, 2.0, 0.0], 0.0);
}

#[test]
fn test_neg_backward() {
    let g: Graph<f32> = Graph::new();
    let a = g.leaf(vec![1.0, -2.0], vec![2]).unwrap();
    a.requires_grad_(true).unwrap();
    let b = neg_op(&a).unwrap();
    b.sum().unwrap().backward().unwrap();
    assert_eq!(a.grad().unwrap(), vec![-1.0, -1.0]);
}
