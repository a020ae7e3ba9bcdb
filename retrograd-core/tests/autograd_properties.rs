//! End-to-end properties of the backward engine: gradient correctness on a
//! polynomial, requires_grad propagation, gradient summation over shared
//! inputs, graph consumption and retention, and parameter freezing.

use retrograd_core::{Graph, RetroGradError};

mod common;
use common::{assert_grad_near, leaf_with_grad};

#[test]
fn test_polynomial_gradients_with_seed() {
    // Q = 3a^3 - b^2, backward with seed [1, 1]:
    // dQ/da = 9a^2, dQ/db = -2b
    let g: Graph<f32> = Graph::new();
    let a = leaf_with_grad(&g, vec![2.0, 3.0], vec![2]);
    let b = leaf_with_grad(&g, vec![6.0, 4.0], vec![2]);

    let q = a
        .pow(3.0)
        .unwrap()
        .mul_scalar(3.0)
        .unwrap()
        .sub(&b.pow(2.0).unwrap())
        .unwrap();
    assert_eq!(q.data(), vec![-12.0, 65.0]);

    q.backward_with(Some(&[1.0, 1.0]), false).unwrap();

    assert_grad_near(&a.grad().unwrap(), &[36.0, 81.0], 1e-4);
    assert_grad_near(&b.grad().unwrap(), &[-12.0, -8.0], 1e-4);
}

#[test]
fn test_backward_without_seed_requires_scalar_root() {
    let g: Graph<f32> = Graph::new();
    let a = leaf_with_grad(&g, vec![1.0, 2.0], vec![2]);
    let doubled = a.mul_scalar(2.0).unwrap();
    assert_eq!(doubled.backward(), Err(RetroGradError::BackwardNonScalar));
}

#[test]
fn test_backward_seed_shape_mismatch() {
    let g: Graph<f32> = Graph::new();
    let a = leaf_with_grad(&g, vec![1.0, 2.0], vec![2]);
    let doubled = a.mul_scalar(2.0).unwrap();
    assert!(matches!(
        doubled.backward_with(Some(&[1.0, 1.0, 1.0]), false),
        Err(RetroGradError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_backward_on_untracked_root_fails() {
    let g: Graph<f32> = Graph::new();
    let a = g.leaf(vec![1.0], vec![1]).unwrap();
    let b = a.mul_scalar(2.0).unwrap();
    assert_eq!(b.backward(), Err(RetroGradError::NoGradientPath));
}

#[test]
fn test_requires_grad_propagation() {
    let g: Graph<f32> = Graph::new();
    let tracked = leaf_with_grad(&g, vec![1.0], vec![1]);
    let untracked = g.leaf(vec![2.0], vec![1]).unwrap();

    // Mixed inputs: the result is tracked.
    let mixed = tracked.mul(&untracked).unwrap();
    assert!(mixed.requires_grad());

    // All-untracked inputs: the result is untracked and no record exists.
    let records_before = g.num_records();
    let plain = untracked.add(&untracked).unwrap();
    assert!(!plain.requires_grad());
    assert_eq!(g.num_records(), records_before);
}

#[test]
fn test_construction_is_idempotent_but_not_shared() {
    let g: Graph<f32> = Graph::new();
    let a = leaf_with_grad(&g, vec![2.0], vec![1]);
    let b = leaf_with_grad(&g, vec![3.0], vec![1]);

    let first = a.mul(&b).unwrap();
    let second = a.mul(&b).unwrap();

    // Identical computed data, distinct record identities.
    assert_eq!(first.data(), second.data());
    assert_ne!(first.id(), second.id());

    // Consuming one expression's records leaves the other usable.
    first.sum().unwrap().backward().unwrap();
    second.sum().unwrap().backward().unwrap();
    // Both passes contributed: grad(a) = b + b, grad(b) = a + a.
    assert_grad_near(&a.grad().unwrap(), &[6.0], 1e-6);
    assert_grad_near(&b.grad().unwrap(), &[4.0], 1e-6);
}

#[test]
fn test_shared_input_gradients_sum() {
    // c = a + a*a => dc/da = 1 + 2a
    let g: Graph<f32> = Graph::new();
    let a = leaf_with_grad(&g, vec![3.0], vec![1]);
    let c = a.add(&a.mul(&a).unwrap()).unwrap();
    c.sum().unwrap().backward().unwrap();
    assert_grad_near(&a.grad().unwrap(), &[7.0], 1e-6);
}

#[test]
fn test_second_backward_without_retention_fails() {
    let g: Graph<f32> = Graph::new();
    let a = leaf_with_grad(&g, vec![2.0], vec![1]);
    let b = leaf_with_grad(&g, vec![5.0], vec![1]);
    let loss = a.mul(&b).unwrap().sum().unwrap();

    loss.backward().unwrap();
    assert_eq!(loss.backward(), Err(RetroGradError::GraphConsumed));
}

#[test]
fn test_retained_backward_accumulates_gradients() {
    let g: Graph<f32> = Graph::new();
    let a = leaf_with_grad(&g, vec![2.0], vec![1]);
    let b = leaf_with_grad(&g, vec![5.0], vec![1]);
    let loss = a.mul(&b).unwrap().sum().unwrap();

    loss.backward_with(None, true).unwrap();
    assert_grad_near(&a.grad().unwrap(), &[5.0], 1e-6);

    // Gradients accumulate across retained passes until explicitly zeroed.
    loss.backward_with(None, true).unwrap();
    assert_grad_near(&a.grad().unwrap(), &[10.0], 1e-6);
    assert_grad_near(&b.grad().unwrap(), &[4.0], 1e-6);

    a.zero_grad();
    b.zero_grad();
    loss.backward_with(None, true).unwrap();
    assert_grad_near(&a.grad().unwrap(), &[5.0], 1e-6);
    assert_grad_near(&b.grad().unwrap(), &[2.0], 1e-6);
}

#[test]
fn test_zero_gradients_clears_all_leaves() {
    let g: Graph<f32> = Graph::new();
    let a = leaf_with_grad(&g, vec![2.0], vec![1]);
    let b = leaf_with_grad(&g, vec![3.0], vec![1]);
    a.mul(&b).unwrap().sum().unwrap().backward().unwrap();
    assert!(a.grad().is_some());
    assert!(b.grad().is_some());

    g.zero_gradients();
    assert!(a.grad().is_none());
    assert!(b.grad().is_none());
}

#[test]
fn test_freezing_before_building_expression() {
    let g: Graph<f32> = Graph::new();
    let frozen = leaf_with_grad(&g, vec![2.0], vec![1]);
    let sibling = leaf_with_grad(&g, vec![3.0], vec![1]);

    frozen.requires_grad_(false).unwrap();
    let loss = frozen.mul(&sibling).unwrap().sum().unwrap();
    loss.backward().unwrap();

    assert!(frozen.grad().is_none());
    assert_grad_near(&sibling.grad().unwrap(), &[2.0], 1e-6);
}

#[test]
fn test_freezing_after_building_expression() {
    // Freezing after the record is built does not rewrite the record, but
    // the frozen leaf still acquires no gradient from a later backward pass.
    let g: Graph<f32> = Graph::new();
    let frozen = leaf_with_grad(&g, vec![2.0], vec![1]);
    let sibling = leaf_with_grad(&g, vec![3.0], vec![1]);

    let loss = frozen.mul(&sibling).unwrap().sum().unwrap();
    frozen.requires_grad_(false).unwrap();
    loss.backward().unwrap();

    assert!(frozen.grad().is_none());
    assert_grad_near(&sibling.grad().unwrap(), &[2.0], 1e-6);
}

#[test]
fn test_backward_on_leaf_root_accumulates_seed() {
    let g: Graph<f32> = Graph::new();
    let a = leaf_with_grad(&g, vec![1.0, 2.0], vec![2]);
    a.backward_with(Some(&[0.5, 0.25]), false).unwrap();
    assert_grad_near(&a.grad().unwrap(), &[0.5, 0.25], 1e-6);
}

#[test]
fn test_gradients_flow_through_deep_chain() {
    // loss = mean(relu(x * 2 + 1)^2), x = [1, -2]
    let g: Graph<f32> = Graph::new();
    let x = leaf_with_grad(&g, vec![1.0, -2.0], vec![2]);
    let h = x.mul_scalar(2.0).unwrap().add_scalar(1.0).unwrap();
    let r = h.relu().unwrap();
    let loss = r.pow(2.0).unwrap().mean().unwrap();
    // h = [3, -3], relu = [3, 0], loss = 9/2
    assert!((loss.item().unwrap() - 4.5).abs() < 1e-6);

    loss.backward().unwrap();
    // dloss/dx = 2*relu(h)*relu'(h)*2 / n = [2*3*1*2/2, 0] = [6, 0]
    assert_grad_near(&x.grad().unwrap(), &[6.0, 0.0], 1e-5);
}

#[test]
fn test_intermediates_store_no_gradient() {
    let g: Graph<f32> = Graph::new();
    let a = leaf_with_grad(&g, vec![2.0], vec![1]);
    let mid = a.mul_scalar(3.0).unwrap();
    let loss = mid.sum().unwrap();
    loss.backward().unwrap();

    assert!(mid.grad().is_none());
    assert!(loss.grad().is_none());
    assert_grad_near(&a.grad().unwrap(), &[3.0], 1e-6);
}
