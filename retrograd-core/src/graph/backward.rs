use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::error::RetroGradError;
use crate::graph::topo::reverse_topological;
use crate::graph::{GraphInner, OpId, ValueId};
use crate::types::RetroNumeric;

/// Runs a backward pass from `root` over the arena.
///
/// The caller holds the graph's write lock for the whole pass, which
/// serializes gradient accumulation against any other user of the graph.
///
/// Algorithm:
/// 1. Validate the seed: an explicit seed must match the root's element
///    count; without a seed the root must be a single-element value and the
///    seed defaults to one.
/// 2. Order the reachable subgraph reverse-topologically (root first); this
///    also rejects consumed records and cycles up front.
/// 3. Walk the order with an accumulator map keyed by `ValueId`. Each
///    record's rule turns the accumulated output gradient into per-input
///    contributions, which are *added* into the map; a value consumed by
///    several records receives the sum of their contributions.
/// 4. Leaves with `requires_grad=true` keep their final gradient on the
///    node; intermediate gradients are dropped as soon as they have been
///    propagated.
///
/// Unless `retain_graph` is set, the rules of every record visited by this
/// pass are dropped afterwards, releasing the saved forward buffers; a later
/// traversal through any of them fails with `GraphConsumed`.
pub(crate) fn run_backward<T: RetroNumeric>(
    inner: &mut GraphInner<T>,
    root: ValueId,
    seed: Option<&[T]>,
    retain_graph: bool,
) -> Result<(), RetroGradError> {
    let root_node = inner.node(root);
    if !root_node.requires_grad {
        return Err(RetroGradError::NoGradientPath);
    }

    let seed_vec: Vec<T> = match seed {
        Some(values) => {
            if values.len() != root_node.numel() {
                return Err(RetroGradError::ShapeMismatch {
                    expected: root_node.shape.clone(),
                    actual: vec![values.len()],
                    operation: "backward seed".to_string(),
                });
            }
            values.to_vec()
        }
        None => {
            if root_node.numel() != 1 {
                return Err(RetroGradError::BackwardNonScalar);
            }
            vec![T::one()]
        }
    };

    let order = reverse_topological(inner, root)?;
    log::debug!(
        "backward: {} value(s) reachable from root {} (retain_graph={})",
        order.len(),
        root,
        retain_graph
    );

    let mut grad_map: HashMap<ValueId, Vec<T>> = HashMap::new();
    grad_map.insert(root, seed_vec);
    let mut visited_records: Vec<OpId> = Vec::new();

    for id in order {
        // No entry means no gradient flowed back to this value (e.g. its
        // only consumers sit behind frozen inputs).
        let grad = match grad_map.remove(&id) {
            Some(grad) => grad,
            None => continue,
        };

        let producer = inner.node(id).producer;
        let op_id = match producer {
            None => {
                let node = inner.node_mut(id);
                if node.requires_grad {
                    accumulate(&mut node.grad, grad)?;
                }
                continue;
            }
            Some(op_id) => op_id,
        };

        let (op, input_ids, input_grads) = {
            let record = &inner.records[op_id];
            // The topological pass already rejected consumed records; this
            // is a defensive re-check.
            let rule = record.rule.as_deref().ok_or(RetroGradError::GraphConsumed)?;
            let input_grads = rule.backward(&grad)?;
            if input_grads.len() != record.inputs.len() {
                return Err(RetroGradError::InternalError(format!(
                    "{:?} rule returned {} gradients for {} inputs",
                    record.op,
                    input_grads.len(),
                    record.inputs.len()
                )));
            }
            (record.op, record.inputs.clone(), input_grads)
        };
        visited_records.push(op_id);

        for (input_id, contribution) in input_ids.into_iter().zip(input_grads) {
            let input_node = inner.node(input_id);
            // Checked at backward time, not record-creation time: freezing a
            // leaf after the record was built stops its gradient here while
            // leaving the record itself untouched.
            if !input_node.requires_grad {
                continue;
            }
            if contribution.len() != input_node.numel() {
                return Err(RetroGradError::ShapeMismatch {
                    expected: input_node.shape.clone(),
                    actual: vec![contribution.len()],
                    operation: format!("{:?} backward", op),
                });
            }
            match grad_map.entry(input_id) {
                Entry::Occupied(mut entry) => {
                    for (acc, add) in entry.get_mut().iter_mut().zip(contribution.iter()) {
                        *acc += *add;
                    }
                }
                Entry::Vacant(entry) => {
                    entry.insert(contribution);
                }
            }
        }
    }

    if !retain_graph {
        log::trace!(
            "backward: consuming {} record(s) (retain_graph=false)",
            visited_records.len()
        );
        for op_id in visited_records {
            inner.records[op_id].rule = None;
        }
    }

    Ok(())
}

/// Adds `grad` into an existing gradient slot, or installs it if empty.
fn accumulate<T: RetroNumeric>(
    slot: &mut Option<Vec<T>>,
    grad: Vec<T>,
) -> Result<(), RetroGradError> {
    match slot.as_mut() {
        Some(existing) => {
            if existing.len() != grad.len() {
                return Err(RetroGradError::InternalError(
                    "gradient buffer length changed between accumulations".to_string(),
                ));
            }
            for (acc, add) in existing.iter_mut().zip(grad.iter()) {
                *acc += *add;
            }
            Ok(())
        }
        None => {
            *slot = Some(grad);
            Ok(())
        }
    }
}
