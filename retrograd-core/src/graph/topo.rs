use crate::error::RetroGradError;
use crate::graph::{GraphInner, ValueId};
use crate::types::RetroNumeric;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Builds a reverse topological order of all values reachable from `root`
/// via producer links: the root comes first, and every value appears only
/// after all of its consumers in the reachable subgraph.
///
/// Uses an explicit-stack depth-first traversal over arena indices (finish
/// order, reversed). Inputs are expanded in their recorded order, so ties
/// fall back to construction order. The acyclicity invariant of the arena
/// makes cycles unreachable, but the traversal checks for them anyway and
/// reports `CycleDetected` rather than looping.
///
/// A record that was consumed by a previous non-retaining backward pass
/// fails the traversal with `GraphConsumed` before any gradient is written.
pub(crate) fn reverse_topological<T: RetroNumeric>(
    inner: &GraphInner<T>,
    root: ValueId,
) -> Result<Vec<ValueId>, RetroGradError> {
    let mut marks = vec![Mark::Unvisited; inner.nodes.len()];
    let mut order: Vec<ValueId> = Vec::new();
    // (node, expanded): a node is pushed once to expand its inputs and once
    // more to record its finish position.
    let mut stack: Vec<(ValueId, bool)> = vec![(root, false)];

    while let Some((id, expanded)) = stack.pop() {
        if expanded {
            marks[id] = Mark::Done;
            order.push(id);
            continue;
        }
        match marks[id] {
            Mark::Done => continue,
            // A pending visit of a node that is already on the current path
            // can only happen through a back edge.
            Mark::InProgress => return Err(RetroGradError::CycleDetected),
            Mark::Unvisited => {}
        }
        marks[id] = Mark::InProgress;
        stack.push((id, true));

        if let Some(op_id) = inner.node(id).producer {
            let record = &inner.records[op_id];
            if record.is_consumed() {
                return Err(RetroGradError::GraphConsumed);
            }
            // Reversed so the first recorded input is expanded first.
            for &input in record.inputs.iter().rev() {
                match marks[input] {
                    Mark::Unvisited => stack.push((input, false)),
                    Mark::InProgress => return Err(RetroGradError::CycleDetected),
                    Mark::Done => {}
                }
            }
        }
    }

    order.reverse();
    Ok(order)
}
