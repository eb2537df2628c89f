//! Forward containment over explored consumer lists.

use std::collections::{BTreeMap, BTreeSet};

use crate::graph::NodeId;

/// Collects every node reachable from `start` through `upstream`.
///
/// The result always contains `start` and `end`, even when `start` has no
/// recorded consumers.
pub fn collect(
    upstream: &BTreeMap<NodeId, Vec<NodeId>>,
    start: NodeId,
    end: NodeId,
) -> BTreeSet<NodeId> {
    let mut contained = BTreeSet::from([start, end]);
    let mut stack = vec![start];

    while let Some(current) = stack.pop() {
        for consumer in upstream.get(&current).into_iter().flatten() {
            if contained.insert(*consumer) {
                stack.push(*consumer);
            }
        }
    }

    contained
}
