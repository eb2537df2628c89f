//! Backward dependency exploration.

use std::collections::BTreeMap;

use crate::error::{WorkflowError, WorkflowResult};
use crate::graph::{GraphView, NodeId};
use crate::node::BuiltinNode;

/// Options for [`explore`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExploreOptions {
    /// Keep walking past other loop ends instead of stopping at them.
    ///
    /// Enabling this lets a loop body contain complete inner loops.
    pub descend_loop_boundaries: bool,
}

/// Result of a backward walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Exploration {
    /// Every producer reached, mapped to the nodes that consume it.
    pub upstream: BTreeMap<NodeId, Vec<NodeId>>,
    /// Producers that are not loop-end boundaries, in discovery order.
    pub parent_ids: Vec<NodeId>,
}

/// Walks backwards from `node_id` through every linked input.
///
/// Each producer reached is recorded with the consumers that link to it.
/// Producers whose type is a loop end are recorded but not walked through
/// unless [`ExploreOptions::descend_loop_boundaries`] is set.
pub fn explore<G: GraphView + ?Sized>(
    view: &G,
    node_id: NodeId,
    options: ExploreOptions,
) -> WorkflowResult<Exploration> {
    let mut exploration = Exploration::default();
    let mut stack = vec![node_id];

    while let Some(current) = stack.pop() {
        let node = view.get_node(current).ok_or(WorkflowError::MalformedGraph {
            node_id: current,
            missing: current,
        })?;

        for input in node.inputs.values() {
            let Some(link) = view.resolve_link(input) else {
                continue;
            };
            let producer = view
                .get_node(link.node)
                .ok_or(WorkflowError::MalformedGraph {
                    node_id: current,
                    missing: link.node,
                })?;

            let boundary = BuiltinNode::classify(&producer.class_type)
                .is_some_and(BuiltinNode::is_loop_end);
            if !boundary {
                exploration.parent_ids.push(link.node);
            }

            let consumers = exploration.upstream.entry(link.node).or_insert_with(|| {
                if !boundary || options.descend_loop_boundaries {
                    stack.push(link.node);
                }
                Vec::new()
            });
            if !consumers.contains(&current) {
                consumers.push(current);
            }
        }
    }

    Ok(exploration)
}
