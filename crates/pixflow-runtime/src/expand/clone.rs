//! Body cloning.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{WorkflowError, WorkflowResult};
use crate::graph::{Expansion, GraphBuilder, GraphView, Input, Link, NodeId, value_channel};

/// Clones the `contained` nodes under fresh IDs.
///
/// Links between contained nodes are rewired to the clones, links to any
/// other node are kept as they are, and every clone remembers the submitted
/// node it descends from. The clone of `start` has its value channels
/// replaced by `next_values`; the clone of `end` becomes the expansion
/// result.
///
/// Returns `None` when `start` or `end` is not part of the live graph or of
/// the contained set.
pub fn clone_body<G: GraphView + ?Sized>(
    view: &G,
    contained: &BTreeSet<NodeId>,
    start: NodeId,
    end: NodeId,
    next_values: Vec<Input>,
) -> WorkflowResult<Option<Expansion>> {
    if view.get_node(start).is_none()
        || view.get_node(end).is_none()
        || !contained.contains(&start)
        || !contained.contains(&end)
    {
        return Ok(None);
    }

    let clones: BTreeMap<NodeId, NodeId> =
        contained.iter().map(|id| (*id, NodeId::new())).collect();
    let mut graph = GraphBuilder::new();

    for (id, clone_id) in &clones {
        let original = view.get_node(*id).ok_or(WorkflowError::MalformedGraph {
            node_id: end,
            missing: *id,
        })?;

        let mut handle = graph.node_with_id(original.class_type.clone(), *clone_id);
        handle.set_origin(view.origin_of(*id));
        for (name, input) in &original.inputs {
            let rewired = view
                .resolve_link(input)
                .and_then(|link| clones.get(&link.node).map(|node| Link::new(*node, link.slot)));
            match rewired {
                Some(link) => handle.set_input(name.clone(), link),
                None => handle.set_input(name.clone(), input.clone()),
            };
        }
    }

    if let Some(mut handle) = graph.lookup(clones[&start]) {
        handle.clear_channels();
        for (index, value) in next_values.into_iter().enumerate() {
            handle.set_input(value_channel(index), value);
        }
    }

    graph.finalize(clones[&end]).map(Some)
}
