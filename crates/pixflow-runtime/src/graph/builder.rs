//! Construction of expansions.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use super::{GraphView, Input, Link, NodeId, PromptNode, parse_value_channel};
use crate::error::{WorkflowError, WorkflowResult};

/// A set of new nodes handed to the engine, plus the node whose outputs
/// stand in for the expanding node's outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct Expansion {
    nodes: BTreeMap<NodeId, PromptNode>,
    result: NodeId,
}

impl Expansion {
    /// Returns the new nodes.
    pub fn nodes(&self) -> &BTreeMap<NodeId, PromptNode> {
        &self.nodes
    }

    /// Returns the node whose outputs replace the expanding node's outputs.
    pub fn result(&self) -> NodeId {
        self.result
    }

    /// Returns the number of new nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns whether the expansion is empty. Finalized expansions never are.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn into_nodes(self) -> BTreeMap<NodeId, PromptNode> {
        self.nodes
    }
}

impl GraphView for Expansion {
    fn get_node(&self, id: NodeId) -> Option<&PromptNode> {
        self.nodes.get(&id)
    }
}

/// Builds an [`Expansion`] node by node.
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    nodes: BTreeMap<NodeId, PromptNode>,
}

impl GraphBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node of `class_type` under a fresh ID.
    pub fn node(&mut self, class_type: impl Into<String>) -> NodeHandle<'_> {
        self.node_with_id(class_type, NodeId::new())
    }

    /// Adds a node of `class_type` under `id`, replacing any node already there.
    pub fn node_with_id(&mut self, class_type: impl Into<String>, id: NodeId) -> NodeHandle<'_> {
        let node = match self.nodes.entry(id) {
            Entry::Occupied(entry) => {
                let node = entry.into_mut();
                *node = PromptNode::new(class_type);
                node
            }
            Entry::Vacant(entry) => entry.insert(PromptNode::new(class_type)),
        };
        NodeHandle { id, node }
    }

    /// Returns a handle to a node added earlier.
    pub fn lookup(&mut self, id: NodeId) -> Option<NodeHandle<'_>> {
        self.nodes
            .get_mut(&id)
            .map(|node| NodeHandle { id, node })
    }

    /// Finishes the expansion with `result` standing in for the caller's outputs.
    pub fn finalize(self, result: NodeId) -> WorkflowResult<Expansion> {
        if !self.nodes.contains_key(&result) {
            return Err(WorkflowError::Internal(format!(
                "expansion result {result} is not part of the expansion"
            )));
        }

        Ok(Expansion {
            nodes: self.nodes,
            result,
        })
    }
}

/// Mutable handle to a node inside a [`GraphBuilder`].
#[derive(Debug)]
pub struct NodeHandle<'a> {
    id: NodeId,
    node: &'a mut PromptNode,
}

impl NodeHandle<'_> {
    /// Returns the node's ID.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Returns a link to one of the node's outputs.
    pub fn out(&self, slot: usize) -> Link {
        Link::new(self.id, slot)
    }

    /// Sets an input, literal or linked.
    pub fn set_input(&mut self, name: impl Into<String>, input: impl Into<Input>) -> &mut Self {
        self.node.inputs.insert(name.into(), input.into());
        self
    }

    /// Records the submitted node this one was cloned from.
    pub fn set_origin(&mut self, origin: NodeId) -> &mut Self {
        self.node.origin = Some(origin);
        self
    }

    /// Removes every auxiliary value channel input.
    pub fn clear_channels(&mut self) -> &mut Self {
        self.node
            .inputs
            .retain(|name, _| parse_value_channel(name).is_none());
        self
    }
}
