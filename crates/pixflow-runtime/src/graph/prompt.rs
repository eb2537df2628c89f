//! Submitted prompts.

use std::collections::{BTreeMap, HashMap};

use petgraph::algo::{is_cyclic_directed, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};

use super::{GraphView, Input, NodeId, PromptMetadata, PromptNode};
use crate::error::{WorkflowError, WorkflowResult};
use crate::node::{BuiltinNode, NodeRegistry};

/// A submitted graph for one execution pass.
///
/// The prompt is the immutable generation-zero graph: loops never mutate it,
/// they only append expansions to the live [`DynamicPrompt`].
///
/// [`DynamicPrompt`]: super::DynamicPrompt
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    /// Nodes keyed by ID.
    pub nodes: BTreeMap<NodeId, PromptNode>,
    /// Prompt metadata.
    #[serde(default)]
    pub metadata: PromptMetadata,
}

impl Prompt {
    /// Creates a new empty prompt.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new prompt with metadata.
    pub fn with_metadata(metadata: PromptMetadata) -> Self {
        Self {
            metadata,
            ..Default::default()
        }
    }

    /// Adds a node and returns its ID.
    pub fn add_node(&mut self, node: PromptNode) -> NodeId {
        let id = NodeId::new();
        self.nodes.insert(id, node);
        id
    }

    /// Adds a node with a specific ID, replacing any previous node.
    pub fn add_node_with_id(&mut self, id: NodeId, node: PromptNode) {
        self.nodes.insert(id, node);
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns whether the prompt has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Validates the prompt against the registered node types.
    ///
    /// Checks that:
    /// - The prompt has at least one node
    /// - Every node type is registered
    /// - Every link points at an existing node
    /// - The graph is acyclic
    /// - Every loop end is fed a flow token by a loop start of its family
    /// - Paired loop start/end nodes carry the same number of value channels
    pub fn validate(&self, registry: &NodeRegistry) -> WorkflowResult<()> {
        if self.nodes.is_empty() {
            return Err(WorkflowError::InvalidDefinition(
                "prompt must have at least one node".into(),
            ));
        }

        for (id, node) in &self.nodes {
            if !registry.contains(&node.class_type) {
                return Err(WorkflowError::UnknownNodeType {
                    node_id: *id,
                    class_type: node.class_type.clone(),
                });
            }

            for (_, link) in node.links() {
                if !self.nodes.contains_key(&link.node) {
                    return Err(WorkflowError::MalformedGraph {
                        node_id: *id,
                        missing: link.node,
                    });
                }
            }
        }

        let graph = self.dependency_graph();
        if is_cyclic_directed(&graph) {
            return Err(WorkflowError::InvalidDefinition(
                "cycle detected in prompt graph".into(),
            ));
        }

        for (id, node) in &self.nodes {
            self.validate_loop_pair(*id, node)?;
        }

        Ok(())
    }

    /// Returns node IDs in dependency order.
    pub fn topological_order(&self) -> WorkflowResult<Vec<NodeId>> {
        let graph = self.dependency_graph();
        toposort(&graph, None)
            .map(|indices| indices.into_iter().map(|index| graph[index]).collect())
            .map_err(|_| WorkflowError::InvalidDefinition("cycle detected in prompt graph".into()))
    }

    /// Builds the producer-to-consumer graph. Dangling links are skipped.
    fn dependency_graph(&self) -> DiGraph<NodeId, ()> {
        let mut graph = DiGraph::with_capacity(self.nodes.len(), 0);
        let node_indices: HashMap<NodeId, NodeIndex> = self
            .nodes
            .keys()
            .map(|id| (*id, graph.add_node(*id)))
            .collect();

        for (id, node) in &self.nodes {
            let to = node_indices[id];
            for (_, link) in node.links() {
                if let Some(from) = node_indices.get(&link.node) {
                    graph.add_edge(*from, to, ());
                }
            }
        }

        graph
    }

    fn validate_loop_pair(&self, id: NodeId, node: &PromptNode) -> WorkflowResult<()> {
        let Some(end_type) = BuiltinNode::classify(&node.class_type) else {
            return Ok(());
        };
        let Some(start_type) = end_type.loop_start() else {
            return Ok(());
        };

        let flow = match node.input("flow") {
            Some(Input::Link(link)) if link.slot == 0 => *link,
            _ => {
                return Err(WorkflowError::InvalidDefinition(format!(
                    "loop end {id} must link its flow input to slot 0 of a {start_type}"
                )));
            }
        };

        let start = self
            .nodes
            .get(&flow.node)
            .ok_or(WorkflowError::MalformedGraph {
                node_id: id,
                missing: flow.node,
            })?;
        if BuiltinNode::classify(&start.class_type) != Some(start_type) {
            return Err(WorkflowError::InvalidDefinition(format!(
                "loop end {id} is paired with {} node {}, expected {start_type}",
                start.class_type, flow.node
            )));
        }

        let first = end_type.first_carried_channel();
        let start_arity = carried_arity(start, first);
        let end_arity = carried_arity(node, first);
        if start_arity != end_arity {
            return Err(WorkflowError::ArityMismatch {
                start: flow.node,
                end: id,
                start_arity,
                end_arity,
            });
        }

        Ok(())
    }
}

/// Number of channels a loop node carries, counting from `first`.
fn carried_arity(node: &PromptNode, first: usize) -> usize {
    node.channels()
        .filter(|(index, _)| *index >= first)
        .map(|(index, _)| index + 1 - first)
        .max()
        .unwrap_or(0)
}

impl GraphView for Prompt {
    fn get_node(&self, id: NodeId) -> Option<&PromptNode> {
        self.nodes.get(&id)
    }
}
