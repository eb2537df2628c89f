//! Per-execution node context.

use crate::error::{WorkflowError, WorkflowResult};
use crate::expand::ExploreOptions;
use crate::graph::{DynamicPrompt, GenerationId, GraphView, NodeId, PromptNode};

/// What a node sees of the engine while it executes.
#[derive(Debug, Clone, Copy)]
pub struct NodeContext<'a> {
    node_id: NodeId,
    graph: &'a DynamicPrompt,
    explore: ExploreOptions,
}

impl<'a> NodeContext<'a> {
    /// Creates a context for `node_id` over the live graph.
    pub fn new(node_id: NodeId, graph: &'a DynamicPrompt, explore: ExploreOptions) -> Self {
        Self {
            node_id,
            graph,
            explore,
        }
    }

    /// Returns the ID of the executing node.
    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    /// Returns the live graph.
    pub fn graph(&self) -> &'a DynamicPrompt {
        self.graph
    }

    /// Returns the generation the executing node belongs to.
    pub fn generation(&self) -> GenerationId {
        self.graph.generation_of(self.node_id)
    }

    /// Returns the options loop ends explore their bodies with.
    pub fn explore_options(&self) -> ExploreOptions {
        self.explore
    }

    /// Returns the executing node's own definition.
    pub fn node(&self) -> WorkflowResult<&'a PromptNode> {
        self.get_node(self.node_id)
    }

    /// Returns another node's definition.
    pub fn get_node(&self, id: NodeId) -> WorkflowResult<&'a PromptNode> {
        self.graph.get_node(id).ok_or(WorkflowError::MalformedGraph {
            node_id: self.node_id,
            missing: id,
        })
    }
}
