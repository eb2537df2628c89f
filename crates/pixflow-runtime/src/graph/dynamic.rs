//! The live graph and its generation arena.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Serialize;

use super::{Expansion, GenerationId, GraphView, NodeId, Prompt, PromptNode};
use crate::error::{WorkflowError, WorkflowResult};

/// The node whose outputs stand in for an expanding node's outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecursionPoint {
    /// Generation the node belongs to.
    pub generation: GenerationId,
    /// The node itself.
    pub node: NodeId,
}

/// One expansion appended to the live graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Generation {
    /// Generation identifier, increasing in creation order.
    pub id: GenerationId,
    /// Node whose execution produced this generation.
    pub parent: NodeId,
    /// Type tag of the parent node.
    pub parent_type: String,
    /// Nodes introduced by this generation.
    pub nodes: Vec<NodeId>,
    /// Where the parent's outputs are redirected to.
    pub recursion_point: RecursionPoint,
}

/// The submitted prompt plus every node added by expansions.
///
/// Generations reference their parent by ID rather than by pointer, so the
/// whole ancestry stays inspectable after the run.
#[derive(Debug, Clone)]
pub struct DynamicPrompt {
    original: Arc<Prompt>,
    ephemeral: BTreeMap<NodeId, PromptNode>,
    generations: Vec<Generation>,
    node_generation: HashMap<NodeId, GenerationId>,
}

impl DynamicPrompt {
    /// Wraps a submitted prompt as generation zero.
    pub fn new(original: Arc<Prompt>) -> Self {
        Self {
            original,
            ephemeral: BTreeMap::new(),
            generations: Vec::new(),
            node_generation: HashMap::new(),
        }
    }

    /// Returns the submitted prompt.
    pub fn original(&self) -> &Prompt {
        &self.original
    }

    /// Returns whether `id` exists in the live graph.
    pub fn contains(&self, id: NodeId) -> bool {
        self.original.nodes.contains_key(&id) || self.ephemeral.contains_key(&id)
    }

    /// Returns the number of nodes added by expansions.
    pub fn ephemeral_count(&self) -> usize {
        self.ephemeral.len()
    }

    /// Returns all generations in creation order.
    pub fn generations(&self) -> &[Generation] {
        &self.generations
    }

    /// Returns a generation by ID.
    pub fn generation(&self, id: GenerationId) -> Option<&Generation> {
        let index = usize::try_from(id.get()).ok()?.checked_sub(1)?;
        self.generations.get(index)
    }

    /// Returns the generation a node was introduced in.
    pub fn generation_of(&self, id: NodeId) -> GenerationId {
        self.node_generation
            .get(&id)
            .copied()
            .unwrap_or(GenerationId::ROOT)
    }

    /// Appends an expansion produced by `parent` as a new generation.
    pub fn push_expansion(
        &mut self,
        parent: NodeId,
        expansion: Expansion,
    ) -> WorkflowResult<&Generation> {
        let parent_type = self
            .get_node(parent)
            .map(|node| node.class_type.clone())
            .ok_or_else(|| {
                WorkflowError::Internal(format!("expanding node {parent} is not in the graph"))
            })?;

        let id = self
            .generations
            .last()
            .map_or(GenerationId::ROOT, |generation| generation.id)
            .next();
        let recursion_point = RecursionPoint {
            generation: id,
            node: expansion.result(),
        };

        let mut nodes = Vec::with_capacity(expansion.len());
        for (node_id, node) in expansion.into_nodes() {
            if self.contains(node_id) {
                return Err(WorkflowError::Internal(format!(
                    "expansion reuses node id {node_id}"
                )));
            }
            self.ephemeral.insert(node_id, node);
            self.node_generation.insert(node_id, id);
            nodes.push(node_id);
        }

        self.generations.push(Generation {
            id,
            parent,
            parent_type,
            nodes,
            recursion_point,
        });

        Ok(&self.generations[self.generations.len() - 1])
    }
}

impl GraphView for DynamicPrompt {
    fn get_node(&self, id: NodeId) -> Option<&PromptNode> {
        self.original
            .nodes
            .get(&id)
            .or_else(|| self.ephemeral.get(&id))
    }
}
