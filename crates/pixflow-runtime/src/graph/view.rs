//! Read-only graph inspection.

use super::{Input, Link, NodeId, PromptNode};

/// Read-only inspector over a graph of prompt nodes.
///
/// Implemented by the submitted [`Prompt`](super::Prompt) and by the live
/// [`DynamicPrompt`](super::DynamicPrompt), which also sees every node
/// produced by earlier expansions.
pub trait GraphView {
    /// Returns the node definition for `id`.
    fn get_node(&self, id: NodeId) -> Option<&PromptNode>;

    /// Returns the link an input refers to, or `None` for literals.
    fn resolve_link(&self, input: &Input) -> Option<Link> {
        input.as_link().copied()
    }

    /// Returns the submitted node `id` was cloned from, or `id` itself.
    fn origin_of(&self, id: NodeId) -> NodeId {
        self.get_node(id).and_then(|node| node.origin).unwrap_or(id)
    }
}
