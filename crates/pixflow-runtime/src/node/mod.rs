//! Node types and the execution interface.
//!
//! This module provides:
//! - [`Node`]: The trait every node type implements
//! - [`NodeInputs`], [`InputMode`]: What a node receives and how
//! - [`NodeOutput`], [`OutputSlot`]: What a node returns
//! - [`NodeRegistry`], [`BuiltinNode`]: Type-tag lookup
//! - Built-in loop, list, branch and logic node types

mod branch;
mod context;
mod inputs;
mod list;
mod logic;
pub mod loops;
mod outputs;
mod registry;

pub use branch::{IfElseDispatcher, IfElseGate};
pub use context::NodeContext;
pub use inputs::{InputMode, InputValue, NodeInputs};
pub use list::{CreateEmptyList, ListFromLoop, accumulate};
pub use logic::{Compare, Comparison, IsEmpty, MathInt, MathOperation};
pub use loops::{ForLoopEnd, ForLoopStart, WhileLoopEnd, WhileLoopStart};
pub use outputs::{NodeOutput, OutputSlot};
pub use registry::{BuiltinNode, NodeRegistry};

use crate::error::WorkflowResult;

/// Tracing target for node execution.
pub const TRACING_TARGET: &str = "pixflow_runtime::node";

/// A node type.
///
/// Implementations are stateless: every call receives the node's resolved
/// inputs and a read-only view of the live graph.
#[async_trait::async_trait]
pub trait Node: Send + Sync {
    /// How the input `name` is delivered to [`Node::execute`].
    fn input_mode(&self, _name: &str) -> InputMode {
        InputMode::Resolved
    }

    /// Executes the node.
    async fn execute(&self, ctx: &NodeContext<'_>, inputs: NodeInputs)
    -> WorkflowResult<NodeOutput>;
}
