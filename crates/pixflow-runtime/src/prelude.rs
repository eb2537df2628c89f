//! Prelude module for convenient imports.
//!
//! This module re-exports commonly used types for ergonomic imports:
//!
//! ```rust
//! use pixflow_runtime::prelude::*;
//! ```

pub use crate::engine::{Engine, EngineConfig, ExecutionContext};
pub use crate::error::{WorkflowError, WorkflowResult};
pub use crate::graph::{
    DynamicPrompt, GraphBuilder, GraphView, Input, Link, NodeId, Prompt, PromptMetadata,
    PromptNode,
};
pub use crate::node::{BuiltinNode, Node, NodeContext, NodeInputs, NodeOutput, NodeRegistry};
pub use crate::value::{Slot, Value};
