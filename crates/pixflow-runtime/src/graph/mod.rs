//! Prompt graph structures.
//!
//! This module provides the graph representation a loop operates on:
//! - [`Prompt`]: The submitted, immutable set of nodes for one execution pass
//! - [`PromptNode`]: A node's type tag and its literal or linked inputs
//! - [`Link`], [`Input`]: Connections between node outputs and inputs
//! - [`GraphView`]: Read-only inspector over a prompt or a live graph
//! - [`DynamicPrompt`]: The live graph, a prompt plus its arena of generations
//! - [`GraphBuilder`], [`Expansion`]: Construction of new work for the engine

mod builder;
mod dynamic;
mod id;
mod input;
mod metadata;
mod node;
mod prompt;
mod view;

pub use builder::{Expansion, GraphBuilder, NodeHandle};
pub use dynamic::{DynamicPrompt, Generation, RecursionPoint};
pub use id::{GenerationId, NodeId};
pub use input::{Input, Link};
pub use metadata::PromptMetadata;
pub use node::{PromptNode, parse_value_channel, value_channel};
pub use prompt::Prompt;
pub use view::GraphView;
