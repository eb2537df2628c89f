#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod engine;
mod error;
pub mod expand;
pub mod graph;
pub mod node;
pub mod value;

#[doc(hidden)]
pub mod prelude;

pub use error::{WorkflowError, WorkflowResult};

/// Tracing target for runtime operations.
pub const TRACING_TARGET: &str = "pixflow_runtime";
