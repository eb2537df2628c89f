//! Prompt execution engine.
//!
//! This module provides the runtime for executing prompts:
//! - [`Engine`]: Schedules nodes in waves and merges loop expansions
//! - [`EngineConfig`]: Configuration options
//! - [`ExecutionContext`]: Results of one execution

mod config;
mod context;
mod executor;

pub use config::{EngineConfig, EngineConfigBuilder};
pub use context::ExecutionContext;
pub use executor::Engine;

/// Tracing target for engine operations.
pub const TRACING_TARGET: &str = "pixflow_runtime::engine";
