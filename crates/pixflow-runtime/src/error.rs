//! Workflow error types.

use thiserror::Error;

use crate::graph::NodeId;

/// Result type for workflow operations.
pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Errors that can occur during workflow operations.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// A link references a node that does not exist in the live graph.
    #[error("node {node_id} links to missing node {missing}")]
    MalformedGraph {
        /// ID of the node holding the dangling link.
        node_id: NodeId,
        /// ID the link points at.
        missing: NodeId,
    },

    /// A node's type tag is not registered.
    #[error("node {node_id} has unknown type {class_type:?}")]
    UnknownNodeType {
        /// ID of the node.
        node_id: NodeId,
        /// The unregistered type tag.
        class_type: String,
    },

    /// Prompt definition is invalid.
    #[error("invalid prompt definition: {0}")]
    InvalidDefinition(String),

    /// A loop-start/loop-end pair declares different channel counts.
    #[error(
        "loop end {end} carries {end_arity} value channels but its start {start} carries {start_arity}"
    )]
    ArityMismatch {
        /// ID of the loop-start node.
        start: NodeId,
        /// ID of the loop-end node.
        end: NodeId,
        /// Channels declared on the start.
        start_arity: usize,
        /// Channels declared on the end.
        end_arity: usize,
    },

    /// A node received an input it cannot work with.
    #[error("invalid input {input:?} for node {node_id}: {message}")]
    InvalidInput {
        /// ID of the node.
        node_id: NodeId,
        /// Input name.
        input: String,
        /// Error message.
        message: String,
    },

    /// Node execution failed.
    #[error("node {node_id} failed: {message}")]
    NodeFailed {
        /// ID of the failed node.
        node_id: NodeId,
        /// Error message.
        message: String,
    },

    /// Pending nodes remain but none of them can ever become ready.
    #[error("execution stalled with {pending} pending nodes")]
    Stalled {
        /// Number of nodes that never became ready.
        pending: usize,
    },

    /// A single loop produced more generations than allowed.
    #[error("loop {node_id} exceeded the expansion limit of {limit} generations")]
    ExpansionLimit {
        /// Loop end the runaway clones descend from.
        node_id: NodeId,
        /// The configured limit.
        limit: usize,
    },

    /// Workflow execution was cancelled.
    #[error("workflow execution cancelled")]
    Cancelled,

    /// Workflow execution timed out.
    #[error("workflow execution timed out")]
    Timeout,

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl WorkflowError {
    /// Creates an invalid input error.
    pub fn invalid_input(
        node_id: NodeId,
        input: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidInput {
            node_id,
            input: input.into(),
            message: message.into(),
        }
    }
}
