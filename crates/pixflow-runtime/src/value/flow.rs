//! Loop flow token.

use serde::{Deserialize, Serialize};

use crate::graph::NodeId;

/// Token handed from a loop-start node to its loop-end node.
///
/// `start` is the id of the loop-start instance that emitted the token in the
/// current generation. `open` is false when the start's condition was false
/// and the body was never scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlowToken {
    /// Loop-start node that produced this token.
    pub start: NodeId,
    /// Whether the loop body was opened.
    pub open: bool,
}

impl FlowToken {
    /// Creates a token for an opened loop.
    pub const fn open(start: NodeId) -> Self {
        Self { start, open: true }
    }

    /// Creates a token for a loop whose body never runs.
    pub const fn closed(start: NodeId) -> Self {
        Self { start, open: false }
    }
}
