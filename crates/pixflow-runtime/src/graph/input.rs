//! Node inputs and links.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::NodeId;
use crate::value::Value;

/// A reference to one output slot of a producer node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Link {
    /// Producer node.
    pub node: NodeId,
    /// Output slot on the producer.
    pub slot: usize,
}

impl Link {
    /// Creates a link to `slot` of `node`.
    pub const fn new(node: NodeId, slot: usize) -> Self {
        Self { node, slot }
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.node, self.slot)
    }
}

/// A node input: a literal value or a link to another node's output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Input {
    /// Literal value.
    Value(Value),
    /// Output of another node.
    Link(Link),
}

impl Input {
    /// Returns the link, if this input is one.
    pub const fn as_link(&self) -> Option<&Link> {
        match self {
            Input::Link(link) => Some(link),
            Input::Value(_) => None,
        }
    }

    /// Returns the literal value, if this input is one.
    pub const fn as_value(&self) -> Option<&Value> {
        match self {
            Input::Value(value) => Some(value),
            Input::Link(_) => None,
        }
    }
}

impl From<Link> for Input {
    fn from(link: Link) -> Self {
        Input::Link(link)
    }
}

impl From<Value> for Input {
    fn from(value: Value) -> Self {
        Input::Value(value)
    }
}

impl From<bool> for Input {
    fn from(value: bool) -> Self {
        Input::Value(Value::Bool(value))
    }
}

impl From<i64> for Input {
    fn from(value: i64) -> Self {
        Input::Value(Value::Int(value))
    }
}

impl From<i32> for Input {
    fn from(value: i32) -> Self {
        Input::Value(Value::from(value))
    }
}

impl From<&str> for Input {
    fn from(value: &str) -> Self {
        Input::Value(Value::from(value))
    }
}
