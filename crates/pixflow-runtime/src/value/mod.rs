//! Data-plane values.
//!
//! Every output slot of every node carries a [`Slot`]: either a ready
//! [`Value`] or the blocked tag that suppresses downstream scheduling.
//! [`Value`] is the universal "any" type that flows between nodes; node types
//! declare which variants they accept at their own input boundary.

mod flow;
mod slot;
mod tensor;

use std::cmp::Ordering;
use std::collections::BTreeMap;

use derive_more::From;
use serde::{Deserialize, Serialize};

pub use flow::FlowToken;
pub use slot::Slot;
pub use tensor::Tensor;

/// Type-erased value for runtime dispatch.
#[derive(Debug, Clone, PartialEq, Default, From, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Value {
    /// Absent value. Distinct from a blocked slot.
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Text.
    String(String),
    /// Ordered sequence.
    List(Vec<Value>),
    /// String-keyed object.
    Map(BTreeMap<String, Value>),
    /// Dense tensor, possibly a batch.
    Tensor(Tensor),
    /// Loop flow token.
    Flow(FlowToken),
}

impl Value {
    /// Returns the variant name, used in diagnostics.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Tensor(_) => "tensor",
            Value::Flow(_) => "flow",
        }
    }

    /// Returns whether this is the null value.
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns this value as a boolean, if it is one.
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns this value as an integer, if it is one.
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns this value as a string slice, if it is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns this value as a list, if it is one.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns this value as a flow token, if it is one.
    pub const fn as_flow(&self) -> Option<&FlowToken> {
        match self {
            Value::Flow(token) => Some(token),
            _ => None,
        }
    }

    /// Returns this value as a tensor, if it is one.
    pub const fn as_tensor(&self) -> Option<&Tensor> {
        match self {
            Value::Tensor(tensor) => Some(tensor),
            _ => None,
        }
    }

    /// Returns the numeric interpretation of this value.
    ///
    /// Integers, floats, booleans and single-element tensors are numeric.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Bool(b) => Some(f64::from(u8::from(*b))),
            Value::Tensor(t) => t.scalar().map(f64::from),
            _ => None,
        }
    }

    /// Converts this value to an integer the way loop counters read it.
    ///
    /// Floats are truncated, numeric strings are parsed, single-element
    /// tensors are unwrapped. Anything else reads as `0`.
    pub fn to_int_lossy(&self) -> i64 {
        match self {
            Value::Int(i) => *i,
            Value::String(s) => s.trim().parse::<i64>().unwrap_or(0),
            other => other.as_number().map(|n| n as i64).unwrap_or(0),
        }
    }

    /// Interprets this value as a condition.
    ///
    /// Only `Bool` values are conditions; a condition wired to anything else
    /// is treated as false so loops stop instead of spinning.
    pub fn is_truthy(&self) -> bool {
        self.as_bool().unwrap_or(false)
    }

    /// Returns whether this value holds no data.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            Value::List(items) => items.is_empty(),
            Value::Map(map) => map.is_empty(),
            Value::Tensor(t) => t.numel() == 0,
            Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Flow(_) => false,
        }
    }

    /// Compares two values for equality, numerically across int and float.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self.as_number(), other.as_number()) {
            (Some(a), Some(b)) if !self.is_tensor() && !other.is_tensor() => a == b,
            _ => self == other,
        }
    }

    /// Orders two values when they are comparable.
    ///
    /// Numbers compare numerically, strings lexicographically. Returns `None`
    /// for every other pairing.
    pub fn loose_cmp(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            _ => {
                let a = self.as_number()?;
                let b = other.as_number()?;
                a.partial_cmp(&b)
            }
        }
    }

    const fn is_tensor(&self) -> bool {
        matches!(self, Value::Tensor(_))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}
