//! Node inputs as delivered by the engine.

use std::collections::BTreeMap;

use crate::error::{WorkflowError, WorkflowResult};
use crate::graph::{Input, NodeId, parse_value_channel, value_channel};
use crate::value::{FlowToken, Slot, Value};

/// How an input is delivered to a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputMode {
    /// Linked inputs are resolved to ready values; a blocked producer skips
    /// the node entirely.
    #[default]
    Resolved,
    /// Linked inputs are resolved, and a blocked slot is delivered as is.
    AcceptsBlocked,
    /// The input is delivered unresolved, as the literal or link it was
    /// defined as. Links still order the node after their producers.
    Raw,
}

/// A single delivered input.
#[derive(Debug, Clone, PartialEq)]
pub enum InputValue {
    /// Resolved slot.
    Slot(Slot),
    /// Unresolved definition.
    Raw(Input),
}

/// Inputs delivered to one node execution.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeInputs {
    node_id: NodeId,
    values: BTreeMap<String, InputValue>,
}

impl NodeInputs {
    /// Creates an empty input set for `node_id`.
    pub fn new(node_id: NodeId) -> Self {
        Self {
            node_id,
            values: BTreeMap::new(),
        }
    }

    /// Adds a resolved input.
    pub fn with_slot(mut self, name: impl Into<String>, slot: impl Into<Slot>) -> Self {
        self.insert(name, InputValue::Slot(slot.into()));
        self
    }

    /// Adds an unresolved input.
    pub fn with_raw(mut self, name: impl Into<String>, input: impl Into<Input>) -> Self {
        self.insert(name, InputValue::Raw(input.into()));
        self
    }

    /// Inserts an input.
    pub fn insert(&mut self, name: impl Into<String>, value: InputValue) {
        self.values.insert(name.into(), value);
    }

    /// Returns the node these inputs belong to.
    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    /// Returns an input by name.
    pub fn get(&self, name: &str) -> Option<&InputValue> {
        self.values.get(name)
    }

    /// Returns a resolved input slot.
    pub fn slot(&self, name: &str) -> Option<&Slot> {
        match self.values.get(name)? {
            InputValue::Slot(slot) => Some(slot),
            InputValue::Raw(_) => None,
        }
    }

    /// Returns a ready input value. Blocked and raw inputs read as `None`.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.slot(name).and_then(Slot::value)
    }

    /// Returns an unresolved input.
    pub fn raw(&self, name: &str) -> Option<&Input> {
        match self.values.get(name)? {
            InputValue::Raw(input) => Some(input),
            InputValue::Slot(_) => None,
        }
    }

    /// Returns a ready input value or an error naming the input.
    pub fn require(&self, name: &str) -> WorkflowResult<&Value> {
        self.value(name)
            .ok_or_else(|| WorkflowError::invalid_input(self.node_id, name, "input is required"))
    }

    /// Reads a boolean input, falling back to `default` when absent.
    pub fn bool_or(&self, name: &str, default: bool) -> WorkflowResult<bool> {
        match self.value(name) {
            None | Some(Value::Null) => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(other) => Err(WorkflowError::invalid_input(
                self.node_id,
                name,
                format!("expected bool, got {}", other.type_name()),
            )),
        }
    }

    /// Reads an integer input the way counters read it, `default` when absent.
    pub fn int_or(&self, name: &str, default: i64) -> i64 {
        match self.value(name) {
            None | Some(Value::Null) => default,
            Some(value) => value.to_int_lossy(),
        }
    }

    /// Reads a string input, falling back to `default` when absent.
    pub fn str_or<'a>(&'a self, name: &str, default: &'a str) -> WorkflowResult<&'a str> {
        match self.value(name) {
            None | Some(Value::Null) => Ok(default),
            Some(Value::String(s)) => Ok(s),
            Some(other) => Err(WorkflowError::invalid_input(
                self.node_id,
                name,
                format!("expected string, got {}", other.type_name()),
            )),
        }
    }

    /// Reads a flow token input.
    pub fn flow(&self, name: &str) -> WorkflowResult<FlowToken> {
        self.value(name)
            .and_then(Value::as_flow)
            .copied()
            .ok_or_else(|| {
                WorkflowError::invalid_input(self.node_id, name, "expected a loop flow token")
            })
    }

    /// Number of auxiliary value channels: the highest index plus one.
    pub fn channel_arity(&self) -> usize {
        self.values
            .keys()
            .filter_map(|name| parse_value_channel(name))
            .map(|index| index + 1)
            .max()
            .unwrap_or(0)
    }

    /// Resolved value channels `0..arity`. Unwired channels read as null.
    pub fn channel_slots(&self) -> Vec<Slot> {
        (0..self.channel_arity())
            .map(|index| match self.values.get(&value_channel(index)) {
                Some(InputValue::Slot(slot)) => slot.clone(),
                Some(InputValue::Raw(Input::Value(value))) => Slot::Ready(value.clone()),
                Some(InputValue::Raw(Input::Link(_))) | None => Slot::Ready(Value::Null),
            })
            .collect()
    }

    /// Unresolved value channels with their indices.
    pub fn raw_channels(&self) -> Vec<(usize, &Input)> {
        self.values
            .iter()
            .filter_map(|(name, value)| match value {
                InputValue::Raw(input) => parse_value_channel(name).map(|index| (index, input)),
                InputValue::Slot(_) => None,
            })
            .collect()
    }
}
