//! Prompt node definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Input, Link, NodeId};

const VALUE_CHANNEL_PREFIX: &str = "value_";

/// Returns the input name of auxiliary value channel `index`.
pub fn value_channel(index: usize) -> String {
    format!("{VALUE_CHANNEL_PREFIX}{index}")
}

/// Parses an auxiliary value channel name back into its index.
pub fn parse_value_channel(name: &str) -> Option<usize> {
    name.strip_prefix(VALUE_CHANNEL_PREFIX)?.parse().ok()
}

/// A node in a prompt: a type tag and named inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptNode {
    /// Registered node type.
    pub class_type: String,
    /// Named inputs, literal or linked.
    #[serde(default)]
    pub inputs: BTreeMap<String, Input>,
    /// Submitted node this one was cloned from, if it is a clone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<NodeId>,
}

impl PromptNode {
    /// Creates a node of the given type with no inputs.
    pub fn new(class_type: impl Into<String>) -> Self {
        Self {
            class_type: class_type.into(),
            inputs: BTreeMap::new(),
            origin: None,
        }
    }

    /// Sets an input.
    pub fn with_input(mut self, name: impl Into<String>, input: impl Into<Input>) -> Self {
        self.inputs.insert(name.into(), input.into());
        self
    }

    /// Returns an input by name.
    pub fn input(&self, name: &str) -> Option<&Input> {
        self.inputs.get(name)
    }

    /// Iterates over the linked inputs with their names.
    pub fn links(&self) -> impl Iterator<Item = (&str, &Link)> {
        self.inputs
            .iter()
            .filter_map(|(name, input)| input.as_link().map(|link| (name.as_str(), link)))
    }

    /// Iterates over the auxiliary value channels in index order.
    pub fn channels(&self) -> impl Iterator<Item = (usize, &Input)> {
        let mut channels: Vec<_> = self
            .inputs
            .iter()
            .filter_map(|(name, input)| parse_value_channel(name).map(|index| (index, input)))
            .collect();
        channels.sort_by_key(|(index, _)| *index);
        channels.into_iter()
    }

    /// Number of auxiliary value channels: the highest index plus one.
    pub fn channel_arity(&self) -> usize {
        self.channels()
            .map(|(index, _)| index + 1)
            .max()
            .unwrap_or(0)
    }
}
