//! Node type registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use super::{
    Compare, CreateEmptyList, ForLoopEnd, ForLoopStart, IfElseDispatcher, IfElseGate, IsEmpty,
    ListFromLoop, MathInt, Node, WhileLoopEnd, WhileLoopStart,
};

/// Type tags of the built-in node types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, EnumIter, EnumString)]
pub enum BuiltinNode {
    /// Opens a condition-driven loop.
    WhileLoopStart,
    /// Closes a condition-driven loop.
    WhileLoopEnd,
    /// Opens a counted loop.
    ForLoopStart,
    /// Closes a counted loop.
    ForLoopEnd,
    /// Accumulates one item per iteration.
    ListFromLoop,
    /// Emits an empty list.
    CreateEmptyList,
    /// Routes a value down one of two branches.
    IfElseDispatcher,
    /// Merges two branches back into one value.
    IfElseGate,
    /// Integer arithmetic.
    MathInt,
    /// Value comparison.
    Compare,
    /// Emptiness check.
    IsEmpty,
}

impl BuiltinNode {
    /// Parses a type tag, returning `None` for non-builtin types.
    pub fn classify(class_type: &str) -> Option<Self> {
        class_type.parse().ok()
    }

    /// Returns whether this type opens a loop.
    pub const fn is_loop_start(self) -> bool {
        matches!(self, Self::WhileLoopStart | Self::ForLoopStart)
    }

    /// Returns whether this type closes a loop.
    pub const fn is_loop_end(self) -> bool {
        matches!(self, Self::WhileLoopEnd | Self::ForLoopEnd)
    }

    /// Returns the loop-start type a loop end must be paired with.
    pub const fn loop_start(self) -> Option<Self> {
        match self {
            Self::WhileLoopEnd => Some(Self::WhileLoopStart),
            Self::ForLoopEnd => Some(Self::ForLoopStart),
            _ => None,
        }
    }

    /// First value channel carried between iterations.
    ///
    /// Counted loops reserve channel `0` for the index.
    pub const fn first_carried_channel(self) -> usize {
        match self {
            Self::ForLoopStart | Self::ForLoopEnd => 1,
            _ => 0,
        }
    }

    /// Returns the implementation of this type.
    pub fn handler(self) -> Arc<dyn Node> {
        match self {
            Self::WhileLoopStart => Arc::new(WhileLoopStart),
            Self::WhileLoopEnd => Arc::new(WhileLoopEnd),
            Self::ForLoopStart => Arc::new(ForLoopStart),
            Self::ForLoopEnd => Arc::new(ForLoopEnd),
            Self::ListFromLoop => Arc::new(ListFromLoop),
            Self::CreateEmptyList => Arc::new(CreateEmptyList),
            Self::IfElseDispatcher => Arc::new(IfElseDispatcher),
            Self::IfElseGate => Arc::new(IfElseGate),
            Self::MathInt => Arc::new(MathInt),
            Self::Compare => Arc::new(Compare),
            Self::IsEmpty => Arc::new(IsEmpty),
        }
    }
}

impl From<BuiltinNode> for String {
    fn from(node: BuiltinNode) -> Self {
        node.as_ref().to_owned()
    }
}

/// Maps type tags to node implementations.
#[derive(Clone, Default)]
pub struct NodeRegistry {
    nodes: HashMap<String, Arc<dyn Node>>,
}

impl NodeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every [`BuiltinNode`].
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for node in BuiltinNode::iter() {
            registry.register(node, node.handler());
        }
        registry
    }

    /// Registers `node` under `class_type`, replacing any previous entry.
    pub fn register(&mut self, class_type: impl Into<String>, node: Arc<dyn Node>) {
        self.nodes.insert(class_type.into(), node);
    }

    /// Returns the implementation registered under `class_type`.
    pub fn get(&self, class_type: &str) -> Option<Arc<dyn Node>> {
        self.nodes.get(class_type).cloned()
    }

    /// Returns whether `class_type` is registered.
    pub fn contains(&self, class_type: &str) -> bool {
        self.nodes.contains_key(class_type)
    }

    /// Lists the registered type tags.
    pub fn list(&self) -> Vec<&str> {
        let mut types: Vec<_> = self.nodes.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}

impl fmt::Debug for NodeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRegistry")
            .field("nodes", &self.list())
            .finish()
    }
}
