//! Node execution results.

use derive_more::From;

use crate::graph::{Expansion, Link};
use crate::value::{Slot, Value};

/// One output slot of a node execution.
#[derive(Debug, Clone, PartialEq, From)]
pub enum OutputSlot {
    /// A produced slot.
    Slot(Slot),
    /// The slot is whatever the linked output resolves to.
    Alias(Link),
}

impl From<Value> for OutputSlot {
    fn from(value: Value) -> Self {
        OutputSlot::Slot(Slot::Ready(value))
    }
}

/// Result of a node execution.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeOutput {
    /// Outputs produced directly.
    Slots(Vec<OutputSlot>),
    /// New nodes to schedule; `outputs` usually alias into the expansion.
    Expand {
        /// Nodes to merge into the live graph.
        expansion: Expansion,
        /// Outputs of the expanding node.
        outputs: Vec<OutputSlot>,
    },
}

impl NodeOutput {
    /// Outputs made of ready values.
    pub fn values(values: impl IntoIterator<Item = Value>) -> Self {
        Self::Slots(values.into_iter().map(OutputSlot::from).collect())
    }

    /// Outputs made of slots.
    pub fn slots(slots: impl IntoIterator<Item = Slot>) -> Self {
        Self::Slots(slots.into_iter().map(OutputSlot::from).collect())
    }

    /// Returns the output slots.
    pub fn outputs(&self) -> &[OutputSlot] {
        match self {
            Self::Slots(outputs) | Self::Expand { outputs, .. } => outputs,
        }
    }
}
