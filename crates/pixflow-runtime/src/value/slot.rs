//! Output slot state.

use serde::{Deserialize, Serialize};

use super::Value;

/// The state of a single output slot.
///
/// A blocked slot tells the scheduler that consumers of this output must not
/// run. It carries no payload and is never confused with [`Value::Null`]:
/// schedulers check the tag, they never compare values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum Slot {
    /// The slot holds data.
    Ready(Value),
    /// The slot is suppressed; consumers are skipped.
    Blocked,
}

impl Slot {
    /// Returns whether this slot is blocked.
    pub const fn is_blocked(&self) -> bool {
        matches!(self, Slot::Blocked)
    }

    /// Returns the value, if the slot is ready.
    pub const fn value(&self) -> Option<&Value> {
        match self {
            Slot::Ready(value) => Some(value),
            Slot::Blocked => None,
        }
    }

    /// Consumes the slot and returns the value, if ready.
    pub fn into_value(self) -> Option<Value> {
        match self {
            Slot::Ready(value) => Some(value),
            Slot::Blocked => None,
        }
    }
}

impl Default for Slot {
    fn default() -> Self {
        Slot::Ready(Value::Null)
    }
}

impl From<Value> for Slot {
    fn from(value: Value) -> Self {
        Slot::Ready(value)
    }
}

impl From<Option<Value>> for Slot {
    fn from(value: Option<Value>) -> Self {
        value.map_or(Slot::Blocked, Slot::Ready)
    }
}
