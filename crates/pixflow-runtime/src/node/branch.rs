//! Conditional branching.

use crate::error::WorkflowResult;
use crate::node::{InputMode, Node, NodeContext, NodeInputs, NodeOutput};
use crate::value::{Slot, Value};

/// Routes `any_value` down exactly one of two outputs.
///
/// Output `0` carries the value when `if_true` holds (default true), output
/// `1` otherwise; the other output is blocked.
#[derive(Debug, Clone, Copy, Default)]
pub struct IfElseDispatcher;

#[async_trait::async_trait]
impl Node for IfElseDispatcher {
    async fn execute(
        &self,
        _ctx: &NodeContext<'_>,
        inputs: NodeInputs,
    ) -> WorkflowResult<NodeOutput> {
        let predicate = inputs.bool_or("if_true", true)?;
        let value = Slot::Ready(inputs.value("any_value").cloned().unwrap_or_default());

        let outputs = if predicate {
            [value, Slot::Blocked]
        } else {
            [Slot::Blocked, value]
        };
        Ok(NodeOutput::slots(outputs))
    }
}

/// Merges two branches back into one output.
///
/// Emits `false_path` when `true_path` is blocked, `true_path` otherwise.
/// Both inputs accept blocked slots.
#[derive(Debug, Clone, Copy, Default)]
pub struct IfElseGate;

#[async_trait::async_trait]
impl Node for IfElseGate {
    fn input_mode(&self, _name: &str) -> InputMode {
        InputMode::AcceptsBlocked
    }

    async fn execute(
        &self,
        _ctx: &NodeContext<'_>,
        inputs: NodeInputs,
    ) -> WorkflowResult<NodeOutput> {
        let read = |name: &str| {
            inputs
                .slot(name)
                .cloned()
                .unwrap_or(Slot::Ready(Value::Null))
        };

        let output = match read("true_path") {
            Slot::Blocked => read("false_path"),
            ready => ready,
        };
        Ok(NodeOutput::slots([output]))
    }
}
