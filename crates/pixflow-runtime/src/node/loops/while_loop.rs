//! Condition-driven loops.

use super::{initial_outputs, open_loop};
use crate::error::WorkflowResult;
use crate::expand;
use crate::graph::{Input, Link, value_channel};
use crate::node::{InputMode, Node, NodeContext, NodeInputs, NodeOutput, OutputSlot, TRACING_TARGET};
use crate::value::{Slot, Value};

/// Opens a loop while `condition` holds.
///
/// Inputs: `condition` (bool, default true) and value channels `value_i`.
/// Outputs: the flow token, then one output per value channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhileLoopStart;

#[async_trait::async_trait]
impl Node for WhileLoopStart {
    fn input_mode(&self, name: &str) -> InputMode {
        match name {
            "condition" => InputMode::Resolved,
            _ => InputMode::AcceptsBlocked,
        }
    }

    async fn execute(
        &self,
        ctx: &NodeContext<'_>,
        inputs: NodeInputs,
    ) -> WorkflowResult<NodeOutput> {
        let condition = inputs.bool_or("condition", true)?;
        Ok(open_loop(ctx.node_id(), condition, inputs.channel_slots()))
    }
}

/// Closes a loop, re-expanding its body while `condition` holds.
///
/// Inputs: `flow` from the paired start, `condition` (bool) and value
/// channels `value_i`. Outputs: one per value channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhileLoopEnd;

#[async_trait::async_trait]
impl Node for WhileLoopEnd {
    fn input_mode(&self, name: &str) -> InputMode {
        match name {
            "flow" => InputMode::Resolved,
            _ => InputMode::AcceptsBlocked,
        }
    }

    async fn execute(
        &self,
        ctx: &NodeContext<'_>,
        inputs: NodeInputs,
    ) -> WorkflowResult<NodeOutput> {
        let token = inputs.flow("flow")?;
        if !token.open {
            tracing::debug!(
                target: TRACING_TARGET,
                node_id = %ctx.node_id(),
                start = %token.start,
                "loop never opened, returning initial values"
            );
            return initial_outputs(ctx, token.start, 0);
        }

        let values = inputs.channel_slots();
        let condition = inputs
            .value("condition")
            .is_some_and(Value::is_truthy);
        if !condition {
            tracing::debug!(
                target: TRACING_TARGET,
                node_id = %ctx.node_id(),
                generation = %ctx.generation(),
                "loop condition false, terminating"
            );
            return Ok(NodeOutput::slots(values));
        }

        let node = ctx.node()?;
        let next_values = values
            .iter()
            .enumerate()
            .map(|(index, slot)| match slot {
                Slot::Ready(value) => Input::Value(value.clone()),
                // A blocked channel keeps pointing at its producer so the
                // next iteration sees the same blocked slot.
                Slot::Blocked => node
                    .input(&value_channel(index))
                    .cloned()
                    .unwrap_or(Input::Value(Value::Null)),
            })
            .collect();

        let expansion = expand::unroll(
            ctx.graph(),
            token.start,
            ctx.node_id(),
            next_values,
            ctx.explore_options(),
        )?;
        let Some(expansion) = expansion else {
            tracing::warn!(
                target: TRACING_TARGET,
                node_id = %ctx.node_id(),
                start = %token.start,
                "loop body not found, terminating with current values"
            );
            return Ok(NodeOutput::slots(values));
        };

        tracing::debug!(
            target: TRACING_TARGET,
            node_id = %ctx.node_id(),
            generation = %ctx.generation(),
            nodes = expansion.len(),
            "expanding next iteration"
        );

        let result = expansion.result();
        let outputs = (0..values.len())
            .map(|index| OutputSlot::Alias(Link::new(result, index)))
            .collect();
        Ok(NodeOutput::Expand { expansion, outputs })
    }
}
