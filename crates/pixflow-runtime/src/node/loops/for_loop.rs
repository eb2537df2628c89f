//! Counted loops.
//!
//! A counted loop is a while loop whose channel `0` holds the index. The end
//! node does not clone the body itself: it expands into an increment, a
//! comparison against `total` and a [`WhileLoopEnd`](super::WhileLoopEnd),
//! which then drives the iteration.

use super::{initial_outputs, open_loop};
use crate::error::WorkflowResult;
use crate::graph::{GraphBuilder, Input, Link, value_channel};
use crate::node::{
    BuiltinNode, InputMode, Node, NodeContext, NodeInputs, NodeOutput, OutputSlot, TRACING_TARGET,
};
use crate::value::{Slot, Value};

/// Opens a loop that runs `total` times.
///
/// Inputs: `total` (int), value channels `value_1..` and the hidden index
/// seed `value_0` (default 0). Outputs: the flow token, the index, then one
/// output per value channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForLoopStart;

#[async_trait::async_trait]
impl Node for ForLoopStart {
    fn input_mode(&self, name: &str) -> InputMode {
        match name {
            "total" | "value_0" => InputMode::Resolved,
            _ => InputMode::AcceptsBlocked,
        }
    }

    async fn execute(
        &self,
        ctx: &NodeContext<'_>,
        inputs: NodeInputs,
    ) -> WorkflowResult<NodeOutput> {
        let total = inputs.require("total")?.to_int_lossy();
        let index = inputs.int_or("value_0", 0);

        let mut values = inputs.channel_slots();
        match values.first_mut() {
            Some(first) => *first = Slot::Ready(Value::Int(index)),
            None => values.push(Slot::Ready(Value::Int(index))),
        }

        Ok(open_loop(ctx.node_id(), total > 0, values))
    }
}

/// Closes a counted loop.
///
/// Inputs: `flow` from the paired start and value channels `value_1..`,
/// taken as links. Outputs: one per value channel, starting at channel 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForLoopEnd;

#[async_trait::async_trait]
impl Node for ForLoopEnd {
    fn input_mode(&self, name: &str) -> InputMode {
        match name {
            "flow" => InputMode::Resolved,
            _ => InputMode::Raw,
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
                "counted loop never opened, returning initial values"
            );
            return initial_outputs(ctx, token.start, 1);
        }

        // Clones copy `total` verbatim, so the start named by the token
        // carries the same operand as the submitted one.
        let start = ctx.get_node(token.start)?;
        let total = match start.input("total") {
            Some(Input::Link(link)) => Input::Link(*link),
            Some(Input::Value(value)) => Input::Value(Value::Int(value.to_int_lossy())),
            None => Input::Value(Value::Int(0)),
        };

        let mut graph = GraphBuilder::new();
        let next_index = graph
            .node(BuiltinNode::MathInt)
            .set_input("operation", "add")
            .set_input("a", Link::new(token.start, 1))
            .set_input("b", 1)
            .id();
        let condition = graph
            .node(BuiltinNode::Compare)
            .set_input("comparison", "a < b")
            .set_input("a", Link::new(next_index, 0))
            .set_input("b", total)
            .id();

        let mut end = graph.node(BuiltinNode::WhileLoopEnd);
        end.set_input("flow", Link::new(token.start, 0))
            .set_input("condition", Link::new(condition, 0))
            .set_input(value_channel(0), Link::new(next_index, 0));
        for (index, input) in inputs.raw_channels() {
            if index > 0 {
                end.set_input(value_channel(index), input.clone());
            }
        }
        let end_id = end.id();

        let arity = start
            .channel_arity()
            .max(inputs.channel_arity())
            .max(1);
        let outputs = (1..arity)
            .map(|index| OutputSlot::Alias(Link::new(end_id, index)))
            .collect();

        tracing::debug!(
            target: TRACING_TARGET,
            node_id = %ctx.node_id(),
            start = %token.start,
            "expanding counted loop"
        );

        Ok(NodeOutput::Expand {
            expansion: graph.finalize(end_id)?,
            outputs,
        })
    }
}
