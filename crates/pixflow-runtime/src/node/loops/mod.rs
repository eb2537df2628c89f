//! Loop node types.
//!
//! A loop is a start/end pair joined by a flow link. The start emits a
//! [`FlowToken`] naming itself; the end either terminates with its current
//! values or expands a fresh copy of the body whose start is seeded with
//! those values.

mod for_loop;
mod while_loop;

pub use for_loop::{ForLoopEnd, ForLoopStart};
pub use while_loop::{WhileLoopEnd, WhileLoopStart};

use super::{NodeContext, NodeOutput, OutputSlot};
use crate::error::WorkflowResult;
use crate::graph::{Input, NodeId, value_channel};
use crate::value::{FlowToken, Slot, Value};

/// Opens or closes a loop at its start node.
///
/// Output `0` is the flow token, output `i + 1` carries value channel `i`.
/// A closed loop blocks every value output so the body is skipped.
fn open_loop(start: NodeId, condition: bool, values: Vec<Slot>) -> NodeOutput {
    let token = if condition {
        FlowToken::open(start)
    } else {
        FlowToken::closed(start)
    };

    let mut outputs = Vec::with_capacity(values.len() + 1);
    outputs.push(OutputSlot::from(Value::Flow(token)));
    outputs.extend(values.into_iter().map(|value| {
        if condition {
            OutputSlot::Slot(value)
        } else {
            OutputSlot::Slot(Slot::Blocked)
        }
    }));
    NodeOutput::Slots(outputs)
}

/// Outputs of a loop end whose body never opened.
///
/// Returns the start's value channels from `first` on, as it was given them:
/// literals become values, links become aliases of their producers.
fn initial_outputs(ctx: &NodeContext<'_>, start: NodeId, first: usize) -> WorkflowResult<NodeOutput> {
    let start = ctx.get_node(start)?;
    let arity = start.channel_arity();

    let outputs = (first..arity)
        .map(|index| match start.input(&value_channel(index)) {
            Some(Input::Value(value)) => OutputSlot::from(value.clone()),
            Some(Input::Link(link)) => OutputSlot::Alias(*link),
            None => OutputSlot::from(Value::Null),
        })
        .collect();

    Ok(NodeOutput::Slots(outputs))
}
