//! List accumulation across loop iterations.

use crate::error::WorkflowResult;
use crate::node::{Node, NodeContext, NodeInputs, NodeOutput};
use crate::value::Value;

/// Appends `item` to a copy of `list`.
///
/// A missing or non-list `list`, or `reset`, starts a fresh list. With
/// `split`, batch tensors contribute one single-element tensor per entry,
/// lists are flattened one level and anything else (text included) is
/// appended whole. A null `item` appends nothing.
pub fn accumulate(list: Option<&Value>, item: &Value, split: bool, reset: bool) -> Vec<Value> {
    let mut items = match list {
        Some(Value::List(items)) if !reset => items.clone(),
        _ => Vec::new(),
    };

    match item {
        Value::Null => {}
        Value::Tensor(tensor) if split && tensor.is_batch() => {
            items.extend(tensor.split_batch().into_iter().map(Value::Tensor));
        }
        Value::List(nested) if split => items.extend(nested.iter().cloned()),
        other => items.push(other.clone()),
    }

    items
}

/// Collects one item per iteration into a list.
///
/// Inputs: `list_in` (the previous list), `item`, `split_items` (default
/// true) and `reset` (default false). Outputs: the list and its length.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListFromLoop;

#[async_trait::async_trait]
impl Node for ListFromLoop {
    async fn execute(
        &self,
        _ctx: &NodeContext<'_>,
        inputs: NodeInputs,
    ) -> WorkflowResult<NodeOutput> {
        let split = inputs.bool_or("split_items", true)?;
        let reset = inputs.bool_or("reset", false)?;
        let item = inputs.value("item").cloned().unwrap_or_default();

        let list = accumulate(inputs.value("list_in"), &item, split, reset);
        let count = i64::try_from(list.len()).unwrap_or(i64::MAX);
        Ok(NodeOutput::values([Value::List(list), Value::Int(count)]))
    }
}

/// Emits an empty list, typically to seed an accumulator.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreateEmptyList;

#[async_trait::async_trait]
impl Node for CreateEmptyList {
    async fn execute(
        &self,
        _ctx: &NodeContext<'_>,
        _inputs: NodeInputs,
    ) -> WorkflowResult<NodeOutput> {
        Ok(NodeOutput::values([Value::List(Vec::new())]))
    }
}
