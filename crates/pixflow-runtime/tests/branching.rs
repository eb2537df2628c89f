//! End-to-end branching and scheduling.

use std::sync::Arc;

use pixflow_runtime::engine::{Engine, EngineConfig};
use pixflow_runtime::graph::{Link, NodeId, Prompt, PromptNode};
use pixflow_runtime::node::{Node, NodeContext, NodeInputs, NodeOutput, NodeRegistry, OutputSlot};
use pixflow_runtime::value::Value;
use pixflow_runtime::{WorkflowError, WorkflowResult};
use uuid::Uuid;

fn test_node_id(n: u128) -> NodeId {
    NodeId::from_uuid(Uuid::from_u128(n))
}

/// Dispatches 5 to `+1` on the true branch or `*2` on the false branch,
/// then merges both branches.
fn dispatch_prompt(predicate: bool) -> Prompt {
    let mut prompt = Prompt::new();
    prompt.add_node_with_id(
        test_node_id(1),
        PromptNode::new("IfElseDispatcher")
            .with_input("any_value", 5)
            .with_input("if_true", predicate),
    );
    prompt.add_node_with_id(
        test_node_id(2),
        PromptNode::new("MathInt")
            .with_input("operation", "add")
            .with_input("a", Link::new(test_node_id(1), 0))
            .with_input("b", 1),
    );
    prompt.add_node_with_id(
        test_node_id(3),
        PromptNode::new("MathInt")
            .with_input("operation", "multiply")
            .with_input("a", Link::new(test_node_id(1), 1))
            .with_input("b", 2),
    );
    prompt.add_node_with_id(
        test_node_id(4),
        PromptNode::new("IfElseGate")
            .with_input("true_path", Link::new(test_node_id(2), 0))
            .with_input("false_path", Link::new(test_node_id(3), 0)),
    );
    prompt
}

#[tokio::test]
async fn test_only_taken_branch_runs() {
    let engine = Engine::with_defaults();

    let ctx = engine
        .execute(&dispatch_prompt(true))
        .await
        .expect("execution failed");
    assert_eq!(ctx.value(Link::new(test_node_id(4), 0)), Some(Value::Int(6)));
    assert!(ctx.is_skipped(test_node_id(3)));
    assert_eq!(ctx.executions_of(test_node_id(2)), 1);

    let ctx = engine
        .execute(&dispatch_prompt(false))
        .await
        .expect("execution failed");
    assert_eq!(ctx.value(Link::new(test_node_id(4), 0)), Some(Value::Int(10)));
    assert!(ctx.is_skipped(test_node_id(2)));
    assert_eq!(ctx.executions_of(test_node_id(3)), 1);
}

#[tokio::test]
async fn test_blocked_branch_propagates_downstream() {
    let mut prompt = dispatch_prompt(true);
    prompt.add_node_with_id(
        test_node_id(5),
        PromptNode::new("IsEmpty").with_input("any_data", Link::new(test_node_id(3), 0)),
    );

    let engine = Engine::with_defaults();
    let ctx = engine.execute(&prompt).await.expect("execution failed");
    assert!(ctx.is_skipped(test_node_id(5)));
    assert_eq!(ctx.value(Link::new(test_node_id(5), 0)), None);
}

#[tokio::test]
async fn test_branch_inside_loop() {
    // Even indices go through `+100`, odd ones pass through `*1`.
    let mut prompt = Prompt::new();
    prompt.add_node_with_id(
        test_node_id(1),
        PromptNode::new("ForLoopStart")
            .with_input("total", 4)
            .with_input("value_1", Value::List(vec![])),
    );
    prompt.add_node_with_id(
        test_node_id(2),
        PromptNode::new("MathInt")
            .with_input("operation", "modulo")
            .with_input("a", Link::new(test_node_id(1), 1))
            .with_input("b", 2),
    );
    prompt.add_node_with_id(
        test_node_id(3),
        PromptNode::new("Compare")
            .with_input("comparison", "a == b")
            .with_input("a", Link::new(test_node_id(2), 0))
            .with_input("b", 0),
    );
    prompt.add_node_with_id(
        test_node_id(4),
        PromptNode::new("IfElseDispatcher")
            .with_input("any_value", Link::new(test_node_id(1), 1))
            .with_input("if_true", Link::new(test_node_id(3), 0)),
    );
    prompt.add_node_with_id(
        test_node_id(5),
        PromptNode::new("MathInt")
            .with_input("operation", "add")
            .with_input("a", Link::new(test_node_id(4), 0))
            .with_input("b", 100),
    );
    prompt.add_node_with_id(
        test_node_id(6),
        PromptNode::new("MathInt")
            .with_input("operation", "multiply")
            .with_input("a", Link::new(test_node_id(4), 1))
            .with_input("b", 1),
    );
    prompt.add_node_with_id(
        test_node_id(7),
        PromptNode::new("IfElseGate")
            .with_input("true_path", Link::new(test_node_id(5), 0))
            .with_input("false_path", Link::new(test_node_id(6), 0)),
    );
    prompt.add_node_with_id(
        test_node_id(8),
        PromptNode::new("ListFromLoop")
            .with_input("list_in", Link::new(test_node_id(1), 2))
            .with_input("item", Link::new(test_node_id(7), 0)),
    );
    prompt.add_node_with_id(
        test_node_id(9),
        PromptNode::new("ForLoopEnd")
            .with_input("flow", Link::new(test_node_id(1), 0))
            .with_input("value_1", Link::new(test_node_id(8), 0)),
    );

    let engine = Engine::with_defaults();
    let ctx = engine.execute(&prompt).await.expect("execution failed");

    let expected = [100, 1, 102, 3].map(Value::Int).to_vec();
    assert_eq!(
        ctx.value(Link::new(test_node_id(9), 0)),
        Some(Value::List(expected))
    );
    assert_eq!(ctx.executions_of(test_node_id(5)), 2);
    assert_eq!(ctx.executions_of(test_node_id(6)), 2);
}

/// Points its only output at a node that never exists.
struct Dangling;

#[async_trait::async_trait]
impl Node for Dangling {
    async fn execute(
        &self,
        _ctx: &NodeContext<'_>,
        _inputs: NodeInputs,
    ) -> WorkflowResult<NodeOutput> {
        Ok(NodeOutput::Slots(vec![OutputSlot::Alias(Link::new(
            NodeId::new(),
            0,
        ))]))
    }
}

#[tokio::test]
async fn test_unresolvable_alias_stalls() {
    let mut registry = NodeRegistry::with_builtins();
    registry.register("Dangling", Arc::new(Dangling));

    let mut prompt = Prompt::new();
    prompt.add_node_with_id(test_node_id(1), PromptNode::new("Dangling"));
    prompt.add_node_with_id(
        test_node_id(2),
        PromptNode::new("IsEmpty").with_input("any_data", Link::new(test_node_id(1), 0)),
    );

    let engine = Engine::with_registry(EngineConfig::default(), registry);
    let err = engine.execute(&prompt).await.unwrap_err();
    assert!(matches!(err, WorkflowError::Stalled { pending: 1 }));
}

#[tokio::test]
async fn test_closed_engine_cancels() {
    let engine = Engine::with_defaults();
    engine.close();

    let err = engine.execute(&dispatch_prompt(true)).await.unwrap_err();
    assert!(matches!(err, WorkflowError::Cancelled));
}
