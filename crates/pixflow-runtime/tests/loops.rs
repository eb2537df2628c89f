//! End-to-end loop execution.

use pixflow_runtime::WorkflowError;
use pixflow_runtime::engine::{Engine, EngineConfig};
use pixflow_runtime::graph::{GraphView, Link, NodeId, Prompt, PromptNode};
use pixflow_runtime::value::{Slot, Value};
use uuid::Uuid;

fn test_node_id(n: u128) -> NodeId {
    NodeId::from_uuid(Uuid::from_u128(n))
}

const START: u128 = 1;
const TIMES_TEN: u128 = 2;
const ACCUMULATOR: u128 = 3;
const END: u128 = 4;
const SIBLING: u128 = 5;
const CONSUMER: u128 = 6;

/// A counted loop appending `index * 10` to a list, plus a sibling reading
/// the index without feeding the loop end and a consumer of the result.
fn times_ten_loop(total: i64) -> Prompt {
    let mut prompt = Prompt::new();
    prompt.add_node_with_id(
        test_node_id(START),
        PromptNode::new("ForLoopStart")
            .with_input("total", total)
            .with_input("value_1", Value::List(vec![])),
    );
    prompt.add_node_with_id(
        test_node_id(TIMES_TEN),
        PromptNode::new("MathInt")
            .with_input("operation", "multiply")
            .with_input("a", Link::new(test_node_id(START), 1))
            .with_input("b", 10),
    );
    prompt.add_node_with_id(
        test_node_id(ACCUMULATOR),
        PromptNode::new("ListFromLoop")
            .with_input("list_in", Link::new(test_node_id(START), 2))
            .with_input("item", Link::new(test_node_id(TIMES_TEN), 0)),
    );
    prompt.add_node_with_id(
        test_node_id(END),
        PromptNode::new("ForLoopEnd")
            .with_input("flow", Link::new(test_node_id(START), 0))
            .with_input("value_1", Link::new(test_node_id(ACCUMULATOR), 0)),
    );
    prompt.add_node_with_id(
        test_node_id(SIBLING),
        PromptNode::new("IsEmpty").with_input("any_data", Link::new(test_node_id(START), 1)),
    );
    prompt.add_node_with_id(
        test_node_id(CONSUMER),
        PromptNode::new("IsEmpty").with_input("any_data", Link::new(test_node_id(END), 0)),
    );
    prompt
}

fn ints(values: impl IntoIterator<Item = i64>) -> Value {
    Value::List(values.into_iter().map(Value::Int).collect())
}

#[tokio::test]
async fn test_for_loop_accumulates_scaled_indices() {
    let engine = Engine::with_defaults();
    let ctx = engine
        .execute(&times_ten_loop(3))
        .await
        .expect("execution failed");

    assert_eq!(
        ctx.value(Link::new(test_node_id(END), 0)),
        Some(ints([0, 10, 20]))
    );
    assert_eq!(
        ctx.value(Link::new(test_node_id(CONSUMER), 0)),
        Some(Value::Bool(false))
    );
    assert_eq!(ctx.executions_of(test_node_id(TIMES_TEN)), 3);
    assert_eq!(ctx.executions_of(test_node_id(ACCUMULATOR)), 3);
    assert_eq!(ctx.executions_of(test_node_id(END)), 1);
    assert_eq!(ctx.executions_of(test_node_id(CONSUMER)), 1);
}

#[tokio::test]
async fn test_for_loop_runs_once_per_index() {
    let mut prompt = times_ten_loop(5);
    prompt.add_node_with_id(
        test_node_id(TIMES_TEN),
        PromptNode::new("MathInt")
            .with_input("operation", "add")
            .with_input("a", Link::new(test_node_id(START), 1))
            .with_input("b", 0),
    );

    let engine = Engine::with_defaults();
    let ctx = engine.execute(&prompt).await.expect("execution failed");

    assert_eq!(
        ctx.value(Link::new(test_node_id(END), 0)),
        Some(ints(0..5))
    );
    assert_eq!(ctx.generations().len(), 5);
    assert_eq!(ctx.executions_of(test_node_id(START)), 5);
}

#[tokio::test]
async fn test_for_loop_with_non_positive_total_never_expands() {
    for total in [0, -3] {
        let engine = Engine::with_defaults();
        let ctx = engine
            .execute(&times_ten_loop(total))
            .await
            .expect("execution failed");

        assert!(ctx.generations().is_empty());
        assert_eq!(ctx.value(Link::new(test_node_id(END), 0)), Some(ints([])));
        assert!(ctx.is_skipped(test_node_id(TIMES_TEN)));
        assert!(ctx.is_skipped(test_node_id(SIBLING)));
        assert_eq!(ctx.executions_of(test_node_id(ACCUMULATOR)), 0);
    }
}

#[tokio::test]
async fn test_loop_body_excludes_outside_sibling() {
    let engine = Engine::with_defaults();
    let ctx = engine
        .execute(&times_ten_loop(4))
        .await
        .expect("execution failed");

    assert_eq!(ctx.executions_of(test_node_id(SIBLING)), 1);
    for generation in ctx.generations() {
        for id in &generation.nodes {
            assert_ne!(ctx.live().origin_of(*id), test_node_id(SIBLING));
            assert_ne!(ctx.live().origin_of(*id), test_node_id(CONSUMER));
            assert_ne!(ctx.live().origin_of(*id), test_node_id(END));
        }
    }
}

/// A counted loop adding a constant produced outside the body. The same
/// producer also feeds the loop end's second channel directly.
fn outside_producer_loop(total: i64) -> Prompt {
    let (start, producer, sum, end) = (11, 12, 13, 14);
    let mut prompt = Prompt::new();
    prompt.add_node_with_id(
        test_node_id(start),
        PromptNode::new("ForLoopStart")
            .with_input("total", total)
            .with_input("value_1", 0)
            .with_input("value_2", 0),
    );
    prompt.add_node_with_id(
        test_node_id(producer),
        PromptNode::new("MathInt")
            .with_input("operation", "add")
            .with_input("a", 40)
            .with_input("b", 2),
    );
    prompt.add_node_with_id(
        test_node_id(sum),
        PromptNode::new("MathInt")
            .with_input("operation", "add")
            .with_input("a", Link::new(test_node_id(start), 2))
            .with_input("b", Link::new(test_node_id(producer), 0)),
    );
    prompt.add_node_with_id(
        test_node_id(end),
        PromptNode::new("ForLoopEnd")
            .with_input("flow", Link::new(test_node_id(start), 0))
            .with_input("value_1", Link::new(test_node_id(sum), 0))
            .with_input("value_2", Link::new(test_node_id(producer), 0)),
    );
    prompt
}

#[tokio::test]
async fn test_outside_producer_is_shared_across_generations() {
    let (producer, sum, end) = (12, 13, 14);
    let engine = Engine::with_defaults();
    let ctx = engine
        .execute(&outside_producer_loop(3))
        .await
        .expect("execution failed");

    assert_eq!(ctx.value(Link::new(test_node_id(end), 0)), Some(Value::Int(126)));
    assert_eq!(ctx.value(Link::new(test_node_id(end), 1)), Some(Value::Int(42)));
    assert_eq!(ctx.executions_of(test_node_id(producer)), 1);
    assert_eq!(ctx.executions_of(test_node_id(sum)), 3);

    let live = ctx.live();
    assert_eq!(ctx.generations().len(), 3);
    for generation in ctx.generations() {
        for id in &generation.nodes {
            assert_ne!(live.origin_of(*id), test_node_id(producer));
        }
    }

    // One comparison per generation; only the last one stops the loop.
    let conditions: Vec<bool> = ctx
        .generations()
        .iter()
        .map(|generation| {
            let compare = generation
                .nodes
                .iter()
                .copied()
                .find(|id| {
                    live.get_node(*id)
                        .is_some_and(|node| node.class_type == "Compare")
                })
                .expect("generation without comparison");
            ctx.value(Link::new(compare, 0))
                .and_then(|value| value.as_bool())
                .expect("comparison not resolved")
        })
        .collect();
    assert_eq!(conditions, vec![true, true, false]);
}

#[tokio::test]
async fn test_generations_chain_through_recursion_points() {
    let engine = Engine::with_defaults();
    let ctx = engine
        .execute(&times_ten_loop(3))
        .await
        .expect("execution failed");

    let generations = ctx.generations();
    assert_eq!(generations[0].parent, test_node_id(END));
    assert_eq!(generations[0].parent_type, "ForLoopEnd");
    for pair in generations.windows(2) {
        assert!(pair[0].id < pair[1].id);
        assert_eq!(pair[1].parent, pair[0].recursion_point.node);
        assert_eq!(pair[1].parent_type, "WhileLoopEnd");
    }
}

/// Adds a while loop at ids `base + 1 ..= base + 4` whose `value_0` counts
/// up by one until it reaches `limit`.
fn add_counting_while_loop(prompt: &mut Prompt, base: u128, condition: bool, limit: i64) {
    let (start, next, compare, end) = (base + 1, base + 2, base + 3, base + 4);
    prompt.add_node_with_id(
        test_node_id(start),
        PromptNode::new("WhileLoopStart")
            .with_input("condition", condition)
            .with_input("value_0", 0),
    );
    prompt.add_node_with_id(
        test_node_id(next),
        PromptNode::new("MathInt")
            .with_input("operation", "add")
            .with_input("a", Link::new(test_node_id(start), 1))
            .with_input("b", 1),
    );
    prompt.add_node_with_id(
        test_node_id(compare),
        PromptNode::new("Compare")
            .with_input("comparison", "a < b")
            .with_input("a", Link::new(test_node_id(next), 0))
            .with_input("b", limit),
    );
    prompt.add_node_with_id(
        test_node_id(end),
        PromptNode::new("WhileLoopEnd")
            .with_input("flow", Link::new(test_node_id(start), 0))
            .with_input("condition", Link::new(test_node_id(compare), 0))
            .with_input("value_0", Link::new(test_node_id(next), 0)),
    );
}

fn counting_while_loop(condition: bool, limit: i64) -> Prompt {
    let mut prompt = Prompt::new();
    add_counting_while_loop(&mut prompt, 0, condition, limit);
    prompt
}

fn engine_with_expansion_limit(limit: usize) -> Engine {
    let config = EngineConfig::builder()
        .max_expansions(limit)
        .build()
        .expect("invalid config");
    Engine::new(config)
}

#[tokio::test]
async fn test_while_loop_counts_to_limit() {
    let engine = Engine::with_defaults();
    let ctx = engine
        .execute(&counting_while_loop(true, 5))
        .await
        .expect("execution failed");

    assert_eq!(
        ctx.value(Link::new(test_node_id(4), 0)),
        Some(Value::Int(5))
    );
    assert_eq!(ctx.executions_of(test_node_id(2)), 5);
    assert_eq!(ctx.generations().len(), 4);
}

#[tokio::test]
async fn test_closed_while_loop_returns_initial_values() {
    let mut prompt = counting_while_loop(false, 5);
    prompt.add_node_with_id(
        test_node_id(1),
        PromptNode::new("WhileLoopStart")
            .with_input("condition", false)
            .with_input("value_0", 7),
    );

    let engine = Engine::with_defaults();
    let ctx = engine.execute(&prompt).await.expect("execution failed");

    assert_eq!(
        ctx.resolve(Link::new(test_node_id(4), 0)),
        Some(Slot::Ready(Value::Int(7)))
    );
    assert!(ctx.is_skipped(test_node_id(2)));
    assert!(ctx.generations().is_empty());
}

#[tokio::test]
async fn test_runaway_loop_hits_expansion_limit() {
    let mut prompt = counting_while_loop(true, 5);
    prompt.add_node_with_id(
        test_node_id(4),
        PromptNode::new("WhileLoopEnd")
            .with_input("flow", Link::new(test_node_id(1), 0))
            .with_input("condition", true)
            .with_input("value_0", Link::new(test_node_id(2), 0)),
    );

    let engine = engine_with_expansion_limit(8);
    let err = engine.execute(&prompt).await.unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::ExpansionLimit { node_id, limit: 8 } if node_id == test_node_id(4)
    ));
}

#[tokio::test]
async fn test_loop_may_use_its_whole_expansion_budget() {
    // Counting to 9 unrolls the while loop 8 times.
    let engine = engine_with_expansion_limit(8);
    let ctx = engine
        .execute(&counting_while_loop(true, 9))
        .await
        .expect("execution failed");
    assert_eq!(ctx.value(Link::new(test_node_id(4), 0)), Some(Value::Int(9)));
    assert_eq!(ctx.expansions_of(test_node_id(4)), 8);

    let ctx = engine
        .execute(&times_ten_loop(8))
        .await
        .expect("execution failed");
    assert_eq!(ctx.generations().len(), 8);
    assert_eq!(
        ctx.value(Link::new(test_node_id(END), 0)),
        Some(ints((0..8).map(|i| i * 10)))
    );
}

#[tokio::test]
async fn test_sibling_loops_have_separate_expansion_budgets() {
    let mut prompt = Prompt::new();
    add_counting_while_loop(&mut prompt, 0, true, 9);
    add_counting_while_loop(&mut prompt, 10, true, 9);

    let engine = engine_with_expansion_limit(8);
    let ctx = engine.execute(&prompt).await.expect("execution failed");

    assert_eq!(ctx.generations().len(), 16);
    assert_eq!(ctx.value(Link::new(test_node_id(4), 0)), Some(Value::Int(9)));
    assert_eq!(ctx.value(Link::new(test_node_id(14), 0)), Some(Value::Int(9)));
}

#[tokio::test]
async fn test_default_config_runs_long_counted_loops() {
    let mut prompt = Prompt::new();
    prompt.add_node_with_id(
        test_node_id(1),
        PromptNode::new("ForLoopStart").with_input("total", 10_001),
    );
    prompt.add_node_with_id(
        test_node_id(2),
        PromptNode::new("MathInt")
            .with_input("operation", "add")
            .with_input("a", Link::new(test_node_id(1), 1))
            .with_input("b", 1),
    );
    prompt.add_node_with_id(
        test_node_id(3),
        PromptNode::new("ForLoopEnd").with_input("flow", Link::new(test_node_id(1), 0)),
    );

    let ctx = Engine::with_defaults()
        .execute(&prompt)
        .await
        .expect("execution failed");
    assert_eq!(ctx.generations().len(), 10_001);
    assert_eq!(ctx.executions_of(test_node_id(2)), 10_001);
}

/// An outer counted loop of 2 wrapping an inner counted loop of 3, both
/// threading one list that collects `outer * 10 + inner`.
fn nested_loops() -> Prompt {
    let (outer, inner, scaled, sum, list, inner_end, outer_end) = (1, 2, 3, 4, 5, 6, 7);
    let mut prompt = Prompt::new();
    prompt.add_node_with_id(
        test_node_id(outer),
        PromptNode::new("ForLoopStart")
            .with_input("total", 2)
            .with_input("value_1", Value::List(vec![])),
    );
    prompt.add_node_with_id(
        test_node_id(inner),
        PromptNode::new("ForLoopStart")
            .with_input("total", 3)
            .with_input("value_1", Link::new(test_node_id(outer), 2)),
    );
    prompt.add_node_with_id(
        test_node_id(scaled),
        PromptNode::new("MathInt")
            .with_input("operation", "multiply")
            .with_input("a", Link::new(test_node_id(outer), 1))
            .with_input("b", 10),
    );
    prompt.add_node_with_id(
        test_node_id(sum),
        PromptNode::new("MathInt")
            .with_input("operation", "add")
            .with_input("a", Link::new(test_node_id(scaled), 0))
            .with_input("b", Link::new(test_node_id(inner), 1)),
    );
    prompt.add_node_with_id(
        test_node_id(list),
        PromptNode::new("ListFromLoop")
            .with_input("list_in", Link::new(test_node_id(inner), 2))
            .with_input("item", Link::new(test_node_id(sum), 0)),
    );
    prompt.add_node_with_id(
        test_node_id(inner_end),
        PromptNode::new("ForLoopEnd")
            .with_input("flow", Link::new(test_node_id(inner), 0))
            .with_input("value_1", Link::new(test_node_id(list), 0)),
    );
    prompt.add_node_with_id(
        test_node_id(outer_end),
        PromptNode::new("ForLoopEnd")
            .with_input("flow", Link::new(test_node_id(outer), 0))
            .with_input("value_1", Link::new(test_node_id(inner_end), 0)),
    );
    prompt
}

#[tokio::test]
async fn test_nested_loops_rerun_inner_loop_when_descending() {
    let config = EngineConfig::builder()
        .descend_loop_boundaries(true)
        .build()
        .expect("invalid config");
    let engine = Engine::new(config);
    let ctx = engine
        .execute(&nested_loops())
        .await
        .expect("execution failed");

    assert_eq!(
        ctx.value(Link::new(test_node_id(7), 0)),
        Some(ints([0, 1, 2, 10, 11, 12]))
    );
    assert_eq!(ctx.executions_of(test_node_id(4)), 6);
}

#[tokio::test]
async fn test_nested_loops_stop_at_inner_loop_end_by_default() {
    let engine = Engine::with_defaults();
    let ctx = engine
        .execute(&nested_loops())
        .await
        .expect("execution failed");

    assert_eq!(
        ctx.value(Link::new(test_node_id(7), 0)),
        Some(ints([0, 1, 2]))
    );
    assert_eq!(ctx.executions_of(test_node_id(4)), 3);
}

#[tokio::test]
async fn test_prompt_from_json() {
    let json = r#"{
        "nodes": {
            "00000000-0000-0000-0000-000000000001": {
                "class_type": "ForLoopStart",
                "inputs": {
                    "total": { "value": { "type": "int", "data": 2 } },
                    "value_1": { "value": { "type": "list", "data": [] } }
                }
            },
            "00000000-0000-0000-0000-000000000002": {
                "class_type": "ListFromLoop",
                "inputs": {
                    "list_in": { "link": { "node": "00000000-0000-0000-0000-000000000001", "slot": 2 } },
                    "item": { "value": { "type": "string", "data": "frame" } }
                }
            },
            "00000000-0000-0000-0000-000000000003": {
                "class_type": "ForLoopEnd",
                "inputs": {
                    "flow": { "link": { "node": "00000000-0000-0000-0000-000000000001", "slot": 0 } },
                    "value_1": { "link": { "node": "00000000-0000-0000-0000-000000000002", "slot": 0 } }
                }
            }
        },
        "metadata": { "name": "frames" }
    }"#;

    let prompt: Prompt = serde_json::from_str(json).expect("deserialization failed");
    assert_eq!(prompt.metadata.name.as_deref(), Some("frames"));

    let engine = Engine::with_defaults();
    let ctx = engine.execute(&prompt).await.expect("execution failed");
    assert_eq!(
        ctx.value(Link::new(test_node_id(3), 0)),
        Some(Value::List(vec![Value::from("frame"), Value::from("frame")]))
    );
}
