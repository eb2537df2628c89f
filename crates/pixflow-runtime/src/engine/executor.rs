//! Prompt execution engine.

use std::sync::Arc;

use futures::StreamExt;
use futures::stream;
use tokio::sync::Semaphore;

use super::context::ExecutionContext;
use super::{EngineConfig, TRACING_TARGET};
use crate::error::{WorkflowError, WorkflowResult};
use crate::graph::{DynamicPrompt, GraphView, Input, NodeId, Prompt};
use crate::node::{InputMode, InputValue, Node, NodeContext, NodeInputs, NodeOutput, NodeRegistry};
use crate::value::Slot;

/// The prompt execution engine.
///
/// Executes a prompt in waves: every node whose linked inputs have resolved
/// runs in the current wave, then loop expansions are merged into the live
/// graph and their nodes join the pending set. A node with a blocked input
/// on an input that does not accept blocked slots is skipped, and all of its
/// outputs become blocked in turn.
pub struct Engine {
    config: EngineConfig,
    registry: NodeRegistry,
    semaphore: Arc<Semaphore>,
}

/// Readiness of a pending node.
enum Prepared {
    /// Some linked input has not resolved yet.
    Waiting,
    /// A required input is blocked.
    Skip,
    /// Every input resolved.
    Ready(Arc<dyn Node>, NodeInputs),
}

impl Engine {
    /// Creates a new engine with the given configuration and the built-in
    /// node types.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_registry(config, NodeRegistry::with_builtins())
    }

    /// Creates a new engine with the given configuration and node types.
    pub fn with_registry(config: EngineConfig, registry: NodeRegistry) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.max_concurrent_runs));

        tracing::info!(
            target: TRACING_TARGET,
            max_concurrent_runs = config.max_concurrent_runs,
            max_parallel_nodes = config.max_parallel_nodes,
            max_expansions = config.max_expansions,
            default_timeout_secs = config.default_timeout.as_secs(),
            "Prompt engine initialized"
        );

        Self {
            config,
            registry,
            semaphore,
        }
    }

    /// Creates a new engine with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(EngineConfig::default())
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the registered node types.
    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    /// Validates a prompt against the registered node types.
    pub fn validate(&self, prompt: &Prompt) -> WorkflowResult<()> {
        prompt.validate(&self.registry)
    }

    /// Stops accepting executions. Pending and later calls to
    /// [`Engine::execute`] fail with [`WorkflowError::Cancelled`].
    pub fn close(&self) {
        self.semaphore.close();
    }

    /// Executes a prompt until no work remains.
    pub async fn execute(&self, prompt: &Prompt) -> WorkflowResult<ExecutionContext> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| WorkflowError::Cancelled)?;

        self.validate(prompt)?;

        tokio::time::timeout(self.config.default_timeout, self.run(prompt))
            .await
            .map_err(|_| WorkflowError::Timeout)?
    }

    async fn run(&self, prompt: &Prompt) -> WorkflowResult<ExecutionContext> {
        let mut pending = prompt.topological_order()?;

        tracing::debug!(
            target: TRACING_TARGET,
            node_count = pending.len(),
            "Starting prompt execution"
        );

        let mut ctx = ExecutionContext::new(DynamicPrompt::new(Arc::new(prompt.clone())));

        while !pending.is_empty() {
            ctx.next_wave();

            let mut waiting = Vec::new();
            let mut ready = Vec::new();
            let mut skipped = 0;
            for id in pending {
                match self.prepare(&ctx, id)? {
                    Prepared::Waiting => waiting.push(id),
                    Prepared::Skip => {
                        ctx.record_skipped(id);
                        skipped += 1;
                    }
                    Prepared::Ready(node, inputs) => ready.push((id, node, inputs)),
                }
            }

            if ready.is_empty() && skipped == 0 {
                return Err(WorkflowError::Stalled {
                    pending: waiting.len(),
                });
            }

            tracing::debug!(
                target: TRACING_TARGET,
                wave = ctx.waves(),
                ready = ready.len(),
                skipped,
                waiting = waiting.len(),
                "Running wave"
            );

            let results = self.run_wave(ctx.live(), ready).await;
            for (id, output) in results {
                match output? {
                    NodeOutput::Slots(outputs) => ctx.record_outputs(id, outputs),
                    NodeOutput::Expand { expansion, outputs } => {
                        // Clones keep the origin of the loop end they copy, so
                        // the count covers every iteration of one loop.
                        let origin = ctx.live().origin_of(id);
                        if ctx.expansions_of(origin) >= self.config.max_expansions {
                            return Err(WorkflowError::ExpansionLimit {
                                node_id: origin,
                                limit: self.config.max_expansions,
                            });
                        }

                        let generation = ctx.live_mut().push_expansion(id, expansion)?;
                        tracing::debug!(
                            target: TRACING_TARGET,
                            node_id = %id,
                            generation = %generation.id,
                            nodes = generation.nodes.len(),
                            "Merged expansion"
                        );
                        waiting.extend(generation.nodes.iter().copied());
                        ctx.record_expansion(origin);
                        ctx.record_outputs(id, outputs);
                    }
                }
            }

            pending = waiting;
        }

        tracing::debug!(
            target: TRACING_TARGET,
            waves = ctx.waves(),
            nodes_executed = ctx.nodes_executed(),
            generations = ctx.generations().len(),
            "Prompt execution completed"
        );

        Ok(ctx)
    }

    /// Runs one wave of ready nodes, at most `max_parallel_nodes` at a time.
    ///
    /// Results come back in the order the nodes were scheduled.
    async fn run_wave(
        &self,
        live: &DynamicPrompt,
        ready: Vec<(NodeId, Arc<dyn Node>, NodeInputs)>,
    ) -> Vec<(NodeId, WorkflowResult<NodeOutput>)> {
        let explore = self.config.explore_options();

        stream::iter(ready.into_iter().map(|(id, node, inputs)| async move {
            let node_ctx = NodeContext::new(id, live, explore);
            tracing::trace!(
                target: TRACING_TARGET,
                node_id = %id,
                generation = %node_ctx.generation(),
                "Executing node"
            );
            (id, node.execute(&node_ctx, inputs).await)
        }))
        .buffered(self.config.max_parallel_nodes)
        .collect()
        .await
    }

    /// Resolves the inputs of a pending node.
    fn prepare(&self, ctx: &ExecutionContext, id: NodeId) -> WorkflowResult<Prepared> {
        let live = ctx.live();
        let definition = live
            .get_node(id)
            .ok_or_else(|| WorkflowError::Internal(format!("scheduled node {id} is not in the graph")))?;
        let node = self
            .registry
            .get(&definition.class_type)
            .ok_or_else(|| WorkflowError::UnknownNodeType {
                node_id: id,
                class_type: definition.class_type.clone(),
            })?;

        let mut inputs = NodeInputs::new(id);
        let mut blocked = false;
        for (name, input) in &definition.inputs {
            let mode = node.input_mode(name);
            let value = match input {
                Input::Link(link) => {
                    if !live.contains(link.node) {
                        return Err(WorkflowError::MalformedGraph {
                            node_id: id,
                            missing: link.node,
                        });
                    }
                    let Some(slot) = ctx.resolve(*link) else {
                        return Ok(Prepared::Waiting);
                    };
                    match mode {
                        InputMode::Raw => InputValue::Raw(input.clone()),
                        InputMode::Resolved if slot.is_blocked() => {
                            blocked = true;
                            continue;
                        }
                        InputMode::Resolved | InputMode::AcceptsBlocked => InputValue::Slot(slot),
                    }
                }
                Input::Value(value) => match mode {
                    InputMode::Raw => InputValue::Raw(input.clone()),
                    InputMode::Resolved | InputMode::AcceptsBlocked => {
                        InputValue::Slot(Slot::Ready(value.clone()))
                    }
                },
            };
            inputs.insert(name.clone(), value);
        }

        if blocked {
            return Ok(Prepared::Skip);
        }
        Ok(Prepared::Ready(node, inputs))
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
