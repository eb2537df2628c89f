//! Results of a prompt execution.

use std::collections::HashMap;

use crate::graph::{DynamicPrompt, Generation, GraphView, Link, NodeId};
use crate::node::OutputSlot;
use crate::value::{Slot, Value};

/// What became of a node.
#[derive(Debug, Clone, PartialEq)]
enum NodeResult {
    /// The node ran and produced these outputs.
    Outputs(Vec<OutputSlot>),
    /// A required input was blocked; every output is blocked.
    Skipped,
}

/// Execution context for a prompt run.
///
/// Holds the live graph with every generation created during the run, and
/// what each node produced. Returned by [`Engine::execute`] for inspection.
///
/// [`Engine::execute`]: super::Engine::execute
#[derive(Debug)]
pub struct ExecutionContext {
    live: DynamicPrompt,
    results: HashMap<NodeId, NodeResult>,
    executions: HashMap<NodeId, usize>,
    expansions: HashMap<NodeId, usize>,
    waves: usize,
}

impl ExecutionContext {
    pub(crate) fn new(live: DynamicPrompt) -> Self {
        Self {
            live,
            results: HashMap::new(),
            executions: HashMap::new(),
            expansions: HashMap::new(),
            waves: 0,
        }
    }

    /// Returns the live graph.
    pub fn live(&self) -> &DynamicPrompt {
        &self.live
    }

    pub(crate) fn live_mut(&mut self) -> &mut DynamicPrompt {
        &mut self.live
    }

    /// Returns every generation created during the run.
    pub fn generations(&self) -> &[Generation] {
        self.live.generations()
    }

    /// Resolves an output slot, following aliases into expansions.
    ///
    /// Returns `None` while the producer has not finished. Reading past the
    /// end of a node's outputs yields null.
    pub fn resolve(&self, link: Link) -> Option<Slot> {
        let mut link = link;
        for _ in 0..=self.results.len() {
            match self.results.get(&link.node)? {
                NodeResult::Skipped => return Some(Slot::Blocked),
                NodeResult::Outputs(outputs) => match outputs.get(link.slot) {
                    None => return Some(Slot::Ready(Value::Null)),
                    Some(OutputSlot::Slot(slot)) => return Some(slot.clone()),
                    Some(OutputSlot::Alias(next)) => link = *next,
                },
            }
        }
        None
    }

    /// Resolves an output slot to its value, if it is ready.
    pub fn value(&self, link: Link) -> Option<Value> {
        self.resolve(link).and_then(Slot::into_value)
    }

    /// Resolves every output of a node.
    pub fn outputs(&self, id: NodeId) -> Option<Vec<Slot>> {
        let count = match self.results.get(&id)? {
            NodeResult::Outputs(outputs) => outputs.len(),
            NodeResult::Skipped => 0,
        };
        (0..count)
            .map(|slot| self.resolve(Link::new(id, slot)))
            .collect()
    }

    /// Returns whether a node finished, executed or skipped.
    pub fn is_finished(&self, id: NodeId) -> bool {
        self.results.contains_key(&id)
    }

    /// Returns whether a node was skipped because of a blocked input.
    pub fn is_skipped(&self, id: NodeId) -> bool {
        matches!(self.results.get(&id), Some(NodeResult::Skipped))
    }

    /// Number of times a submitted node ran, counting its clones.
    pub fn executions_of(&self, id: NodeId) -> usize {
        self.executions.get(&id).copied().unwrap_or(0)
    }

    /// Total number of node executions.
    pub fn nodes_executed(&self) -> usize {
        self.executions.values().sum()
    }

    /// Number of generations expanded by a loop end and all of its clones.
    pub fn expansions_of(&self, id: NodeId) -> usize {
        self.expansions.get(&id).copied().unwrap_or(0)
    }

    /// Number of scheduling waves the run took.
    pub fn waves(&self) -> usize {
        self.waves
    }

    pub(crate) fn record_outputs(&mut self, id: NodeId, outputs: Vec<OutputSlot>) {
        let origin = self.live.origin_of(id);
        *self.executions.entry(origin).or_default() += 1;
        self.results.insert(id, NodeResult::Outputs(outputs));
    }

    pub(crate) fn record_expansion(&mut self, origin: NodeId) {
        *self.expansions.entry(origin).or_default() += 1;
    }

    pub(crate) fn record_skipped(&mut self, id: NodeId) {
        self.results.insert(id, NodeResult::Skipped);
    }

    pub(crate) fn next_wave(&mut self) {
        self.waves += 1;
    }
}
