//! Loop unrolling.
//!
//! An iteration is materialized by three passes over the live graph:
//! - [`explore`]: walk backwards from a loop end, recording which nodes
//!   consume which producers
//! - [`collect`]: walk forwards from the loop start through those consumer
//!   lists to find the loop body
//! - [`clone_body`]: copy the body under fresh IDs, rewiring internal links
//!   and seeding the copied loop start with the next iteration's values

mod clone;
mod contain;
mod explore;

pub use clone::clone_body;
pub use contain::collect;
pub use explore::{Exploration, ExploreOptions, explore};

use crate::error::WorkflowResult;
use crate::graph::{Expansion, GraphView, Input, NodeId};

/// Tracing target for loop unrolling.
pub const TRACING_TARGET: &str = "pixflow_runtime::expand";

/// Produces the next iteration of the loop closed by `end`.
///
/// Returns `None` when the loop body cannot be located, in which case the
/// caller should terminate the loop with its current values.
pub fn unroll<G: GraphView + ?Sized>(
    view: &G,
    start: NodeId,
    end: NodeId,
    next_values: Vec<Input>,
    options: ExploreOptions,
) -> WorkflowResult<Option<Expansion>> {
    let exploration = explore(view, end, options)?;
    let contained = collect(&exploration.upstream, start, end);

    tracing::debug!(
        target: TRACING_TARGET,
        start = %start,
        end = %end,
        explored = exploration.upstream.len(),
        contained = contained.len(),
        "collected loop body"
    );

    clone_body(view, &contained, start, end, next_values)
}
