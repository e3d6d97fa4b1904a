//! Shortest-time path search over parity-constrained graphs
//!
//! A tracer walks the graph carrying its elapsed time. Following an edge whose
//! parity matches the current time costs one step; otherwise the tracer waits
//! one step at the node first. The search runs tracers in parallel and returns
//! every path that reaches the destination in the minimal time.

pub mod config;
pub mod parallel;
pub mod result;
pub mod tracer;

pub use config::{DEFAULT_MAX_STEPS, SearchConfig};
pub use parallel::run_parallel_search;
pub use result::{PruneReason, SearchResult, SearchStatistics, WorkerStatistics};
pub use tracer::{TraceHistory, Tracer};

use crate::graph::{Graph, NodeId};
use thiserror::Error;

/// Invalid search requests
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("start and destination are the same node ({0})")]
    StartIsDestination(String),
    #[error("node {0} does not belong to this graph")]
    UnknownNode(NodeId),
}

/// Find every shortest-time path from `start` to `destination`.
///
/// Per-node bookkeeping is reset first, so the same graph can be searched
/// repeatedly. An unreachable destination is not an error: the result then has
/// no paths and [`SearchResult::found_path`] is false.
pub fn find_shortest_paths(
    graph: &mut Graph,
    start: NodeId,
    destination: NodeId,
    config: &SearchConfig,
) -> Result<SearchResult, SearchError> {
    for id in [start, destination] {
        if !graph.contains(id) {
            return Err(SearchError::UnknownNode(id));
        }
    }
    if start == destination {
        return Err(SearchError::StartIsDestination(
            graph.name(start).to_string(),
        ));
    }

    graph.reset_search_state();
    Ok(run_parallel_search(graph, start, destination, config))
}
