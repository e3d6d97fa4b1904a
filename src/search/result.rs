//! Search result types and statistics

use crate::graph::{Graph, NodeId, UNREACHED};
use std::fmt;
use std::time::Duration;

/// Why a tracer was discarded without branching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneReason {
    /// Elapsed time above the step ceiling
    StepLimit,
    /// Elapsed time above the best known time to the destination
    GlobalBest,
    /// Another tracer reached the same node more than one step earlier
    NodeArrival,
}

impl fmt::Display for PruneReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PruneReason::StepLimit => write!(f, "step limit"),
            PruneReason::GlobalBest => write!(f, "global best"),
            PruneReason::NodeArrival => write!(f, "node arrival"),
        }
    }
}

/// Counters kept by a single worker
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerStatistics {
    pub worker_id: usize,
    /// Tracers pulled from the frontier
    pub tracers_processed: u64,
    pub pruned_step_limit: u64,
    pub pruned_global_best: u64,
    pub pruned_node_arrival: u64,
    /// Successor tracers pushed
    pub successors_pushed: u64,
    /// Destination arrivals sent to the coordinator
    pub wins_recorded: u64,
    /// Tracers dropped without branching after the deadline
    pub abandoned: u64,
}

impl WorkerStatistics {
    pub fn new(worker_id: usize) -> Self {
        Self {
            worker_id,
            ..Default::default()
        }
    }

    pub fn record_prune(&mut self, reason: PruneReason) {
        match reason {
            PruneReason::StepLimit => self.pruned_step_limit += 1,
            PruneReason::GlobalBest => self.pruned_global_best += 1,
            PruneReason::NodeArrival => self.pruned_node_arrival += 1,
        }
    }

    pub fn total_pruned(&self) -> u64 {
        self.pruned_step_limit + self.pruned_global_best + self.pruned_node_arrival
    }
}

/// Statistics from a search operation
#[derive(Debug, Clone, Default)]
pub struct SearchStatistics {
    /// Total time spent searching
    pub elapsed_time: Duration,
    pub num_workers: usize,
    pub tracers_processed: u64,
    pub pruned_step_limit: u64,
    pub pruned_global_best: u64,
    pub pruned_node_arrival: u64,
    pub successors_pushed: u64,
    pub wins_recorded: u64,
    pub abandoned: u64,
    /// Whether the deadline expired before the search finished
    pub timed_out: bool,
    pub per_worker: Vec<WorkerStatistics>,
}

impl SearchStatistics {
    /// Sum per-worker counters
    pub fn aggregate(mut per_worker: Vec<WorkerStatistics>) -> Self {
        per_worker.sort_by_key(|w| w.worker_id);
        let mut stats = Self {
            num_workers: per_worker.len(),
            ..Default::default()
        };
        for w in &per_worker {
            stats.tracers_processed += w.tracers_processed;
            stats.pruned_step_limit += w.pruned_step_limit;
            stats.pruned_global_best += w.pruned_global_best;
            stats.pruned_node_arrival += w.pruned_node_arrival;
            stats.successors_pushed += w.successors_pushed;
            stats.wins_recorded += w.wins_recorded;
            stats.abandoned += w.abandoned;
        }
        stats.per_worker = per_worker;
        stats
    }

    pub fn total_pruned(&self) -> u64 {
        self.pruned_step_limit + self.pruned_global_best + self.pruned_node_arrival
    }

    /// Get tracers processed per second
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed_time.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.tracers_processed as f64 / secs
        }
    }

    /// Format statistics as a human-readable string
    pub fn format_summary(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!("Time: {:.2?}\n", self.elapsed_time));
        s.push_str(&format!("Workers: {}\n", self.num_workers));
        s.push_str(&format!("Tracers processed: {}\n", self.tracers_processed));
        s.push_str(&format!(
            "Throughput: {:.0} tracers/sec\n",
            self.throughput()
        ));
        s.push_str(&format!(
            "Pruned: {} (step limit {}, global best {}, node arrival {})\n",
            self.total_pruned(),
            self.pruned_step_limit,
            self.pruned_global_best,
            self.pruned_node_arrival
        ));
        s.push_str(&format!("Successors pushed: {}\n", self.successors_pushed));
        s.push_str(&format!("Wins recorded: {}\n", self.wins_recorded));
        if self.timed_out {
            s.push_str(&format!(
                "Timed out, {} tracers abandoned\n",
                self.abandoned
            ));
        }
        s
    }
}

/// Result of a shortest-path search
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Best time to the destination, `UNREACHED` if there is no path
    pub best_time: u32,
    /// Distinct optimal paths, start and destination included, in sorted order
    pub paths: Vec<Vec<NodeId>>,
    pub statistics: SearchStatistics,
}

impl SearchResult {
    /// Keep the candidates recorded at `best_time`, dropping duplicates.
    ///
    /// Candidates recorded before a better time was discovered are expected
    /// and discarded here.
    pub fn from_candidates(
        best_time: u32,
        candidates: Vec<(Vec<NodeId>, u32)>,
        statistics: SearchStatistics,
    ) -> Self {
        let mut paths: Vec<Vec<NodeId>> = if best_time == UNREACHED {
            Vec::new()
        } else {
            candidates
                .into_iter()
                .filter(|(_, time)| *time == best_time)
                .map(|(path, _)| path)
                .collect()
        };
        paths.sort();
        paths.dedup();

        Self {
            best_time,
            paths,
            statistics,
        }
    }

    pub fn found_path(&self) -> bool {
        self.best_time != UNREACHED
    }

    /// Best time, or `None` when the destination was not reached
    pub fn shortest_time(&self) -> Option<u32> {
        self.found_path().then_some(self.best_time)
    }

    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    /// Render the result with node names from `graph`, timing before paths
    pub fn display<'a>(&'a self, graph: &'a Graph) -> DisplayResult<'a> {
        DisplayResult {
            result: self,
            graph,
        }
    }
}

/// Helper returned by [`SearchResult::display`]
pub struct DisplayResult<'a> {
    result: &'a SearchResult,
    graph: &'a Graph,
}

impl fmt::Display for DisplayResult<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.result;
        let elapsed_ms = result.statistics.elapsed_time.as_millis();
        if !result.found_path() {
            writeln!(f, "No path found.")?;
            return writeln!(f, "Execution time: {}ms", elapsed_ms);
        }
        writeln!(f, "Shortest time: {} steps", result.best_time)?;
        writeln!(f, "Number of shortest paths: {}", result.path_count())?;
        writeln!(f, "Execution time: {}ms", elapsed_ms)?;
        writeln!(f)?;
        writeln!(f, "Shortest paths:")?;
        for path in &result.paths {
            writeln!(f, "  {}", self.graph.format_path(path))?;
        }
        Ok(())
    }
}
