//! Parallel search coordinator that manages worker threads.

use crate::graph::{Graph, NodeId};
use crate::search::config::SearchConfig;
use crate::search::parallel::channel::{
    CoordinatorChannels, SharedBest, WorkerChannels, WorkerMessage, create_channels,
};
use crate::search::parallel::frontier::Frontier;
use crate::search::result::{PruneReason, SearchResult, SearchStatistics, WorkerStatistics};
use crate::search::tracer::Tracer;
use crossbeam_channel::RecvTimeoutError;
use log::{debug, error, trace, warn};
use std::time::{Duration, Instant};

/// State shared by every worker for the duration of one search.
struct SearchContext<'g> {
    graph: &'g Graph,
    destination: NodeId,
    max_steps: u32,
    frontier: Frontier,
    shared: SharedBest,
}

/// What happened to a single pulled tracer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TracerOutcome {
    Pruned(PruneReason),
    /// Reached the destination and was sent to the coordinator
    Won,
    /// Reached the destination slower than the best known time
    Lost,
    Branched(u64),
    /// Deadline expired, no successors generated
    Abandoned,
}

/// Run the parallel search from `start` to `destination`.
///
/// The graph's per-node bookkeeping must be reset before calling this.
pub fn run_parallel_search(
    graph: &Graph,
    start: NodeId,
    destination: NodeId,
    config: &SearchConfig,
) -> SearchResult {
    let start_time = Instant::now();
    let num_workers = config.num_workers.max(1);

    let context = SearchContext {
        graph,
        destination,
        max_steps: config.max_steps,
        frontier: Frontier::new(Tracer::seed(start)),
        shared: SharedBest::default(),
    };

    // Create communication channels
    let (coordinator_channels, worker_channels) = create_channels(num_workers);

    debug!(
        "searching {} -> {} with {} workers (max steps {})",
        graph.name(start),
        graph.name(destination),
        num_workers,
        config.max_steps
    );

    let (candidates, worker_stats, timed_out) = std::thread::scope(|scope| {
        let context = &context;
        let worker_handles: Vec<_> = worker_channels
            .into_iter()
            .map(|channels| scope.spawn(move || run_worker(context, channels)))
            .collect();

        let collected = run_coordinator(
            coordinator_channels,
            &context.shared,
            config.timeout,
            start_time,
        );

        // Wait for all workers to finish
        for handle in worker_handles {
            if handle.join().is_err() {
                error!("search worker panicked");
            }
        }
        collected
    });

    let best_time = context.shared.current_best();
    let mut statistics = SearchStatistics::aggregate(worker_stats);
    statistics.elapsed_time = start_time.elapsed();
    statistics.timed_out = timed_out;

    debug!(
        "search finished in {:.2?}: best time {}, {} candidates, {} tracers processed",
        statistics.elapsed_time,
        best_time,
        candidates.len(),
        statistics.tracers_processed
    );

    SearchResult::from_candidates(best_time, candidates, statistics)
}

/// Coordinator loop that collects wins and worker statistics.
///
/// Returns once every worker has reported `Finished`, which only happens after
/// the frontier has closed, so every win has already been received.
fn run_coordinator(
    channels: CoordinatorChannels,
    shared: &SharedBest,
    timeout: Option<Duration>,
    start_time: Instant,
) -> (Vec<(Vec<NodeId>, u32)>, Vec<WorkerStatistics>, bool) {
    let mut candidates = Vec::new();
    let mut worker_stats = Vec::with_capacity(channels.num_workers);
    let mut timed_out = false;

    // Calculate timeout
    let deadline = timeout.map(|t| start_time + t);

    loop {
        if !timed_out && deadline.is_some_and(|d| Instant::now() >= d) {
            warn!("search deadline expired, draining remaining work");
            shared.signal_stop();
            timed_out = true;
        }

        // Without a deadline there is nothing to check between messages
        let received = match deadline {
            Some(_) if !timed_out => channels
                .from_workers
                .recv_timeout(Duration::from_millis(100)),
            _ => channels
                .from_workers
                .recv()
                .map_err(|_| RecvTimeoutError::Disconnected),
        };
        match received {
            Ok(WorkerMessage::Win {
                worker_id,
                path,
                time,
            }) => {
                trace!("worker {} recorded a path of time {}", worker_id, time);
                candidates.push((path, time));
            }
            Ok(WorkerMessage::Finished {
                worker_id,
                statistics,
            }) => {
                debug!(
                    "worker {} finished after {} tracers",
                    worker_id, statistics.tracers_processed
                );
                worker_stats.push(statistics);
                if worker_stats.len() >= channels.num_workers {
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                // All senders dropped, we're done
                break;
            }
        }
    }

    (candidates, worker_stats, timed_out)
}

/// Worker loop: pull tracers until the frontier closes.
fn run_worker(context: &SearchContext<'_>, channels: WorkerChannels) {
    let mut stats = WorkerStatistics::new(channels.worker_id);

    while let Some(tracer) = context.frontier.pop() {
        stats.tracers_processed += 1;
        // Completes the tracer on return and on unwind alike
        let _completion = CompletionGuard(&context.frontier);
        match process_tracer(&tracer, context, &channels) {
            TracerOutcome::Pruned(reason) => stats.record_prune(reason),
            TracerOutcome::Won => stats.wins_recorded += 1,
            TracerOutcome::Lost => {}
            TracerOutcome::Branched(n) => stats.successors_pushed += n,
            TracerOutcome::Abandoned => stats.abandoned += 1,
        }
    }

    let finished = WorkerMessage::Finished {
        worker_id: channels.worker_id,
        statistics: stats,
    };
    if let Err(e) = channels.to_coordinator.send(finished) {
        error!("worker {} could not report completion: {}", channels.worker_id, e);
    }
}

/// Marks the pulled tracer as processed when dropped, unwinding included.
struct CompletionGuard<'a>(&'a Frontier);

impl Drop for CompletionGuard<'_> {
    fn drop(&mut self) {
        self.0.complete();
    }
}

/// Prune, record or branch a single tracer.
fn process_tracer(
    tracer: &Tracer,
    context: &SearchContext<'_>,
    channels: &WorkerChannels,
) -> TracerOutcome {
    if tracer.time > context.max_steps {
        return TracerOutcome::Pruned(PruneReason::StepLimit);
    }
    // Equal times are kept so that ties reach the destination
    if tracer.time > context.shared.current_best() {
        return TracerOutcome::Pruned(PruneReason::GlobalBest);
    }

    let Some(node) = context.graph.node(tracer.node) else {
        error!("tracer points at unknown node {}", tracer.node);
        return TracerOutcome::Lost;
    };

    // One step of slack: waiting can still let this tracer tie
    let earliest = node.record_arrival(tracer.time);
    if tracer.time > earliest.saturating_add(1) {
        return TracerOutcome::Pruned(PruneReason::NodeArrival);
    }

    if tracer.node == context.destination {
        let outcome = context.shared.offer(tracer.time);
        if !outcome.is_recorded() {
            return TracerOutcome::Lost;
        }
        let win = WorkerMessage::Win {
            worker_id: channels.worker_id,
            path: tracer.history.to_path(),
            time: tracer.time,
        };
        if let Err(e) = channels.to_coordinator.send(win) {
            error!("worker {} could not report a win: {}", channels.worker_id, e);
        }
        return TracerOutcome::Won;
    }

    if context.shared.should_stop() {
        return TracerOutcome::Abandoned;
    }

    let mut pushed = 0;
    for connection in node.connections() {
        // This tracer is still pending, so the frontier cannot have closed
        let pushed_ok = context.frontier.push(tracer.follow(connection));
        debug_assert!(pushed_ok.is_ok(), "successor pushed onto a closed frontier");
        match pushed_ok {
            Ok(()) => pushed += 1,
            Err(e) => error!("{} while branching from {}", e, node.name()),
        }
    }
    TracerOutcome::Branched(pushed)
}
