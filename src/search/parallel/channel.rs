//! Shared pruning state and worker-to-coordinator messages.

use crate::graph::{NodeId, UNREACHED};
use crate::search::result::WorkerStatistics;
use crossbeam_channel::{Receiver, Sender, unbounded};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Message sent from workers to the coordinator.
#[derive(Debug, Clone)]
pub enum WorkerMessage {
    /// Worker reached the destination at or below the best known time.
    Win {
        worker_id: usize,
        path: Vec<NodeId>,
        time: u32,
    },
    /// Worker saw the frontier close and exited.
    Finished {
        worker_id: usize,
        statistics: WorkerStatistics,
    },
}

/// How a destination arrival compares with the best known time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WinOutcome {
    /// Strictly better; the global best was lowered.
    Improved,
    /// Equal to the global best.
    Tied,
    /// Strictly worse than a time another worker already recorded.
    Worse,
}

impl WinOutcome {
    pub fn is_recorded(self) -> bool {
        !matches!(self, WinOutcome::Worse)
    }
}

/// Shared state for tracking the best time to the destination across all workers.
#[derive(Debug)]
pub struct SharedBest {
    /// Current best time (`UNREACHED` means no path yet).
    pub best_time: AtomicU32,
    /// Flag to make workers stop branching.
    pub should_stop: AtomicBool,
}

impl Default for SharedBest {
    fn default() -> Self {
        Self {
            best_time: AtomicU32::new(UNREACHED),
            should_stop: AtomicBool::new(false),
        }
    }
}

impl SharedBest {
    /// Try to lower the best time. Returns true if this is a new best.
    pub fn try_update(&self, new_time: u32) -> bool {
        let mut current = self.best_time.load(Ordering::Acquire);
        loop {
            if new_time >= current {
                return false;
            }
            match self.best_time.compare_exchange_weak(
                current,
                new_time,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(previous) => {
                    debug_assert!(new_time < previous, "global best must not regress");
                    return true;
                }
                Err(c) => current = c,
            }
        }
    }

    /// Compare a destination arrival against the best time, lowering it when better.
    pub fn offer(&self, time: u32) -> WinOutcome {
        if self.try_update(time) {
            WinOutcome::Improved
        } else if time == self.current_best() {
            WinOutcome::Tied
        } else {
            WinOutcome::Worse
        }
    }

    /// Get the current best time (`UNREACHED` if none found).
    pub fn current_best(&self) -> u32 {
        self.best_time.load(Ordering::Acquire)
    }

    /// Check if workers should stop branching.
    pub fn should_stop(&self) -> bool {
        self.should_stop.load(Ordering::Acquire)
    }

    /// Signal all workers to stop branching.
    pub fn signal_stop(&self) {
        self.should_stop.store(true, Ordering::Release);
    }
}

/// Channel endpoints for a worker.
pub struct WorkerChannels {
    pub worker_id: usize,
    /// Send messages to coordinator.
    pub to_coordinator: Sender<WorkerMessage>,
}

/// Channel endpoints for the coordinator.
pub struct CoordinatorChannels {
    /// Receive messages from workers.
    pub from_workers: Receiver<WorkerMessage>,
    pub num_workers: usize,
}

/// Create channels for parallel search with the given number of workers.
pub fn create_channels(num_workers: usize) -> (CoordinatorChannels, Vec<WorkerChannels>) {
    // Unbounded so that recording a win never blocks a worker
    let (worker_tx, coordinator_rx) = unbounded();

    let worker_channels = (0..num_workers)
        .map(|worker_id| WorkerChannels {
            worker_id,
            to_coordinator: worker_tx.clone(),
        })
        .collect();

    let coordinator = CoordinatorChannels {
        from_workers: coordinator_rx,
        num_workers,
    };

    (coordinator, worker_channels)
}
