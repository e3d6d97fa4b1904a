//! Work queue shared by the worker pool.
//!
//! Workers are both consumers and producers, so an empty queue does not mean
//! the search is over: another worker may be about to push successors. The
//! [`PendingWork`] counter tracks every tracer that has been pushed but not yet
//! fully processed, and the queue is closed exactly when it drops to zero.

use crate::search::tracer::Tracer;
use crossbeam_channel::{Receiver, Sender, select, unbounded};
use log::error;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("push onto a closed frontier")]
pub struct FrontierClosed;

/// Count of tracers pushed but not yet fully processed.
#[derive(Debug)]
pub struct PendingWork(AtomicUsize);

impl PendingWork {
    /// Starts at one, accounting for the seed tracer.
    pub fn new() -> Self {
        Self(AtomicUsize::new(1))
    }

    /// Account for a tracer about to be pushed.
    pub fn add_one(&self) {
        self.0.fetch_add(1, Ordering::AcqRel);
    }

    /// Account for a fully processed tracer. Returns true if nothing is left.
    pub fn finish_one(&self) -> bool {
        let previous = self.0.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(previous > 0, "pending work underflow");
        previous == 1
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::Acquire)
    }
}

impl Default for PendingWork {
    fn default() -> Self {
        Self::new()
    }
}

/// Unbounded multi-producer multi-consumer queue of tracers.
pub struct Frontier {
    tx: Sender<Tracer>,
    rx: Receiver<Tracer>,
    /// Dropped on close; wakes every consumer blocked in `pop`.
    shutdown_tx: Mutex<Option<Sender<()>>>,
    shutdown_rx: Receiver<()>,
    closed: AtomicBool,
    pending: PendingWork,
}

impl Frontier {
    /// Create a frontier holding only the seed tracer.
    pub fn new(seed: Tracer) -> Self {
        let (tx, rx) = unbounded();
        let (shutdown_tx, shutdown_rx) = unbounded();
        // The receiver lives in `self`, so this cannot fail
        let _ = tx.send(seed);
        Self {
            tx,
            rx,
            shutdown_tx: Mutex::new(Some(shutdown_tx)),
            shutdown_rx,
            closed: AtomicBool::new(false),
            pending: PendingWork::new(),
        }
    }

    /// Push a successor tracer.
    ///
    /// The pending count is raised before the tracer becomes visible to any
    /// consumer, so the count can never reach zero while it is in flight.
    pub fn push(&self, tracer: Tracer) -> Result<(), FrontierClosed> {
        if self.is_closed() {
            return Err(FrontierClosed);
        }
        self.pending.add_one();
        self.tx.send(tracer).map_err(|_| FrontierClosed)
    }

    /// Block until a tracer is available. Returns `None` once the frontier is closed.
    pub fn pop(&self) -> Option<Tracer> {
        select! {
            recv(self.rx) -> msg => msg.ok(),
            recv(self.shutdown_rx) -> _ => None,
        }
    }

    /// Mark one pulled tracer as fully processed, including all of its pushes.
    /// The call that brings the pending count to zero closes the frontier.
    pub fn complete(&self) {
        if self.pending.finish_one() {
            self.close();
        }
    }

    fn close(&self) {
        let already_closed = self.closed.swap(true, Ordering::AcqRel);
        debug_assert!(!already_closed, "frontier closed twice");
        if already_closed {
            error!("frontier closed twice");
            return;
        }
        debug_assert!(self.rx.is_empty(), "frontier closed with queued work");
        let mut guard = match self.shutdown_tx.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.take();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Tracers pushed but not yet completed
    pub fn pending(&self) -> usize {
        self.pending.get()
    }

    /// Tracers currently queued
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
