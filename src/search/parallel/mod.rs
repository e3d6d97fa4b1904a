//! Parallel execution of the tracer search.
//!
//! # Architecture
//!
//! The parallel search system consists of:
//! - A **frontier** queue of tracers that workers both drain and refill, with a
//!   pending-work counter that closes it once no tracer can ever arrive again
//! - A fixed pool of **workers** that prune, record and branch tracers
//! - **Shared state** holding the best known time to the destination
//! - A **coordinator** (the calling thread) that collects winning paths and
//!   per-worker statistics through a channel and enforces the deadline
//!
//! # Example
//!
//! ```ignore
//! use parity_paths::search::{SearchConfig, run_parallel_search};
//!
//! let config = SearchConfig::default()
//!     .with_workers(4)
//!     .with_timeout(Duration::from_secs(60));
//!
//! let result = run_parallel_search(&graph, start, destination, &config);
//! ```

pub mod channel;
pub mod coordinator;
pub mod frontier;

pub use coordinator::run_parallel_search;
pub use frontier::{Frontier, FrontierClosed, PendingWork};
