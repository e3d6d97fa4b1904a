//! Configuration for the parallel path search.

use std::time::Duration;

/// Hard ceiling on elapsed time for any tracer
pub const DEFAULT_MAX_STEPS: u32 = 100;

/// Configuration for a single search run.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Number of worker threads to spawn.
    pub num_workers: usize,
    /// Tracers with more elapsed steps than this are discarded.
    pub max_steps: u32,
    /// Overall deadline for the search. Once expired, workers stop branching
    /// and the result is marked as timed out.
    pub timeout: Option<Duration>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            num_workers: num_cpus::get(),
            max_steps: DEFAULT_MAX_STEPS,
            timeout: None,
        }
    }
}

impl SearchConfig {
    /// Set the number of workers. Zero is raised to one.
    pub fn with_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = num_workers.max(1);
        self
    }

    /// Set the number of workers from an Option, keeping the default on `None`.
    pub fn with_workers_option(self, num_workers: Option<usize>) -> Self {
        match num_workers {
            Some(n) => self.with_workers(n),
            None => self,
        }
    }

    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Set the overall timeout for the search.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the overall timeout from an Option.
    pub fn with_timeout_option(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}
