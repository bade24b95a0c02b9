//! Concurrency context for tree induction, backed by a Rayon thread pool.
//!
//! All parallel work in this crate is bulk-synchronous: a batch of independent
//! tasks is forked onto the pool and joined before the caller proceeds. The
//! context also carries the cooperative cancellation flag that table
//! construction and node processing poll.

use crate::core::error::{Result, TreeError};
use rayon::prelude::*;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag used to request that running computations stop.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Every clone of this token observes it.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Returns true once cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Host-supplied execution environment: a bounded worker pool, its
/// parallelism degree and a cancellation check.
#[derive(Debug, Clone)]
pub struct ConcurrencyContext {
    pool: Arc<rayon::ThreadPool>,
    parallelism: usize,
    cancellation: CancellationToken,
}

impl ConcurrencyContext {
    /// Creates a context with its own thread pool. `0` uses all cores.
    pub fn new(num_threads: usize) -> Result<Self> {
        let parallelism = if num_threads == 0 {
            num_cpus::get().max(1)
        } else {
            num_threads
        };

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(parallelism)
            .thread_name(|index| format!("column-tree-worker-{}", index))
            .build()
            .map_err(|e| TreeError::threading(format!("Failed to create thread pool: {}", e)))?;

        Ok(ConcurrencyContext {
            pool: Arc::new(pool),
            parallelism,
            cancellation: CancellationToken::new(),
        })
    }

    /// Creates a single-threaded context.
    pub fn sequential() -> Result<Self> {
        Self::new(1)
    }

    /// Replaces the cancellation token, e.g. to share one with the host.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Number of worker threads available.
    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    /// Returns a handle that can cancel computations running in this context.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Fails with [`TreeError::Cancelled`] once cancellation was requested.
    pub fn check_cancelled(&self) -> Result<()> {
        if self.cancellation.is_cancelled() {
            Err(TreeError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Runs independent tasks to completion on the pool and collects their
    /// results in task order.
    ///
    /// If any task fails, the failure of the lowest-indexed failing task is
    /// returned unchanged and all other results are discarded. Panics are
    /// caught and reported as [`TreeError::TaskPanicked`].
    pub fn run<T, F>(&self, tasks: Vec<F>) -> Result<Vec<T>>
    where
        T: Send,
        F: FnOnce() -> Result<T> + Send,
    {
        match tasks.len() {
            0 => return Ok(Vec::new()),
            1 if self.parallelism <= 1 => {
                return tasks.into_iter().map(run_guarded).collect();
            }
            _ => {}
        }

        let outcomes: Vec<Result<T>> = self
            .pool
            .install(|| tasks.into_par_iter().map(run_guarded).collect());

        outcomes.into_iter().collect()
    }
}

fn run_guarded<T, F>(task: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    match panic::catch_unwind(AssertUnwindSafe(task)) {
        Ok(result) => result,
        Err(payload) => Err(TreeError::task_panicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
