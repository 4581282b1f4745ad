use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use bbn_core::errors::{BbnError, ErrorInfo};
use rayon::prelude::*;
use tracing::warn;

/// Per-point computation dispatched by an executor: `(grid index, momentum) -> value`.
pub type GridTask<'a> = dyn Fn(usize, f64) -> Result<f64, BbnError> + Sync + 'a;

/// Attempts made for a grid point before its failure is escalated.
pub const MAX_ATTEMPTS: u32 = 2;

/// Strategy evaluating a task over every grid point.
///
/// Results are always returned in grid order and every point is evaluated
/// with the same summation order, so executors are interchangeable without
/// changing the numbers produced.
pub trait GridExecutor: Send + Sync + fmt::Debug {
    /// Short label for logs and manifests.
    fn name(&self) -> &'static str;

    /// Evaluates `task` on every point and collects the results in order.
    fn map(&self, points: &[f64], task: &GridTask<'_>) -> Result<Vec<f64>, BbnError>;

    /// Releases worker resources. Later calls to [`GridExecutor::map`] fail.
    fn close(&self);
}

fn run_with_retry(task: &GridTask<'_>, index: usize, p: f64) -> Result<f64, BbnError> {
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match task(index, p) {
            Ok(value) => return Ok(value),
            Err(err) if attempt < MAX_ATTEMPTS => {
                warn!(index, momentum = p, error = %err, "grid task failed, retrying");
            }
            Err(err) => {
                return Err(BbnError::Collision(
                    ErrorInfo::new("grid-task", "collision task failed after retry")
                        .with_context("attempts", attempt.to_string())
                        .with_context("index", index.to_string())
                        .with_context("momentum", p.to_string())
                        .with_context("cause", err.to_string()),
                ));
            }
        }
    }
}

fn closed_error(name: &str) -> BbnError {
    BbnError::Executor(
        ErrorInfo::new("executor-closed", "executor was used after close")
            .with_context("executor", name),
    )
}

/// Evaluates grid points one after another on the calling thread.
#[derive(Debug, Default)]
pub struct SequentialExecutor {
    closed: AtomicBool,
}

impl SequentialExecutor {
    /// Creates an open sequential executor.
    pub fn new() -> Self {
        Self::default()
    }
}

impl GridExecutor for SequentialExecutor {
    fn name(&self) -> &'static str {
        "sequential"
    }

    fn map(&self, points: &[f64], task: &GridTask<'_>) -> Result<Vec<f64>, BbnError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(closed_error(self.name()));
        }
        points
            .iter()
            .enumerate()
            .map(|(index, &p)| run_with_retry(task, index, p))
            .collect()
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// Evaluates grid points on a dedicated rayon thread pool.
#[derive(Debug)]
pub struct RayonExecutor {
    pool: rayon::ThreadPool,
    threads: usize,
    closed: AtomicBool,
}

impl RayonExecutor {
    /// Builds a pool with `threads` workers (at least one).
    pub fn new(threads: usize) -> Result<Self, BbnError> {
        let threads = threads.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("bbn-grid-{index}"))
            .build()
            .map_err(|err| {
                BbnError::Executor(
                    ErrorInfo::new("thread-pool", err.to_string())
                        .with_context("threads", threads.to_string()),
                )
            })?;
        Ok(Self {
            pool,
            threads,
            closed: AtomicBool::new(false),
        })
    }

    /// Number of worker threads.
    pub fn threads(&self) -> usize {
        self.threads
    }
}

impl GridExecutor for RayonExecutor {
    fn name(&self) -> &'static str {
        "rayon"
    }

    fn map(&self, points: &[f64], task: &GridTask<'_>) -> Result<Vec<f64>, BbnError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(closed_error(self.name()));
        }
        self.pool.install(|| {
            points
                .par_iter()
                .enumerate()
                .map(|(index, &p)| run_with_retry(task, index, p))
                .collect()
        })
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
