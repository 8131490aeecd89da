//! Bounded worker pool
//!
//! A fixed number of permits bounds how many workers run at once. The
//! dispatcher blocks on permit acquisition when the ceiling is reached, which
//! is the only backpressure; every launched worker is awaited before a wave
//! is considered drained.

use crate::HarvestError;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};

/// Counts from one drained wave
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Workers launched
    pub launched: usize,

    /// Workers that panicked instead of completing
    pub panicked: usize,
}

/// Fixed-capacity pool of concurrency tickets
#[derive(Debug, Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    ceiling: usize,
}

impl WorkerPool {
    /// Creates a pool allowing `ceiling` concurrent workers (at least one)
    pub fn new(ceiling: usize) -> Self {
        let ceiling = ceiling.max(1);
        Self {
            permits: Arc::new(Semaphore::new(ceiling)),
            ceiling,
        }
    }

    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    /// Tickets currently held by running workers
    pub fn in_flight(&self) -> usize {
        self.ceiling - self.permits.available_permits()
    }

    /// Runs `worker` over every item and waits for all of them to finish
    ///
    /// Items are launched in iteration order, each only after a ticket is
    /// free; completion order is unspecified. The ticket is released when
    /// the worker finishes, whether it returned or panicked. A panicking
    /// worker is logged and counted and does not cut the wave short.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::PoolClosed`] if the ticket semaphore was closed.
    pub async fn run_to_completion<I, F, Fut>(
        &self,
        items: I,
        mut worker: F,
    ) -> Result<DrainReport, HarvestError>
    where
        I: IntoIterator,
        F: FnMut(I::Item) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = JoinSet::new();
        let mut report = DrainReport::default();

        for item in items {
            let permit = Arc::clone(&self.permits)
                .acquire_owned()
                .await
                .map_err(|_| HarvestError::PoolClosed)?;

            let job = worker(item);
            tasks.spawn(async move {
                let _permit = permit;
                job.await;
            });
            report.launched += 1;

            // Reap finished workers so the set stays bounded by the ceiling
            while let Some(joined) = tasks.try_join_next() {
                report.note(joined);
            }
        }

        tracing::debug!(launched = report.launched, "Waiting for workers to drain");

        while let Some(joined) = tasks.join_next().await {
            report.note(joined);
        }

        Ok(report)
    }
}

impl DrainReport {
    fn note(&mut self, joined: Result<(), JoinError>) {
        if let Err(e) = joined {
            self.panicked += 1;
            tracing::error!("Worker task failed: {}", e);
        }
    }
}
