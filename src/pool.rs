//! Bounded worker pool for the async service operations
//!
//! Tasks run on the tokio runtime but only `workers` of them make progress at
//! once. Shutdown stops new submissions, gives in-flight tasks a grace period,
//! then cancels whatever is still running.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("Worker pool has been shut down")]
    Closed,

    #[error("Task was cancelled during shutdown")]
    Cancelled,

    #[error("Task failed to complete: {0}")]
    Join(String),
}

/// Fixed-size pool; clones share the same workers
#[derive(Debug, Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    tracker: TaskTracker,
    cancel: CancellationToken,
    workers: usize,
}

impl WorkerPool {
    /// Creates a pool running at most `workers` tasks at once (minimum one)
    pub fn new(workers: usize) -> Self {
        let workers = workers.max(1);
        Self {
            permits: Arc::new(Semaphore::new(workers)),
            tracker: TaskTracker::new(),
            cancel: CancellationToken::new(),
            workers,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// False once shutdown has begun
    pub fn is_active(&self) -> bool {
        !self.tracker.is_closed()
    }

    /// Tasks submitted and not yet finished, queued ones included
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Submits `task`; it starts once a worker is free
    ///
    /// The handle resolves to `Err(PoolError::Cancelled)` if shutdown cancels
    /// the task before it completes.
    pub fn spawn<F, T>(&self, task: F) -> Result<JoinHandle<Result<T, PoolError>>, PoolError>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        if self.tracker.is_closed() {
            return Err(PoolError::Closed);
        }

        let permits = Arc::clone(&self.permits);
        let cancel = self.cancel.clone();

        Ok(self.tracker.spawn(async move {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(PoolError::Cancelled),
                result = async {
                    let _permit = permits.acquire_owned().await.map_err(|_| PoolError::Closed)?;
                    Ok::<T, PoolError>(task.await)
                } => result,
            }
        }))
    }

    /// Stops accepting tasks and waits up to `grace` for in-flight ones
    ///
    /// Tasks still running after the grace period are cancelled. Calling this
    /// more than once is harmless.
    pub async fn shutdown(&self, grace: Duration) {
        self.tracker.close();
        info!(in_flight = self.tracker.len(), "Shutting down worker pool");

        if tokio::time::timeout(grace, self.tracker.wait()).await.is_err() {
            warn!(
                remaining = self.tracker.len(),
                grace_ms = grace.as_millis() as u64,
                "Grace period elapsed; cancelling remaining tasks"
            );
            self.cancel.cancel();
            self.tracker.wait().await;
        }
        debug!("Worker pool stopped");
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(5)
    }
}
