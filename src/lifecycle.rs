use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinSet;
use tracing::warn;

/// Keeps background work alive until it completes.
///
/// Entry points that must return before their work is done hand the future to
/// [`Lifecycle::register`]. The process calls [`Lifecycle::drain`] before exiting so a
/// reset that is already in flight is not cut off.
#[derive(Clone, Debug, Default)]
pub struct Lifecycle {
    tasks: Arc<Mutex<JoinSet<()>>>,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = self.lock();
        // reap whatever already finished so the set does not grow unbounded
        while let Some(result) = tasks.try_join_next() {
            log_join_failure(result);
        }
        tasks.spawn(task);
    }

    /// Number of registered tasks that have not been reaped yet.
    pub fn pending(&self) -> usize {
        let mut tasks = self.lock();
        while let Some(result) = tasks.try_join_next() {
            log_join_failure(result);
        }
        tasks.len()
    }

    /// Waits for every registered task, including ones registered while draining.
    pub async fn drain(&self) {
        loop {
            let mut batch = std::mem::take(&mut *self.lock());
            if batch.is_empty() {
                return;
            }
            while let Some(result) = batch.join_next().await {
                log_join_failure(result);
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, JoinSet<()>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn log_join_failure(result: Result<(), tokio::task::JoinError>) {
    if let Err(err) = result {
        warn!(%err, "registered background task did not complete");
    }
}
