//! Bounded-parallelism runner for a batch of independent tasks.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;
use tracing::error;

/// Snapshot of the limiter counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimiterStats {
    pub limit: usize,
    pub in_flight: usize,
    pub peak_in_flight: usize,
    pub started: usize,
    pub completed: usize,
}

#[derive(Debug, Default)]
struct Counters {
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    started: AtomicUsize,
    completed: AtomicUsize,
}

/// A running task's hold on one slot. Released when the task ends, even
/// by panic.
struct Slot {
    counters: Arc<Counters>,
    _permit: OwnedSemaphorePermit,
}

impl Slot {
    fn claim(counters: &Arc<Counters>, permit: OwnedSemaphorePermit) -> Self {
        let now = counters.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        counters.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        counters.started.fetch_add(1, Ordering::SeqCst);
        Self {
            counters: Arc::clone(counters),
            _permit: permit,
        }
    }
}

impl Drop for Slot {
    fn drop(&mut self) {
        self.counters.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.counters.completed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Runs tasks with at most `limit` of them in flight.
///
/// Tasks start in input order; the next one starts as soon as any running
/// task finishes. A failing or panicking task does not stop the others.
pub struct ConcurrencyLimiter {
    limit: usize,
    semaphore: Arc<Semaphore>,
    counters: Arc<Counters>,
}

impl ConcurrencyLimiter {
    /// Creates a limiter. A limit of zero is treated as one.
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            limit,
            semaphore: Arc::new(Semaphore::new(limit)),
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn stats(&self) -> LimiterStats {
        LimiterStats {
            limit: self.limit,
            in_flight: self.counters.in_flight.load(Ordering::SeqCst),
            peak_in_flight: self.counters.peak_in_flight.load(Ordering::SeqCst),
            started: self.counters.started.load(Ordering::SeqCst),
            completed: self.counters.completed.load(Ordering::SeqCst),
        }
    }

    /// Runs every task and waits for all of them.
    ///
    /// The output has one entry per input task, in input order. An entry is
    /// `None` when its task panicked.
    pub async fn run_all<I, Fut, T>(&self, tasks: I) -> Vec<Option<T>>
    where
        I: IntoIterator<Item = Fut>,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let mut set = JoinSet::new();
        let mut results: Vec<Option<T>> = Vec::new();

        for (index, task) in tasks.into_iter().enumerate() {
            results.push(None);

            // The semaphore queues waiters FIFO, and tasks are only spawned
            // once they hold a permit, so start order follows input order.
            let permit = match Arc::clone(&self.semaphore).acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    error!("Concurrency limiter closed, remaining tasks skipped: {}", e);
                    break;
                }
            };
            let slot = Slot::claim(&self.counters, permit);

            set.spawn(async move {
                let _slot = slot;
                (index, task.await)
            });
        }

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, output)) => results[index] = Some(output),
                Err(e) => error!("Task aborted: {}", e),
            }
        }

        results
    }
}
