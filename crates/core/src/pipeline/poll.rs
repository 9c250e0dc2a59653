//! Non-blocking "check again until done" primitive.

use std::future::Future;
use std::time::Duration;

/// Result of a completed wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOutcome<T> {
    /// The first terminal value observed.
    pub value: T,
    /// How many times the check was re-issued after the initial value.
    pub rechecks: u32,
}

/// Re-issues a check at a fixed interval until its result is terminal.
///
/// The interval is a timer sleep on the async runtime, so a waiting item
/// yields to every other task instead of holding a thread. There is no
/// attempt limit.
#[derive(Debug, Clone, Copy)]
pub struct PollingWaiter {
    interval: Duration,
}

impl PollingWaiter {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Starts from `initial` and calls `recheck` after every interval until
    /// `is_terminal` accepts a value. An error from `recheck` ends the wait.
    pub async fn wait<T, E, P, F, Fut>(
        &self,
        initial: T,
        is_terminal: P,
        mut recheck: F,
    ) -> Result<PollOutcome<T>, E>
    where
        P: Fn(&T) -> bool,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut current = initial;
        let mut rechecks = 0;

        while !is_terminal(&current) {
            tokio::time::sleep(self.interval).await;
            rechecks += 1;
            current = recheck().await?;
        }

        Ok(PollOutcome {
            value: current,
            rechecks,
        })
    }
}
