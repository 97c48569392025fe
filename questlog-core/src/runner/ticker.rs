//! Cancellable once-per-period tick source.

use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

/// Sends `()` down a channel once per period until cancelled.
///
/// Missed periods are delivered in a burst, so the number of ticks tracks
/// wall-clock time instead of drifting behind it.
#[derive(Debug)]
pub struct Ticker {
    period: Duration,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    /// A stopped ticker with the given period.
    ///
    /// A zero period is raised to 1 ms, since `tokio::time::interval_at`
    /// panics on zero. Configured periods never reach this clamp:
    /// `Config::validate` rejects `runner.tick_interval_ms = 0` at load time.
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            handle: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Start ticking into `tx`. Must be called inside a tokio runtime.
    ///
    /// Returns false if already active. The first tick arrives one period
    /// after starting.
    pub fn start(&mut self, tx: UnboundedSender<()>) -> bool {
        if self.is_active() {
            return false;
        }

        let period = self.period;
        self.handle = Some(tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                if tx.send(()).is_err() {
                    break;
                }
            }
        }));
        tracing::debug!(period_ms = period.as_millis() as u64, "Ticker started");
        true
    }

    /// Stop ticking. Safe to call at any time; returns whether a task was stopped.
    pub fn cancel(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => {
                handle.abort();
                tracing::debug!("Ticker cancelled");
                true
            }
            None => false,
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel();
    }
}
