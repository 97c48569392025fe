//! A session runner wired to a real-time ticker.

use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::ticker::Ticker;
use super::{RunnerPhase, SessionRunner};

/// Owns a [`SessionRunner`] and keeps its ticker in step with the phase.
///
/// The ticker runs exactly while the runner is `Running`. Every mutation
/// goes through [`LiveSession::apply`], which re-syncs the ticker afterwards.
#[derive(Debug)]
pub struct LiveSession {
    runner: SessionRunner,
    ticker: Ticker,
    tx: UnboundedSender<()>,
    rx: UnboundedReceiver<()>,
}

impl LiveSession {
    /// Must be called inside a tokio runtime if `runner` is already running.
    pub fn new(runner: SessionRunner, period: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut live = Self {
            runner,
            ticker: Ticker::new(period),
            tx,
            rx,
        };
        live.sync_ticker();
        live
    }

    pub fn runner(&self) -> &SessionRunner {
        &self.runner
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.is_active()
    }

    /// Run an action against the runner, then start or cancel the ticker
    /// to match the new phase.
    pub fn apply<R>(&mut self, action: impl FnOnce(&mut SessionRunner) -> R) -> R {
        let out = action(&mut self.runner);
        self.sync_ticker();
        out
    }

    fn sync_ticker(&mut self) {
        if self.runner.phase() == RunnerPhase::Running {
            self.ticker.start(self.tx.clone());
        } else if self.ticker.cancel() {
            // Ticks queued before the cancel belong to the previous run.
            while self.rx.try_recv().is_ok() {}
        }
    }

    /// Wait for the next tick and apply it to the clock.
    ///
    /// Pending for as long as the ticker is cancelled. Returns whether the
    /// clock advanced.
    pub async fn next_tick(&mut self) -> bool {
        match self.rx.recv().await {
            Some(()) => self.runner.tick(),
            None => false,
        }
    }

    /// Cancel the ticker. Idempotent.
    pub fn teardown(&mut self) {
        self.ticker.cancel();
    }

    pub fn into_runner(mut self) -> SessionRunner {
        self.teardown();
        self.runner
    }
}
