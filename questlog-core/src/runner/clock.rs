//! Elapsed-time counter for a running session.

use serde::Serialize;

/// Clock transitions. Time only advances in `Running`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockState {
    #[default]
    Stopped,
    Running,
    Paused,
}

/// Session clock counting whole elapsed seconds
#[derive(Debug, Clone, Default)]
pub struct SessionClock {
    elapsed_seconds: u64,
    state: ClockState,
}

impl SessionClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    /// Started and not yet stopped, paused or not
    pub fn is_running(&self) -> bool {
        matches!(self.state, ClockState::Running | ClockState::Paused)
    }

    pub fn is_paused(&self) -> bool {
        self.state == ClockState::Paused
    }

    /// Whether ticks currently advance the clock
    pub fn is_ticking(&self) -> bool {
        self.state == ClockState::Running
    }

    /// Start counting. Returns false (and changes nothing) if already started.
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            return false;
        }
        self.state = ClockState::Running;
        true
    }

    pub fn pause(&mut self) -> bool {
        if self.state != ClockState::Running {
            return false;
        }
        self.state = ClockState::Paused;
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.state != ClockState::Paused {
            return false;
        }
        self.state = ClockState::Running;
        true
    }

    /// Stop counting. Idempotent; returns whether the clock was running.
    pub fn stop(&mut self) -> bool {
        let was_running = self.is_running();
        self.state = ClockState::Stopped;
        was_running
    }

    /// Advance by one second if running and not paused.
    pub fn tick(&mut self) -> bool {
        if !self.is_ticking() {
            return false;
        }
        self.elapsed_seconds += 1;
        true
    }
}
