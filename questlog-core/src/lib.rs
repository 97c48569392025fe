//! # questlog-core
//!
//! Core library for questlog - a campaign journal for tabletop game masters.
//!
//! This library provides:
//! - Domain types for campaigns, sessions, NPCs, and locations
//! - Database storage layer with SQLite
//! - Configuration management
//! - Logging infrastructure
//! - The live session runner: clock, event log, initiative, and write-back
//!
//! ## Example
//!
//! ```rust,no_run
//! use questlog_core::{Database, EventKind, SessionRunner};
//!
//! let db = Database::open_in_memory().expect("failed to open database");
//! let session = db.get_session("session-id").expect("query failed").expect("no such session");
//!
//! let mut runner = SessionRunner::new(session);
//! runner.start().expect("already started");
//! runner.record(EventKind::Note, "Found a clue");
//! let wrap_up = runner.end_session(&db).expect("write-back failed");
//! println!("{}", wrap_up.report);
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use db::{Database, SessionFilter, SessionStore};
pub use dice::{DiceRoller, Die};
pub use error::{Error, Result};
pub use runner::{
    EventKind, Initiative, InitiativeEntry, LiveSession, NewEvent, QuickAction, Rejected,
    RunnerPhase, RunnerTab, SessionEvent, SessionRunner, SessionWrapUp,
};
pub use types::*;

// Public modules
pub mod config;
pub mod db;
pub mod dice;
pub mod error;
pub mod format;
pub mod logging;
pub mod runner;
pub mod types;
