//! Database layer for questlog
//!
//! This module provides the storage layer using SQLite with:
//! - Schema migrations
//! - Repository pattern for queries
//! - The [`SessionStore`] contract the session runner writes through

pub mod repo;
pub mod schema;

pub use repo::{Database, SessionFilter};

use crate::error::Result;
use crate::types::SessionUpdate;

/// Write-back contract for the owning session record.
///
/// The session runner calls [`SessionStore::update_session`] once, when a
/// session ends. Implementations report a missing record as
/// [`crate::Error::SessionNotFound`].
pub trait SessionStore {
    fn update_session(&self, id: &str, update: &SessionUpdate) -> Result<()>;
}
