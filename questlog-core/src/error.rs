//! Error types for questlog-core

use thiserror::Error;

use crate::runner::Rejected;

/// Main error type for the questlog-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding error for event metadata
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// A record failed validation before being stored
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// Session not found
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// Campaign not found
    #[error("campaign not found: {0}")]
    CampaignNotFound(String),

    /// The session runner declined an action
    #[error("rejected: {0}")]
    Rejected(#[from] Rejected),
}

/// Result type alias for questlog-core
pub type Result<T> = std::result::Result<T, Error>;
