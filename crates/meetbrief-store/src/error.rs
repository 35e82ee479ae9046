//! Error types for the store contracts

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Database error
    #[error("database error: {0}")]
    Database(String),

    /// A worker artifact is missing from disk
    #[error("artifact not found: {path}")]
    ArtifactNotFound {
        /// Expected artifact path
        path: PathBuf,
    },

    /// A meeting record was not found
    #[error("meeting not found: {meeting_id}")]
    MeetingNotFound {
        /// Missing record identifier
        meeting_id: meetbrief_core::MeetingId,
    },
}

impl StoreError {
    /// Create a database error
    pub fn database(message: impl std::fmt::Display) -> Self {
        Self::Database(message.to_string())
    }
}
