//! Error types for the coordination service

use meetbrief_core::{MeetingId, WorkerKind};
use std::{error::Error as StdError, fmt};

/// Result type alias for coordinator operations
pub type Result<T> = std::result::Result<T, CoordinatorError>;

/// Errors that can occur while coordinating jobs
#[derive(Debug)]
pub enum CoordinatorError {
    /// Store operation failed
    Store(meetbrief_store::StoreError),

    /// A worker reported success without an artifact location
    MissingArtifact {
        /// Affected meeting
        meeting_id: MeetingId,
        /// Worker that omitted its artifact
        kind: WorkerKind,
    },

    /// The persisted meeting record does not exist
    MeetingNotFound {
        /// Missing record identifier
        meeting_id: MeetingId,
    },

    /// Service lifecycle violation
    ServiceAlreadyRunning,

    /// Configuration error
    Configuration {
        /// Error message
        message: String,
    },
}

impl CoordinatorError {
    /// Create a new configuration error
    #[must_use]
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

impl fmt::Display for CoordinatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Store(err) => write!(f, "store error: {err}"),
            Self::MissingArtifact { meeting_id, kind } => write!(
                f,
                "{kind} result for meeting {meeting_id} has no artifact location"
            ),
            Self::MeetingNotFound { meeting_id } => {
                write!(f, "meeting {meeting_id} not found in record store")
            }
            Self::ServiceAlreadyRunning => write!(f, "coordinator service is already running"),
            Self::Configuration { message } => write!(f, "configuration error: {message}"),
        }
    }
}

impl StdError for CoordinatorError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<meetbrief_store::StoreError> for CoordinatorError {
    fn from(err: meetbrief_store::StoreError) -> Self {
        Self::Store(err)
    }
}
