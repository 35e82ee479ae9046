//! Database row models for `MeetBrief`

use chrono::{DateTime, Utc};
use meetbrief_core::{MeetingRecord, MeetingStatus};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Database representation of a meeting record
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct MeetingRow {
    /// Record identifier
    pub id: i64,

    /// Meeting title
    pub title: String,

    /// Original uploaded filename
    pub filename: String,

    /// Stored audio file path
    pub filepath: String,

    /// Audio duration in seconds
    pub duration: Option<f64>,

    /// Lifecycle status as stored
    pub status: String,

    /// Formatted transcript text
    pub transcript: Option<String>,

    /// Generated summary
    pub summary: Option<String>,

    /// Detected language code
    pub language: Option<String>,

    /// Failure or degradation message
    pub error_message: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl From<MeetingRow> for MeetingRecord {
    fn from(row: MeetingRow) -> Self {
        // Unknown status strings are surfaced as errors rather than dropped
        // on the floor; the coordinator never writes one.
        let status = row
            .status
            .parse::<MeetingStatus>()
            .unwrap_or(MeetingStatus::Error);

        Self {
            id: row.id,
            title: row.title,
            status,
            transcript: row.transcript,
            summary: row.summary,
            language: row.language,
            error_message: row.error_message,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
