//! Core data types for `MeetBrief`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Meeting identifier type
pub type MeetingId = i64;

/// Processing mode requested at submission time
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MeetingMode {
    /// Produce a transcript only
    TranscribeOnly,
    /// Produce a transcript and run the analysis pipeline
    TranscribeAndSummarize,
}

impl Default for MeetingMode {
    fn default() -> Self {
        Self::TranscribeAndSummarize
    }
}

impl std::fmt::Display for MeetingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TranscribeOnly => write!(f, "transcribe_only"),
            Self::TranscribeAndSummarize => write!(f, "transcribe_and_summarize"),
        }
    }
}

/// Meeting lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MeetingStatus {
    /// Uploaded, not yet queued
    Pending,
    /// Queued for transcription
    Queued,
    /// Transcription worker is running
    Transcribing,
    /// Transcript saved, analysis pipeline running
    Summarizing,
    /// Terminal: processing finished
    Completed,
    /// Terminal: processing failed
    Error,
}

impl Default for MeetingStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl std::fmt::Display for MeetingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Queued => write!(f, "queued"),
            Self::Transcribing => write!(f, "transcribing"),
            Self::Summarizing => write!(f, "summarizing"),
            Self::Completed => write!(f, "completed"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for MeetingStatus {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "queued" => Ok(Self::Queued),
            "transcribing" => Ok(Self::Transcribing),
            "summarizing" => Ok(Self::Summarizing),
            "completed" => Ok(Self::Completed),
            "error" => Ok(Self::Error),
            other => Err(crate::Error::Validation {
                field: "status".to_string(),
                message: format!("unknown meeting status: {other}"),
            }),
        }
    }
}

/// Kind of worker producing a result for a meeting
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WorkerKind {
    /// Speech transcription worker
    Transcribe,
    /// Speaker diarization worker
    Diarize,
}

impl WorkerKind {
    /// Both worker kinds, in cleanup order
    pub const ALL: [Self; 2] = [Self::Transcribe, Self::Diarize];
}

impl std::fmt::Display for WorkerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transcribe => write!(f, "transcribe"),
            Self::Diarize => write!(f, "diarize"),
        }
    }
}

/// Outcome reported by a worker
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WorkerStatus {
    /// Worker finished and wrote its artifact
    Completed,
    /// Worker failed
    Error,
}

/// Worker result envelope stored in the coordination store
///
/// Written once by the producing worker, read and then cleared by the
/// coordinator. `artifact_location` points at the worker's JSON artifact on
/// success; `error` carries the failure message otherwise.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkerResult {
    /// Worker outcome
    pub status: WorkerStatus,

    /// Path to the result artifact (set when completed)
    pub artifact_location: Option<PathBuf>,

    /// Error message (set when failed)
    pub error: Option<String>,
}

impl WorkerResult {
    /// Successful result pointing at an artifact file
    #[must_use]
    pub fn completed(artifact_location: impl Into<PathBuf>) -> Self {
        Self {
            status: WorkerStatus::Completed,
            artifact_location: Some(artifact_location.into()),
            error: None,
        }
    }

    /// Failed result carrying the worker's error message
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: WorkerStatus::Error,
            artifact_location: None,
            error: Some(message.into()),
        }
    }

    /// Whether the worker reported failure
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.status, WorkerStatus::Error)
    }
}

/// A transcribed segment with timing information
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranscriptSegment {
    /// Start time in seconds
    pub start: f64,

    /// End time in seconds
    pub end: f64,

    /// Transcribed text
    pub text: String,
}

/// A speaker turn from diarization
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpeakerSegment {
    /// Start time in seconds
    pub start: f64,

    /// End time in seconds
    pub end: f64,

    /// Opaque speaker label (e.g. "speaker_0"); not stable across meetings
    pub speaker: String,
}

/// A transcribed segment annotated with its speaker
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MergedSegment {
    /// Start time in seconds
    pub start: f64,

    /// End time in seconds
    pub end: f64,

    /// Transcribed text
    pub text: String,

    /// Assigned speaker label
    pub speaker: String,
}

/// Persisted meeting record
///
/// Identity and creation belong to the upload path; the coordinator only
/// writes transcript, language, summary, error message and derived status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MeetingRecord {
    /// Record identifier
    pub id: MeetingId,

    /// Meeting title (derived from the uploaded filename)
    pub title: String,

    /// Lifecycle status
    pub status: MeetingStatus,

    /// Formatted transcript text
    pub transcript: Option<String>,

    /// Generated meeting summary (Markdown)
    pub summary: Option<String>,

    /// Detected language code
    pub language: Option<String>,

    /// Failure or degradation message, if any
    pub error_message: Option<String>,

    /// When the record was created
    pub created_at: DateTime<Utc>,

    /// When the record was last updated
    pub updated_at: DateTime<Utc>,
}

/// Transcription worker artifact (`{id}_transcribe.json`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranscriptionArtifact {
    /// Meeting this artifact belongs to
    pub meeting_id: MeetingId,

    /// Full transcript text (unformatted)
    pub transcript: String,

    /// Detected language code
    pub language: Option<String>,

    /// Timestamped segments
    pub segments: Vec<TranscriptSegment>,
}

/// Diarization worker artifact (`{id}_diarize.json`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiarizationArtifact {
    /// Meeting this artifact belongs to
    pub meeting_id: MeetingId,

    /// Speaker turns
    pub speaker_segments: Vec<SpeakerSegment>,
}

/// Merged segments artifact written by the coordinator (`{id}_merged.json`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MergedArtifact {
    /// Meeting this artifact belongs to
    pub meeting_id: MeetingId,

    /// Detected language code
    pub language: Option<String>,

    /// Speaker-annotated segments
    pub segments: Vec<MergedSegment>,

    /// Number of distinct speakers seen in the merge
    pub speaker_count: usize,
}
