//! Core types and utilities for `MeetBrief`
//!
//! Shared data model for the coordination engine: meeting lifecycle types,
//! worker result envelopes, segment types, artifact payloads, shared
//! configuration sections and formatting helpers.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod config;
pub mod error;
pub mod types;
pub mod utils;

pub use config::{DatabaseConfig, LlmConfig, LoggingConfig};
pub use error::{Error, Result};
pub use types::{
    DiarizationArtifact, MeetingId, MeetingMode, MeetingRecord, MeetingStatus, MergedArtifact,
    MergedSegment, SpeakerSegment, TranscriptSegment, TranscriptionArtifact, WorkerKind,
    WorkerResult, WorkerStatus,
};
