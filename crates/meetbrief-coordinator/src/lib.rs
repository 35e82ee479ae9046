//! Task coordination service for `MeetBrief`
//!
//! Tracks one in-flight job per meeting, polls the shared coordination
//! store for worker results arriving out of order, merges transcript and
//! speaker segmentations, persists outcomes and drives the analysis
//! pipeline as supervised background work.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod config;
pub mod coordinator;
pub mod error;
pub mod formatter;
pub mod merger;
pub mod service;

// Re-export commonly used types
pub use config::{CoordinatorConfig, PollConfig, ResultStorageConfig, ServiceConfig};
pub use coordinator::{PendingJob, TaskCoordinator};
pub use error::{CoordinatorError, Result};
pub use merger::{FALLBACK_SPEAKER, distinct_speaker_count, merge_transcript_with_speakers};
pub use service::{CoordinatorService, ServiceStatus};
