//! Persisted meeting record contract
//!
//! The coordinator is the sole writer of transcript, language, summary and
//! derived status transitions during the coordination flow. Record identity
//! and creation belong to the upload path, which is not part of this
//! workspace.

use crate::error::StoreResult;
use async_trait::async_trait;
use meetbrief_core::{MeetingId, MeetingRecord, MeetingStatus};

/// Read/write access to persisted meeting records
#[async_trait]
pub trait MeetingStore: Send + Sync {
    /// Fetch a meeting record; `None` when the id is unknown
    async fn fetch(&self, meeting_id: MeetingId) -> StoreResult<Option<MeetingRecord>>;

    /// Save the formatted transcript and detected language, moving the
    /// record to the given status (`completed` for transcript-only jobs,
    /// `summarizing` when analysis follows)
    async fn save_transcript(
        &self,
        meeting_id: MeetingId,
        transcript: &str,
        language: Option<&str>,
        status: MeetingStatus,
    ) -> StoreResult<()>;

    /// Attach the generated summary, mark the record completed and clear
    /// any prior error message
    async fn attach_summary(&self, meeting_id: MeetingId, summary: &str) -> StoreResult<()>;

    /// Mark the record completed with a degradation message (the transcript
    /// is usable, the summary is not)
    async fn complete_with_warning(&self, meeting_id: MeetingId, message: &str)
    -> StoreResult<()>;

    /// Mark the record failed with the given error message
    async fn mark_error(&self, meeting_id: MeetingId, message: &str) -> StoreResult<()>;
}
