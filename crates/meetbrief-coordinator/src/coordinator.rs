//! Per-job state machine driving worker results to a persisted outcome
//!
//! The coordinator owns an in-memory registry of in-flight jobs and is
//! polled by the service loop. Workers publish results into the shared
//! coordination store on their own schedule; each poll tick reads whatever
//! has arrived, advances the job if possible, and otherwise leaves it
//! untouched. Transcription failure is fatal to a job; diarization failure
//! degrades to transcript-only output; analysis failure degrades to a
//! completed record without a summary.

use crate::error::{CoordinatorError, Result};
use crate::formatter::{format_plain_transcript, format_tagged_transcript};
use crate::merger::{distinct_speaker_count, merge_transcript_with_speakers};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use meetbrief_analysis::{AnalysisPipeline, SegmentInfo, StepName, StepRecord};
use meetbrief_core::utils::extract_plain_text;
use meetbrief_core::{
    MeetingId, MeetingMode, MeetingStatus, MergedArtifact, WorkerKind, WorkerResult,
};
use meetbrief_store::{ArtifactStore, CoordinationStore, MeetingStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Bookkeeping for one in-flight job
#[derive(Debug, Clone)]
pub struct PendingJob {
    /// Processing mode requested at submission
    pub mode: MeetingMode,

    /// Whether diarization was requested
    pub diarization_enabled: bool,

    /// When the job was registered
    pub started_at: DateTime<Utc>,
}

/// Coordinates worker results into persisted meeting outcomes
pub struct TaskCoordinator {
    coordination: Arc<dyn CoordinationStore>,
    meetings: Arc<dyn MeetingStore>,
    artifacts: Arc<ArtifactStore>,
    pipeline: Arc<AnalysisPipeline>,

    /// In-flight jobs by meeting id
    pending: DashMap<MeetingId, PendingJob>,

    /// Supervised analysis tasks, joined or aborted on shutdown
    analysis_tasks: Arc<DashMap<MeetingId, JoinHandle<()>>>,
}

impl std::fmt::Debug for TaskCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskCoordinator")
            .field("pending", &self.pending.len())
            .field("analysis_tasks", &self.analysis_tasks.len())
            .finish_non_exhaustive()
    }
}

impl TaskCoordinator {
    /// Create a coordinator over the given stores and pipeline
    #[must_use]
    pub fn new(
        coordination: Arc<dyn CoordinationStore>,
        meetings: Arc<dyn MeetingStore>,
        artifacts: Arc<ArtifactStore>,
        pipeline: Arc<AnalysisPipeline>,
    ) -> Self {
        Self {
            coordination,
            meetings,
            artifacts,
            pipeline,
            pending: DashMap::new(),
            analysis_tasks: Arc::new(DashMap::new()),
        }
    }

    /// Register a job for coordination
    ///
    /// Idempotent by overwrite: re-adding a meeting id replaces the prior
    /// bookkeeping without merging.
    pub fn add_task(&self, meeting_id: MeetingId, mode: MeetingMode, diarization_enabled: bool) {
        info!(
            meeting_id,
            %mode,
            diarization_enabled,
            "registered job for coordination"
        );
        self.pending.insert(
            meeting_id,
            PendingJob {
                mode,
                diarization_enabled,
                started_at: Utc::now(),
            },
        );
    }

    /// Snapshot of currently registered meeting ids
    #[must_use]
    pub fn pending_ids(&self) -> Vec<MeetingId> {
        self.pending.iter().map(|entry| *entry.key()).collect()
    }

    /// Number of registered jobs
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Whether a job is currently registered
    #[must_use]
    pub fn is_tracking(&self, meeting_id: MeetingId) -> bool {
        self.pending.contains_key(&meeting_id)
    }

    /// Number of analysis tasks currently in flight
    #[must_use]
    pub fn active_analysis_count(&self) -> usize {
        self.analysis_tasks.len()
    }

    /// Advance one job if its worker results allow it
    ///
    /// Returns `false` when the job is unknown or still waiting on results,
    /// `true` when a terminal or semi-terminal action was taken this tick.
    /// Never blocks waiting for a result: absence means an immediate
    /// `false`.
    ///
    /// # Errors
    ///
    /// Returns an error only when the coordination store itself fails; all
    /// processing failures are absorbed into the job's ERROR disposition.
    pub async fn check_and_process(&self, meeting_id: MeetingId) -> Result<bool> {
        let Some(job) = self.pending.get(&meeting_id).map(|j| j.value().clone()) else {
            return Ok(false);
        };

        let Some(transcribe) = self
            .coordination
            .worker_result(meeting_id, WorkerKind::Transcribe)
            .await?
        else {
            return Ok(false);
        };

        if transcribe.is_error() {
            let message = transcribe
                .error
                .as_deref()
                .unwrap_or("transcription worker failed");
            self.handle_error(meeting_id, "transcribe", message).await;
            return Ok(true);
        }

        let outcome = if job.diarization_enabled {
            let Some(diarize) = self
                .coordination
                .worker_result(meeting_id, WorkerKind::Diarize)
                .await?
            else {
                // Transcription success alone is not enough to proceed.
                return Ok(false);
            };

            if diarize.is_error() {
                warn!(
                    meeting_id,
                    error = diarize.error.as_deref().unwrap_or("unknown"),
                    "diarization failed, continuing with transcript-only output"
                );
                self.process_transcript_only(meeting_id, &transcribe, &job)
                    .await
            } else {
                self.process_with_diarization(meeting_id, &transcribe, &diarize, &job)
                    .await
            }
        } else {
            self.process_transcript_only(meeting_id, &transcribe, &job)
                .await
        };

        if let Err(e) = outcome {
            error!(meeting_id, error = %e, "failed to process worker results");
            self.handle_error(meeting_id, "coordinator", &e.to_string())
                .await;
        }

        Ok(true)
    }

    /// Transcript-only path: format without speaker tags and hand off
    async fn process_transcript_only(
        &self,
        meeting_id: MeetingId,
        transcribe: &WorkerResult,
        job: &PendingJob,
    ) -> Result<()> {
        let location = transcribe.artifact_location.as_deref().ok_or(
            CoordinatorError::MissingArtifact {
                meeting_id,
                kind: WorkerKind::Transcribe,
            },
        )?;
        let artifact = self.artifacts.load_transcription(location).await?;

        let formatted = format_plain_transcript(&artifact.segments);
        let segments: Vec<SegmentInfo> = artifact.segments.iter().map(SegmentInfo::from).collect();

        self.save_and_branch(meeting_id, formatted, segments, artifact.language, job.mode)
            .await?;
        self.cleanup(meeting_id).await;
        Ok(())
    }

    /// Diarization path: merge, persist the merged artifact and hand off
    async fn process_with_diarization(
        &self,
        meeting_id: MeetingId,
        transcribe: &WorkerResult,
        diarize: &WorkerResult,
        job: &PendingJob,
    ) -> Result<()> {
        let transcribe_location = transcribe.artifact_location.as_deref().ok_or(
            CoordinatorError::MissingArtifact {
                meeting_id,
                kind: WorkerKind::Transcribe,
            },
        )?;
        let diarize_location = diarize.artifact_location.as_deref().ok_or(
            CoordinatorError::MissingArtifact {
                meeting_id,
                kind: WorkerKind::Diarize,
            },
        )?;

        let transcription = self.artifacts.load_transcription(transcribe_location).await?;
        let diarization = self.artifacts.load_diarization(diarize_location).await?;

        // A diarizer that found nothing degrades to untagged output.
        let (formatted, segments) = if diarization.speaker_segments.is_empty() {
            warn!(meeting_id, "diarization produced no speaker turns");
            (
                format_plain_transcript(&transcription.segments),
                transcription
                    .segments
                    .iter()
                    .map(SegmentInfo::from)
                    .collect::<Vec<_>>(),
            )
        } else {
            let merged = merge_transcript_with_speakers(
                &transcription.segments,
                &diarization.speaker_segments,
            );
            let speaker_count = distinct_speaker_count(&merged);

            self.artifacts
                .save_merged(&MergedArtifact {
                    meeting_id,
                    language: transcription.language.clone(),
                    segments: merged.clone(),
                    speaker_count,
                })
                .await?;
            info!(meeting_id, speaker_count, "merged speaker turns into transcript");

            (
                format_tagged_transcript(&merged),
                merged.iter().map(SegmentInfo::from).collect::<Vec<_>>(),
            )
        };

        self.save_and_branch(
            meeting_id,
            formatted,
            segments,
            transcription.language,
            job.mode,
        )
        .await?;
        self.cleanup(meeting_id).await;
        Ok(())
    }

    /// Persist the transcript, then either finish the job or detach the
    /// analysis step
    async fn save_and_branch(
        &self,
        meeting_id: MeetingId,
        transcript: String,
        segments: Vec<SegmentInfo>,
        language: Option<String>,
        mode: MeetingMode,
    ) -> Result<()> {
        let status = match mode {
            MeetingMode::TranscribeOnly => MeetingStatus::Completed,
            MeetingMode::TranscribeAndSummarize => MeetingStatus::Summarizing,
        };

        self.meetings
            .save_transcript(meeting_id, &transcript, language.as_deref(), status)
            .await?;

        match mode {
            MeetingMode::TranscribeOnly => {
                self.coordination
                    .set_job_status(meeting_id, MeetingStatus::Completed, "transcription finished")
                    .await?;
            }
            MeetingMode::TranscribeAndSummarize => {
                self.coordination
                    .set_job_status(
                        meeting_id,
                        MeetingStatus::Summarizing,
                        "analyzing meeting content",
                    )
                    .await?;
            }
        }

        let record = self
            .meetings
            .fetch(meeting_id)
            .await?
            .ok_or(CoordinatorError::MeetingNotFound { meeting_id })?;
        self.artifacts.save_transcript_text(&record).await?;
        info!(meeting_id, "transcript saved");

        if mode == MeetingMode::TranscribeAndSummarize {
            self.spawn_analysis(meeting_id, transcript, segments);
        }

        self.pending.remove(&meeting_id);
        Ok(())
    }

    /// Launch the analysis step as a supervised background task
    ///
    /// The poll loop never awaits this work; a slow analysis for one job
    /// must not delay polling of the others.
    fn spawn_analysis(&self, meeting_id: MeetingId, transcript: String, segments: Vec<SegmentInfo>) {
        let pipeline = Arc::clone(&self.pipeline);
        let meetings = Arc::clone(&self.meetings);
        let coordination = Arc::clone(&self.coordination);
        let artifacts = Arc::clone(&self.artifacts);
        let tasks = Arc::clone(&self.analysis_tasks);

        let handle = tokio::spawn(async move {
            run_analysis(
                meeting_id,
                &transcript,
                &segments,
                &pipeline,
                meetings.as_ref(),
                coordination.as_ref(),
                &artifacts,
            )
            .await;
            tasks.remove(&meeting_id);
        });

        // A task that finished before this insert leaves a completed handle
        // behind; sweep those out instead of letting them accumulate.
        self.analysis_tasks.retain(|_, h| !h.is_finished());
        self.analysis_tasks.insert(meeting_id, handle);
    }

    /// Move a job to its ERROR disposition
    ///
    /// Writes the `source: message` composite to the record, overwrites the
    /// job status, clears the store entries and deregisters the job. Store
    /// failures here are logged, not propagated; the tick must not escape.
    pub async fn handle_error(&self, meeting_id: MeetingId, source: &str, message: &str) {
        error!(meeting_id, source, message, "job failed");

        let composite = format!("{source}: {message}");
        if let Err(e) = self.meetings.mark_error(meeting_id, &composite).await {
            error!(meeting_id, error = %e, "failed to persist error state");
        }
        if let Err(e) = self
            .coordination
            .set_job_status(meeting_id, MeetingStatus::Error, message)
            .await
        {
            warn!(meeting_id, error = %e, "failed to update job status");
        }

        self.cleanup(meeting_id).await;
        self.pending.remove(&meeting_id);
    }

    /// Clear both worker result entries for a job
    ///
    /// Durable artifacts are retained; only the ephemeral coordination keys
    /// go, which is what makes result consumption at-most-once per job.
    async fn cleanup(&self, meeting_id: MeetingId) {
        for kind in WorkerKind::ALL {
            if let Err(e) = self.coordination.clear_worker_result(meeting_id, kind).await {
                warn!(meeting_id, %kind, error = %e, "failed to clear worker result");
            }
        }
        debug!(meeting_id, "cleared coordination entries");
    }

    /// Join in-flight analysis tasks, aborting any that exceed the timeout
    pub async fn shutdown(&self, timeout: Duration) {
        let ids: Vec<MeetingId> = self.analysis_tasks.iter().map(|e| *e.key()).collect();
        if ids.is_empty() {
            return;
        }

        info!(count = ids.len(), "waiting for in-flight analysis tasks");
        for meeting_id in ids {
            let Some((_, mut handle)) = self.analysis_tasks.remove(&meeting_id) else {
                continue;
            };
            match tokio::time::timeout(timeout, &mut handle).await {
                Ok(_) => debug!(meeting_id, "analysis task finished"),
                Err(_) => {
                    warn!(meeting_id, "analysis task timed out during shutdown, aborting");
                    handle.abort();
                }
            }
        }
    }
}

/// Detached analysis step
///
/// Strips the transcript back to plain text, runs the pipeline, and
/// persists the outcome. A missing or empty summary degrades the record to
/// completed-with-warning: a meeting with a transcript but no summary is
/// still usable.
async fn run_analysis(
    meeting_id: MeetingId,
    transcript: &str,
    segments: &[SegmentInfo],
    pipeline: &AnalysisPipeline,
    meetings: &dyn MeetingStore,
    coordination: &dyn CoordinationStore,
    artifacts: &ArtifactStore,
) {
    info!(meeting_id, "starting meeting analysis");

    let plain_text = extract_plain_text(transcript);
    let results = pipeline.run(&plain_text, segments).await;

    let summary = results
        .summary_content()
        .map(str::trim)
        .filter(|content| !content.is_empty())
        .map(str::to_string);

    match summary {
        Some(summary) => {
            if let Err(e) = meetings.attach_summary(meeting_id, &summary).await {
                error!(meeting_id, error = %e, "failed to persist summary");
                return;
            }
            if let Err(e) = coordination
                .set_job_status(meeting_id, MeetingStatus::Completed, "analysis finished")
                .await
            {
                warn!(meeting_id, error = %e, "failed to update job status");
            }
            if let Err(e) = artifacts.save_analysis(meeting_id, &results).await {
                warn!(meeting_id, error = %e, "failed to save analysis artifact");
            }
            if let Err(e) = artifacts.save_summary(meeting_id, &summary).await {
                warn!(meeting_id, error = %e, "failed to save summary artifact");
            }
            info!(meeting_id, "meeting analysis finished");
        }
        None => {
            let reason = match results.get(StepName::Summary) {
                Some(StepRecord::Failed { error }) => error.clone(),
                _ => "pipeline produced no content".to_string(),
            };
            let message = format!("summary generation failed: {reason}");
            error!(meeting_id, %message, "analysis produced no usable summary");

            if let Err(e) = meetings.complete_with_warning(meeting_id, &message).await {
                error!(meeting_id, error = %e, "failed to persist degraded completion");
            }
            if let Err(e) = coordination
                .set_job_status(meeting_id, MeetingStatus::Completed, &message)
                .await
            {
                warn!(meeting_id, error = %e, "failed to update job status");
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use meetbrief_analysis::{AnalysisError, AnalysisResult, ChatClient, ChatPrompt};
    use meetbrief_core::{MeetingRecord, TranscriptSegment, TranscriptionArtifact};
    use meetbrief_store::{JobStatus, MemoryCoordinationStore, StoreResult};
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// In-memory meeting record store
    #[derive(Default)]
    struct InMemoryMeetingStore {
        records: Mutex<HashMap<MeetingId, MeetingRecord>>,
    }

    impl InMemoryMeetingStore {
        fn insert(&self, record: MeetingRecord) {
            self.records.lock().insert(record.id, record);
        }

        fn get(&self, meeting_id: MeetingId) -> Option<MeetingRecord> {
            self.records.lock().get(&meeting_id).cloned()
        }
    }

    #[async_trait]
    impl MeetingStore for InMemoryMeetingStore {
        async fn fetch(&self, meeting_id: MeetingId) -> StoreResult<Option<MeetingRecord>> {
            Ok(self.get(meeting_id))
        }

        async fn save_transcript(
            &self,
            meeting_id: MeetingId,
            transcript: &str,
            language: Option<&str>,
            status: MeetingStatus,
        ) -> StoreResult<()> {
            let mut records = self.records.lock();
            if let Some(record) = records.get_mut(&meeting_id) {
                record.transcript = Some(transcript.to_string());
                record.language = language.map(str::to_string);
                record.status = status;
                record.updated_at = Utc::now();
            }
            Ok(())
        }

        async fn attach_summary(&self, meeting_id: MeetingId, summary: &str) -> StoreResult<()> {
            let mut records = self.records.lock();
            if let Some(record) = records.get_mut(&meeting_id) {
                record.summary = Some(summary.to_string());
                record.status = MeetingStatus::Completed;
                record.error_message = None;
            }
            Ok(())
        }

        async fn complete_with_warning(
            &self,
            meeting_id: MeetingId,
            message: &str,
        ) -> StoreResult<()> {
            let mut records = self.records.lock();
            if let Some(record) = records.get_mut(&meeting_id) {
                record.status = MeetingStatus::Completed;
                record.error_message = Some(message.to_string());
            }
            Ok(())
        }

        async fn mark_error(&self, meeting_id: MeetingId, message: &str) -> StoreResult<()> {
            let mut records = self.records.lock();
            if let Some(record) = records.get_mut(&meeting_id) {
                record.status = MeetingStatus::Error;
                record.error_message = Some(message.to_string());
            }
            Ok(())
        }
    }

    /// Chat client replying with a fixed summary text
    struct CannedClient;

    #[async_trait]
    impl ChatClient for CannedClient {
        async fn chat(&self, _prompt: ChatPrompt) -> AnalysisResult<String> {
            Ok("## Summary\nEverything went fine.".to_string())
        }
    }

    /// Chat client that always fails
    struct BrokenClient;

    #[async_trait]
    impl ChatClient for BrokenClient {
        async fn chat(&self, _prompt: ChatPrompt) -> AnalysisResult<String> {
            Err(AnalysisError::EmptyResponse)
        }
    }

    struct Harness {
        coordinator: TaskCoordinator,
        coordination: Arc<MemoryCoordinationStore>,
        meetings: Arc<InMemoryMeetingStore>,
        dir: TempDir,
    }

    fn harness(client: Arc<dyn ChatClient>) -> Harness {
        let dir = TempDir::new().unwrap();
        let coordination = Arc::new(MemoryCoordinationStore::new());
        let meetings = Arc::new(InMemoryMeetingStore::default());
        let artifacts = Arc::new(ArtifactStore::new(dir.path()));
        let pipeline = Arc::new(AnalysisPipeline::full(client));

        let coordinator = TaskCoordinator::new(
            Arc::clone(&coordination) as Arc<dyn CoordinationStore>,
            Arc::clone(&meetings) as Arc<dyn MeetingStore>,
            artifacts,
            pipeline,
        );

        Harness {
            coordinator,
            coordination,
            meetings,
            dir,
        }
    }

    fn record(meeting_id: MeetingId) -> MeetingRecord {
        MeetingRecord {
            id: meeting_id,
            title: format!("meeting {meeting_id}"),
            status: MeetingStatus::Pending,
            transcript: None,
            summary: None,
            language: None,
            error_message: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    async fn write_transcription(dir: &TempDir, meeting_id: MeetingId) -> PathBuf {
        let artifact = TranscriptionArtifact {
            meeting_id,
            transcript: "good morning\nlet's begin".to_string(),
            language: Some("en".to_string()),
            segments: vec![
                TranscriptSegment {
                    start: 0.0,
                    end: 2.0,
                    text: "good morning".to_string(),
                },
                TranscriptSegment {
                    start: 2.0,
                    end: 5.0,
                    text: "let's begin".to_string(),
                },
            ],
        };
        let path = dir.path().join(format!("{meeting_id}_transcribe.json"));
        tokio::fs::write(&path, serde_json::to_string(&artifact).unwrap())
            .await
            .unwrap();
        path
    }

    async fn write_diarization(dir: &TempDir, meeting_id: MeetingId) -> PathBuf {
        let artifact = meetbrief_core::DiarizationArtifact {
            meeting_id,
            speaker_segments: vec![
                meetbrief_core::SpeakerSegment {
                    start: 0.0,
                    end: 2.5,
                    speaker: "speaker_0".to_string(),
                },
                meetbrief_core::SpeakerSegment {
                    start: 2.5,
                    end: 5.0,
                    speaker: "speaker_1".to_string(),
                },
            ],
        };
        let path = dir.path().join(format!("{meeting_id}_diarize.json"));
        tokio::fs::write(&path, serde_json::to_string(&artifact).unwrap())
            .await
            .unwrap();
        path
    }

    #[tokio::test]
    async fn test_unknown_job_is_a_noop() {
        let h = harness(Arc::new(CannedClient));

        let advanced = h.coordinator.check_and_process(404).await.unwrap();

        assert!(!advanced);
        assert!(h.meetings.get(404).is_none());
        assert_eq!(h.coordination.job_status(404).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_waiting_for_transcription_returns_false() {
        let h = harness(Arc::new(CannedClient));
        h.meetings.insert(record(1));
        h.coordinator
            .add_task(1, MeetingMode::TranscribeOnly, false);

        assert!(!h.coordinator.check_and_process(1).await.unwrap());
        assert!(h.coordinator.is_tracking(1));
    }

    #[tokio::test]
    async fn test_transcription_error_is_fatal() {
        let h = harness(Arc::new(CannedClient));
        h.meetings.insert(record(2));
        h.coordinator
            .add_task(2, MeetingMode::TranscribeAndSummarize, true);
        h.coordination
            .put_worker_result(2, WorkerKind::Transcribe, WorkerResult::error("model crashed"))
            .await
            .unwrap();

        let advanced = h.coordinator.check_and_process(2).await.unwrap();
        assert!(advanced);

        let rec = h.meetings.get(2).unwrap();
        assert_eq!(rec.status, MeetingStatus::Error);
        assert_eq!(rec.error_message.as_deref(), Some("transcribe: model crashed"));

        // Deregistered and cleared; the next tick is a no-op.
        assert!(!h.coordinator.is_tracking(2));
        assert_eq!(
            h.coordination
                .worker_result(2, WorkerKind::Transcribe)
                .await
                .unwrap(),
            None
        );
        assert!(!h.coordinator.check_and_process(2).await.unwrap());
    }

    #[tokio::test]
    async fn test_transcribe_only_flow_completes() {
        let h = harness(Arc::new(CannedClient));
        h.meetings.insert(record(3));
        h.coordinator.add_task(3, MeetingMode::TranscribeOnly, false);

        let location = write_transcription(&h.dir, 3).await;
        h.coordination
            .put_worker_result(3, WorkerKind::Transcribe, WorkerResult::completed(location))
            .await
            .unwrap();

        assert!(h.coordinator.check_and_process(3).await.unwrap());

        let rec = h.meetings.get(3).unwrap();
        assert_eq!(rec.status, MeetingStatus::Completed);
        assert_eq!(rec.language.as_deref(), Some("en"));
        assert_eq!(
            rec.transcript.as_deref(),
            Some("[00:00 --> 00:02] good morning\n[00:02 --> 00:05] let's begin")
        );
        assert!(rec.summary.is_none());

        // Transcript export exists, no analysis ran.
        assert!(h.dir.path().join("3_transcript.txt").exists());
        assert_eq!(h.coordinator.active_analysis_count(), 0);

        let status = h.coordination.job_status(3).await.unwrap().unwrap();
        assert_eq!(status.status, MeetingStatus::Completed);
        assert_eq!(status.message, "transcription finished");
    }

    #[tokio::test]
    async fn test_diarization_waits_for_second_worker() {
        let h = harness(Arc::new(CannedClient));
        h.meetings.insert(record(4));
        h.coordinator.add_task(4, MeetingMode::TranscribeOnly, true);

        let location = write_transcription(&h.dir, 4).await;
        h.coordination
            .put_worker_result(4, WorkerKind::Transcribe, WorkerResult::completed(location))
            .await
            .unwrap();

        // Transcription alone is not enough across any number of ticks.
        assert!(!h.coordinator.check_and_process(4).await.unwrap());
        assert!(!h.coordinator.check_and_process(4).await.unwrap());
        assert!(h.coordinator.is_tracking(4));

        // The diarization result arrives on a later tick; now it merges.
        let diarize_location = write_diarization(&h.dir, 4).await;
        h.coordination
            .put_worker_result(
                4,
                WorkerKind::Diarize,
                WorkerResult::completed(diarize_location),
            )
            .await
            .unwrap();

        assert!(h.coordinator.check_and_process(4).await.unwrap());

        let rec = h.meetings.get(4).unwrap();
        assert_eq!(rec.status, MeetingStatus::Completed);
        assert_eq!(
            rec.transcript.as_deref(),
            Some(
                "[00:00 --> 00:02] [speaker_0] good morning\n\
                 [00:02 --> 00:05] [speaker_1] let's begin"
            )
        );

        // Merged artifact was persisted with the distinct speaker count.
        let merged: MergedArtifact = serde_json::from_str(
            &tokio::fs::read_to_string(h.dir.path().join("4_merged.json"))
                .await
                .unwrap(),
        )
        .unwrap();
        assert_eq!(merged.speaker_count, 2);
        assert_eq!(merged.segments.len(), 2);
    }

    #[tokio::test]
    async fn test_diarization_error_degrades_to_transcript_only() {
        let h = harness(Arc::new(CannedClient));
        h.meetings.insert(record(5));
        h.coordinator.add_task(5, MeetingMode::TranscribeOnly, true);

        let location = write_transcription(&h.dir, 5).await;
        h.coordination
            .put_worker_result(5, WorkerKind::Transcribe, WorkerResult::completed(location))
            .await
            .unwrap();
        h.coordination
            .put_worker_result(5, WorkerKind::Diarize, WorkerResult::error("gpu oom"))
            .await
            .unwrap();

        assert!(h.coordinator.check_and_process(5).await.unwrap());

        // The job completed rather than failing, without speaker tags.
        let rec = h.meetings.get(5).unwrap();
        assert_eq!(rec.status, MeetingStatus::Completed);
        assert!(rec.error_message.is_none());
        assert!(rec.transcript.unwrap().contains("[00:00 --> 00:02] good morning"));
        assert!(!h.dir.path().join("5_merged.json").exists());
    }

    #[tokio::test]
    async fn test_summarize_flow_attaches_summary() {
        let h = harness(Arc::new(CannedClient));
        h.meetings.insert(record(6));
        h.coordinator
            .add_task(6, MeetingMode::TranscribeAndSummarize, false);

        let location = write_transcription(&h.dir, 6).await;
        h.coordination
            .put_worker_result(6, WorkerKind::Transcribe, WorkerResult::completed(location))
            .await
            .unwrap();

        assert!(h.coordinator.check_and_process(6).await.unwrap());

        // Ownership has passed to the detached analysis task.
        assert!(!h.coordinator.is_tracking(6));
        h.coordinator.shutdown(Duration::from_secs(5)).await;

        let rec = h.meetings.get(6).unwrap();
        assert_eq!(rec.status, MeetingStatus::Completed);
        assert_eq!(
            rec.summary.as_deref(),
            Some("## Summary\nEverything went fine.")
        );
        assert!(rec.error_message.is_none());

        assert!(h.dir.path().join("6_summary.md").exists());
        assert!(h.dir.path().join("6_analysis.json").exists());

        let status = h.coordination.job_status(6).await.unwrap().unwrap();
        assert_eq!(
            status,
            JobStatus {
                status: MeetingStatus::Completed,
                message: "analysis finished".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_failed_analysis_degrades_to_completed_with_warning() {
        let h = harness(Arc::new(BrokenClient));
        h.meetings.insert(record(7));
        h.coordinator
            .add_task(7, MeetingMode::TranscribeAndSummarize, false);

        let location = write_transcription(&h.dir, 7).await;
        h.coordination
            .put_worker_result(7, WorkerKind::Transcribe, WorkerResult::completed(location))
            .await
            .unwrap();

        assert!(h.coordinator.check_and_process(7).await.unwrap());
        h.coordinator.shutdown(Duration::from_secs(5)).await;

        // The transcript survives; the record is completed with a warning.
        let rec = h.meetings.get(7).unwrap();
        assert_eq!(rec.status, MeetingStatus::Completed);
        assert!(rec.transcript.is_some());
        assert!(rec.summary.is_none());
        assert!(
            rec.error_message
                .unwrap()
                .starts_with("summary generation failed:")
        );
        assert!(!h.dir.path().join("7_summary.md").exists());
    }

    #[tokio::test]
    async fn test_cleanup_invariant_after_terminal_disposition() {
        let h = harness(Arc::new(CannedClient));
        h.meetings.insert(record(8));
        h.coordinator.add_task(8, MeetingMode::TranscribeOnly, true);

        let location = write_transcription(&h.dir, 8).await;
        h.coordination
            .put_worker_result(8, WorkerKind::Transcribe, WorkerResult::completed(location))
            .await
            .unwrap();
        let diarize_location = write_diarization(&h.dir, 8).await;
        h.coordination
            .put_worker_result(
                8,
                WorkerKind::Diarize,
                WorkerResult::completed(diarize_location),
            )
            .await
            .unwrap();

        assert!(h.coordinator.check_and_process(8).await.unwrap());

        for kind in WorkerKind::ALL {
            assert_eq!(h.coordination.worker_result(8, kind).await.unwrap(), None);
        }
        // Durable artifacts are retained.
        assert!(h.dir.path().join("8_merged.json").exists());
        assert!(h.dir.path().join("8_transcript.txt").exists());
    }

    #[tokio::test]
    async fn test_processing_failure_routes_to_error_state() {
        let h = harness(Arc::new(CannedClient));
        h.meetings.insert(record(9));
        h.coordinator.add_task(9, MeetingMode::TranscribeOnly, false);

        // Completed result whose artifact file does not exist.
        h.coordination
            .put_worker_result(
                9,
                WorkerKind::Transcribe,
                WorkerResult::completed(h.dir.path().join("missing.json")),
            )
            .await
            .unwrap();

        assert!(h.coordinator.check_and_process(9).await.unwrap());

        let rec = h.meetings.get(9).unwrap();
        assert_eq!(rec.status, MeetingStatus::Error);
        assert!(rec.error_message.unwrap().starts_with("coordinator:"));
        assert!(!h.coordinator.is_tracking(9));
    }

    #[tokio::test]
    async fn test_add_task_overwrites_bookkeeping() {
        let h = harness(Arc::new(CannedClient));
        h.coordinator.add_task(10, MeetingMode::TranscribeOnly, true);
        h.coordinator
            .add_task(10, MeetingMode::TranscribeAndSummarize, false);

        assert_eq!(h.coordinator.pending_len(), 1);
        let job = h.coordinator.pending.get(&10).unwrap().value().clone();
        assert_eq!(job.mode, MeetingMode::TranscribeAndSummarize);
        assert!(!job.diarization_enabled);
    }

    #[tokio::test]
    async fn test_empty_diarization_falls_back_to_plain_formatting() {
        let h = harness(Arc::new(CannedClient));
        h.meetings.insert(record(11));
        h.coordinator.add_task(11, MeetingMode::TranscribeOnly, true);

        let location = write_transcription(&h.dir, 11).await;
        h.coordination
            .put_worker_result(11, WorkerKind::Transcribe, WorkerResult::completed(location))
            .await
            .unwrap();

        let empty = meetbrief_core::DiarizationArtifact {
            meeting_id: 11,
            speaker_segments: vec![],
        };
        let diarize_path = h.dir.path().join("11_diarize.json");
        tokio::fs::write(&diarize_path, serde_json::to_string(&empty).unwrap())
            .await
            .unwrap();
        h.coordination
            .put_worker_result(
                11,
                WorkerKind::Diarize,
                WorkerResult::completed(diarize_path),
            )
            .await
            .unwrap();

        assert!(h.coordinator.check_and_process(11).await.unwrap());

        let rec = h.meetings.get(11).unwrap();
        assert!(!rec.transcript.unwrap().contains("[speaker"));
        assert!(!h.dir.path().join("11_merged.json").exists());
    }
}
