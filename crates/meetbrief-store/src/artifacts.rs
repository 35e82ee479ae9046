//! Durable result artifacts
//!
//! One set of files per meeting id under the results directory. Workers
//! write `{id}_transcribe.json` / `{id}_diarize.json`; the coordinator reads
//! those through the locations carried in worker results, and writes the
//! merged, analysis, summary and transcript files. Artifacts outlive the
//! ephemeral coordination keys.

use crate::error::{StoreError, StoreResult};
use meetbrief_core::{
    DiarizationArtifact, MeetingId, MeetingRecord, MergedArtifact, TranscriptionArtifact,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// File-based artifact store rooted at a results directory
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    results_dir: PathBuf,
}

impl ArtifactStore {
    /// Create a store rooted at the given directory
    pub fn new(results_dir: impl Into<PathBuf>) -> Self {
        Self {
            results_dir: results_dir.into(),
        }
    }

    /// Create the results directory if it does not exist
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the directory cannot be created.
    pub async fn ensure_dir(&self) -> StoreResult<()> {
        fs::create_dir_all(&self.results_dir).await?;
        Ok(())
    }

    /// Root directory for result files
    #[must_use]
    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    /// Load a transcription worker artifact from its recorded location
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file is missing or not valid JSON.
    pub async fn load_transcription(&self, location: &Path) -> StoreResult<TranscriptionArtifact> {
        let data = read_artifact(location).await?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Load a diarization worker artifact from its recorded location
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file is missing or not valid JSON.
    pub async fn load_diarization(&self, location: &Path) -> StoreResult<DiarizationArtifact> {
        let data = read_artifact(location).await?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Write the merged segment set (`{id}_merged.json`)
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on serialization or write failure.
    pub async fn save_merged(&self, artifact: &MergedArtifact) -> StoreResult<PathBuf> {
        let path = self.path_for(artifact.meeting_id, "merged.json");
        let data = serde_json::to_string_pretty(artifact)?;
        fs::write(&path, data).await?;
        debug!(path = %path.display(), "saved merged segments");
        Ok(path)
    }

    /// Write the full analysis result mapping (`{id}_analysis.json`)
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on serialization or write failure.
    pub async fn save_analysis<T: Serialize + Sync>(
        &self,
        meeting_id: MeetingId,
        results: &T,
    ) -> StoreResult<PathBuf> {
        let path = self.path_for(meeting_id, "analysis.json");
        let data = serde_json::to_string_pretty(results)?;
        fs::write(&path, data).await?;
        debug!(path = %path.display(), "saved analysis results");
        Ok(path)
    }

    /// Write the summary Markdown verbatim (`{id}_summary.md`)
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on write failure.
    pub async fn save_summary(&self, meeting_id: MeetingId, content: &str) -> StoreResult<PathBuf> {
        let path = self.path_for(meeting_id, "summary.md");
        fs::write(&path, content).await?;
        debug!(path = %path.display(), "saved summary");
        Ok(path)
    }

    /// Write the human-readable transcript export (`{id}_transcript.txt`)
    ///
    /// Skipped (returns `None`) when the record carries no transcript yet.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on write failure.
    pub async fn save_transcript_text(
        &self,
        record: &MeetingRecord,
    ) -> StoreResult<Option<PathBuf>> {
        let Some(transcript) = record.transcript.as_deref() else {
            return Ok(None);
        };

        let path = self.path_for(record.id, "transcript.txt");
        let mut contents = String::new();
        contents.push_str(&format!("Meeting ID: {}\n", record.id));
        contents.push_str(&format!("Title: {}\n", record.title));
        contents.push_str(&format!(
            "Language: {}\n",
            record.language.as_deref().unwrap_or("unknown")
        ));
        contents.push_str(&format!(
            "Exported: {}\n",
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S")
        ));
        contents.push_str(&"=".repeat(50));
        contents.push_str("\n\n");
        contents.push_str(transcript);

        fs::write(&path, contents).await?;
        debug!(path = %path.display(), "saved transcript export");
        Ok(Some(path))
    }

    fn path_for(&self, meeting_id: MeetingId, suffix: &str) -> PathBuf {
        self.results_dir.join(format!("{meeting_id}_{suffix}"))
    }
}

async fn read_artifact(location: &Path) -> StoreResult<String> {
    match fs::read_to_string(location).await {
        Ok(data) => Ok(data),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StoreError::ArtifactNotFound {
            path: location.to_path_buf(),
        }),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meetbrief_core::{MeetingStatus, MergedSegment, SpeakerSegment, TranscriptSegment};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn store() -> (TempDir, ArtifactStore) {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        (dir, store)
    }

    #[tokio::test]
    async fn test_load_transcription_artifact() {
        let (dir, store) = store();
        let artifact = TranscriptionArtifact {
            meeting_id: 12,
            transcript: "hello".to_string(),
            language: Some("en".to_string()),
            segments: vec![TranscriptSegment {
                start: 0.0,
                end: 1.0,
                text: "hello".to_string(),
            }],
        };

        let location = dir.path().join("12_transcribe.json");
        tokio::fs::write(&location, serde_json::to_string(&artifact).unwrap())
            .await
            .unwrap();

        let loaded = store.load_transcription(&location).await.unwrap();
        assert_eq!(loaded, artifact);
    }

    #[tokio::test]
    async fn test_load_missing_artifact() {
        let (dir, store) = store();
        let location = dir.path().join("99_transcribe.json");

        let err = store.load_transcription(&location).await.unwrap_err();
        assert!(matches!(err, StoreError::ArtifactNotFound { .. }));
    }

    #[tokio::test]
    async fn test_load_diarization_artifact() {
        let (dir, store) = store();
        let artifact = DiarizationArtifact {
            meeting_id: 4,
            speaker_segments: vec![SpeakerSegment {
                start: 0.0,
                end: 3.0,
                speaker: "speaker_0".to_string(),
            }],
        };

        let location = dir.path().join("4_diarize.json");
        tokio::fs::write(&location, serde_json::to_string(&artifact).unwrap())
            .await
            .unwrap();

        let loaded = store.load_diarization(&location).await.unwrap();
        assert_eq!(loaded.speaker_segments.len(), 1);
    }

    #[tokio::test]
    async fn test_save_merged_uses_id_prefix() {
        let (dir, store) = store();
        let artifact = MergedArtifact {
            meeting_id: 8,
            language: Some("en".to_string()),
            segments: vec![MergedSegment {
                start: 0.0,
                end: 1.0,
                text: "hi".to_string(),
                speaker: "speaker_0".to_string(),
            }],
            speaker_count: 1,
        };

        let path = store.save_merged(&artifact).await.unwrap();
        assert_eq!(path, dir.path().join("8_merged.json"));

        let data = tokio::fs::read_to_string(&path).await.unwrap();
        let parsed: MergedArtifact = serde_json::from_str(&data).unwrap();
        assert_eq!(parsed, artifact);
    }

    #[tokio::test]
    async fn test_save_summary_verbatim() {
        let (dir, store) = store();
        let content = "## Topic\nQuarterly review\n";

        store.save_summary(21, content).await.unwrap();

        let written = tokio::fs::read_to_string(dir.path().join("21_summary.md"))
            .await
            .unwrap();
        assert_eq!(written, content);
    }

    #[tokio::test]
    async fn test_save_transcript_text_header() {
        let (dir, store) = store();
        let record = MeetingRecord {
            id: 6,
            title: "standup".to_string(),
            status: MeetingStatus::Completed,
            transcript: Some("[00:00 --> 00:02] hello".to_string()),
            summary: None,
            language: Some("en".to_string()),
            error_message: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };

        store.save_transcript_text(&record).await.unwrap();

        let written = tokio::fs::read_to_string(dir.path().join("6_transcript.txt"))
            .await
            .unwrap();
        assert!(written.starts_with("Meeting ID: 6\nTitle: standup\nLanguage: en\n"));
        assert!(written.contains(&"=".repeat(50)));
        assert!(written.ends_with("[00:00 --> 00:02] hello"));
    }

    #[tokio::test]
    async fn test_save_transcript_text_skips_empty_record() {
        let (dir, store) = store();
        let record = MeetingRecord {
            id: 11,
            title: "empty".to_string(),
            status: MeetingStatus::Pending,
            transcript: None,
            summary: None,
            language: None,
            error_message: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };

        let path = store.save_transcript_text(&record).await.unwrap();
        assert!(path.is_none());
        assert!(!dir.path().join("11_transcript.txt").exists());
    }

    #[tokio::test]
    async fn test_ensure_dir_creates_nested_path() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("data").join("results");
        let store = ArtifactStore::new(&nested);

        store.ensure_dir().await.unwrap();
        assert!(nested.is_dir());
    }
}
