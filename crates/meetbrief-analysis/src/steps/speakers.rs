//! Speaker role and stance analysis

use super::{extract_json_block, truncate_chars};
use crate::error::{AnalysisError, AnalysisResult};
use crate::llm::{ChatClient, ChatPrompt};
use crate::pipeline::AnalysisStep;
use crate::result::{
    AnalysisResults, SegmentInfo, SpeakerAnalysis, SpeakerInsights, SpeakerStats, StepName,
    StepOutput,
};
use async_trait::async_trait;
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::warn;

/// Cap on the per-speaker content sent to the model
const MAX_CONTENT_CHARS: usize = 12_000;

/// Utterances sampled per speaker
const MAX_UTTERANCES_PER_SPEAKER: usize = 20;

const SYSTEM_PROMPT: &str = "You are a professional meeting analyst who identifies participant \
roles and viewpoints. Reply with JSON only.";

/// Analyzes each speaker's role, main points and stance
pub struct SpeakersStep {
    client: Arc<dyn ChatClient>,
}

impl std::fmt::Debug for SpeakersStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeakersStep").finish_non_exhaustive()
    }
}

impl SpeakersStep {
    /// Create the step with the given chat backend
    #[must_use]
    pub fn new(client: Arc<dyn ChatClient>) -> Self {
        Self { client }
    }

    fn build_prompt(speakers_content: &str) -> String {
        format!(
            "Analyze each speaker in the following meeting excerpts.\n\n\
             {speakers_content}\n\n\
             Determine:\n\
             1. Each speaker's role in the meeting (e.g. facilitator, questioner, reporter)\n\
             2. Each speaker's main points or position\n\
             3. The interaction pattern between speakers (e.g. who responds to whom)\n\n\
             Reply with JSON in this shape:\n\
             ```json\n\
             {{\n\
               \"speakers\": {{\n\
                 \"speaker_0\": {{\n\
                   \"role\": \"role description\",\n\
                   \"main_points\": [\"point 1\", \"point 2\"],\n\
                   \"stance\": \"overall position or attitude\"\n\
                 }}\n\
               }},\n\
               \"interaction_pattern\": \"interaction description\"\n\
             }}\n\
             ```"
        )
    }
}

/// Per-speaker talk-time statistics over speaker-annotated segments
fn calculate_stats(segments: &[SegmentInfo]) -> IndexMap<String, SpeakerStats> {
    let mut time: IndexMap<String, f64> = IndexMap::new();
    let mut count: IndexMap<String, usize> = IndexMap::new();

    for segment in segments {
        let Some(speaker) = segment.speaker.as_deref() else {
            continue;
        };
        let duration = (segment.end - segment.start).max(0.0);
        *time.entry(speaker.to_string()).or_insert(0.0) += duration;
        *count.entry(speaker.to_string()).or_insert(0) += 1;
    }

    let total: f64 = time.values().sum();
    time.iter()
        .map(|(speaker, seconds)| {
            let percentage = if total > 0.0 {
                seconds / total * 100.0
            } else {
                0.0
            };
            (
                speaker.clone(),
                SpeakerStats {
                    duration_mins: round1(seconds / 60.0),
                    percentage: round1(percentage),
                    segment_count: count.get(speaker).copied().unwrap_or(0),
                },
            )
        })
        .collect()
}

/// Sampled utterances per speaker, formatted for the model
fn prepare_speakers_content(segments: &[SegmentInfo]) -> String {
    let mut texts: IndexMap<String, Vec<&str>> = IndexMap::new();
    for segment in segments {
        let Some(speaker) = segment.speaker.as_deref() else {
            continue;
        };
        if !segment.text.is_empty() {
            texts.entry(speaker.to_string()).or_default().push(&segment.text);
        }
    }

    let mut sections = Vec::new();
    for (speaker, utterances) in &texts {
        let mut section = format!("### Utterances by {speaker}:\n");
        for text in utterances.iter().take(MAX_UTTERANCES_PER_SPEAKER) {
            section.push_str(&format!("  - {text}\n"));
        }
        if utterances.len() > MAX_UTTERANCES_PER_SPEAKER {
            section.push_str(&format!("  ... ({} utterances total)\n", utterances.len()));
        }
        sections.push(section);
    }

    sections.join("\n")
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[async_trait]
impl AnalysisStep for SpeakersStep {
    fn name(&self) -> StepName {
        StepName::Speakers
    }

    async fn process(
        &self,
        _transcript: &str,
        segments: &[SegmentInfo],
        _previous: &AnalysisResults,
    ) -> AnalysisResult<StepOutput> {
        let stats = calculate_stats(segments);
        if stats.is_empty() {
            return Err(AnalysisError::NoSpeakerData);
        }

        let content = prepare_speakers_content(segments);
        let content = truncate_chars(&content, MAX_CONTENT_CHARS);

        let reply = self
            .client
            .chat(ChatPrompt::new(
                SYSTEM_PROMPT,
                Self::build_prompt(content),
                0.3,
                2000,
            ))
            .await?;

        // An unparsable reply degrades to stats-only output.
        let analysis = match serde_json::from_str::<SpeakerAnalysis>(extract_json_block(&reply)) {
            Ok(analysis) => Some(analysis),
            Err(e) => {
                warn!(error = %e, "speaker analysis reply was not valid JSON");
                None
            }
        };

        Ok(StepOutput::Speakers(SpeakerInsights { stats, analysis }))
    }
}
