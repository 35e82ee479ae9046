//! Decision extraction

use super::{extract_json_block, truncate_chars};
use crate::error::AnalysisResult;
use crate::llm::{ChatClient, ChatPrompt};
use crate::pipeline::AnalysisStep;
use crate::result::{AnalysisResults, Decision, Decisions, SegmentInfo, StepName, StepOutput};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

/// Cap on the transcript text sent to the model
const MAX_TRANSCRIPT_CHARS: usize = 15_000;

const SYSTEM_PROMPT: &str = "You are a professional meeting assistant who identifies consensus \
and decisions reached in meetings. Reply with JSON only.";

/// Extracts agreed decisions and confirmed directions from the transcript
pub struct DecisionsStep {
    client: Arc<dyn ChatClient>,
}

impl std::fmt::Debug for DecisionsStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionsStep").finish_non_exhaustive()
    }
}

impl DecisionsStep {
    /// Create the step with the given chat backend
    #[must_use]
    pub fn new(client: Arc<dyn ChatClient>) -> Self {
        Self { client }
    }

    fn build_prompt(transcript: &str) -> String {
        format!(
            "Extract every decision from the following meeting transcript.\n\n\
             Transcript:\n{transcript}\n\n\
             Look for:\n\
             1. Matters where consensus was reached\n\
             2. Decisions that were made\n\
             3. Directions or strategies that were confirmed\n\
             4. Proposals that were accepted\n\n\
             For each decision identify the content, the discussion background and the \
             affected scope.\n\n\
             Reply with JSON only, in this shape:\n\
             ```json\n\
             {{\n\
               \"items\": [\n\
                 {{\n\
                   \"decision\": \"decision content\",\n\
                   \"background\": \"short discussion background\",\n\
                   \"impact\": \"affected scope or null\",\n\
                   \"confidence\": \"high/medium/low\"\n\
                 }}\n\
               ]\n\
             }}\n\
             ```\n\n\
             Only include matters with clear consensus — leave out topics still under \
             discussion. If there are no decisions, reply with {{\"items\": []}}."
        )
    }
}

#[derive(Debug, Deserialize)]
struct ItemsReply {
    #[serde(default)]
    items: Vec<Decision>,
}

#[async_trait]
impl AnalysisStep for DecisionsStep {
    fn name(&self) -> StepName {
        StepName::Decisions
    }

    async fn process(
        &self,
        transcript: &str,
        _segments: &[SegmentInfo],
        _previous: &AnalysisResults,
    ) -> AnalysisResult<StepOutput> {
        let transcript = truncate_chars(transcript, MAX_TRANSCRIPT_CHARS);

        let reply = self
            .client
            .chat(ChatPrompt::new(
                SYSTEM_PROMPT,
                Self::build_prompt(transcript),
                0.2,
                2000,
            ))
            .await?;

        // An unparsable reply degrades to an empty item list.
        let items = match serde_json::from_str::<ItemsReply>(extract_json_block(&reply)) {
            Ok(parsed) => parsed.items,
            Err(e) => {
                warn!(error = %e, "decision reply was not valid JSON");
                Vec::new()
            }
        };

        let count = items.len();
        Ok(StepOutput::Decisions(Decisions { items, count }))
    }
}
