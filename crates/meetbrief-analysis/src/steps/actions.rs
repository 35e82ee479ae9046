//! Action item extraction

use super::{extract_json_block, truncate_chars};
use crate::error::AnalysisResult;
use crate::llm::{ChatClient, ChatPrompt};
use crate::pipeline::AnalysisStep;
use crate::result::{ActionItem, ActionItems, AnalysisResults, SegmentInfo, StepName, StepOutput};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

/// Cap on the transcript text sent to the model
const MAX_TRANSCRIPT_CHARS: usize = 15_000;

const SYSTEM_PROMPT: &str = "You are a professional meeting assistant who identifies and extracts \
action items from meeting conversations. Reply with JSON only.";

/// Extracts tasks, follow-ups and commitments from the transcript
pub struct ActionsStep {
    client: Arc<dyn ChatClient>,
}

impl std::fmt::Debug for ActionsStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionsStep").finish_non_exhaustive()
    }
}

impl ActionsStep {
    /// Create the step with the given chat backend
    #[must_use]
    pub fn new(client: Arc<dyn ChatClient>) -> Self {
        Self { client }
    }

    fn build_prompt(transcript: &str) -> String {
        format!(
            "Extract every action item from the following meeting transcript.\n\n\
             Transcript:\n{transcript}\n\n\
             Look for:\n\
             1. Tasks that need to be done\n\
             2. Items requiring follow-up\n\
             3. Things to prepare\n\
             4. Commitments made by participants\n\n\
             For each item identify, where mentioned, the assignee, the deadline and a \
             priority (high/medium/low, judged from the tone).\n\n\
             Reply with JSON only, in this shape:\n\
             ```json\n\
             {{\n\
               \"items\": [\n\
                 {{\n\
                   \"task\": \"task description\",\n\
                   \"assignee\": \"person or null\",\n\
                   \"deadline\": \"deadline or null\",\n\
                   \"priority\": \"high/medium/low\",\n\
                   \"context\": \"why this task exists\"\n\
                 }}\n\
               ]\n\
             }}\n\
             ```\n\n\
             If there are no action items, reply with:\n\
             ```json\n\
             {{\"items\": []}}\n\
             ```"
        )
    }
}

#[derive(Debug, Deserialize)]
struct ItemsReply {
    #[serde(default)]
    items: Vec<ActionItem>,
}

#[async_trait]
impl AnalysisStep for ActionsStep {
    fn name(&self) -> StepName {
        StepName::Actions
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
                warn!(error = %e, "action item reply was not valid JSON");
                Vec::new()
            }
        };

        let count = items.len();
        Ok(StepOutput::Actions(ActionItems { items, count }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct ScriptedClient(String);

    #[async_trait]
    impl ChatClient for ScriptedClient {
        async fn chat(&self, _prompt: ChatPrompt) -> AnalysisResult<String> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_process_parses_items() {
        let reply = r#"```json
{"items": [{"task": "send the slides", "assignee": "sam", "deadline": "friday", "priority": "high", "context": "board review"}]}
```"#;
        let step = ActionsStep::new(Arc::new(ScriptedClient(reply.to_string())));

        let output = step
            .process("transcript", &[], &AnalysisResults::new())
            .await
            .unwrap();

        match output {
            StepOutput::Actions(actions) => {
                assert_eq!(actions.count, 1);
                assert_eq!(actions.items[0].task, "send the slides");
                assert_eq!(actions.items[0].assignee.as_deref(), Some("sam"));
                assert_eq!(actions.items[0].priority, "high");
            }
            other => panic!("unexpected output: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_process_empty_items() {
        let step = ActionsStep::new(Arc::new(ScriptedClient(r#"{"items": []}"#.to_string())));

        let output = step
            .process("transcript", &[], &AnalysisResults::new())
            .await
            .unwrap();

        match output {
            StepOutput::Actions(actions) => assert_eq!(actions.count, 0),
            other => panic!("unexpected output: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_process_degrades_on_bad_reply() {
        let step = ActionsStep::new(Arc::new(ScriptedClient("I could not help".to_string())));

        let output = step
            .process("transcript", &[], &AnalysisResults::new())
            .await
            .unwrap();

        match output {
            StepOutput::Actions(actions) => {
                assert!(actions.items.is_empty());
                assert_eq!(actions.count, 0);
            }
            other => panic!("unexpected output: {other:?}"),
        }
    }
}
