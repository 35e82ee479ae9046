//! Integrating summary
//!
//! The only step that reads earlier results; it must be registered last.

use crate::error::AnalysisResult;
use crate::llm::{ChatClient, ChatPrompt};
use crate::pipeline::AnalysisStep;
use crate::result::{
    AnalysisResults, MeetingSummary, SegmentInfo, StepName, StepOutput, StepRecord,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Cap on the transcript excerpt folded into the prompt
const MAX_EXCERPT_CHARS: usize = 6000;

/// Leading part of a long transcript kept in the excerpt
const EXCERPT_HEAD_CHARS: usize = 4000;

/// Trailing part of a long transcript kept in the excerpt
const EXCERPT_TAIL_CHARS: usize = 2000;

const SYSTEM_PROMPT: &str = "You are a professional meeting assistant who integrates analysis \
results into structured summaries. Output the summary directly as Markdown.";

/// Combines the earlier analyses into one structured narrative summary
pub struct SummaryStep {
    client: Arc<dyn ChatClient>,
}

impl std::fmt::Debug for SummaryStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SummaryStep").finish_non_exhaustive()
    }
}

impl SummaryStep {
    /// Create the step with the given chat backend
    #[must_use]
    pub fn new(client: Arc<dyn ChatClient>) -> Self {
        Self { client }
    }

    fn build_prompt(
        excerpt: &str,
        speakers_info: &str,
        actions_info: &str,
        decisions_info: &str,
    ) -> String {
        format!(
            "Write a complete meeting summary report from the information below.\n\n\
             ## Transcript excerpt\n{excerpt}\n\n\
             ## Analyzed information\n\n\
             ### Speaker analysis\n{speakers_info}\n\n\
             ### Action items\n{actions_info}\n\n\
             ### Decisions\n{decisions_info}\n\n\
             ---\n\n\
             Produce a structured summary with these sections:\n\n\
             ## Topic\n\
             (one line, at most 15 words)\n\n\
             ## Participants\n\
             (participants and their roles, from the speaker analysis)\n\n\
             ## Key points\n\
             (the 3-5 most important discussion points, 1-2 sentences each)\n\n\
             ## Action items\n\
             (as `- [ ] task @assignee (deadline)` entries)\n\n\
             ## Decisions\n\
             (matters where consensus was reached)\n\n\
             ## Interaction\n\
             (a short note on how the participants interacted)\n\n\
             Keep the tone professional and concise."
        )
    }
}

/// Front-and-back excerpt of a long transcript
fn transcript_excerpt(transcript: &str) -> String {
    let chars = transcript.chars().count();
    if chars <= MAX_EXCERPT_CHARS {
        return transcript.to_string();
    }

    let head: String = transcript.chars().take(EXCERPT_HEAD_CHARS).collect();
    let tail: String = {
        let skip = chars - EXCERPT_TAIL_CHARS;
        transcript.chars().skip(skip).collect()
    };
    format!("{head}\n\n[... middle omitted ...]\n\n{tail}")
}

fn format_speakers(record: Option<&StepRecord>) -> String {
    let Some(StepRecord::Completed(StepOutput::Speakers(insights))) = record else {
        return "(no speaker information)".to_string();
    };

    let mut lines = Vec::new();

    if !insights.stats.is_empty() {
        lines.push("**Talk time:**".to_string());
        for (speaker, stats) in &insights.stats {
            lines.push(format!(
                "- {speaker}: {} min ({}%), {} utterances",
                stats.duration_mins, stats.percentage, stats.segment_count
            ));
        }
    }

    if let Some(analysis) = &insights.analysis {
        if !analysis.speakers.is_empty() {
            lines.push("\n**Roles:**".to_string());
            for (speaker, profile) in &analysis.speakers {
                lines.push(format!("- {speaker}: {}", profile.role));
                if let Some(stance) = &profile.stance {
                    lines.push(format!("  - Stance: {stance}"));
                }
                for point in profile.main_points.iter().take(3) {
                    lines.push(format!("  - {point}"));
                }
            }
        }
        if let Some(pattern) = &analysis.interaction_pattern {
            lines.push(format!("\n**Interaction:** {pattern}"));
        }
    }

    if lines.is_empty() {
        "(no speaker information)".to_string()
    } else {
        lines.join("\n")
    }
}

fn format_actions(record: Option<&StepRecord>) -> String {
    let Some(StepRecord::Completed(StepOutput::Actions(actions))) = record else {
        return "(no action items)".to_string();
    };
    if actions.items.is_empty() {
        return "(no action items)".to_string();
    }

    let mut lines = Vec::new();
    for item in &actions.items {
        let mut line = format!("- {}", item.task);
        if let Some(assignee) = &item.assignee {
            line.push_str(&format!(" @{assignee}"));
        }
        if let Some(deadline) = &item.deadline {
            line.push_str(&format!(" (due: {deadline})"));
        }
        line.push_str(&format!(" [priority: {}]", item.priority));
        lines.push(line);
        if let Some(context) = &item.context {
            lines.push(format!("  Context: {context}"));
        }
    }
    lines.join("\n")
}

fn format_decisions(record: Option<&StepRecord>) -> String {
    let Some(StepRecord::Completed(StepOutput::Decisions(decisions))) = record else {
        return "(no decisions)".to_string();
    };
    if decisions.items.is_empty() {
        return "(no decisions)".to_string();
    }

    let mut lines = Vec::new();
    for item in &decisions.items {
        let mut line = format!("- {}", item.decision);
        if item.confidence != "high" {
            line.push_str(&format!(" [confidence: {}]", item.confidence));
        }
        lines.push(line);
        if let Some(background) = &item.background {
            lines.push(format!("  Background: {background}"));
        }
    }
    lines.join("\n")
}

#[async_trait]
impl AnalysisStep for SummaryStep {
    fn name(&self) -> StepName {
        StepName::Summary
    }

    async fn process(
        &self,
        transcript: &str,
        _segments: &[SegmentInfo],
        previous: &AnalysisResults,
    ) -> AnalysisResult<StepOutput> {
        let speakers_info = format_speakers(previous.get(StepName::Speakers));
        let actions_info = format_actions(previous.get(StepName::Actions));
        let decisions_info = format_decisions(previous.get(StepName::Decisions));
        let excerpt = transcript_excerpt(transcript);

        let content = self
            .client
            .chat(ChatPrompt::new(
                SYSTEM_PROMPT,
                Self::build_prompt(&excerpt, &speakers_info, &actions_info, &decisions_info),
                0.3,
                3000,
            ))
            .await?;

        Ok(StepOutput::Summary(MeetingSummary {
            content,
            integrated_from: previous.step_names(),
            transcript_length: transcript.chars().count(),
        }))
    }
}
