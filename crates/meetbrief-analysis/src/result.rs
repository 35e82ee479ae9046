//! Typed analysis results
//!
//! Step outcomes are a closed union rather than a string-keyed bag of JSON:
//! each variant carries the step's shape, the record map preserves
//! registration order, and the integrating summary step pattern-matches on
//! earlier outputs instead of probing for optional keys.

use indexmap::IndexMap;
use meetbrief_core::{MergedSegment, TranscriptSegment};
use serde::{Deserialize, Serialize};

/// Names of the fixed pipeline steps, used as result keys
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StepName {
    /// Speaker role and stance analysis
    Speakers,
    /// Action item extraction
    Actions,
    /// Decision extraction
    Decisions,
    /// Integrating summary
    Summary,
}

impl std::fmt::Display for StepName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Speakers => write!(f, "speakers"),
            Self::Actions => write!(f, "actions"),
            Self::Decisions => write!(f, "decisions"),
            Self::Summary => write!(f, "summary"),
        }
    }
}

/// A transcript segment as the pipeline sees it
///
/// Speaker labels are present only when diarization ran and succeeded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SegmentInfo {
    /// Start time in seconds
    pub start: f64,

    /// End time in seconds
    pub end: f64,

    /// Transcribed text
    pub text: String,

    /// Speaker label, if known
    pub speaker: Option<String>,
}

impl From<&MergedSegment> for SegmentInfo {
    fn from(segment: &MergedSegment) -> Self {
        Self {
            start: segment.start,
            end: segment.end,
            text: segment.text.clone(),
            speaker: Some(segment.speaker.clone()),
        }
    }
}

impl From<&TranscriptSegment> for SegmentInfo {
    fn from(segment: &TranscriptSegment) -> Self {
        Self {
            start: segment.start,
            end: segment.end,
            text: segment.text.clone(),
            speaker: None,
        }
    }
}

/// Per-speaker talk-time statistics
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpeakerStats {
    /// Total speaking time in minutes (rounded to one decimal)
    pub duration_mins: f64,

    /// Share of total speaking time, in percent
    pub percentage: f64,

    /// Number of segments attributed to the speaker
    pub segment_count: usize,
}

/// Model-derived profile of one speaker
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpeakerProfile {
    /// Role in the meeting (e.g. facilitator, reporter)
    #[serde(default)]
    pub role: String,

    /// Main points raised
    #[serde(default)]
    pub main_points: Vec<String>,

    /// Overall stance or attitude
    #[serde(default)]
    pub stance: Option<String>,
}

/// Model-derived speaker analysis
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SpeakerAnalysis {
    /// Per-speaker profiles
    #[serde(default)]
    pub speakers: IndexMap<String, SpeakerProfile>,

    /// Description of the interaction pattern between speakers
    #[serde(default)]
    pub interaction_pattern: Option<String>,
}

/// Output of the speakers step
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpeakerInsights {
    /// Talk-time statistics, keyed by speaker label
    pub stats: IndexMap<String, SpeakerStats>,

    /// LLM analysis; `None` when the model reply was unusable
    pub analysis: Option<SpeakerAnalysis>,
}

/// One extracted action item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionItem {
    /// Task description
    pub task: String,

    /// Responsible person, if identified
    #[serde(default)]
    pub assignee: Option<String>,

    /// Deadline, if mentioned
    #[serde(default)]
    pub deadline: Option<String>,

    /// Priority (high/medium/low)
    #[serde(default = "default_priority")]
    pub priority: String,

    /// Why the task exists
    #[serde(default)]
    pub context: Option<String>,
}

/// Output of the actions step
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionItems {
    /// Extracted items
    pub items: Vec<ActionItem>,

    /// Item count
    pub count: usize,
}

/// One extracted decision
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Decision {
    /// The decision reached
    pub decision: String,

    /// Discussion background
    #[serde(default)]
    pub background: Option<String>,

    /// What the decision affects
    #[serde(default)]
    pub impact: Option<String>,

    /// Confidence that consensus was actually reached (high/medium/low)
    #[serde(default = "default_confidence")]
    pub confidence: String,
}

/// Output of the decisions step
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Decisions {
    /// Extracted decisions
    pub items: Vec<Decision>,

    /// Decision count
    pub count: usize,
}

/// Output of the integrating summary step
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MeetingSummary {
    /// Summary text (Markdown)
    pub content: String,

    /// Steps whose results were folded into the summary
    pub integrated_from: Vec<StepName>,

    /// Length of the analyzed transcript, in characters
    pub transcript_length: usize,
}

/// Successful step output
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum StepOutput {
    /// Speakers step output
    Speakers(SpeakerInsights),
    /// Actions step output
    Actions(ActionItems),
    /// Decisions step output
    Decisions(Decisions),
    /// Summary step output
    Summary(MeetingSummary),
}

/// Outcome of one step: its output, or an isolated failure
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum StepRecord {
    /// The step completed
    Completed(StepOutput),
    /// The step failed; the error is retained, the pipeline moved on
    Failed {
        /// Failure message
        error: String,
    },
}

/// Accumulated step outcomes, in execution order
///
/// Never pruned: every step's outcome, success or isolated failure, is
/// retained and serialized into the analysis artifact.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct AnalysisResults(IndexMap<StepName, StepRecord>);

impl AnalysisResults {
    /// Empty result set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a step outcome under its name
    pub fn record(&mut self, name: StepName, record: StepRecord) {
        self.0.insert(name, record);
    }

    /// Outcome for a step, if it has run
    #[must_use]
    pub fn get(&self, name: StepName) -> Option<&StepRecord> {
        self.0.get(&name)
    }

    /// Successful output for a step, if any
    #[must_use]
    pub fn output(&self, name: StepName) -> Option<&StepOutput> {
        match self.0.get(&name) {
            Some(StepRecord::Completed(output)) => Some(output),
            _ => None,
        }
    }

    /// The summary step's text content, if it succeeded
    #[must_use]
    pub fn summary_content(&self) -> Option<&str> {
        match self.output(StepName::Summary) {
            Some(StepOutput::Summary(summary)) => Some(summary.content.as_str()),
            _ => None,
        }
    }

    /// Names of all recorded steps, in execution order
    #[must_use]
    pub fn step_names(&self) -> Vec<StepName> {
        self.0.keys().copied().collect()
    }

    /// Number of recorded steps
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no step has run yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn default_priority() -> String {
    "medium".to_string()
}

fn default_confidence() -> String {
    "medium".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_step_name_display() {
        assert_eq!(StepName::Speakers.to_string(), "speakers");
        assert_eq!(StepName::Summary.to_string(), "summary");
    }

    #[test]
    fn test_segment_info_from_merged() {
        let merged = MergedSegment {
            start: 1.0,
            end: 2.0,
            text: "hi".to_string(),
            speaker: "speaker_0".to_string(),
        };
        let info = SegmentInfo::from(&merged);
        assert_eq!(info.speaker.as_deref(), Some("speaker_0"));
        assert_eq!(info.text, "hi");
    }

    #[test]
    fn test_segment_info_from_transcript() {
        let plain = TranscriptSegment {
            start: 0.0,
            end: 1.0,
            text: "hello".to_string(),
        };
        let info = SegmentInfo::from(&plain);
        assert_eq!(info.speaker, None);
    }

    #[test]
    fn test_results_preserve_order() {
        let mut results = AnalysisResults::new();
        results.record(
            StepName::Speakers,
            StepRecord::Failed {
                error: "no speakers".to_string(),
            },
        );
        results.record(
            StepName::Actions,
            StepRecord::Completed(StepOutput::Actions(ActionItems {
                items: vec![],
                count: 0,
            })),
        );

        assert_eq!(
            results.step_names(),
            vec![StepName::Speakers, StepName::Actions]
        );
        assert!(results.output(StepName::Speakers).is_none());
        assert!(results.output(StepName::Actions).is_some());
    }

    #[test]
    fn test_summary_content_accessor() {
        let mut results = AnalysisResults::new();
        assert_eq!(results.summary_content(), None);

        results.record(
            StepName::Summary,
            StepRecord::Completed(StepOutput::Summary(MeetingSummary {
                content: "## Topic".to_string(),
                integrated_from: vec![StepName::Actions],
                transcript_length: 100,
            })),
        );
        assert_eq!(results.summary_content(), Some("## Topic"));
    }

    #[test]
    fn test_serialized_shape() {
        let mut results = AnalysisResults::new();
        results.record(
            StepName::Actions,
            StepRecord::Completed(StepOutput::Actions(ActionItems {
                items: vec![ActionItem {
                    task: "ship it".to_string(),
                    assignee: None,
                    deadline: None,
                    priority: "high".to_string(),
                    context: None,
                }],
                count: 1,
            })),
        );
        results.record(
            StepName::Summary,
            StepRecord::Failed {
                error: "backend down".to_string(),
            },
        );

        let value = serde_json::to_value(&results).unwrap();
        assert_eq!(value["actions"]["count"], 1);
        assert_eq!(value["actions"]["items"][0]["task"], "ship it");
        assert_eq!(value["summary"]["error"], "backend down");
    }

    #[test]
    fn test_action_item_defaults() {
        let item: ActionItem =
            serde_json::from_str(r#"{"task": "send minutes"}"#).unwrap();
        assert_eq!(item.priority, "medium");
        assert_eq!(item.assignee, None);
    }

    #[test]
    fn test_decision_defaults() {
        let decision: Decision =
            serde_json::from_str(r#"{"decision": "adopt plan B"}"#).unwrap();
        assert_eq!(decision.confidence, "medium");
        assert_eq!(decision.impact, None);
    }
}
