//! Meeting analysis pipeline for `MeetBrief`
//!
//! An ordered chain of analysis steps over a finished transcript. Three
//! independent steps (speaker roles, action items, decisions) run first;
//! the integrating summary step runs last and is the only one reading
//! earlier results. A failing step is recorded and skipped over — one
//! step's failure never prevents the others from running.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod error;
pub mod llm;
pub mod pipeline;
pub mod result;
pub mod steps;

pub use error::{AnalysisError, AnalysisResult};
pub use llm::{ChatClient, ChatPrompt, DeepSeekClient};
pub use pipeline::{AnalysisPipeline, AnalysisStep};
pub use result::{
    ActionItem, ActionItems, AnalysisResults, Decision, Decisions, MeetingSummary, SegmentInfo,
    SpeakerAnalysis, SpeakerInsights, SpeakerProfile, SpeakerStats, StepName, StepOutput,
    StepRecord,
};
