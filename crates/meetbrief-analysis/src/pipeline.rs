//! Pipeline runner
//!
//! Executes steps strictly in registration order. A step failure is caught,
//! recorded under the step's name and logged; the remaining steps still run.
//! The summary step must therefore be registered last — it is the only step
//! that reads earlier results.

use crate::error::AnalysisResult;
use crate::llm::ChatClient;
use crate::result::{AnalysisResults, SegmentInfo, StepName, StepOutput, StepRecord};
use crate::steps::{ActionsStep, DecisionsStep, SpeakersStep, SummaryStep};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info};

/// One analysis step
///
/// `previous` holds the outcomes of all earlier steps, keyed by step name;
/// later steps may read earlier ones, never the other way around — enforced
/// by registration order.
#[async_trait]
pub trait AnalysisStep: Send + Sync {
    /// Step name, used as the result key
    fn name(&self) -> StepName;

    /// Run the step over the plain transcript and structured segments
    async fn process(
        &self,
        transcript: &str,
        segments: &[SegmentInfo],
        previous: &AnalysisResults,
    ) -> AnalysisResult<StepOutput>;
}

/// Ordered chain of analysis steps
pub struct AnalysisPipeline {
    steps: Vec<Box<dyn AnalysisStep>>,
}

impl std::fmt::Debug for AnalysisPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisPipeline")
            .field("steps", &self.steps.iter().map(|s| s.name()).collect::<Vec<_>>())
            .finish()
    }
}

impl AnalysisPipeline {
    /// Empty pipeline
    #[must_use]
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Append a step; steps run in the order they were added
    #[must_use]
    pub fn with_step(mut self, step: Box<dyn AnalysisStep>) -> Self {
        self.steps.push(step);
        self
    }

    /// The full meeting pipeline: speakers, actions and decisions are
    /// independent of each other; the integrating summary runs last
    #[must_use]
    pub fn full(client: Arc<dyn ChatClient>) -> Self {
        Self::new()
            .with_step(Box::new(SpeakersStep::new(Arc::clone(&client))))
            .with_step(Box::new(ActionsStep::new(Arc::clone(&client))))
            .with_step(Box::new(DecisionsStep::new(Arc::clone(&client))))
            .with_step(Box::new(SummaryStep::new(client)))
    }

    /// Number of registered steps
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the pipeline has no steps
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run every step and return the accumulated outcomes
    pub async fn run(&self, transcript: &str, segments: &[SegmentInfo]) -> AnalysisResults {
        let mut results = AnalysisResults::new();

        for step in &self.steps {
            let name = step.name();
            debug!(step = %name, "running analysis step");

            match step.process(transcript, segments, &results).await {
                Ok(output) => {
                    info!(step = %name, "analysis step finished");
                    results.record(name, StepRecord::Completed(output));
                }
                Err(e) => {
                    error!(step = %name, error = %e, "analysis step failed");
                    results.record(
                        name,
                        StepRecord::Failed {
                            error: e.to_string(),
                        },
                    );
                }
            }
        }

        results
    }
}

impl Default for AnalysisPipeline {
    fn default() -> Self {
        Self::new()
    }
}
