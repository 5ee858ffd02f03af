// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::Arc;

use super::{is_generation_sentinel, REVIEW_FAILED};
use crate::capability::{GenerationOutcome, TextGenerator};
use crate::error::PipelineError;
use crate::workflow::graph::StageId;
use crate::workflow::stage::Stage;
use crate::workflow::state::{StateUpdate, WorkflowState};

pub const REVIEW_PROMPT: &str = "Review the following summary and improve it for clarity, grammar, and conciseness.\n\n\
Make it professional, readable, and retain the original meaning. Avoid repetition.\n\n";

/// Improves `generated_text` into `reviewed_text`.
///
/// A failed summary is never sent to the model: the stage writes a
/// `[REVIEW_FAILED]` sentinel and returns.
pub struct ReviewStage {
    reviewer: Arc<dyn TextGenerator>,
}

impl ReviewStage {
    pub fn new(reviewer: Arc<dyn TextGenerator>) -> Self {
        Self { reviewer }
    }
}

fn review_failed(reason: &str) -> String {
    format!("{} {}", REVIEW_FAILED, reason)
}

#[async_trait]
impl Stage for ReviewStage {
    fn id(&self) -> StageId {
        StageId::Review
    }

    async fn run(&self, state: &WorkflowState) -> Result<StateUpdate, PipelineError> {
        let text = state.generated_text.as_deref().unwrap_or_default().trim();

        if text.is_empty() || is_generation_sentinel(text) {
            log::warn!("Skipping review, summary carries no usable text");
            return Ok(StateUpdate::new().reviewed_text(review_failed(
                "Cannot review due to previous summarization error.",
            )));
        }

        let prompt = format!("{}{}", REVIEW_PROMPT, text);
        let reviewed = match self.reviewer.generate(&prompt, None).await {
            GenerationOutcome::Text(text) => text,
            GenerationOutcome::Malformed(detail) => {
                log::warn!("Review response malformed: {}", detail);
                review_failed("Unexpected response format.")
            }
            GenerationOutcome::AdapterError(detail) => {
                log::warn!("Review call failed: {}", detail);
                review_failed("Generation API call failed.")
            }
        };

        Ok(StateUpdate::new().reviewed_text(reviewed))
    }
}
