// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::Arc;

use super::{GENERATION_ERROR, NO_SUMMARY};
use crate::capability::{GenerationOutcome, GenerationParams, TextGenerator};
use crate::error::PipelineError;
use crate::workflow::graph::StageId;
use crate::workflow::stage::{require, Stage};
use crate::workflow::state::{StateUpdate, WorkflowState};

pub const SUMMARY_PROMPT_PREFIX: &str = "Summarize this: ";

/// Summarizes `scraped_text` into `generated_text`.
///
/// Runs again on every loop-back with the same scraped text; sampling makes
/// each pass differ.
pub struct GenerateStage {
    generator: Arc<dyn TextGenerator>,
    params: Option<GenerationParams>,
    input_chars: usize,
}

impl GenerateStage {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        params: Option<GenerationParams>,
        input_chars: usize,
    ) -> Self {
        Self {
            generator,
            params,
            input_chars,
        }
    }

    fn prompt(&self, scraped: &str) -> String {
        let head: String = scraped.chars().take(self.input_chars).collect();
        format!("{}{}", SUMMARY_PROMPT_PREFIX, head)
    }
}

#[async_trait]
impl Stage for GenerateStage {
    fn id(&self) -> StageId {
        StageId::Generate
    }

    async fn run(&self, state: &WorkflowState) -> Result<StateUpdate, PipelineError> {
        let scraped = require(StageId::Generate, "scraped_text", state.scraped_text.as_deref())?;

        let summary = match self
            .generator
            .generate(&self.prompt(scraped), self.params.as_ref())
            .await
        {
            GenerationOutcome::Text(text) => text,
            GenerationOutcome::Malformed(detail) => {
                log::warn!("Summary response malformed: {}", detail);
                NO_SUMMARY.to_string()
            }
            GenerationOutcome::AdapterError(detail) => {
                log::warn!("Summary call failed: {}", detail);
                GENERATION_ERROR.to_string()
            }
        };

        Ok(StateUpdate::new().generated_text(summary))
    }
}
