// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::Arc;

use crate::capability::SimilarityScorer;
use crate::error::PipelineError;
use crate::workflow::graph::StageId;
use crate::workflow::stage::{require, Stage};
use crate::workflow::state::{StateUpdate, WorkflowState};

/// Scores `reviewed_text` against `scraped_text`; scorer failure aborts the run
pub struct ScoreStage {
    scorer: Arc<dyn SimilarityScorer>,
}

impl ScoreStage {
    pub fn new(scorer: Arc<dyn SimilarityScorer>) -> Self {
        Self { scorer }
    }
}

/// Clamp into [0, 1] and round to 4 decimal places
fn normalize_score(raw: f64) -> f64 {
    let rounded = (raw.clamp(0.0, 1.0) * 10_000.0).round() / 10_000.0;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

#[async_trait]
impl Stage for ScoreStage {
    fn id(&self) -> StageId {
        StageId::Score
    }

    async fn run(&self, state: &WorkflowState) -> Result<StateUpdate, PipelineError> {
        let scraped = require(StageId::Score, "scraped_text", state.scraped_text.as_deref())?;
        let reviewed = require(StageId::Score, "reviewed_text", state.reviewed_text.as_deref())?;

        let raw = self
            .scorer
            .similarity(scraped, reviewed)
            .await
            .map_err(|e| PipelineError::capability(StageId::Score, e))?;

        let score = normalize_score(raw);
        log::info!("Reward score: {}", score);
        Ok(StateUpdate::new().reward_score(score))
    }
}
