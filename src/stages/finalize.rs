// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::Arc;

use crate::capability::Speaker;
use crate::error::PipelineError;
use crate::workflow::graph::StageId;
use crate::workflow::stage::Stage;
use crate::workflow::state::{StateUpdate, WorkflowState};

/// Announces the result. Speech failure is logged and the run still ends normally.
pub struct FinalizeStage {
    speaker: Arc<dyn Speaker>,
}

impl FinalizeStage {
    pub fn new(speaker: Arc<dyn Speaker>) -> Self {
        Self { speaker }
    }
}

pub(crate) fn announcement(score: Option<f64>) -> String {
    match score {
        Some(score) => format!("Summary complete. Reward score is {}", score),
        None => "Summary complete.".to_string(),
    }
}

#[async_trait]
impl Stage for FinalizeStage {
    fn id(&self) -> StageId {
        StageId::Finalize
    }

    async fn run(&self, state: &WorkflowState) -> Result<StateUpdate, PipelineError> {
        if state.reviewed_text.is_none() {
            log::warn!("Finalizing without a reviewed text");
        }

        if let Err(e) = self.speaker.speak(&announcement(state.reward_score)).await {
            log::error!("Speech output failed: {}", e);
        }

        Ok(StateUpdate::new())
    }
}
