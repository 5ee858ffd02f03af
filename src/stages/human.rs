// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::Arc;

use crate::capability::{DecisionProvider, ReviewSnapshot};
use crate::error::PipelineError;
use crate::workflow::graph::{Intent, StageId};
use crate::workflow::stage::Stage;
use crate::workflow::state::{StateUpdate, WorkflowState};

pub const GATE_PROMPT: &str =
    "Suggest edits or type 'stop' to finalize, 'improve' to regenerate: ";

/// Blocking human checkpoint.
///
/// Shows the latest attempt, then prompts until the answer is `stop` or
/// `improve` (trimmed, any case). There is no retry limit; only a closed
/// input source ends the wait with an error.
pub struct HumanGateStage {
    decisions: Arc<dyn DecisionProvider>,
}

impl HumanGateStage {
    pub fn new(decisions: Arc<dyn DecisionProvider>) -> Self {
        Self { decisions }
    }

    async fn await_intent(&self) -> Result<Intent, PipelineError> {
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            let line = self
                .decisions
                .read_line(GATE_PROMPT)
                .await
                .map_err(|e| PipelineError::capability(StageId::HumanGate, e))?;

            match Intent::parse(&line) {
                Some(intent) => {
                    log::info!("Human chose '{}' after {} prompt(s)", intent, attempts);
                    return Ok(intent);
                }
                None => log::warn!("Unrecognized answer {:?}, asking again", line.trim()),
            }
        }
    }
}

#[async_trait]
impl Stage for HumanGateStage {
    fn id(&self) -> StageId {
        StageId::HumanGate
    }

    async fn run(&self, state: &WorkflowState) -> Result<StateUpdate, PipelineError> {
        let snapshot = ReviewSnapshot {
            generated_text: state.generated_text.clone().unwrap_or_default(),
            reviewed_text: state.reviewed_text.clone().unwrap_or_default(),
            reward_score: state.reward_score,
        };
        self.decisions
            .present(&snapshot)
            .await
            .map_err(|e| PipelineError::capability(StageId::HumanGate, e))?;

        let intent = self.await_intent().await?;
        Ok(StateUpdate::new().intent(intent.as_str()))
    }
}
