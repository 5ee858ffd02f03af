// SPDX-License-Identifier: MIT

//! Stage trait - one node's work in the workflow graph

use async_trait::async_trait;

use crate::error::PipelineError;
use crate::workflow::graph::StageId;
use crate::workflow::state::{StateUpdate, WorkflowState};

/// A stage reads the accumulated state and returns only the fields it changed
#[async_trait]
pub trait Stage: Send + Sync {
    /// The graph node this stage implements
    fn id(&self) -> StageId;

    /// Run the stage against a view of the current state
    async fn run(&self, state: &WorkflowState) -> Result<StateUpdate, PipelineError>;
}

/// Read a field a previous stage must have written
pub(crate) fn require<'a>(
    stage: StageId,
    field: &'static str,
    value: Option<&'a str>,
) -> Result<&'a str, PipelineError> {
    value.ok_or(PipelineError::MissingField { stage, field })
}
