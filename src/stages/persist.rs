// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

use crate::error::PipelineError;
use crate::versioning::VersionRecorder;
use crate::workflow::graph::StageId;
use crate::workflow::stage::{require, Stage};
use crate::workflow::state::{StateUpdate, WorkflowState};

/// Records the current revision, sentinel text included, and stores its id
pub struct PersistStage {
    recorder: Arc<VersionRecorder>,
}

impl PersistStage {
    pub fn new(recorder: Arc<VersionRecorder>) -> Self {
        Self { recorder }
    }
}

#[async_trait]
impl Stage for PersistStage {
    fn id(&self) -> StageId {
        StageId::Persist
    }

    async fn run(&self, state: &WorkflowState) -> Result<StateUpdate, PipelineError> {
        let reviewed = require(StageId::Persist, "reviewed_text", state.reviewed_text.as_deref())?;
        let score = state.reward_score.ok_or(PipelineError::MissingField {
            stage: StageId::Persist,
            field: "reward_score",
        })?;

        let version_id = self.recorder.record(reviewed, score, Utc::now()).await?;
        Ok(StateUpdate::new().version_id(version_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::collection::InMemoryCollection;
    use crate::capability::DocumentStore;

    fn ready_state(text: &str) -> WorkflowState {
        let mut state = WorkflowState::new("https://example.com");
        state.apply(StateUpdate::new().reviewed_text(text).reward_score(0.4));
        state
    }

    #[tokio::test]
    async fn test_persist_sets_new_version_each_pass() {
        let dir = tempfile::tempdir().unwrap();
        let collection = InMemoryCollection::new("book_versions");
        let recorder = Arc::new(VersionRecorder::new(dir.path(), Arc::new(collection.clone())));
        let stage = PersistStage::new(recorder.clone());

        let mut state = ready_state("[REVIEW_FAILED] Unexpected response format.");
        let first = stage.run(&state).await.unwrap().version_id.unwrap();
        state.apply(StateUpdate::new().version_id(first.clone()));
        let second = stage.run(&state).await.unwrap().version_id.unwrap();

        assert_ne!(first, second);
        assert!(recorder.record_path(&first).exists());
        assert!(recorder.record_path(&second).exists());

        let export = collection.export_all().await.unwrap();
        assert_eq!(export.ids, vec![first, second]);
        assert!(export.documents[0].starts_with("[REVIEW_FAILED]"));
    }

    #[tokio::test]
    async fn test_requires_score() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = Arc::new(VersionRecorder::new(
            dir.path(),
            Arc::new(InMemoryCollection::new("book_versions")),
        ));
        let stage = PersistStage::new(recorder);

        let mut state = WorkflowState::new("https://example.com");
        state.apply(StateUpdate::new().reviewed_text("text"));
        let err = stage.run(&state).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MissingField {
                field: "reward_score",
                ..
            }
        ));
    }
}
