// SPDX-License-Identifier: MIT

//! Runtime state for one workflow run

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::update::StateUpdate;

/// Accumulated workflow state
///
/// Created with only `source_url`; every other field is filled in by stages.
/// `source_url` has no counterpart in `StateUpdate`, so no stage can rewrite it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowState {
    source_url: String,
    pub scraped_text: Option<String>,
    pub generated_text: Option<String>,
    pub reviewed_text: Option<String>,
    pub reward_score: Option<f64>,
    pub version_id: Option<String>,
    pub intent: Option<String>,
}

impl WorkflowState {
    /// Create the initial state for a run
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            ..Self::default()
        }
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    /// Merge a partial update: returned fields overwrite, omitted fields persist
    pub fn apply(&mut self, update: StateUpdate) {
        let StateUpdate {
            scraped_text,
            generated_text,
            reviewed_text,
            reward_score,
            version_id,
            intent,
        } = update;

        overwrite(&mut self.scraped_text, scraped_text);
        overwrite(&mut self.generated_text, generated_text);
        overwrite(&mut self.reviewed_text, reviewed_text);
        overwrite(&mut self.reward_score, reward_score);
        overwrite(&mut self.version_id, version_id);
        overwrite(&mut self.intent, intent);
    }

    /// Convert state to a JSON object (used for debug logging)
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

fn overwrite<T>(slot: &mut Option<T>, value: Option<T>) {
    if let Some(v) = value {
        *slot = Some(v);
    }
}
