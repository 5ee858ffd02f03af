// SPDX-License-Identifier: MIT

//! Partial state updates returned by stages

/// Fields a stage changed; `None` means "leave as is"
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateUpdate {
    pub scraped_text: Option<String>,
    pub generated_text: Option<String>,
    pub reviewed_text: Option<String>,
    pub reward_score: Option<f64>,
    pub version_id: Option<String>,
    pub intent: Option<String>,
}

impl StateUpdate {
    /// An update that changes nothing
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scraped_text(mut self, text: impl Into<String>) -> Self {
        self.scraped_text = Some(text.into());
        self
    }

    pub fn generated_text(mut self, text: impl Into<String>) -> Self {
        self.generated_text = Some(text.into());
        self
    }

    pub fn reviewed_text(mut self, text: impl Into<String>) -> Self {
        self.reviewed_text = Some(text.into());
        self
    }

    pub fn reward_score(mut self, score: f64) -> Self {
        self.reward_score = Some(score);
        self
    }

    pub fn version_id(mut self, id: impl Into<String>) -> Self {
        self.version_id = Some(id.into());
        self
    }

    pub fn intent(mut self, intent: impl Into<String>) -> Self {
        self.intent = Some(intent.into());
        self
    }

    /// Names of the fields this update touches (for logging)
    pub fn touched_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.scraped_text.is_some() {
            fields.push("scraped_text");
        }
        if self.generated_text.is_some() {
            fields.push("generated_text");
        }
        if self.reviewed_text.is_some() {
            fields.push("reviewed_text");
        }
        if self.reward_score.is_some() {
            fields.push("reward_score");
        }
        if self.version_id.is_some() {
            fields.push("version_id");
        }
        if self.intent.is_some() {
            fields.push("intent");
        }
        fields
    }

    pub fn is_empty(&self) -> bool {
        self.touched_fields().is_empty()
    }
}
