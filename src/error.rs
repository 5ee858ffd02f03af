// SPDX-License-Identifier: MIT

//! Typed error handling for revision-loop
//!
//! Failures that the workflow chooses not to mask surface as `PipelineError`.
//! Recoverable remote-call failures never reach this module: they are turned
//! into sentinel text by the Generate and Review stages.

use thiserror::Error;

use crate::workflow::graph::StageId;

/// Top-level error type for a pipeline run
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A capability adapter failed and the stage does not recover from it
    #[error("{stage} stage failed: {source}")]
    Capability {
        stage: StageId,
        #[source]
        source: CapabilityError,
    },

    /// The workflow graph is misconfigured
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    /// A stage ran before the field it reads was written
    #[error("{stage} stage requires state field '{field}'")]
    MissingField { stage: StageId, field: &'static str },

    /// The entry URL could not be used
    #[error("Invalid source URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The optional review pass cap was hit
    #[error("Max {kind} reached: {limit}")]
    MaxIterations { kind: String, limit: u32 },

    /// Configuration errors (bad file, bad value)
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

/// Errors raised while building or walking the workflow graph
#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("No entry stage set")]
    MissingEntry,

    #[error("Stage {0} is not registered")]
    UnknownStage(StageId),

    #[error("Stage {0} has no outgoing edge")]
    MissingEdge(StageId),

    #[error("Branch at {stage} has no target for '{label}'")]
    MissingBranchTarget { stage: StageId, label: &'static str },
}

/// Errors from capability adapters (fetch, generate, score, speak, store, input)
#[derive(Debug, Error)]
pub enum CapabilityError {
    /// API errors from external services
    #[error("API error from {provider}: {message}")]
    Api { provider: String, message: String },

    /// API token not configured
    #[error("API token not configured for provider: {0}")]
    ApiTokenMissing(String),

    /// HTTP request errors
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Response did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// A record with this id already exists
    #[error("Document '{0}' already exists")]
    DuplicateId(String),

    /// Speech output failed
    #[error("Speech failed: {0}")]
    Speech(String),

    /// The interactive input source has no more lines
    #[error("Input closed before a decision was made")]
    InputClosed,

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Wrap a capability failure with the stage it happened in
    pub fn capability(stage: StageId, source: CapabilityError) -> Self {
        Self::Capability { stage, source }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

impl CapabilityError {
    /// Create an API error
    pub fn api(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            provider: provider.into(),
            message: message.into(),
        }
    }
}
