// SPDX-License-Identifier: MIT

//! Capability module - the external collaborators stages call
//!
//! Each capability is a trait so the entry point can inject a concrete
//! adapter and tests can inject mocks:
//! - [web] - page fetch over HTTP with HTML-to-text extraction
//! - [huggingface] - text generation and remote similarity via the inference API
//! - [lexical] - offline cosine similarity
//! - [speech] - console or external-command speech output
//! - [collection] - in-memory document store for version records
//! - [decision] - console and scripted human input

pub mod collection;
pub mod decision;
pub mod huggingface;
pub mod lexical;
pub mod speech;
pub mod web;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::CapabilityError;

/// Sampling parameters sent with a generation request
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct GenerationParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub do_sample: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Outcome of a generation call, resolved once at the adapter boundary
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    /// Well-formed response carrying text
    Text(String),
    /// Response parsed but did not have the expected shape
    Malformed(String),
    /// Transport failure or unparseable body
    AdapterError(String),
}

/// Fetches a page and returns its visible text
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, url: &Url) -> Result<String, CapabilityError>;
}

/// Remote text generation (summarize, review)
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, params: Option<&GenerationParams>)
        -> GenerationOutcome;
}

/// Semantic similarity between two texts
#[async_trait]
pub trait SimilarityScorer: Send + Sync {
    async fn similarity(&self, text_a: &str, text_b: &str) -> Result<f64, CapabilityError>;
}

/// Audible (or otherwise rendered) output
#[async_trait]
pub trait Speaker: Send + Sync {
    async fn speak(&self, text: &str) -> Result<(), CapabilityError>;
}

/// Metadata stored next to every version document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VersionMetadata {
    pub version_id: String,
    pub reward_score: f64,
    pub timestamp: DateTime<Utc>,
}

/// Aggregate of every stored document, in insertion order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CollectionExport {
    pub ids: Vec<String>,
    pub documents: Vec<String>,
    pub metadatas: Vec<VersionMetadata>,
}

impl CollectionExport {
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }
}

/// Indexed store for version documents; append-only
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Add a document; fails with `DuplicateId` if `id` is already present
    async fn put(
        &self,
        id: &str,
        document: &str,
        metadata: VersionMetadata,
    ) -> Result<(), CapabilityError>;

    async fn contains(&self, id: &str) -> Result<bool, CapabilityError>;

    async fn export_all(&self) -> Result<CollectionExport, CapabilityError>;
}

/// Source of human decisions for the gate
#[async_trait]
pub trait DecisionProvider: Send + Sync {
    /// Show the latest attempt before asking
    async fn present(&self, review: &ReviewSnapshot) -> Result<(), CapabilityError>;

    /// Prompt and return one raw line of input
    async fn read_line(&self, prompt: &str) -> Result<String, CapabilityError>;
}

/// What the human sees at the gate
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewSnapshot {
    pub generated_text: String,
    pub reviewed_text: String,
    pub reward_score: Option<f64>,
}
