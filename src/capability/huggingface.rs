// SPDX-License-Identifier: MIT

//! Hugging Face inference API - text generation and sentence similarity

use super::{GenerationOutcome, GenerationParams, SimilarityScorer, TextGenerator};
use crate::error::CapabilityError;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api-inference.huggingface.co/models";

const PROVIDER: &str = "huggingface";

/// Connection settings shared by the generation and similarity adapters
#[derive(Clone)]
pub struct HuggingFaceEndpoint {
    client: Client,
    base_url: String,
    api_token: Option<String>,
}

impl HuggingFaceEndpoint {
    pub fn new(
        base_url: impl Into<String>,
        api_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, CapabilityError> {
        if api_token.is_none() {
            log::warn!("No Hugging Face API token set, requests will be anonymous");
        }

        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.into(),
            api_token,
        })
    }

    fn model_url(&self, model_name: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), model_name)
    }

    fn post(&self, model_name: &str, body: &Value) -> RequestBuilder {
        let request = self.client.post(self.model_url(model_name)).json(body);
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

/// Summarization / text2text model behind the inference API
pub struct HuggingFaceGenerator {
    endpoint: HuggingFaceEndpoint,
    model_name: String,
}

impl HuggingFaceGenerator {
    pub fn new(endpoint: HuggingFaceEndpoint, model_name: impl Into<String>) -> Self {
        Self {
            endpoint,
            model_name: model_name.into(),
        }
    }
}

#[async_trait]
impl TextGenerator for HuggingFaceGenerator {
    async fn generate(
        &self,
        prompt: &str,
        params: Option<&GenerationParams>,
    ) -> GenerationOutcome {
        let mut body = json!({ "inputs": prompt });
        if let Some(params) = params {
            body["parameters"] = json!(params);
        }

        log::debug!(
            "Inference request to {}: {}",
            self.model_name,
            serde_json::to_string_pretty(&body).unwrap_or_default()
        );

        let resp = match self.endpoint.post(&self.model_name, &body).send().await {
            Ok(resp) => resp,
            Err(e) => {
                log::error!("Error calling {}: {}", self.model_name, e);
                return GenerationOutcome::AdapterError(e.to_string());
            }
        };

        let status = resp.status();
        let text = match resp.text().await {
            Ok(text) => text,
            Err(e) => return GenerationOutcome::AdapterError(e.to_string()),
        };
        log::debug!("Inference response ({}): {}", status, text);

        parse_generation_body(&text)
    }
}

/// Classify an inference response body.
///
/// A list whose first object has `summary_text` (or `generated_text`) is a
/// success. Other valid JSON, including the `{"error": ...}` shape, is
/// malformed. A body that is not JSON at all is an adapter error.
pub fn parse_generation_body(body: &str) -> GenerationOutcome {
    let value: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => return GenerationOutcome::AdapterError(format!("invalid JSON body: {}", e)),
    };

    let text = value
        .as_array()
        .and_then(|items| items.first())
        .and_then(|first| first.get("summary_text").or_else(|| first.get("generated_text")))
        .and_then(|t| t.as_str());

    match text {
        Some(t) => GenerationOutcome::Text(t.to_string()),
        None => match value.get("error") {
            Some(err) => GenerationOutcome::Malformed(format!("API error: {}", err)),
            None => GenerationOutcome::Malformed(format!("unexpected shape: {}", value)),
        },
    }
}

/// Sentence-similarity model behind the inference API
pub struct HuggingFaceSimilarity {
    endpoint: HuggingFaceEndpoint,
    model_name: String,
}

impl HuggingFaceSimilarity {
    pub fn new(endpoint: HuggingFaceEndpoint, model_name: impl Into<String>) -> Self {
        Self {
            endpoint,
            model_name: model_name.into(),
        }
    }
}

#[async_trait]
impl SimilarityScorer for HuggingFaceSimilarity {
    async fn similarity(&self, text_a: &str, text_b: &str) -> Result<f64, CapabilityError> {
        let body = json!({
            "inputs": {
                "source_sentence": text_a,
                "sentences": [text_b]
            }
        });

        let resp = self.endpoint.post(&self.model_name, &body).send().await?;

        if !resp.status().is_success() {
            let text = resp.text().await?;
            return Err(CapabilityError::api(PROVIDER, text));
        }

        let scores: Value = resp.json().await?;
        parse_similarity_body(&scores)
    }
}

fn parse_similarity_body(value: &Value) -> Result<f64, CapabilityError> {
    value
        .as_array()
        .and_then(|scores| scores.first())
        .and_then(|s| s.as_f64())
        .ok_or_else(|| CapabilityError::InvalidResponse(format!("expected [score], got {}", value)))
}
