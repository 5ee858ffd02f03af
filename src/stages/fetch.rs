// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::Arc;
use url::Url;

use crate::capability::PageFetcher;
use crate::error::PipelineError;
use crate::workflow::graph::StageId;
use crate::workflow::stage::Stage;
use crate::workflow::state::{StateUpdate, WorkflowState};

/// Fetches `source_url` into `scraped_text`; any failure aborts the run
pub struct FetchStage {
    fetcher: Arc<dyn PageFetcher>,
}

impl FetchStage {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }
}

/// Parse and check an entry URL
pub fn parse_source_url(raw: &str) -> Result<Url, PipelineError> {
    let url = Url::parse(raw).map_err(|e| PipelineError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(PipelineError::InvalidUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

#[async_trait]
impl Stage for FetchStage {
    fn id(&self) -> StageId {
        StageId::Fetch
    }

    async fn run(&self, state: &WorkflowState) -> Result<StateUpdate, PipelineError> {
        let url = parse_source_url(state.source_url())?;

        let text = self
            .fetcher
            .fetch_page(&url)
            .await
            .map_err(|e| PipelineError::capability(StageId::Fetch, e))?;

        log::info!("Scraped {} chars from {}", text.chars().count(), url);
        Ok(StateUpdate::new().scraped_text(text))
    }
}
