// SPDX-License-Identifier: MIT

//! Version recorder - immutable per-revision records plus an exportable index
//!
//! Every call to `record` writes `{output_dir}/{version_id}.json` and adds the
//! same payload to the document store. `export_all` dumps the whole store to a
//! single aggregate file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::capability::{DocumentStore, VersionMetadata};
use crate::error::{CapabilityError, PipelineError};
use crate::workflow::graph::StageId;

pub const DEFAULT_EXPORT_FILE: &str = "book_versions_export.json";

/// Attempts at drawing a fresh id before giving up
const MAX_ID_ATTEMPTS: usize = 8;

/// On-disk form of one version
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VersionRecord {
    pub text: String,
    pub reward_score: f64,
    pub timestamp: DateTime<Utc>,
}

/// Result of an export request
#[derive(Debug, Clone, PartialEq)]
pub enum ExportReport {
    /// Nothing recorded yet; no file written
    Empty,
    Exported { path: PathBuf, count: usize },
}

pub struct VersionRecorder {
    output_dir: PathBuf,
    export_file_name: String,
    store: Arc<dyn DocumentStore>,
}

impl VersionRecorder {
    pub fn new(output_dir: impl Into<PathBuf>, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            output_dir: output_dir.into(),
            export_file_name: DEFAULT_EXPORT_FILE.to_string(),
            store,
        }
    }

    pub fn with_export_file_name(mut self, name: impl Into<String>) -> Self {
        self.export_file_name = name.into();
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path of the per-version artifact
    pub fn record_path(&self, version_id: &str) -> PathBuf {
        self.output_dir.join(format!("{}.json", version_id))
    }

    /// Persist one revision and return its new id
    pub async fn record(
        &self,
        text: &str,
        reward_score: f64,
        timestamp: DateTime<Utc>,
    ) -> Result<String, PipelineError> {
        fs::create_dir_all(&self.output_dir).await?;

        let record = VersionRecord {
            text: text.to_string(),
            reward_score,
            timestamp,
        };
        let payload = serde_json::to_vec_pretty(&record)?;

        let version_id = self.write_new_record(&payload).await?;

        let metadata = VersionMetadata {
            version_id: version_id.clone(),
            reward_score,
            timestamp,
        };
        if let Err(e) = self.store.put(&version_id, text, metadata).await {
            let path = self.record_path(&version_id);
            if let Err(rm_err) = fs::remove_file(&path).await {
                log::warn!("Could not remove unindexed {}: {}", path.display(), rm_err);
            }
            return Err(PipelineError::capability(StageId::Persist, e));
        }

        log::info!(
            "Recorded version {} (reward {}) at {}",
            version_id,
            reward_score,
            self.record_path(&version_id).display()
        );
        Ok(version_id)
    }

    /// Create the artifact exclusively, drawing a new id on collision
    async fn write_new_record(&self, payload: &[u8]) -> Result<String, PipelineError> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let version_id = new_version_id();
            let in_store = self
                .store
                .contains(&version_id)
                .await
                .map_err(|e| PipelineError::capability(StageId::Persist, e))?;
            if in_store {
                log::warn!("Version id {} already stored, drawing another", version_id);
                continue;
            }

            let path = self.record_path(&version_id);
            let file = fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await;

            match file {
                Ok(mut file) => {
                    file.write_all(payload).await?;
                    file.flush().await?;
                    return Ok(version_id);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    log::warn!("{} already exists, drawing another id", path.display());
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(PipelineError::capability(
            StageId::Persist,
            CapabilityError::DuplicateId("no free version id".to_string()),
        ))
    }

    /// Write every stored version to one aggregate file.
    ///
    /// Rewrites the same file on each call; with no versions it writes nothing.
    pub async fn export_all(&self) -> Result<ExportReport, PipelineError> {
        let export = self
            .store
            .export_all()
            .await
            .map_err(|e| PipelineError::capability(StageId::Persist, e))?;

        if export.is_empty() {
            log::info!("No versions recorded, nothing to export");
            return Ok(ExportReport::Empty);
        }

        fs::create_dir_all(&self.output_dir).await?;
        let path = self.output_dir.join(&self.export_file_name);
        fs::write(&path, serde_json::to_vec_pretty(&export)?).await?;

        log::info!("Exported {} versions to {}", export.len(), path.display());
        Ok(ExportReport::Exported {
            path,
            count: export.len(),
        })
    }
}

/// `v_` followed by 8 hex chars of a random UUID
pub fn new_version_id() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("v_{}", &hex[..8])
}
