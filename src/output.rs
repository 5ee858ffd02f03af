// SPDX-License-Identifier: MIT

//! Final output artifact written after a normal stop

use chrono::{DateTime, Local};
use serde_json::json;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::PipelineError;
use crate::workflow::state::WorkflowState;

/// Write `final_{timestamp}.txt` with the reviewed text and a status marker.
///
/// Returns `None` without touching the disk if the run produced no reviewed text.
pub async fn write_final_artifact(
    output_dir: &Path,
    state: &WorkflowState,
    now: DateTime<Local>,
) -> Result<Option<PathBuf>, PipelineError> {
    let Some(reviewed) = state.reviewed_text.as_deref() else {
        return Ok(None);
    };

    fs::create_dir_all(output_dir).await?;
    let path = output_dir.join(format!("final_{}.txt", now.format("%Y%m%d_%H%M%S")));

    let status = json!({
        "status": "Saved",
        "path": path.display().to_string(),
    });
    let content = format!(
        "Generated Summary:\n{}\n{}",
        reviewed,
        serde_json::to_string_pretty(&status)?
    );

    fs::write(&path, content).await?;
    log::info!("Final output saved to {}", path.display());
    Ok(Some(path))
}
