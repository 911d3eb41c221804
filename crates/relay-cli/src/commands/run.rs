//! `relay run <file>` - dispatch an intent read from disk, no language model
//! involved.

use anyhow::{Context, Result};
use relay_core::{Intent, RelayConfig};
use relay_runtime::Summarizer;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Read an intent from a `.json`, `.yaml` or `.yml` file.
pub fn read_intent(path: &Path) -> Result<Intent> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read intent file: {}", path.display()))?;

    let is_yaml = path
        .extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false);
    if is_yaml {
        serde_yaml::from_str(&raw).with_context(|| format!("Invalid intent YAML in {}", path.display()))
    } else {
        serde_json::from_str(&raw).with_context(|| format!("Invalid intent JSON in {}", path.display()))
    }
}

pub async fn run(config: &RelayConfig, path: &Path) -> Result<()> {
    let intent = read_intent(path)?;

    // Summarization is the only use of the model here; run without it if no
    // key is set.
    let summarizer: Option<Arc<dyn Summarizer>> = match super::planner(config) {
        Ok(planner) => Some(planner as Arc<dyn Summarizer>),
        Err(e) => {
            debug!(error = %e, "summarizer unavailable");
            None
        }
    };

    let mut dispatcher = super::dispatcher(config, summarizer)?;
    let summary = dispatcher.dispatch(&intent).await?;
    info!(
        batch_id = %summary.batch_id,
        succeeded = summary.succeeded,
        failed = summary.failed,
        "run complete"
    );
    Ok(())
}
