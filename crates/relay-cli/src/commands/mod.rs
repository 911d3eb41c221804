//! CLI command implementations.

pub mod actions;
pub mod repl;
pub mod run;

use anyhow::{Context, Result};
use relay_core::RelayConfig;
use relay_planner::{GeminiModel, Planner};
use relay_runtime::{Dispatcher, StdoutReporter, Summarizer};
use std::sync::Arc;

/// Build the language-model front end from configuration.
pub fn planner(config: &RelayConfig) -> Result<Arc<Planner>> {
    let model = GeminiModel::from_config(&config.planner)
        .context("The language model is not configured")?;
    Ok(Arc::new(
        Planner::new(Arc::new(model), &config.planner)
            .with_calendar_config(config.calendar.clone()),
    ))
}

/// Connect the enabled Google services and wrap them in a dispatcher that
/// reports to stdout.
pub fn dispatcher(
    config: &RelayConfig,
    summarizer: Option<Arc<dyn Summarizer>>,
) -> Result<Dispatcher> {
    let mut capabilities = relay_adapter_google::connect(&config.google)
        .context("Failed to connect Google services")?;
    if let Some(summarizer) = summarizer {
        capabilities = capabilities.with_summarizer(summarizer);
    }

    Ok(Dispatcher::new(capabilities, Arc::new(StdoutReporter))
        .with_calendar_config(config.calendar.clone())
        .with_drive_config(config.drive.clone()))
}
