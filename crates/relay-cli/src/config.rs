//! Locating and loading `relay.toml`.

use anyhow::{Context, Result};
use relay_core::RelayConfig;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const CONFIG_ENV: &str = "RELAY_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "relay.toml";

/// `--config` wins, then `RELAY_CONFIG`, then `relay.toml` in the working
/// directory.
pub fn config_path(explicit: Option<PathBuf>, env_value: Option<String>) -> PathBuf {
    explicit
        .or_else(|| env_value.filter(|v| !v.trim().is_empty()).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Load the configuration at `path`. A missing file yields defaults; YAML is
/// accepted for `.yaml`/`.yml`, anything else is parsed as TOML.
pub fn load(path: &Path) -> Result<RelayConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "no config file, using defaults");
        return Ok(RelayConfig::default());
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let is_yaml = path
        .extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false);
    let config: RelayConfig = if is_yaml {
        serde_yaml::from_str(&raw)
            .with_context(|| format!("Invalid YAML in {}", path.display()))?
    } else {
        toml::from_str(&raw).with_context(|| format!("Invalid TOML in {}", path.display()))?
    };

    info!(config = %path.display(), "Loaded configuration");
    Ok(config)
}
