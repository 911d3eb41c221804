//! Access token lookup. Tokens are issued and refreshed elsewhere.

use crate::error::GoogleApiError;
use relay_core::GoogleConfig;
use serde::Deserialize;
use std::path::Path;

/// Token file payload. Accepts both `token` and `access_token`.
#[derive(Debug, Deserialize)]
struct TokenFile {
    #[serde(alias = "access_token")]
    token: Option<String>,
}

/// Read the access token from the configured environment variable, falling
/// back to the token file.
pub fn load_access_token(config: &GoogleConfig) -> Result<String, GoogleApiError> {
    if let Ok(token) = std::env::var(&config.access_token_env) {
        let token = token.trim();
        if !token.is_empty() {
            return Ok(token.to_string());
        }
    }

    match &config.token_file {
        Some(path) => read_token_file(path),
        None => Err(GoogleApiError::TokenMissing {
            env: config.access_token_env.clone(),
        }),
    }
}

pub fn read_token_file(path: &Path) -> Result<String, GoogleApiError> {
    let raw = std::fs::read_to_string(path)?;
    let file: TokenFile = serde_json::from_str(&raw)?;
    file.token
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| GoogleApiError::TokenInvalid {
            path: path.to_path_buf(),
        })
}
