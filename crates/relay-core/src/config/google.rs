//! Google Workspace access configuration.
//!
//! Relay does not run an OAuth flow. It expects an already-issued access
//! token, read from an environment variable or from a token file written by
//! another tool.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    /// Environment variable holding a bearer access token.
    #[serde(default = "default_access_token_env")]
    pub access_token_env: String,

    /// Token file (JSON with a `token` or `access_token` field).
    /// Used when the environment variable is unset.
    #[serde(default)]
    pub token_file: Option<PathBuf>,

    /// Enable the Gmail capability.
    #[serde(default = "default_enabled")]
    pub mail: bool,

    /// Enable the Calendar capability.
    #[serde(default = "default_enabled")]
    pub calendar: bool,

    /// Enable the Drive capability.
    #[serde(default = "default_enabled")]
    pub drive: bool,

    #[serde(default = "default_gmail_base_url")]
    pub gmail_base_url: String,

    #[serde(default = "default_calendar_base_url")]
    pub calendar_base_url: String,

    #[serde(default = "default_drive_base_url")]
    pub drive_base_url: String,

    #[serde(default = "default_drive_upload_url")]
    pub drive_upload_url: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            access_token_env: default_access_token_env(),
            token_file: None,
            mail: default_enabled(),
            calendar: default_enabled(),
            drive: default_enabled(),
            gmail_base_url: default_gmail_base_url(),
            calendar_base_url: default_calendar_base_url(),
            drive_base_url: default_drive_base_url(),
            drive_upload_url: default_drive_upload_url(),
        }
    }
}

fn default_access_token_env() -> String {
    "RELAY_GOOGLE_TOKEN".to_string()
}

fn default_enabled() -> bool {
    true
}

fn default_gmail_base_url() -> String {
    "https://gmail.googleapis.com/gmail/v1/users/me".to_string()
}

fn default_calendar_base_url() -> String {
    "https://www.googleapis.com/calendar/v3".to_string()
}

fn default_drive_base_url() -> String {
    "https://www.googleapis.com/drive/v3".to_string()
}

fn default_drive_upload_url() -> String {
    "https://www.googleapis.com/upload/drive/v3".to_string()
}
