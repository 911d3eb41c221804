//! Drive defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriveConfig {
    /// Directory downloads land in when no destination is given.
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Page size for `list_files` without a count.
    #[serde(default = "default_list_count")]
    pub default_list_count: usize,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            default_list_count: default_list_count(),
        }
    }
}

fn default_download_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_list_count() -> usize {
    10
}
