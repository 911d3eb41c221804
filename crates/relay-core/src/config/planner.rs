//! Language-model settings for intent parsing, chat and summarization.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Model name passed to the Generative Language API.
    #[serde(default = "default_model")]
    pub model: String,

    /// Environment variables checked, in order, for the API key.
    #[serde(default = "default_api_key_envs")]
    pub api_key_envs: Vec<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Prompts remembered before the history is reset.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key_envs: default_api_key_envs(),
            base_url: default_base_url(),
            history_limit: default_history_limit(),
        }
    }
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_api_key_envs() -> Vec<String> {
    vec!["API_KEY".to_string(), "GEMINI_API_KEY".to_string()]
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_history_limit() -> usize {
    10
}
