//! Generative Language API `generateContent` client.

use crate::error::PlannerError;
use crate::{ChatModel, Completion};
use async_trait::async_trait;
use relay_core::PlannerConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate.
    fn text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().map(|p| p.text).collect();
        (!text.is_empty()).then_some(text)
    }
}

fn request_body<'a>(completion: &'a Completion) -> GenerateRequest<'a> {
    GenerateRequest {
        system_instruction: completion.system.as_deref().map(|text| Content {
            role: None,
            parts: vec![Part { text }],
        }),
        contents: vec![Content {
            role: Some("user"),
            parts: vec![Part {
                text: &completion.prompt,
            }],
        }],
        generation_config: GenerationConfig {
            response_mime_type: if completion.json {
                "application/json"
            } else {
                "text/plain"
            },
        },
    }
}

pub struct GeminiModel {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiModel {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Build from configuration, taking the key from the first set
    /// environment variable in `api_key_envs`.
    pub fn from_config(config: &PlannerConfig) -> Result<Self, PlannerError> {
        let api_key = config
            .api_key_envs
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .map(|v| v.trim().to_string())
            .find(|v| !v.is_empty())
            .ok_or_else(|| PlannerError::ApiKeyMissing {
                envs: config.api_key_envs.clone(),
            })?;
        Ok(Self::new(api_key, &config.model, &config.base_url))
    }
}

#[async_trait]
impl ChatModel for GeminiModel {
    async fn complete(&self, completion: &Completion) -> Result<String, PlannerError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        debug!(model = %self.model, json = completion.json, "generateContent");

        let resp = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body(completion))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(PlannerError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateResponse = resp.json().await?;
        body.text().ok_or(PlannerError::EmptyResponse)
    }
}
