#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    #[error("No API key: set one of {}", envs.join(", "))]
    ApiKeyMissing { envs: Vec<String> },
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Model API error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Model returned no text")]
    EmptyResponse,
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Intent does not match schema: {0}")]
    Schema(String),
}
