use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum GoogleApiError {
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Token expired or revoked")]
    AuthExpired,
    #[error("No access token: set {env} or configure google.token_file")]
    TokenMissing { env: String },
    #[error("Token file {path} has no `token` or `access_token` field")]
    TokenInvalid { path: PathBuf },
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
}
