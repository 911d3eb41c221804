//! Authenticated request plumbing shared by the Gmail, Calendar and Drive clients.

use crate::error::GoogleApiError;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

/// A reqwest client bound to one bearer token.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    token: String,
}

impl ApiClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            token: token.into(),
        }
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        self.http.get(url).bearer_auth(&self.token)
    }

    pub fn post(&self, url: &str) -> RequestBuilder {
        self.http.post(url).bearer_auth(&self.token)
    }

    pub fn patch(&self, url: &str) -> RequestBuilder {
        self.http.patch(url).bearer_auth(&self.token)
    }

    pub fn delete(&self, url: &str) -> RequestBuilder {
        self.http.delete(url).bearer_auth(&self.token)
    }

    /// Send and decode a JSON response body.
    pub async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, GoogleApiError> {
        let resp = self.send(request).await?;
        Ok(resp.json().await?)
    }

    /// Send, discarding the response body.
    pub async fn execute(&self, request: RequestBuilder) -> Result<(), GoogleApiError> {
        self.send(request).await.map(|_| ())
    }

    /// Send and check the status. 401 maps to `AuthExpired`, any other
    /// non-success status to `ApiError` carrying the response body.
    pub async fn send(&self, request: RequestBuilder) -> Result<Response, GoogleApiError> {
        let resp = request.send().await?;
        let status = resp.status();
        debug!(status = status.as_u16(), url = %resp.url(), "google api response");

        if status == StatusCode::UNAUTHORIZED {
            return Err(GoogleApiError::AuthExpired);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GoogleApiError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(resp)
    }
}
