//! Shared HTTP plumbing: base URL, auth header, timeouts and error normalisation.

use reqwest::header::{HeaderMap, HeaderValue, InvalidHeaderValue};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::config::Config;

/// Header name for the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// A request to the promotion service failed.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
    #[error("API key is not a valid header value")]
    InvalidApiKey(#[from] InvalidHeaderValue),
    #[error("request to {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{path} returned {status}: {message}")]
    Status {
        path: String,
        status: StatusCode,
        code: Option<String>,
        message: String,
    },
    #[error("unexpected response body from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("a submission is already in progress")]
    SubmissionPending,
}

impl ClientError {
    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Transport { .. } => true,
            ClientError::Status { status, .. } => {
                status.is_server_error()
                    || *status == StatusCode::REQUEST_TIMEOUT
                    || *status == StatusCode::TOO_MANY_REQUESTS
            }
            _ => false,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

/// Thin wrapper over `reqwest::Client` rooted at the service's base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client from configuration: timeout and optional API key.
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &config.api_key {
            let mut value = HeaderValue::from_str(key)?;
            value.set_sensitive(true);
            headers.insert(API_KEY_HEADER, value);
        }

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .default_headers(headers)
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self::with_client(http, &config.api_base_url))
    }

    pub fn with_client(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.send(path, self.http.get(self.url(path))).await?;
        decode(path, response).await
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let response = self
            .send(path, self.http.post(self.url(path)).json(body))
            .await?;
        decode(path, response).await
    }

    pub async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let response = self
            .send(path, self.http.put(self.url(path)).json(body))
            .await?;
        decode(path, response).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        self.send(path, self.http.delete(self.url(path))).await?;
        Ok(())
    }

    async fn send(&self, path: &str, request: RequestBuilder) -> Result<Response, ClientError> {
        let response = request.send().await.map_err(|source| {
            tracing::error!("request to {} failed: {}", path, source);
            ClientError::Transport {
                path: path.to_string(),
                source,
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let (code, message) = error_details(&body, status);
        tracing::warn!(%status, path, "request rejected: {}", message);
        Err(ClientError::Status {
            path: path.to_string(),
            status,
            code,
            message,
        })
    }
}

async fn decode<T: DeserializeOwned>(path: &str, response: Response) -> Result<T, ClientError> {
    response.json().await.map_err(|source| ClientError::Decode {
        path: path.to_string(),
        source,
    })
}

/// Pull a code and message out of an error body.
///
/// Understands `{ "error": { "code", "message" } }` envelopes and flat
/// `{ "message": "..." | [...] }` bodies; anything else falls back to the status text.
pub(crate) fn error_details(body: &str, status: StatusCode) -> (Option<String>, String) {
    let fallback = || {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    };

    let Ok(json) = serde_json::from_str::<serde_json::Value>(body) else {
        let text = body.trim();
        return (None, if text.is_empty() { fallback() } else { text.to_string() });
    };

    let (code, message) = match json.get("error") {
        Some(serde_json::Value::Object(error)) => (error.get("code"), error.get("message")),
        _ => (json.get("code"), json.get("message")),
    };

    let code = code.and_then(|c| c.as_str()).map(str::to_string);
    let message = match message {
        Some(serde_json::Value::String(m)) => m.clone(),
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str())
            .collect::<Vec<_>>()
            .join("; "),
        _ => fallback(),
    };
    (code, message)
}
