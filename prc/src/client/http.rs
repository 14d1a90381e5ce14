//! HTTP implementation of SessionApi
//!
//! Talks JSON to the router backend with reqwest. Non-success statuses and
//! bodies that are not the expected JSON are both reported as errors; nothing
//! is retried here.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{ApiError, SessionApi};
use crate::config::ServerConfig;
use crate::domain::{SessionId, StatusSnapshot};

#[derive(Debug, Serialize)]
struct CreateSessionRequest<'a> {
    prompt: &'a str,
}

/// Minimum contract of the creation response; other fields are ignored
#[derive(Debug, Deserialize)]
struct CreateSessionResponse {
    session_id: SessionId,
}

/// Router backend client
#[derive(Debug, Clone)]
pub struct HttpSessionApi {
    base_url: Url,
    http: Client,
}

impl HttpSessionApi {
    /// Create a client for the backend at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        debug!(%base_url, ?timeout, "HttpSessionApi::new: called");
        let base_url = Url::parse(base_url).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(format!("{} cannot be used as a base URL", base_url)));
        }

        let http = Client::builder().timeout(timeout).build().map_err(ApiError::Network)?;

        Ok(Self { base_url, http })
    }

    /// Create a client from the `server` configuration section
    pub fn from_config(config: &ServerConfig) -> Result<Self, ApiError> {
        Self::new(&config.base_url, Duration::from_millis(config.timeout_ms))
    }

    /// Append path segments to the base URL, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ApiError::InvalidUrl(format!("{} cannot be used as a base URL", self.base_url)))?;
            path.pop_if_empty().extend(segments);
        }
        debug!(%url, "endpoint: built");
        Ok(url)
    }

    /// Turn a response into `T`, treating non-2xx statuses as errors
    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(status = %status.as_u16(), "decode: non-success response");
            let message = if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("Unknown status").to_string()
            } else {
                body
            };
            return Err(ApiError::Http {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl SessionApi for HttpSessionApi {
    async fn create_session(&self, prompt: &str) -> Result<SessionId, ApiError> {
        debug!(prompt_len = prompt.len(), "create_session: called");
        let url = self.endpoint(&["api", "prompt"])?;

        let response = self.http.post(url).json(&CreateSessionRequest { prompt }).send().await?;
        let created: CreateSessionResponse = Self::decode(response).await?;

        debug!(session_id = %created.session_id, "create_session: session created");
        Ok(created.session_id)
    }

    async fn fetch_status(&self, session_id: &SessionId) -> Result<StatusSnapshot, ApiError> {
        debug!(%session_id, "fetch_status: called");
        let url = self.endpoint(&["api", "status", session_id.as_str()])?;

        let response = self.http.get(url).send().await?;
        let snapshot: StatusSnapshot = Self::decode(response).await?;

        debug!(%session_id, status = %snapshot.status, "fetch_status: received snapshot");
        Ok(snapshot)
    }
}
