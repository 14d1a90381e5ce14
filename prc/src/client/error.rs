//! Router API error types

use thiserror::Error;

/// Errors that can occur while talking to the router backend
///
/// All of these are transport errors from the session's point of view:
/// the client surfaces them and gives up on the session without retrying.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("API error {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),

    #[error("JSON deserialization error: {0}")]
    Json(#[from] serde_json::Error),
}
