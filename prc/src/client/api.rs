//! SessionApi trait definition

use async_trait::async_trait;
#[allow(unused_imports)]
use tracing::debug;

use super::ApiError;
use crate::domain::{SessionId, StatusSnapshot};

/// The two endpoints of the router backend the client depends on
///
/// Each call is independent; the implementation keeps no session state.
#[async_trait]
pub trait SessionApi: Send + Sync {
    /// `POST /api/prompt` - create a session for the prompt
    async fn create_session(&self, prompt: &str) -> Result<SessionId, ApiError>;

    /// `GET /api/status/{session_id}` - fetch the session's latest snapshot
    async fn fetch_status(&self, session_id: &SessionId) -> Result<StatusSnapshot, ApiError>;
}
