//! Pipeline status reported by the router backend

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stage of a session's pipeline as reported by the server
///
/// The client drives no transitions itself; it only decides whether a
/// reported status is terminal. Strings the client does not recognise are
/// kept verbatim in `Other` so they can still be logged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PipelineStatus {
    Parsing,
    GeneratingPrompts,
    RoutingToLlms,
    CombiningResponses,
    Completed,
    Error,
    /// The backend has no record of the session id
    NotFound,
    Other(String),
}

impl PipelineStatus {
    /// Wire representation of the status
    pub fn as_str(&self) -> &str {
        match self {
            Self::Parsing => "parsing",
            Self::GeneratingPrompts => "generating_prompts",
            Self::RoutingToLlms => "routing_to_llms",
            Self::CombiningResponses => "combining_responses",
            Self::Completed => "completed",
            Self::Error => "error",
            Self::NotFound => "not_found",
            Self::Other(s) => s,
        }
    }

    /// Whether polling stops once this status is observed
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error | Self::NotFound)
    }
}

impl From<String> for PipelineStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "parsing" => Self::Parsing,
            "generating_prompts" => Self::GeneratingPrompts,
            "routing_to_llms" => Self::RoutingToLlms,
            "combining_responses" => Self::CombiningResponses,
            "completed" => Self::Completed,
            "error" => Self::Error,
            "not_found" => Self::NotFound,
            _ => Self::Other(s),
        }
    }
}

impl From<PipelineStatus> for String {
    fn from(status: PipelineStatus) -> Self {
        match status {
            PipelineStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
