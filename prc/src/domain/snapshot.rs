//! Status snapshots returned by `GET /api/status/{session_id}`

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{PipelineStatus, SessionId};

/// Point-in-time view of one session's pipeline progress
///
/// The client never mutates a snapshot; it only renders the latest one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,

    pub status: PipelineStatus,

    /// Category name to `"Not Applicable"` or descriptive text, in server order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsed_categories: Option<Map<String, Value>>,

    /// Category name to the structured prompt generated for it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_prompts: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responses: Option<CategoryResponses>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combined_response: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StatusSnapshot {
    /// Create a bare snapshot carrying only a status
    pub fn new(status: PipelineStatus) -> Self {
        Self {
            session_id: None,
            status,
            parsed_categories: None,
            generated_prompts: None,
            responses: None,
            combined_response: None,
            error: None,
        }
    }
}

/// The categories the router has a dedicated LLM for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseCategory {
    GeneralKnowledge,
    Mathematics,
    Coding,
    Literature,
}

impl ResponseCategory {
    pub const ALL: [ResponseCategory; 4] = [
        ResponseCategory::GeneralKnowledge,
        ResponseCategory::Mathematics,
        ResponseCategory::Coding,
        ResponseCategory::Literature,
    ];
}

/// Per-category LLM output; unknown keys are ignored
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryResponses {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub general_knowledge: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mathematics: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coding: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub literature: Option<String>,
}

impl CategoryResponses {
    pub fn get(&self, category: ResponseCategory) -> Option<&str> {
        match category {
            ResponseCategory::GeneralKnowledge => self.general_knowledge.as_deref(),
            ResponseCategory::Mathematics => self.mathematics.as_deref(),
            ResponseCategory::Coding => self.coding.as_deref(),
            ResponseCategory::Literature => self.literature.as_deref(),
        }
    }
}
