//! Human-readable status labels

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{PipelineStatus, StatusSnapshot};

/// Placeholder substituted with the server's error message
pub const ERROR_PLACEHOLDER: &str = "{error}";

/// Shown when an `error` snapshot carries no message
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Lookup table from wire status name to the status line shown for it
///
/// Statuses without an entry produce no status line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusLabels(BTreeMap<String, String>);

impl Default for StatusLabels {
    fn default() -> Self {
        let labels = [
            (PipelineStatus::Parsing, "Analyzing prompt..."),
            (
                PipelineStatus::GeneratingPrompts,
                "Generating optimized prompts for each category...",
            ),
            (PipelineStatus::RoutingToLlms, "Sending prompts to specialized LLMs..."),
            (PipelineStatus::CombiningResponses, "Combining responses..."),
            (PipelineStatus::Completed, "Processing complete!"),
            (PipelineStatus::Error, "Error: {error}"),
            (PipelineStatus::NotFound, "Error: session not found"),
        ];

        Self(
            labels
                .into_iter()
                .map(|(status, label)| (status.as_str().to_string(), label.to_string()))
                .collect(),
        )
    }
}

impl StatusLabels {
    /// Default table with `overrides` replacing individual entries
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> Self {
        let mut labels = Self::default();
        for (status, label) in overrides {
            labels.0.insert(status.clone(), label.clone());
        }
        labels
    }

    /// Raw label for a status, placeholders unresolved
    pub fn get(&self, status: &PipelineStatus) -> Option<&str> {
        self.0.get(status.as_str()).map(String::as_str)
    }

    /// Status line for a snapshot, with `{error}` resolved
    pub fn label_for(&self, snapshot: &StatusSnapshot) -> Option<String> {
        let label = self.get(&snapshot.status)?;
        let message = snapshot.error.as_deref().unwrap_or(UNKNOWN_ERROR);
        Some(label.replace(ERROR_PLACEHOLDER, message))
    }

    /// Text written into the parsing region while the prompt is analysed
    pub fn parsing_placeholder(&self) -> String {
        self.get(&PipelineStatus::Parsing)
            .unwrap_or("Analyzing prompt...")
            .to_string()
    }
}
