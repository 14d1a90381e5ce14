//! Snapshot to view mapping
//!
//! Everything here is pure: a snapshot goes in, a `ViewUpdate` describing
//! what each output region should show comes out. Writing that update to a
//! terminal (or anything else) is the job of [`crate::surface`].

mod labels;
mod plan;

pub use labels::{ERROR_PLACEHOLDER, StatusLabels, UNKNOWN_ERROR};
pub use plan::{
    CATEGORIES_HEADING, CategoryLine, NOT_APPLICABLE, ViewOptions, ViewUpdate, format_category_name, plan_update,
};

use crate::domain::ResponseCategory;

/// Named output areas of a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Region {
    /// Prompt analysis: placeholder, parsed categories or errors
    Parsing,
    GeneralKnowledge,
    Mathematics,
    Coding,
    Literature,
    /// Final synthesized answer
    Combined,
    /// Per-category prompts the backend generated
    GeneratedPrompts,
}

impl Region {
    pub fn title(self) -> &'static str {
        match self {
            Self::Parsing => "Prompt Analysis",
            Self::GeneralKnowledge => "General Knowledge",
            Self::Mathematics => "Mathematics",
            Self::Coding => "Coding",
            Self::Literature => "Literature",
            Self::Combined => "Combined Response",
            Self::GeneratedPrompts => "Generated Prompts",
        }
    }

    /// Region a category's LLM response is written to
    pub fn for_category(category: ResponseCategory) -> Self {
        match category {
            ResponseCategory::GeneralKnowledge => Self::GeneralKnowledge,
            ResponseCategory::Mathematics => Self::Mathematics,
            ResponseCategory::Coding => Self::Coding,
            ResponseCategory::Literature => Self::Literature,
        }
    }
}

/// What a region displays
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionContent {
    Text(String),
    /// The parsed-categories listing, rendered under [`CATEGORIES_HEADING`]
    Categories(Vec<CategoryLine>),
}

impl Default for RegionContent {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl RegionContent {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Categories(_) => false,
        }
    }

    /// Unstyled rendering, one category per line
    pub fn to_plain_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Categories(lines) => {
                let mut out = format!("{}\n\n", CATEGORIES_HEADING);
                for line in lines {
                    out.push_str(&line.to_string());
                    out.push('\n');
                }
                out
            }
        }
    }
}
