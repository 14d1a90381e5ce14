//! Pure mapping from a status snapshot to region updates

use std::fmt;

use serde_json::{Map, Value};
use tracing::debug;

use super::{Region, RegionContent, StatusLabels, UNKNOWN_ERROR};
use crate::domain::{PipelineStatus, ResponseCategory, StatusSnapshot};

/// Marker value the backend uses for categories that do not apply
pub const NOT_APPLICABLE: &str = "Not Applicable";

/// Heading printed above the parsed-categories listing
pub const CATEGORIES_HEADING: &str = "Parsed Categories:";

/// One line of the parsed-categories listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryLine {
    /// Display name, e.g. "General Knowledge"
    pub name: String,
    pub applicable: bool,
}

impl CategoryLine {
    pub fn verdict(&self) -> &'static str {
        if self.applicable { "Applicable" } else { NOT_APPLICABLE }
    }
}

impl fmt::Display for CategoryLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.verdict())
    }
}

/// Knobs that change what a snapshot renders to
#[derive(Debug, Clone, Default)]
pub struct ViewOptions {
    pub labels: StatusLabels,
    pub show_generated_prompts: bool,
}

/// Everything one snapshot asks the surface to show
///
/// Regions not listed keep whatever they showed before.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewUpdate {
    pub regions: Vec<(Region, RegionContent)>,
    /// Transient status line; `None` leaves the current one alone
    pub status_line: Option<String>,
}

impl ViewUpdate {
    /// Content planned for a region, if any
    pub fn region(&self, region: Region) -> Option<&RegionContent> {
        self.regions.iter().find(|(r, _)| *r == region).map(|(_, content)| content)
    }
}

/// Turn `general_knowledge` into `General Knowledge`
///
/// Underscores become spaces and every letter that starts a word is
/// upper-cased; the rest of each word is left as is.
pub fn format_category_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut at_word_start = true;
    for c in name.chars() {
        let c = if c == '_' { ' ' } else { c };
        if at_word_start && c.is_alphanumeric() {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = !c.is_alphanumeric();
    }
    out
}

/// Build the category listing, keeping the server's order
fn category_lines(categories: &Map<String, Value>) -> Vec<CategoryLine> {
    categories
        .iter()
        .map(|(name, value)| CategoryLine {
            name: format_category_name(name),
            applicable: value.as_str() != Some(NOT_APPLICABLE),
        })
        .collect()
}

fn generated_prompts_text(prompts: &Map<String, Value>) -> String {
    prompts
        .iter()
        .map(|(name, prompt)| {
            let prompt = match prompt {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            format!("{}:\n{}", format_category_name(name), prompt)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn parsing_content(snapshot: &StatusSnapshot, options: &ViewOptions) -> Option<RegionContent> {
    match (&snapshot.status, &snapshot.parsed_categories) {
        (PipelineStatus::Error, _) => {
            let message = snapshot.error.as_deref().unwrap_or(UNKNOWN_ERROR);
            Some(RegionContent::Text(format!("Error: {}", message)))
        }
        (PipelineStatus::NotFound, _) => Some(RegionContent::text("Error: session not found")),
        (PipelineStatus::Parsing, None) => Some(RegionContent::Text(options.labels.parsing_placeholder())),
        (_, Some(categories)) => Some(RegionContent::Categories(category_lines(categories))),
        (_, None) => None,
    }
}

/// Map a snapshot to the updates it implies
///
/// Pure and deterministic: the same snapshot always yields the same update.
pub fn plan_update(snapshot: &StatusSnapshot, options: &ViewOptions) -> ViewUpdate {
    debug!(status = %snapshot.status, "plan_update: called");
    let mut regions = Vec::new();

    if let Some(content) = parsing_content(snapshot, options) {
        regions.push((Region::Parsing, content));
    }

    if let Some(responses) = &snapshot.responses {
        for category in ResponseCategory::ALL {
            match responses.get(category) {
                Some(text) if !text.is_empty() => {
                    regions.push((Region::for_category(category), RegionContent::text(text)));
                }
                _ => {}
            }
        }
    }

    if let Some(combined) = &snapshot.combined_response {
        regions.push((Region::Combined, RegionContent::text(combined.as_str())));
    }

    if options.show_generated_prompts {
        if let Some(prompts) = snapshot.generated_prompts.as_ref().filter(|p| !p.is_empty()) {
            regions.push((Region::GeneratedPrompts, RegionContent::Text(generated_prompts_text(prompts))));
        }
    }

    ViewUpdate {
        regions,
        status_line: options.labels.label_for(snapshot),
    }
}
