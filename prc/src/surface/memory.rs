//! In-memory surface
//!
//! Records what would be on screen. Used by tests and by anything that
//! wants the rendered state without a terminal.

use std::collections::BTreeMap;

use super::{SubmitState, Surface};
use crate::view::{Region, RegionContent};

#[derive(Debug, Default)]
pub struct MemorySurface {
    regions: BTreeMap<Region, RegionContent>,
    status_line: Option<String>,
    status_replacements: usize,
    results_visible: bool,
    submit_state: SubmitState,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn region(&self, region: Region) -> Option<&RegionContent> {
        self.regions.get(&region)
    }

    /// Plain text of a region; empty when never written
    pub fn region_text(&self, region: Region) -> String {
        self.regions
            .get(&region)
            .map(RegionContent::to_plain_text)
            .unwrap_or_default()
    }

    /// How many times the status line has been swapped out
    pub fn status_replacements(&self) -> usize {
        self.status_replacements
    }

    pub fn results_visible(&self) -> bool {
        self.results_visible
    }

    pub fn submit_state(&self) -> SubmitState {
        self.submit_state
    }
}

impl Surface for MemorySurface {
    fn clear_regions(&mut self) {
        self.regions.clear();
    }

    fn set_region(&mut self, region: Region, content: RegionContent) {
        self.regions.insert(region, content);
    }

    fn show_results(&mut self) {
        self.results_visible = true;
    }

    fn status_line(&self) -> Option<&str> {
        self.status_line.as_deref()
    }

    fn replace_status_line(&mut self, text: String) {
        self.status_line = Some(text);
        self.status_replacements += 1;
    }

    fn clear_status_line(&mut self) {
        self.status_line = None;
    }

    fn set_submit_state(&mut self, state: SubmitState) {
        self.submit_state = state;
    }
}
