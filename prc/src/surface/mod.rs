//! Output surfaces
//!
//! A surface is the side-effecting half of rendering: it owns the output
//! regions, the single transient status line and the submit control. The
//! controller computes a [`ViewUpdate`] and hands it to [`apply_update`].

mod memory;
mod terminal;

pub use memory::MemorySurface;
pub use terminal::TerminalSurface;

use tracing::debug;

use crate::view::{Region, RegionContent, ViewUpdate};

/// State of the submit control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitState {
    /// Accepting prompts
    #[default]
    Ready,
    /// Disabled while a session is processed
    Processing,
}

impl SubmitState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Ready => "Submit Prompt",
            Self::Processing => "Processing...",
        }
    }

    pub fn is_enabled(self) -> bool {
        self == Self::Ready
    }
}

/// Something the controller renders into
pub trait Surface {
    /// Empty every output region
    fn clear_regions(&mut self);

    /// Overwrite one region's content
    fn set_region(&mut self, region: Region, content: RegionContent);

    /// Reveal the results panel
    fn show_results(&mut self);

    /// Text of the status line currently shown, if any
    fn status_line(&self) -> Option<&str>;

    /// Remove the current status line and show `text` in its place
    fn replace_status_line(&mut self, text: String);

    /// Remove the status line entirely
    fn clear_status_line(&mut self);

    fn set_submit_state(&mut self, state: SubmitState);
}

/// Write a planned update to a surface
///
/// The status line is only replaced when its text actually changes, so
/// applying the same update twice leaves the surface untouched the second
/// time.
pub fn apply_update<S: Surface + ?Sized>(surface: &mut S, update: ViewUpdate) {
    debug!(
        region_count = update.regions.len(),
        status_line = ?update.status_line,
        "apply_update: called"
    );
    for (region, content) in update.regions {
        surface.set_region(region, content);
    }

    if let Some(text) = update.status_line {
        if surface.status_line() != Some(text.as_str()) {
            debug!(%text, "apply_update: status line changed");
            surface.replace_status_line(text);
        }
    }
}
