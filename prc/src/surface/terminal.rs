//! Coloured terminal surface
//!
//! A terminal cannot redraw earlier output in place, so each region is
//! printed again whenever its content changes and never when it does not.

use std::collections::BTreeMap;
use std::io::{self, Write};

use colored::Colorize;
use tracing::{debug, warn};

use super::{SubmitState, Surface};
use crate::view::{CATEGORIES_HEADING, Region, RegionContent};

pub struct TerminalSurface<W: Write> {
    out: W,
    shown: BTreeMap<Region, RegionContent>,
    status_line: Option<String>,
    submit_state: SubmitState,
}

impl TerminalSurface<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            shown: BTreeMap::new(),
            status_line: None,
            submit_state: SubmitState::default(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{}", text).and_then(|_| self.out.flush()) {
            warn!(error = %e, "TerminalSurface::emit: write failed");
        }
    }

    /// Only the parsing region carries error messages; answers that happen
    /// to start with "Error" are ordinary text.
    fn is_error(region: Region, content: &RegionContent) -> bool {
        matches!(content, RegionContent::Text(text) if region == Region::Parsing && text.starts_with("Error:"))
    }

    fn format_region(region: Region, content: &RegionContent) -> String {
        let mut out = format!("{}\n", format!("[{}]", region.title()).bold().cyan());
        match content {
            RegionContent::Text(text) if Self::is_error(region, content) => {
                out.push_str(&text.red().to_string());
            }
            RegionContent::Text(text) => out.push_str(text),
            RegionContent::Categories(lines) => {
                out.push_str(&format!("{}\n", CATEGORIES_HEADING.bold()));
                let rendered: Vec<String> = lines
                    .iter()
                    .map(|line| {
                        let verdict = if line.applicable {
                            line.verdict().green()
                        } else {
                            line.verdict().dimmed()
                        };
                        format!("  {}: {}", line.name.bold(), verdict)
                    })
                    .collect();
                out.push_str(&rendered.join("\n"));
            }
        }
        out
    }
}

impl<W: Write> Surface for TerminalSurface<W> {
    fn clear_regions(&mut self) {
        self.shown.clear();
    }

    fn set_region(&mut self, region: Region, content: RegionContent) {
        if self.shown.get(&region) == Some(&content) {
            return;
        }
        if !content.is_empty() {
            debug!(?region, "TerminalSurface::set_region: printing");
            let text = Self::format_region(region, &content);
            self.emit(&text);
        }
        self.shown.insert(region, content);
    }

    fn show_results(&mut self) {
        let rule = "─".repeat(40);
        self.emit(&rule.dimmed().to_string());
    }

    fn status_line(&self) -> Option<&str> {
        self.status_line.as_deref()
    }

    fn replace_status_line(&mut self, text: String) {
        let line = format!("{} {}", "»".yellow(), text.yellow());
        self.emit(&line);
        self.status_line = Some(text);
    }

    fn clear_status_line(&mut self) {
        self.status_line = None;
    }

    fn set_submit_state(&mut self, state: SubmitState) {
        if self.submit_state == state {
            return;
        }
        debug!(?state, "TerminalSurface::set_submit_state: changed");
        let marker = format!("[{}]", state.label());
        let marker = if state.is_enabled() { marker.green() } else { marker.dimmed() };
        self.emit(&marker.to_string());
        self.submit_state = state;
    }
}
