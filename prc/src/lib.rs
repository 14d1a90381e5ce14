//! promptrouter - client for the multi-LLM prompt router
//!
//! The router backend takes a free-text prompt, splits it into categories,
//! sends each applicable category to a specialised LLM and combines the
//! answers. This crate is the client side: it submits the prompt, polls the
//! session the backend creates and renders progress as it arrives.
//!
//! # Modules
//!
//! - [`domain`] - Wire types: session ids, pipeline status, snapshots
//! - [`client`] - `SessionApi` trait and its reqwest implementation
//! - [`view`] - Pure snapshot to view mapping
//! - [`surface`] - Where rendered output goes (terminal, memory)
//! - [`controller`] - Submit / poll / render lifecycle
//! - [`repl`] - Interactive prompt loop
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod client;
pub mod config;
pub mod controller;
pub mod domain;
pub mod repl;
pub mod surface;
pub mod view;

// Re-export commonly used types
pub use client::{ApiError, HttpSessionApi, SessionApi};
pub use config::Config;
pub use controller::{ControllerOptions, PollOutcome, SessionController, SessionError, SubmitError};
pub use domain::{PipelineStatus, SessionId, StatusSnapshot};
pub use surface::{MemorySurface, Surface, TerminalSurface};
pub use view::{StatusLabels, ViewOptions, ViewUpdate, plan_update};
