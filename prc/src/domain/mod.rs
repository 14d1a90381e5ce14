//! Domain types for the prompt router client
//!
//! Wire types exchanged with the router backend: the opaque session id,
//! the pipeline status, and the status snapshot returned by each poll.

mod id;
mod snapshot;
mod status;

pub use id::SessionId;
pub use snapshot::{CategoryResponses, ResponseCategory, StatusSnapshot};
pub use status::PipelineStatus;
