//! Router backend client
//!
//! Provides the session creation and status retrieval calls the controller
//! is built on.

mod api;
mod error;
mod http;

pub use api::SessionApi;
#[cfg(test)]
pub use api::mock;
pub use error::ApiError;
pub use http::HttpSessionApi;
