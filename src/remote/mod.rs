//! Client for the compute backend that produces line art.
//!
//! This module provides:
//! - Request/response bodies for the four backend endpoints
//! - The `RemoteClient` seam and its HTTP implementation
//! - Normalization of returned SVG before it is converted to polylines

pub mod types;

mod client;
mod normalize;
#[cfg(test)]
mod tests;

pub use client::{HttpRemoteClient, RemoteClient};
pub use normalize::normalize_svg;
pub use types::{HandwritingSample, StrokePoint, SynthesisParams};

use thiserror::Error;

/// Errors from talking to the compute backend.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Remote request failed: {0}")]
    RequestFailed(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}
