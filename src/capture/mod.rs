//! Snapshot capture for the photo booth.
//!
//! This module provides:
//! - Image sources (an external capture command or a still file)
//! - PNG encoding of whatever the source produced
//! - Optional archiving of every snapshot

pub mod file;
pub mod types;

mod camera;
mod dependencies;
mod snapshot;
#[cfg(test)]
mod tests;

pub use camera::{CommandImageSource, StillImageSource};
pub use dependencies::{CaptureDependencies, ImageSource, SnapshotArchiver};
pub use file::ArchiveConfig;
pub use snapshot::{Camera, encode_png};
pub use types::{CaptureError, ImagePayload, Snapshot};

use crate::config::CaptureConfig;

impl Camera {
    /// Camera wired to the configured source and archive directory.
    pub fn from_config(config: &CaptureConfig) -> Result<Self, CaptureError> {
        Ok(Self::new(
            CaptureDependencies::from_config(config)?,
            ArchiveConfig::from_config(config),
        ))
    }
}
