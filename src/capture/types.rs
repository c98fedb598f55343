//! Data types for snapshot capture.

use std::path::PathBuf;
use thiserror::Error;

/// File name the backend expects for uploaded snapshots.
pub const SNAPSHOT_FILE_NAME: &str = "snapshot.png";

/// A captured frame ready to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    /// Encoded image bytes (always PNG).
    pub bytes: Vec<u8>,
    pub mime: &'static str,
    pub file_name: &'static str,
}

impl ImagePayload {
    pub fn png(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            mime: "image/png",
            file_name: SNAPSHOT_FILE_NAME,
        }
    }
}

/// Result of one snapshot.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub payload: ImagePayload,
    /// Where the snapshot was archived, if archiving is enabled and succeeded.
    pub archived_path: Option<PathBuf>,
}

/// Errors that can occur while taking a snapshot.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("No image source configured")]
    NoSource,

    #[error("Capture command failed: {0}")]
    CommandFailed(String),

    #[error("Failed to read or archive snapshot: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    Image(String),
}

impl From<image::ImageError> for CaptureError {
    fn from(err: image::ImageError) -> Self {
        CaptureError::Image(err.to_string())
    }
}
