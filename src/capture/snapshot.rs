use std::io::Cursor;
use std::sync::Arc;

use image::ImageFormat;
use tokio::task;

use crate::capture::{
    dependencies::{CaptureDependencies, SnapshotArchiver},
    file::ArchiveConfig,
    types::{CaptureError, ImagePayload, Snapshot},
};

/// Re-encodes arbitrary image bytes as PNG. PNG input is validated and passed through.
pub fn encode_png(bytes: &[u8]) -> Result<Vec<u8>, CaptureError> {
    let format = image::guess_format(bytes)?;
    if format == ImageFormat::Png {
        image::load_from_memory_with_format(bytes, ImageFormat::Png)?;
        return Ok(bytes.to_vec());
    }

    log::debug!("Converting {:?} snapshot to PNG", format);
    let decoded = image::load_from_memory_with_format(bytes, format)?;
    let mut encoded = Cursor::new(Vec::new());
    decoded.write_to(&mut encoded, ImageFormat::Png)?;
    Ok(encoded.into_inner())
}

/// Takes snapshots from the configured source, optionally archiving each one.
#[derive(Clone)]
pub struct Camera {
    dependencies: Arc<CaptureDependencies>,
    archive: Option<ArchiveConfig>,
}

impl Camera {
    pub fn new(dependencies: CaptureDependencies, archive: Option<ArchiveConfig>) -> Self {
        Self {
            dependencies: Arc::new(dependencies),
            archive,
        }
    }

    /// Capture one frame and encode it for upload.
    ///
    /// Archive failures are logged; the snapshot is still returned.
    pub async fn snapshot(&self) -> Result<Snapshot, CaptureError> {
        log::info!(
            "Taking snapshot from {}",
            self.dependencies.source.describe()
        );

        let raw = self.dependencies.source.capture().await?;
        log::debug!("Captured {} bytes", raw.len());

        let png = task::spawn_blocking(move || encode_png(&raw))
            .await
            .map_err(|e| CaptureError::Image(format!("Encode task failed: {}", e)))??;

        let archived_path = match self.archive.clone() {
            Some(config) => {
                match archive(Arc::clone(&self.dependencies.archiver), png.clone(), config).await {
                    Ok(path) => Some(path),
                    Err(err) => {
                        log::warn!("Failed to archive snapshot: {}", err);
                        None
                    }
                }
            }
            None => None,
        };

        Ok(Snapshot {
            payload: ImagePayload::png(png),
            archived_path,
        })
    }
}

async fn archive(
    archiver: Arc<dyn SnapshotArchiver>,
    png: Vec<u8>,
    config: ArchiveConfig,
) -> Result<std::path::PathBuf, CaptureError> {
    task::spawn_blocking(move || archiver.archive(&png, &config))
        .await
        .map_err(|e| CaptureError::Image(format!("Archive task failed: {}", e)))?
}
