use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;

use crate::capture::{
    camera::{CommandImageSource, StillImageSource},
    file::{self, ArchiveConfig},
    types::CaptureError,
};
use crate::config::CaptureConfig;

/// Where snapshot bytes come from. Any format the `image` crate can decode is accepted.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn capture(&self) -> Result<Vec<u8>, CaptureError>;

    fn describe(&self) -> String;
}

/// Abstraction over archiving snapshots to disk.
pub trait SnapshotArchiver: Send + Sync {
    fn archive(&self, png: &[u8], config: &ArchiveConfig) -> Result<PathBuf, CaptureError>;
}

/// Bundle of dependencies used when taking a snapshot. Each component can be mocked in tests.
#[derive(Clone)]
pub struct CaptureDependencies {
    pub source: Arc<dyn ImageSource>,
    pub archiver: Arc<dyn SnapshotArchiver>,
}

impl CaptureDependencies {
    /// A still image wins over the capture command when both are configured.
    pub fn from_config(config: &CaptureConfig) -> Result<Self, CaptureError> {
        let source: Arc<dyn ImageSource> = if let Some(path) = config.still_image.as_deref() {
            Arc::new(StillImageSource::new(file::expand_tilde(path)))
        } else if let Some((program, args)) = config.command.split_first() {
            Arc::new(CommandImageSource::new(program.clone(), args.to_vec()))
        } else {
            return Err(CaptureError::NoSource);
        };

        Ok(Self {
            source,
            archiver: Arc::new(DefaultArchiver),
        })
    }
}

struct DefaultArchiver;

impl SnapshotArchiver for DefaultArchiver {
    fn archive(&self, png: &[u8], config: &ArchiveConfig) -> Result<PathBuf, CaptureError> {
        file::archive_snapshot(png, config)
    }
}
