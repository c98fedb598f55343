use std::{
    io::Cursor,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

use super::{
    ArchiveConfig, Camera, CaptureDependencies, CaptureError, CommandImageSource, ImageSource,
    SnapshotArchiver, StillImageSource, encode_png,
};
use crate::config::CaptureConfig;

const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

fn sample_image(format: ImageFormat) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 6, Rgb([200, 40, 40])));
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, format).unwrap();
    buffer.into_inner()
}

#[derive(Clone)]
struct MockSource {
    data: Vec<u8>,
    error: Arc<Mutex<Option<CaptureError>>>,
    calls: Arc<Mutex<usize>>,
}

impl MockSource {
    fn returning(data: Vec<u8>) -> Self {
        Self {
            data,
            error: Arc::new(Mutex::new(None)),
            calls: Arc::new(Mutex::new(0)),
        }
    }
}

#[async_trait]
impl ImageSource for MockSource {
    async fn capture(&self) -> Result<Vec<u8>, CaptureError> {
        *self.calls.lock().unwrap() += 1;
        if let Some(err) = self.error.lock().unwrap().take() {
            Err(err)
        } else {
            Ok(self.data.clone())
        }
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}

#[derive(Clone, Default)]
struct MockArchiver {
    should_fail: bool,
    archived: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl SnapshotArchiver for MockArchiver {
    fn archive(&self, png: &[u8], config: &ArchiveConfig) -> Result<PathBuf, CaptureError> {
        if self.should_fail {
            return Err(CaptureError::Io(std::io::Error::other("disk full")));
        }
        self.archived.lock().unwrap().push(png.to_vec());
        Ok(config.directory.join("snap.png"))
    }
}

fn archive_config() -> ArchiveConfig {
    ArchiveConfig {
        directory: PathBuf::from("/archive"),
        filename_template: "snap".to_string(),
    }
}

#[test]
fn png_input_passes_through_unchanged() {
    let png = sample_image(ImageFormat::Png);
    assert_eq!(encode_png(&png).unwrap(), png);
}

#[test]
fn jpeg_input_is_converted_to_png() {
    let jpeg = sample_image(ImageFormat::Jpeg);
    let converted = encode_png(&jpeg).unwrap();
    assert_eq!(&converted[..8], &PNG_SIGNATURE);

    let decoded = image::load_from_memory(&converted).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (8, 6));
}

#[test]
fn garbage_is_rejected() {
    let err = encode_png(b"definitely not an image").unwrap_err();
    assert!(matches!(err, CaptureError::Image(_)));
}

#[tokio::test]
async fn snapshot_produces_named_png_payload() {
    let source = MockSource::returning(sample_image(ImageFormat::Jpeg));
    let camera = Camera::new(
        CaptureDependencies {
            source: Arc::new(source.clone()),
            archiver: Arc::new(MockArchiver::default()),
        },
        None,
    );

    let snapshot = camera.snapshot().await.unwrap();

    assert_eq!(snapshot.payload.file_name, "snapshot.png");
    assert_eq!(snapshot.payload.mime, "image/png");
    assert_eq!(&snapshot.payload.bytes[..8], &PNG_SIGNATURE);
    assert!(snapshot.archived_path.is_none());
    assert_eq!(*source.calls.lock().unwrap(), 1);
}

#[tokio::test]
async fn snapshot_is_archived_when_enabled() {
    let archiver = MockArchiver::default();
    let camera = Camera::new(
        CaptureDependencies {
            source: Arc::new(MockSource::returning(sample_image(ImageFormat::Png))),
            archiver: Arc::new(archiver.clone()),
        },
        Some(archive_config()),
    );

    let snapshot = camera.snapshot().await.unwrap();

    assert_eq!(snapshot.archived_path, Some(PathBuf::from("/archive/snap.png")));
    assert_eq!(archiver.archived.lock().unwrap()[0], snapshot.payload.bytes);
}

#[tokio::test]
async fn archive_failure_does_not_fail_snapshot() {
    let camera = Camera::new(
        CaptureDependencies {
            source: Arc::new(MockSource::returning(sample_image(ImageFormat::Png))),
            archiver: Arc::new(MockArchiver {
                should_fail: true,
                ..MockArchiver::default()
            }),
        },
        Some(archive_config()),
    );

    let snapshot = camera.snapshot().await.unwrap();
    assert!(snapshot.archived_path.is_none());
}

#[tokio::test]
async fn source_errors_propagate() {
    let source = MockSource::returning(Vec::new());
    *source.error.lock().unwrap() = Some(CaptureError::CommandFailed("no camera".into()));
    let camera = Camera::new(
        CaptureDependencies {
            source: Arc::new(source),
            archiver: Arc::new(MockArchiver::default()),
        },
        None,
    );

    let err = camera.snapshot().await.unwrap_err();
    assert!(err.to_string().contains("no camera"));
}

#[tokio::test]
async fn still_image_source_reads_file() {
    let temp = tempfile::TempDir::new().unwrap();
    let path = temp.path().join("still.png");
    std::fs::write(&path, sample_image(ImageFormat::Png)).unwrap();

    let bytes = StillImageSource::new(path).capture().await.unwrap();
    assert_eq!(&bytes[..8], &PNG_SIGNATURE);
}

#[cfg(unix)]
#[tokio::test]
async fn command_source_collects_stdout_and_reports_failures() {
    let temp = tempfile::TempDir::new().unwrap();
    let path = temp.path().join("frame.png");
    std::fs::write(&path, sample_image(ImageFormat::Png)).unwrap();

    let ok = CommandImageSource::new("cat".into(), vec![path.display().to_string()]);
    assert_eq!(&ok.capture().await.unwrap()[..8], &PNG_SIGNATURE);

    let failing = CommandImageSource::new("sh".into(), vec!["-c".into(), "exit 3".into()]);
    assert!(matches!(
        failing.capture().await,
        Err(CaptureError::CommandFailed(_))
    ));
}

#[test]
fn empty_command_without_still_image_has_no_source() {
    let config = CaptureConfig {
        command: Vec::new(),
        ..CaptureConfig::default()
    };
    assert!(matches!(
        CaptureDependencies::from_config(&config),
        Err(CaptureError::NoSource)
    ));
}
