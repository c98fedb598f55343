//! Archiving snapshots to disk.

use super::types::CaptureError;
use crate::config::CaptureConfig;
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};

/// Where and how archived snapshots are named.
#[derive(Debug, Clone)]
pub struct ArchiveConfig {
    pub directory: PathBuf,
    /// Filename template (supports chrono format specifiers).
    pub filename_template: String,
}

impl ArchiveConfig {
    /// `None` when archiving is disabled.
    pub fn from_config(config: &CaptureConfig) -> Option<Self> {
        let directory = config.archive_dir.as_deref()?.trim();
        if directory.is_empty() {
            return None;
        }
        Some(Self {
            directory: expand_tilde(directory),
            filename_template: config.filename_template.clone(),
        })
    }
}

/// Generate a `.png` filename from the template and the current time.
pub fn generate_filename(template: &str) -> String {
    let now = Local::now();
    format!("{}.png", now.format(template))
}

/// Ensure the archive directory exists, creating it if necessary.
pub fn ensure_directory_exists(directory: &Path) -> Result<PathBuf, CaptureError> {
    if !directory.exists() {
        log::info!("Creating snapshot directory: {}", directory.display());
        fs::create_dir_all(directory)?;
    }

    let canonical = directory
        .canonicalize()
        .unwrap_or_else(|_| directory.to_path_buf());

    Ok(canonical)
}

/// Write PNG bytes into the archive directory.
///
/// Two snapshots in the same second would share a name, so a numeric suffix is
/// appended until the path is free.
pub fn archive_snapshot(png: &[u8], config: &ArchiveConfig) -> Result<PathBuf, CaptureError> {
    let directory = ensure_directory_exists(&config.directory)?;
    let filename = generate_filename(&config.filename_template);

    let mut file_path = directory.join(&filename);
    let stem = filename.trim_end_matches(".png").to_string();
    let mut suffix = 1;
    while file_path.exists() {
        file_path = directory.join(format!("{}-{}.png", stem, suffix));
        suffix += 1;
    }

    fs::write(&file_path, png)?;
    log::info!(
        "Archived snapshot to {} ({} bytes)",
        file_path.display(),
        png.len()
    );

    Ok(file_path)
}

/// Expand tilde (~) in path strings.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(stripped);
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn generated_names_are_png() {
        let filename = generate_filename("snap_%Y%m%d");
        assert!(filename.starts_with("snap_2"));
        assert!(filename.ends_with(".png"));
    }

    #[test]
    fn expand_tilde_leaves_absolute_paths() {
        let expanded = expand_tilde("~/Pictures");
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert_eq!(expand_tilde("/srv/snaps"), PathBuf::from("/srv/snaps"));
    }

    #[test]
    fn archive_disabled_without_directory() {
        let mut config = CaptureConfig::default();
        assert!(ArchiveConfig::from_config(&config).is_none());
        config.archive_dir = Some("   ".to_string());
        assert!(ArchiveConfig::from_config(&config).is_none());
    }

    #[test]
    fn archive_creates_directory_and_avoids_collisions() {
        let temp = TempDir::new().unwrap();
        let config = ArchiveConfig {
            directory: temp.path().join("snaps"),
            filename_template: "fixed".to_string(),
        };

        let first = archive_snapshot(b"one", &config).unwrap();
        let second = archive_snapshot(b"two", &config).unwrap();

        assert_ne!(first, second);
        assert!(first.ends_with("fixed.png"));
        assert!(second.ends_with("fixed-1.png"));
        assert_eq!(fs::read(second).unwrap(), b"two");
    }
}
