use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::capture::{dependencies::ImageSource, types::CaptureError};

/// Runs an external program that writes one frame to stdout (`fswebcam ... -`).
pub struct CommandImageSource {
    program: String,
    args: Vec<String>,
}

impl CommandImageSource {
    pub fn new(program: String, args: Vec<String>) -> Self {
        Self { program, args }
    }
}

#[async_trait]
impl ImageSource for CommandImageSource {
    async fn capture(&self) -> Result<Vec<u8>, CaptureError> {
        log::debug!("Running capture command: {} {:?}", self.program, self.args);

        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                CaptureError::CommandFailed(format!("Failed to run {}: {}", self.program, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CaptureError::CommandFailed(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        if output.stdout.is_empty() {
            return Err(CaptureError::CommandFailed(format!(
                "{} produced no image data",
                self.program
            )));
        }

        Ok(output.stdout)
    }

    fn describe(&self) -> String {
        format!("command '{}'", self.program)
    }
}

/// Reads the same image file on every capture.
pub struct StillImageSource {
    path: PathBuf,
}

impl StillImageSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl ImageSource for StillImageSource {
    async fn capture(&self) -> Result<Vec<u8>, CaptureError> {
        log::debug!("Reading still image from {}", self.path.display());
        Ok(tokio::fs::read(&self.path).await?)
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}
