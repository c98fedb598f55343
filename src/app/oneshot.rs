//! Single-action commands that run without the interactive session.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};

use crate::app::selector::SessionPortSelector;
use crate::config::Config;
use crate::device::{
    ConnectionManager, DrawSequencer, DrawSettings, SerialSettings, SerialTransport,
    serial::available_port_names,
};
use crate::geometry::LyonGeometryEngine;
use crate::pipeline::{DrawTarget, draw_svg};
use crate::remote::{HandwritingSample, HttpRemoteClient, RemoteClient, StrokePoint, normalize_svg};

/// Reads a sample file: a JSON array of strokes, each an array of `{x, y, t}`.
pub fn load_sample(
    path: &Path,
    username: Option<String>,
    transcription: Option<String>,
    config: &Config,
) -> Result<HandwritingSample> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read sample from {}", path.display()))?;
    let strokes: Vec<Vec<StrokePoint>> = serde_json::from_str(&data)
        .with_context(|| format!("Failed to parse strokes in {}", path.display()))?;

    if strokes.iter().all(Vec::is_empty) {
        bail!("Sample {} contains no points", path.display());
    }

    Ok(HandwritingSample {
        username: username
            .or_else(|| config.remote.username.clone())
            .unwrap_or_else(|| "anonymous".to_string()),
        transcription: transcription.unwrap_or_else(|| config.sampler.prompt.clone()),
        strokes,
    })
}

pub async fn upload_sample_file(
    config: &Config,
    path: &Path,
    username: Option<String>,
    transcription: Option<String>,
) -> Result<()> {
    let sample = load_sample(path, username, transcription, config)?;
    let client = HttpRemoteClient::new(&config.remote)?;
    client
        .upload_sample(&sample)
        .await
        .context("Failed to upload handwriting sample")?;
    println!(
        "Uploaded sample '{}' ({} strokes)",
        sample.transcription,
        sample.strokes.len()
    );
    Ok(())
}

/// Connect, draw one SVG file and disconnect again.
///
/// With `normalize` the file is treated as backend output and its sizing
/// `<rect>` is applied and removed first.
pub async fn draw_svg_file(
    config: &Config,
    path: &Path,
    port: Option<String>,
    normalize: bool,
) -> Result<()> {
    let svg = fs::read_to_string(path)
        .with_context(|| format!("Failed to read SVG from {}", path.display()))?;
    let svg = if normalize {
        normalize_svg(&svg).with_context(|| format!("Failed to normalize {}", path.display()))?
    } else {
        svg
    };

    let selector = Arc::new(SessionPortSelector::new(port));
    let transport = SerialTransport::new(SerialSettings::from_config(&config.device), selector);
    let connection = ConnectionManager::new(Arc::new(transport));
    connection
        .connect()
        .await
        .context("Failed to connect to the plotter")?;

    let geometry = LyonGeometryEngine::new(config.drawing.flatten_tolerance);
    let sequencer = DrawSequencer::new(DrawSettings::from_config(config));
    let result = draw_svg(
        &geometry,
        DrawTarget::from_config(&config.drawing),
        &sequencer,
        &connection,
        &svg,
    )
    .await;

    connection.disconnect().await;
    result.with_context(|| format!("Failed to draw {}", path.display()))?;
    println!("Drew {}", path.display());
    Ok(())
}

pub fn print_ports() -> Result<()> {
    let ports = available_port_names().context("Failed to enumerate serial ports")?;
    if ports.is_empty() {
        println!("No serial ports found");
    }
    for (index, name) in ports.iter().enumerate() {
        println!("{}) {}", index + 1, name);
    }
    Ok(())
}
