//! Request and response bodies exchanged with the compute backend.

use serde::{Deserialize, Serialize};

use crate::config::RemoteConfig;

/// JSON body for text to art.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextToArtRequest {
    pub text: String,
    pub bias: f64,
    pub style: u32,
    pub line_width: u32,
}

/// Returned by both art endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ArtResponse {
    pub svg: String,
}

/// Returned by image to text.
#[derive(Debug, Clone, Deserialize)]
pub struct TextResponse {
    pub result: String,
}

/// One captured pen sample; `t` is milliseconds since the stroke set began.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokePoint {
    pub x: f64,
    pub y: f64,
    pub t: u64,
}

/// A handwriting sample forwarded to the backend's sample store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandwritingSample {
    pub username: String,
    pub transcription: String,
    pub strokes: Vec<Vec<StrokePoint>>,
}

impl HandwritingSample {
    pub fn point_count(&self) -> usize {
        self.strokes.iter().map(Vec::len).sum()
    }
}

/// Rendering parameters sent along with text to art.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthesisParams {
    pub bias: f64,
    pub style: u32,
    pub line_width: u32,
}

impl SynthesisParams {
    pub fn from_config(config: &RemoteConfig) -> Self {
        Self {
            bias: config.synthesis_bias,
            style: config.synthesis_style,
            line_width: config.synthesis_line_width,
        }
    }
}

impl Default for SynthesisParams {
    fn default() -> Self {
        Self {
            bias: 1.0,
            style: 0,
            line_width: 70,
        }
    }
}
