//! Configuration type definitions.

use super::enums::PipelineMode;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Plotter link and servo settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DeviceConfig {
    /// Serial port path (e.g. "/dev/ttyACM0"). Leave unset to choose interactively
    #[serde(default)]
    pub port: Option<String>,

    /// Serial baud rate
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    /// How long to wait for the device to acknowledge a command (valid range: 100 - 60000)
    #[serde(default = "default_command_timeout_ms")]
    pub command_timeout_ms: u64,

    /// Servo pulse that lifts the pen (valid range: 500 - 2500)
    #[serde(default = "default_pen_up_pulse")]
    pub pen_up_pulse: u16,

    /// Servo pulse that lowers the pen (valid range: 500 - 2500)
    #[serde(default = "default_pen_down_pulse")]
    pub pen_down_pulse: u16,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: default_baud_rate(),
            command_timeout_ms: default_command_timeout_ms(),
            pen_up_pulse: default_pen_up_pulse(),
            pen_down_pulse: default_pen_down_pulse(),
        }
    }
}

/// Drawable area and draw timing.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DrawingConfig {
    /// Width artwork is fitted into, in millimeters (valid range: 10.0 - 1000.0)
    #[serde(default = "default_fit_size")]
    pub width: f64,

    /// Height artwork is fitted into, in millimeters (valid range: 10.0 - 1000.0)
    #[serde(default = "default_fit_size")]
    pub height: f64,

    /// Plotter Y extent the vertical axis is flipped against (valid range: 10.0 - 1000.0)
    /// Larger than `height` leaves a `draw_height - height` margin
    #[serde(default = "default_draw_height")]
    pub draw_height: f64,

    /// Keep the artwork's aspect ratio when fitting it to the drawable area
    #[serde(default = "default_true")]
    pub preserve_aspect: bool,

    /// Flip the vertical axis (SVG Y grows downward, the plotter's grows upward)
    #[serde(default = "default_true")]
    pub flip_y: bool,

    /// Pause after lowering the pen, in milliseconds (valid range: 0 - 5000)
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Pause after lifting the pen between strokes, in milliseconds (valid range: 0 - 5000)
    #[serde(default = "default_stroke_delay_ms")]
    pub stroke_delay_ms: u64,

    /// Try to lift the pen when a draw fails part-way
    #[serde(default = "default_true")]
    pub lift_pen_on_failure: bool,

    /// Curve flattening tolerance in SVG units (valid range: 0.01 - 5.0)
    #[serde(default = "default_flatten_tolerance")]
    pub flatten_tolerance: f32,
}

impl Default for DrawingConfig {
    fn default() -> Self {
        Self {
            width: default_fit_size(),
            height: default_fit_size(),
            draw_height: default_draw_height(),
            preserve_aspect: true,
            flip_y: true,
            settle_delay_ms: default_settle_delay_ms(),
            stroke_delay_ms: default_stroke_delay_ms(),
            lift_pen_on_failure: true,
            flatten_tolerance: default_flatten_tolerance(),
        }
    }
}

/// Capture-to-draw workflow settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PipelineSettings {
    /// "direct" sends the snapshot straight to art generation,
    /// "two-step" recognizes text first and lets you edit it
    #[serde(default)]
    pub mode: PipelineMode,

    /// Count down before taking the snapshot
    #[serde(default = "default_true")]
    pub countdown: bool,

    /// Countdown length in seconds (valid range: 1 - 60)
    #[serde(default = "default_countdown_seconds")]
    pub countdown_seconds: u32,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            mode: PipelineMode::default(),
            countdown: true,
            countdown_seconds: default_countdown_seconds(),
        }
    }
}

/// Compute backend endpoints and request parameters.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RemoteConfig {
    /// Base URL of the compute backend
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Text to art endpoint
    #[serde(default = "default_synthesize_path")]
    pub synthesize_path: String,

    /// Image to art endpoint (direct mode)
    #[serde(default = "default_image_to_art_path")]
    pub image_to_art_path: String,

    /// Image to text endpoint (two-step mode)
    #[serde(default = "default_image_to_text_path")]
    pub image_to_text_path: String,

    /// Handwriting sample upload endpoint
    #[serde(default = "default_sample_path")]
    pub sample_path: String,

    /// Username forwarded with direct-mode snapshots and handwriting samples
    #[serde(default)]
    pub username: Option<String>,

    /// Line width sent with snapshot uploads (valid range: 1 - 500)
    #[serde(default = "default_image_line_width")]
    pub image_line_width: u32,

    /// Handwriting synthesis bias
    #[serde(default = "default_synthesis_bias")]
    pub synthesis_bias: f64,

    /// Handwriting synthesis style index
    #[serde(default)]
    pub synthesis_style: u32,

    /// Line width used for synthesized text (valid range: 1 - 500)
    #[serde(default = "default_synthesis_line_width")]
    pub synthesis_line_width: u32,

    /// Request timeout in seconds (valid range: 1 - 600)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            synthesize_path: default_synthesize_path(),
            image_to_art_path: default_image_to_art_path(),
            image_to_text_path: default_image_to_text_path(),
            sample_path: default_sample_path(),
            username: None,
            image_line_width: default_image_line_width(),
            synthesis_bias: default_synthesis_bias(),
            synthesis_style: 0,
            synthesis_line_width: default_synthesis_line_width(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Where snapshots come from and whether they are kept.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CaptureConfig {
    /// Command that writes one camera frame to stdout
    #[serde(default = "default_capture_command")]
    pub command: Vec<String>,

    /// Use this image file instead of running the capture command
    #[serde(default)]
    pub still_image: Option<String>,

    /// Directory to archive every snapshot in (unset = don't archive)
    #[serde(default)]
    pub archive_dir: Option<String>,

    /// Archive filename template (chrono format specifiers)
    #[serde(default = "default_filename_template")]
    pub filename_template: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            command: default_capture_command(),
            still_image: None,
            archive_dir: None,
            filename_template: default_filename_template(),
        }
    }
}

/// Handwriting sample collection.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SamplerConfig {
    /// Default transcription sent with uploaded samples
    #[serde(default = "default_sampler_prompt")]
    pub prompt: String,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            prompt: default_sampler_prompt(),
        }
    }
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_true() -> bool {
    true
}

fn default_baud_rate() -> u32 {
    115_200
}

fn default_command_timeout_ms() -> u64 {
    2_000
}

fn default_pen_up_pulse() -> u16 {
    1000
}

fn default_pen_down_pulse() -> u16 {
    1700
}

fn default_fit_size() -> f64 {
    100.0
}

fn default_draw_height() -> f64 {
    125.0
}

fn default_settle_delay_ms() -> u64 {
    100
}

fn default_stroke_delay_ms() -> u64 {
    150
}

fn default_flatten_tolerance() -> f32 {
    0.1
}

fn default_countdown_seconds() -> u32 {
    5
}

pub(crate) fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_synthesize_path() -> String {
    "/synthesize".to_string()
}

fn default_image_to_art_path() -> String {
    "/one-and-done".to_string()
}

fn default_image_to_text_path() -> String {
    "/solve".to_string()
}

fn default_sample_path() -> String {
    "/save-handwriting-sample".to_string()
}

fn default_image_line_width() -> u32 {
    52
}

fn default_synthesis_bias() -> f64 {
    1.0
}

fn default_synthesis_line_width() -> u32 {
    70
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_capture_command() -> Vec<String> {
    ["fswebcam", "--no-banner", "--png", "-1", "-"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_filename_template() -> String {
    "snapshot_%Y-%m-%d_%H%M%S".to_string()
}

fn default_sampler_prompt() -> String {
    "two-twenty carried, for him".to_string()
}
