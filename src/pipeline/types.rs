//! Data types for the capture-to-draw pipeline.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::capture::CaptureError;
use crate::config::{Config, PipelineMode};
use crate::device::DrawError;
use crate::geometry::GeometryError;
use crate::remote::RemoteError;

/// Where the pipeline currently is.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PipelinePhase {
    #[default]
    Idle,
    /// Seconds left before the snapshot.
    CountingDown(u32),
    Capturing,
    AwaitingRemote,
    /// Recognized text waiting to be reviewed and committed.
    AwaitingEdit(String),
    Drawing,
    /// Human-readable reason; cleared only by an explicit dismiss.
    Failed(String),
}

impl fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelinePhase::Idle => write!(f, "idle"),
            PipelinePhase::CountingDown(remaining) => write!(f, "counting down ({})", remaining),
            PipelinePhase::Capturing => write!(f, "capturing"),
            PipelinePhase::AwaitingRemote => write!(f, "waiting for backend"),
            PipelinePhase::AwaitingEdit(text) => write!(f, "awaiting edit: {:?}", text),
            PipelinePhase::Drawing => write!(f, "drawing"),
            PipelinePhase::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Triggers accepted by the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    /// Start a run from a snapshot (countdown first, if enabled).
    BeginCapture,
    /// Abort a countdown or abandon recognized text.
    Cancel,
    /// Start a run from typed text.
    SubmitText(String),
    /// Accept the (possibly edited) recognized text.
    Commit(String),
    /// Clear a failure.
    Dismiss,
    /// Mode for the next run; the current run keeps its own.
    SetMode(PipelineMode),
    /// The user is leaving; stop any countdown.
    LeaveSession,
}

/// Variants of the workflow, fixed for the duration of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub mode: PipelineMode,
    pub has_countdown: bool,
    pub countdown_from: u32,
    pub tick: Duration,
    pub draw_flip_y: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            mode: PipelineMode::Direct,
            has_countdown: true,
            countdown_from: 5,
            tick: Duration::from_secs(1),
            draw_flip_y: true,
        }
    }
}

impl PipelineConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            mode: config.pipeline.mode,
            has_countdown: config.pipeline.countdown,
            countdown_from: config.pipeline.countdown_seconds.max(1),
            draw_flip_y: config.drawing.flip_y,
            ..Self::default()
        }
    }
}

/// Errors that end a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("Could not read artwork: {0}")]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Draw(#[from] DrawError),

    #[error("Pipeline is not running")]
    NotRunning,
}
