//! Data types for the plotter connection and draw commands.

use std::time::Duration;

use thiserror::Error;

use crate::geometry::Point;

/// Whether the pen is touching the paper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PenState {
    /// Lifted for travel, leaves no mark.
    Up,
    /// Lowered onto the paper.
    Down,
}

/// Lifecycle of the single device connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    /// A link has been requested and the user or transport has not answered yet.
    Connecting,
    Connected,
}

/// One step of the draw stream sent to the device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
    SetPen(PenState),
    MoveTo(Point),
    /// Pause without talking to the device.
    Hold(Duration),
}

/// Errors raised by a device transport or handle.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("No compatible device transport is available")]
    TransportUnavailable,

    #[error("Device selection cancelled by user")]
    UserCancelled,

    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("Device I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Device did not acknowledge '{command}' within {timeout_ms} ms")]
    Timeout { command: String, timeout_ms: u64 },

    #[error("Device protocol error: {0}")]
    Protocol(String),
}

/// Errors returned by the draw sequencer.
#[derive(Debug, Error)]
pub enum DrawError {
    #[error("Plotter is not connected")]
    NotConnected,

    #[error("Device command failed: {0}")]
    DeviceCommandFailed(#[source] DeviceError),
}
