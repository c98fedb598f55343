//! Plotter connection and drawing.
//!
//! This module provides:
//! - The single-connection lifecycle (`ConnectionManager`)
//! - The pen-up/move/pen-down draw sequence (`DrawSequencer`)
//! - A framed serial transport for real hardware

pub mod frame;
pub mod serial;
pub mod types;

mod manager;
mod sequencer;
mod transport;

#[cfg(test)]
pub(crate) mod mock;

pub use manager::{ConnectionGuard, ConnectionManager};
pub use sequencer::{DrawSequencer, DrawSettings};
pub use serial::{SerialSettings, SerialTransport};
pub use transport::{DeviceHandle, DeviceTransport, PortSelector};
pub use types::{ConnectionState, DeviceError, DrawCommand, DrawError, PenState};
