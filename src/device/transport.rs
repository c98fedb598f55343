use async_trait::async_trait;

use crate::device::types::DeviceError;

/// A live link to the plotter. Each call suspends until the device acknowledges.
#[async_trait]
pub trait DeviceHandle: Send {
    async fn move_to(&mut self, x: f64, y: f64) -> Result<(), DeviceError>;

    /// Drives the pen servo to a raw pulse level.
    async fn set_pen(&mut self, level: u16) -> Result<(), DeviceError>;

    async fn close(&mut self) -> Result<(), DeviceError>;

    /// Human readable description of the link (port name, etc).
    fn describe(&self) -> String;
}

/// Abstraction over how a device link is obtained. Mocked in tests.
#[async_trait]
pub trait DeviceTransport: Send + Sync {
    /// Ask the host (and usually the user) for a device link.
    async fn request_connection(&self) -> Result<Box<dyn DeviceHandle>, DeviceError>;
}

/// Lets the user pick one of several candidate ports.
///
/// Returning `None` means the user declined to choose.
pub trait PortSelector: Send + Sync {
    fn select(&self, candidates: &[String]) -> Option<String>;
}
