//! Serial-port transport for the plotter.

use std::io::ErrorKind;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serialport::SerialPort;
use tokio::task;

use crate::config::DeviceConfig;
use crate::device::{
    frame::{self, DELIMITER, Frame},
    transport::{DeviceHandle, DeviceTransport, PortSelector},
    types::DeviceError,
};

/// Settings for opening a serial link.
#[derive(Debug, Clone)]
pub struct SerialSettings {
    /// Fixed port path; when `None` the user is asked to pick one.
    pub port: Option<String>,
    pub baud_rate: u32,
    pub ack_timeout: Duration,
}

impl SerialSettings {
    pub fn from_config(config: &DeviceConfig) -> Self {
        Self {
            port: config.port.clone().filter(|p| !p.trim().is_empty()),
            baud_rate: config.baud_rate,
            ack_timeout: Duration::from_millis(config.command_timeout_ms),
        }
    }
}

/// Opens serial links, asking a [`PortSelector`] which port to use.
pub struct SerialTransport {
    settings: SerialSettings,
    selector: Arc<dyn PortSelector>,
}

impl SerialTransport {
    pub fn new(settings: SerialSettings, selector: Arc<dyn PortSelector>) -> Self {
        Self { settings, selector }
    }
}

/// Names of the serial ports currently visible to the host.
pub fn available_port_names() -> Result<Vec<String>, DeviceError> {
    Ok(serialport::available_ports()?
        .into_iter()
        .map(|info| info.port_name)
        .collect())
}

#[async_trait]
impl DeviceTransport for SerialTransport {
    async fn request_connection(&self) -> Result<Box<dyn DeviceHandle>, DeviceError> {
        let settings = self.settings.clone();
        let selector = Arc::clone(&self.selector);

        task::spawn_blocking(move || -> Result<Box<dyn DeviceHandle>, DeviceError> {
            let port_name = match settings.port {
                Some(port) => port,
                None => {
                    let candidates = available_port_names().map_err(|err| {
                        log::warn!("Could not enumerate serial ports: {}", err);
                        DeviceError::TransportUnavailable
                    })?;
                    if candidates.is_empty() {
                        return Err(DeviceError::TransportUnavailable);
                    }
                    selector
                        .select(&candidates)
                        .ok_or(DeviceError::UserCancelled)?
                }
            };

            log::info!("Opening {} @{}", port_name, settings.baud_rate);
            let port = serialport::new(port_name.as_str(), settings.baud_rate)
                .timeout(Duration::from_millis(50))
                .open()?;

            Ok(Box::new(SerialHandle {
                name: port_name,
                port: Some(port),
                next_id: 0,
                ack_timeout: settings.ack_timeout,
            }))
        })
        .await
        .map_err(|e| DeviceError::Protocol(format!("Connect task failed: {}", e)))?
    }
}

/// A framed command link over an open serial port.
pub struct SerialHandle {
    name: String,
    port: Option<Box<dyn SerialPort>>,
    next_id: u8,
    ack_timeout: Duration,
}

impl SerialHandle {
    async fn send(&mut self, command: &str, payload: Vec<u8>) -> Result<(), DeviceError> {
        let mut port = self
            .port
            .take()
            .ok_or_else(|| DeviceError::Protocol("link is closed".to_string()))?;
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        let frame = Frame::new(command, payload, id);
        let timeout = self.ack_timeout;

        let (port, result) = task::spawn_blocking(move || {
            let result = exchange(port.as_mut(), &frame, timeout);
            (port, result)
        })
        .await
        .map_err(|e| DeviceError::Protocol(format!("Serial task failed: {}", e)))?;

        self.port = Some(port);
        result
    }
}

/// Writes `frame` and blocks until the device acknowledges its id.
fn exchange(
    port: &mut dyn SerialPort,
    frame: &Frame,
    timeout: Duration,
) -> Result<(), DeviceError> {
    port.write_all(&frame.encode()?)?;
    port.flush()?;

    let deadline = Instant::now() + timeout;
    let mut pending = Vec::new();
    let mut chunk = [0u8; 64];

    while Instant::now() < deadline {
        match port.read(&mut chunk) {
            Ok(0) => {}
            Ok(read) => {
                for &byte in &chunk[..read] {
                    if byte != DELIMITER {
                        pending.push(byte);
                        continue;
                    }
                    let reply = Frame::decode(&pending);
                    pending.clear();
                    match reply {
                        Ok(reply) if reply.id == frame.id => return Ok(()),
                        Ok(reply) => log::debug!("Ignoring reply {} for msg {}", reply.name, reply.id),
                        Err(err) => log::warn!("Discarding unreadable reply: {}", err),
                    }
                }
            }
            Err(err) if err.kind() == ErrorKind::TimedOut => {}
            Err(err) => return Err(err.into()),
        }
    }

    Err(DeviceError::Timeout {
        command: frame.name.clone(),
        timeout_ms: timeout.as_millis() as u64,
    })
}

#[async_trait]
impl DeviceHandle for SerialHandle {
    async fn move_to(&mut self, x: f64, y: f64) -> Result<(), DeviceError> {
        self.send("go", frame::move_payload(x, y)).await
    }

    async fn set_pen(&mut self, level: u16) -> Result<(), DeviceError> {
        self.send("servo", frame::servo_payload(level)).await
    }

    async fn close(&mut self) -> Result<(), DeviceError> {
        if let Some(port) = self.port.take() {
            port.clear(serialport::ClearBuffer::All)?;
            drop(port);
        }
        Ok(())
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}
