use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::device::{
    transport::{DeviceHandle, DeviceTransport},
    types::DeviceError,
};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DeviceCall {
    MoveTo(f64, f64),
    SetPen(u16),
    Close,
}

/// Shared recording of every call made to handles produced by [`MockTransport`].
#[derive(Clone, Default)]
pub(crate) struct CallLog(Arc<Mutex<Vec<DeviceCall>>>);

impl CallLog {
    pub fn calls(&self) -> Vec<DeviceCall> {
        self.0.lock().unwrap().clone()
    }

    fn push(&self, call: DeviceCall) -> usize {
        let mut calls = self.0.lock().unwrap();
        calls.push(call);
        calls.len()
    }
}

#[derive(Clone, Default)]
pub(crate) struct MockTransport {
    pub log: CallLog,
    /// Error returned by the next `request_connection` call.
    pub connect_error: Arc<Mutex<Option<DeviceError>>>,
    /// 1-based index of the motion/pen call that should fail.
    pub fail_on_call: Option<usize>,
    pub fail_close: bool,
    pub connections: Arc<Mutex<usize>>,
}

impl MockTransport {
    pub fn failing_at(call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            ..Self::default()
        }
    }

    pub fn connection_count(&self) -> usize {
        *self.connections.lock().unwrap()
    }
}

#[async_trait]
impl DeviceTransport for MockTransport {
    async fn request_connection(&self) -> Result<Box<dyn DeviceHandle>, DeviceError> {
        if let Some(err) = self.connect_error.lock().unwrap().take() {
            return Err(err);
        }
        let mut connections = self.connections.lock().unwrap();
        *connections += 1;
        Ok(Box::new(MockHandle {
            id: *connections,
            log: self.log.clone(),
            fail_on_call: self.fail_on_call,
            fail_close: self.fail_close,
        }))
    }
}

pub(crate) struct MockHandle {
    id: usize,
    log: CallLog,
    fail_on_call: Option<usize>,
    fail_close: bool,
}

impl MockHandle {
    fn record(&self, call: DeviceCall) -> Result<(), DeviceError> {
        let count = self.log.push(call);
        if self.fail_on_call == Some(count) {
            Err(DeviceError::Protocol("mock device rejected command".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DeviceHandle for MockHandle {
    async fn move_to(&mut self, x: f64, y: f64) -> Result<(), DeviceError> {
        self.record(DeviceCall::MoveTo(x, y))
    }

    async fn set_pen(&mut self, level: u16) -> Result<(), DeviceError> {
        self.record(DeviceCall::SetPen(level))
    }

    async fn close(&mut self) -> Result<(), DeviceError> {
        self.log.push(DeviceCall::Close);
        if self.fail_close {
            Err(DeviceError::Io(std::io::Error::other("close failed")))
        } else {
            Ok(())
        }
    }

    fn describe(&self) -> String {
        format!("mock-{}", self.id)
    }
}
