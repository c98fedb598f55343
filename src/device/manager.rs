use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard, watch};

use crate::device::{
    transport::{DeviceHandle, DeviceTransport},
    types::{ConnectionState, DeviceError},
};

/// The one slot holding the live device link, if any.
pub(crate) enum ConnectionSlot {
    Disconnected,
    Connected(Box<dyn DeviceHandle>),
}

/// Owns the single logical connection to the plotter.
///
/// Every draw and every connect/disconnect goes through the same async mutex,
/// so a disconnect can never interleave with in-flight motion commands.
#[derive(Clone)]
pub struct ConnectionManager {
    transport: Arc<dyn DeviceTransport>,
    slot: Arc<Mutex<ConnectionSlot>>,
    state_tx: Arc<watch::Sender<ConnectionState>>,
}

/// Exclusive access to the connection for the duration of one operation.
pub struct ConnectionGuard<'a> {
    slot: MutexGuard<'a, ConnectionSlot>,
}

impl ConnectionGuard<'_> {
    /// The live handle, or `None` while disconnected.
    pub fn handle_mut(&mut self) -> Option<&mut Box<dyn DeviceHandle>> {
        match &mut *self.slot {
            ConnectionSlot::Connected(handle) => Some(handle),
            ConnectionSlot::Disconnected => None,
        }
    }
}

impl ConnectionManager {
    pub fn new(transport: Arc<dyn DeviceTransport>) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            transport,
            slot: Arc::new(Mutex::new(ConnectionSlot::Disconnected)),
            state_tx: Arc::new(state_tx),
        }
    }

    /// Request a device link. An existing link is closed first.
    pub async fn connect(&self) -> Result<(), DeviceError> {
        let mut slot = self.slot.lock().await;
        if matches!(*slot, ConnectionSlot::Connected(_)) {
            log::info!("Already connected; closing existing link before reconnecting");
            self.close_slot(&mut slot).await;
        }

        self.publish(ConnectionState::Connecting);
        match self.transport.request_connection().await {
            Ok(handle) => {
                log::info!("Connected to plotter: {}", handle.describe());
                *slot = ConnectionSlot::Connected(handle);
                self.publish(ConnectionState::Connected);
                Ok(())
            }
            Err(err) => {
                log::warn!("Plotter connection failed: {}", err);
                *slot = ConnectionSlot::Disconnected;
                self.publish(ConnectionState::Disconnected);
                Err(err)
            }
        }
    }

    /// Close the link. Safe to call while already disconnected; close errors are
    /// logged and the manager always ends up `Disconnected`.
    pub async fn disconnect(&self) {
        let mut slot = self.slot.lock().await;
        if matches!(*slot, ConnectionSlot::Disconnected) {
            log::debug!("Disconnect requested while already disconnected");
            self.publish(ConnectionState::Disconnected);
            return;
        }
        self.close_slot(&mut slot).await;
    }

    /// Exclusive access for one logical operation (usually a full draw).
    pub async fn lock(&self) -> ConnectionGuard<'_> {
        ConnectionGuard {
            slot: self.slot.lock().await,
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    /// Watch connection state changes.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    async fn close_slot(&self, slot: &mut MutexGuard<'_, ConnectionSlot>) {
        if let ConnectionSlot::Connected(mut handle) =
            std::mem::replace(&mut **slot, ConnectionSlot::Disconnected)
        {
            let description = handle.describe();
            match handle.close().await {
                Ok(()) => log::info!("Disconnected from plotter: {}", description),
                Err(err) => log::error!("Error while closing {}: {}", description, err),
            }
        }
        self.publish(ConnectionState::Disconnected);
    }

    fn publish(&self, state: ConnectionState) {
        self.state_tx.send_replace(state);
    }
}
