//! Live connections and their outbound queues.
//!
//! Every socket has exactly one writer task, draining the queue registered
//! here. Anything that wants to write to a connection (responses, event
//! notifications) goes through that queue.

use crate::domain::connection::ConnectionId;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::debug;

/// Why a frame could not be queued
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    #[error("connection {0} is not registered")]
    NotConnected(ConnectionId),

    #[error("outbound queue for {0} is full")]
    QueueFull(ConnectionId),

    #[error("connection {0} is closing")]
    Closed(ConnectionId),
}

/// Map of live connections to their outbound queues
#[derive(Default)]
pub struct ConnectionHub {
    connections: DashMap<ConnectionId, mpsc::Sender<String>>,
}

impl ConnectionHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, id: ConnectionId, outbound: mpsc::Sender<String>) {
        self.connections.insert(id, outbound);
        debug!(connection_id = %id, "Connection registered");
    }

    /// Returns whether the connection was registered.
    pub fn remove(&self, id: &ConnectionId) -> bool {
        let removed = self.connections.remove(id).is_some();
        if removed {
            debug!(connection_id = %id, "Connection removed");
        }
        removed
    }

    /// Queue a frame without waiting. A full queue drops the frame.
    pub fn send(&self, id: &ConnectionId, frame: String) -> Result<(), DeliveryError> {
        // Clone the sender out so no map shard lock is held while sending.
        let outbound = self
            .connections
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or(DeliveryError::NotConnected(*id))?;

        outbound.try_send(frame).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DeliveryError::QueueFull(*id),
            mpsc::error::TrySendError::Closed(_) => DeliveryError::Closed(*id),
        })
    }

    #[must_use]
    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.connections.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}
