//! Per-connection outbound handle

use std::fmt;

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::error::DeliveryError;
use crate::protocol::ServerMessage;

/// Identity of one accepted transport connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Sending half of a connection.
///
/// Sends never wait: envelopes are queued for the transport's writer task,
/// so a slow peer cannot hold up the sender.
#[derive(Debug, Clone)]
pub struct Outbound {
    id: ConnectionId,
    tx: mpsc::UnboundedSender<ServerMessage>,
}

impl Outbound {
    /// Create a handle plus the receiver the transport drains
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ServerMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let outbound = Self {
            id: ConnectionId::new(),
            tx,
        };
        (outbound, rx)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queue an envelope for this connection
    pub fn send(&self, msg: ServerMessage) -> Result<(), DeliveryError> {
        self.tx
            .send(msg)
            .map_err(|_| DeliveryError::ConnectionClosed(self.id))
    }
}
