//! Connection gateway
//!
//! Bridges transport events (accept, frame, error, close) into the router.
//! The gateway never tears a connection down itself: a bad frame or a
//! rejected command is logged and dropped, and the connection stays open.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::connection::Outbound;
use crate::error::RelayError;
use crate::protocol::ClientMessage;
use crate::registry::SessionRegistry;
use crate::router::{CommandRouter, ConnectionState, PendingSession};

/// How a connection's session ID is derived at accept time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdentityStrategy {
    /// Fresh random UUID per connection
    #[default]
    Generated,
    /// The client's `Sec-WebSocket-Key` handshake header. Not guaranteed
    /// unique; a collision is rejected at login.
    HandshakeKey,
}

impl fmt::Display for IdentityStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityStrategy::Generated => write!(f, "generated"),
            IdentityStrategy::HandshakeKey => write!(f, "handshake-key"),
        }
    }
}

impl FromStr for IdentityStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "generated" => Ok(IdentityStrategy::Generated),
            "handshake-key" => Ok(IdentityStrategy::HandshakeKey),
            other => Err(format!(
                "unknown identity strategy '{}' (expected generated or handshake-key)",
                other
            )),
        }
    }
}

/// Metadata captured from the transport handshake
#[derive(Debug, Clone, Default)]
pub struct Handshake {
    /// Value of the `Sec-WebSocket-Key` request header
    pub websocket_key: Option<String>,
}

/// Entry point for transport-level connection events
#[derive(Clone)]
pub struct Gateway {
    router: CommandRouter,
    identity: IdentityStrategy,
}

impl Gateway {
    pub fn new(registry: SessionRegistry, identity: IdentityStrategy) -> Self {
        Self {
            router: CommandRouter::new(registry),
            identity,
        }
    }

    pub fn registry(&self) -> &SessionRegistry {
        self.router.registry()
    }

    pub fn identity(&self) -> IdentityStrategy {
        self.identity
    }

    /// Accept a connection. The returned session is not registered until
    /// the client logs in.
    pub fn on_connect(&self, handshake: &Handshake, outbound: Outbound) -> PendingSession {
        let session_id = match (self.identity, &handshake.websocket_key) {
            (IdentityStrategy::HandshakeKey, Some(key)) => key.clone(),
            _ => Uuid::new_v4().to_string(),
        };
        info!(
            session_id = %session_id,
            connection_id = %outbound.id(),
            "New connection"
        );
        PendingSession::new(session_id, outbound)
    }

    /// Handle one inbound frame.
    ///
    /// Errors are logged here and also returned so the transport can count
    /// them; none of them should close the connection.
    pub async fn on_message(
        &self,
        conn: &mut PendingSession,
        raw: &[u8],
    ) -> Result<(), RelayError> {
        if conn.state() == ConnectionState::Closed {
            debug!(session_id = %conn.session_id(), "Frame after close dropped");
            return Ok(());
        }

        let msg = match ClientMessage::parse(raw) {
            Ok(msg) => msg,
            Err(e) => {
                warn!(session_id = %conn.session_id(), "Dropping frame: {}", e);
                return Err(e.into());
            }
        };

        let result = self.router.dispatch(conn, msg).await;
        if let Err(e) = &result {
            if e.is_ignorable() {
                debug!(session_id = %conn.session_id(), "Ignoring command: {}", e);
            } else {
                warn!(session_id = %conn.session_id(), "Command failed: {}", e);
            }
        }
        result
    }

    /// Report a transport error. Cleanup happens in [`Gateway::on_close`].
    pub fn on_error(&self, conn: &PendingSession, err: &dyn std::error::Error) {
        warn!(session_id = %conn.session_id(), "Connection error: {}", err);
    }

    /// Handle the connection going away. Runs at most once per connection.
    pub async fn on_close(&self, conn: &mut PendingSession, reason: Option<&str>) {
        if conn.state() == ConnectionState::Closed {
            return;
        }
        info!(
            session_id = %conn.session_id(),
            reason = reason.unwrap_or(""),
            "Disconnected"
        );
        self.router.logout(conn).await;
        conn.mark_closed();
    }
}
