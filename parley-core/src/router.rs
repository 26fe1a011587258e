//! Command router and per-connection protocol state machine
//!
//! ```text
//!                  request-login
//!  Unauthenticated ─────────────▶ Authenticated
//!        ▲    │   ◀─────────────       │
//!        │    │   request-logout       │
//!        │    └──────────┬─────────────┘
//!        │               ▼ close
//!        └──────────   Closed
//! ```
//!
//! Commands that arrive in the wrong state are rejected with
//! [`ProtocolError::InvalidStateTransition`]; the gateway treats that as a
//! silent no-op, no envelope goes back to the client.

use chrono::Utc;
use tracing::{debug, instrument, warn};

use crate::connection::{ConnectionId, Outbound};
use crate::error::{ProtocolError, RelayError};
use crate::protocol::{ClientMessage, ServerMessage};
use crate::registry::SessionRegistry;

/// Protocol state of one connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Connected, no session registered yet
    Unauthenticated,
    /// Session registered under the connection's session ID
    Authenticated,
    /// Transport closed; no further commands are processed
    Closed,
}

/// A connection as the router sees it: provisional identity, send handle
/// and protocol state. Created on accept, before any login.
#[derive(Debug)]
pub struct PendingSession {
    session_id: String,
    outbound: Outbound,
    state: ConnectionState,
}

impl PendingSession {
    pub fn new(session_id: String, outbound: Outbound) -> Self {
        Self {
            session_id,
            outbound,
            state: ConnectionState::Unauthenticated,
        }
    }

    /// Session ID this connection registers under at login
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.outbound.id()
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub(crate) fn mark_closed(&mut self) {
        self.state = ConnectionState::Closed;
    }

    fn reply(&self, msg: ServerMessage) {
        if let Err(e) = self.outbound.send(msg) {
            warn!(session_id = %self.session_id, "Reply dropped: {}", e);
        }
    }
}

/// Routes decoded commands to their handlers
#[derive(Clone)]
pub struct CommandRouter {
    registry: SessionRegistry,
}

impl CommandRouter {
    pub fn new(registry: SessionRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Run one command to completion for `conn`
    #[instrument(
        name = "router::dispatch",
        skip_all,
        fields(session_id = %conn.session_id, cmd = msg.command())
    )]
    pub async fn dispatch(
        &self,
        conn: &mut PendingSession,
        msg: ClientMessage,
    ) -> Result<(), RelayError> {
        use ConnectionState::{Authenticated, Unauthenticated};

        match (conn.state, msg) {
            (_, ClientMessage::Unknown) => Err(ProtocolError::UnknownCommand.into()),
            (Unauthenticated, ClientMessage::RequestLogin { username }) => {
                self.login(conn, username).await
            }
            (Authenticated, ClientMessage::RequestLogout) => {
                self.logout(conn).await;
                Ok(())
            }
            (Authenticated, ClientMessage::RequestRename { username }) => {
                self.rename(conn, username).await
            }
            (Authenticated, ClientMessage::FetchClients) => {
                self.fetch_clients(conn).await;
                Ok(())
            }
            (Authenticated, ClientMessage::SendText { receiver, text }) => {
                self.send_text(conn, receiver, text).await;
                Ok(())
            }
            (state, msg) => Err(ProtocolError::InvalidStateTransition {
                command: msg.command(),
                state,
            }
            .into()),
        }
    }

    async fn login(&self, conn: &mut PendingSession, username: String) -> Result<(), RelayError> {
        let mut directory = self.registry.lock().await;
        directory.register(
            conn.session_id.clone(),
            username.clone(),
            conn.outbound.clone(),
        )?;
        conn.state = ConnectionState::Authenticated;

        conn.reply(ServerMessage::LoginSucceeded {
            session_id: conn.session_id.clone(),
        });
        directory.broadcast(
            &conn.session_id,
            &ServerMessage::SomeoneEntered {
                session_id: conn.session_id.clone(),
                username,
            },
        );
        Ok(())
    }

    /// Tear down whatever session is bound to `conn` and announce it.
    ///
    /// Safe to call repeatedly: only the call that actually removes the
    /// session broadcasts `someone-left`. Returns whether a session was
    /// removed.
    pub async fn logout(&self, conn: &mut PendingSession) -> bool {
        if conn.state == ConnectionState::Authenticated {
            conn.state = ConnectionState::Unauthenticated;
        }

        let mut directory = self.registry.lock().await;
        let Some(session_id) = directory
            .find_by_connection(conn.connection_id())
            .map(str::to_string)
        else {
            return false;
        };
        directory.unregister(&session_id);

        directory.broadcast(
            &session_id,
            &ServerMessage::SomeoneLeft {
                session_id: session_id.clone(),
            },
        );
        true
    }

    async fn rename(&self, conn: &PendingSession, username: String) -> Result<(), RelayError> {
        let mut directory = self.registry.lock().await;
        directory.rename(&conn.session_id, username.clone())?;
        directory.broadcast(
            &conn.session_id,
            &ServerMessage::SomeoneRenamed {
                session_id: conn.session_id.clone(),
                username,
            },
        );
        Ok(())
    }

    async fn fetch_clients(&self, conn: &PendingSession) {
        let clients = self.registry.list_excluding(&conn.session_id).await;
        conn.reply(ServerMessage::ClientsArrived { clients });
    }

    async fn send_text(&self, conn: &PendingSession, receiver: String, text: String) {
        let time = Utc::now().timestamp_millis();

        conn.reply(ServerMessage::SendText {
            receiver: receiver.clone(),
            text: text.clone(),
            time,
        });

        let delivered = self
            .registry
            .deliver(
                &receiver,
                ServerMessage::ReceiveText {
                    sender: conn.session_id.clone(),
                    text,
                    time,
                },
            )
            .await;
        if !delivered {
            debug!(receiver = %receiver, "Text receiver not registered");
        }
    }
}
