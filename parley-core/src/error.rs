//! Error types for parley-core

use thiserror::Error;

use crate::connection::ConnectionId;
use crate::router::ConnectionState;

/// Top-level error type for parley-core
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Errors raised by the session registry
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Session already registered: {0}")]
    DuplicateSession(String),

    #[error("Session not found: {0}")]
    NotFound(String),
}

/// Errors raised while interpreting inbound envelopes
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(#[from] serde_json::Error),

    #[error("Unknown command")]
    UnknownCommand,

    #[error("Command {command} not allowed in state {state:?}")]
    InvalidStateTransition {
        command: &'static str,
        state: ConnectionState,
    },
}

/// Errors raised when handing an envelope to a connection
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("Connection {0} is closed")]
    ConnectionClosed(ConnectionId),
}

impl RelayError {
    /// Whether this error is an expected protocol no-op rather than a fault
    pub fn is_ignorable(&self) -> bool {
        matches!(
            self,
            RelayError::Protocol(ProtocolError::UnknownCommand)
                | RelayError::Protocol(ProtocolError::InvalidStateTransition { .. })
        )
    }
}
