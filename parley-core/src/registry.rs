//! Session registry
//!
//! The registry is the single source of truth for who is logged in. It maps
//! session IDs to [`Session`]s in login order, which is also the order the
//! directory is listed in.
//!
//! [`Directory`] holds the data and is purely synchronous. [`SessionRegistry`]
//! wraps it in one `RwLock`. Mutations only go through the write guard the
//! router holds for a command, so a mutation and the fanout it triggers are
//! one step; the handle itself only offers reads.

use std::sync::Arc;

use indexmap::IndexMap;
use tokio::sync::{RwLock, RwLockWriteGuard};
use tracing::{debug, info, warn};

use crate::connection::{ConnectionId, Outbound};
use crate::error::{DeliveryError, RegistryError};
use crate::protocol::{ClientInfo, ServerMessage};

/// A logged-in participant bound to one connection
#[derive(Debug)]
pub struct Session {
    session_id: String,
    username: String,
    outbound: Outbound,
}

impl Session {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.outbound.id()
    }

    /// Queue an envelope for this session's connection
    pub fn send(&self, msg: ServerMessage) -> Result<(), DeliveryError> {
        self.outbound.send(msg)
    }

    /// Directory entry for this session
    pub fn info(&self) -> ClientInfo {
        ClientInfo {
            session_id: self.session_id.clone(),
            username: self.username.clone(),
        }
    }
}

/// Active sessions keyed by session ID, in login order
#[derive(Debug, Default)]
pub struct Directory {
    sessions: IndexMap<String, Session>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a session. An existing session with the same ID is left untouched.
    pub fn register(
        &mut self,
        session_id: String,
        username: String,
        outbound: Outbound,
    ) -> Result<&Session, RegistryError> {
        match self.sessions.entry(session_id) {
            indexmap::map::Entry::Occupied(entry) => {
                warn!(session_id = %entry.key(), "Session ID already registered");
                Err(RegistryError::DuplicateSession(entry.key().clone()))
            }
            indexmap::map::Entry::Vacant(entry) => {
                let session_id = entry.key().clone();
                info!(session_id = %session_id, username = %username, "Session registered");
                Ok(&*entry.insert(Session {
                    session_id,
                    username,
                    outbound,
                }))
            }
        }
    }

    /// Remove a session, returning it if it was present
    pub fn unregister(&mut self, session_id: &str) -> Option<Session> {
        let removed = self.sessions.shift_remove(session_id);
        match &removed {
            Some(_) => info!(session_id = %session_id, "Session unregistered"),
            None => debug!(session_id = %session_id, "Session already unregistered"),
        }
        removed
    }

    /// Change the display name of a session in place
    pub fn rename(&mut self, session_id: &str, username: String) -> Result<(), RegistryError> {
        let session = self
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| RegistryError::NotFound(session_id.to_string()))?;
        debug!(session_id = %session_id, to = %username, "Session renamed");
        session.username = username;
        Ok(())
    }

    /// Resolve a connection back to the session bound to it
    pub fn find_by_connection(&self, connection: ConnectionId) -> Option<&str> {
        self.sessions
            .values()
            .find(|session| session.connection_id() == connection)
            .map(Session::session_id)
    }

    /// Every session except `session_id`, in login order
    pub fn list_excluding(&self, session_id: &str) -> Vec<ClientInfo> {
        self.sessions
            .values()
            .filter(|session| session.session_id != session_id)
            .map(Session::info)
            .collect()
    }

    pub fn get(&self, session_id: &str) -> Option<&Session> {
        self.sessions.get(session_id)
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.contains_key(session_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub(crate) fn sessions(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }
}

/// Thread-safe handle to the session directory.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    inner: Arc<RwLock<Directory>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn list_excluding(&self, session_id: &str) -> Vec<ClientInfo> {
        self.inner.read().await.list_excluding(session_id)
    }

    /// Send `msg` to one session; returns whether it was found
    pub async fn deliver(&self, receiver: &str, msg: ServerMessage) -> bool {
        self.inner.read().await.deliver(receiver, msg)
    }

    /// Number of logged-in sessions
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Exclusive access for a mutation plus the fanout it triggers
    pub(crate) async fn lock(&self) -> RwLockWriteGuard<'_, Directory> {
        self.inner.write().await
    }
}
