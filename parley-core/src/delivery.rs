//! Broadcast fanout and unicast delivery over the directory
//!
//! Both run against a borrowed [`Directory`] so the router can deliver while
//! still holding the guard it used for the triggering mutation.

use tracing::{trace, warn};

use crate::protocol::ServerMessage;
use crate::registry::Directory;

impl Directory {
    /// Send `msg` to every session except `exclude`.
    ///
    /// A failed send is logged and skipped; the remaining recipients still
    /// get the envelope. Returns how many sessions accepted it.
    pub fn broadcast(&self, exclude: &str, msg: &ServerMessage) -> usize {
        let mut delivered = 0;
        for session in self.sessions().filter(|s| s.session_id() != exclude) {
            match session.send(msg.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => warn!(
                    session_id = %session.session_id(),
                    "Broadcast to session failed: {}", e
                ),
            }
        }
        trace!("Broadcast to {} sessions", delivered);
        delivered
    }

    /// Send `msg` to the session `receiver`.
    ///
    /// Returns true when the receiver is registered and the send was
    /// attempted, false when no such session exists.
    pub fn deliver(&self, receiver: &str, msg: ServerMessage) -> bool {
        let Some(session) = self.get(receiver) else {
            return false;
        };
        if let Err(e) = session.send(msg) {
            warn!(session_id = %receiver, "Delivery to session failed: {}", e);
        }
        true
    }
}
