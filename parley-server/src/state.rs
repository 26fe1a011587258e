//! Shared application state for the parley server

use chrono::{DateTime, Utc};
use parley_core::{Gateway, IdentityStrategy, SessionRegistry};

/// Shared application state accessible by all handlers
#[derive(Clone)]
pub struct AppState {
    /// Gateway every WebSocket connection is routed through
    pub gateway: Gateway,
    /// When the server started
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Create state with an empty registry
    pub fn new(identity: IdentityStrategy) -> Self {
        Self::with_registry(SessionRegistry::new(), identity)
    }

    /// Create state around an existing registry (for testing)
    pub fn with_registry(registry: SessionRegistry, identity: IdentityStrategy) -> Self {
        Self {
            gateway: Gateway::new(registry, identity),
            started_at: Utc::now(),
        }
    }

    /// The session registry behind the gateway
    pub fn registry(&self) -> &SessionRegistry {
        self.gateway.registry()
    }

    /// Returns how long the server has been running
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(IdentityStrategy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_new() {
        let state = AppState::new(IdentityStrategy::HandshakeKey);
        assert!(state.uptime_seconds() >= 0);
        assert_eq!(state.gateway.identity(), IdentityStrategy::HandshakeKey);
    }

    #[tokio::test]
    async fn test_app_state_shares_registry() {
        let registry = SessionRegistry::new();
        let state = AppState::with_registry(registry.clone(), IdentityStrategy::Generated);

        let (outbound, _rx) = parley_core::Outbound::channel();
        let mut conn = state
            .gateway
            .on_connect(&parley_core::Handshake::default(), outbound);
        state
            .gateway
            .on_message(&mut conn, br#"{"cmd":"request-login","username":"alice"}"#)
            .await
            .unwrap();

        assert_eq!(registry.len().await, 1);
        assert_eq!(state.registry().len().await, 1);
    }
}
