//! parley-server - WebSocket transport for the parley chat relay
//!
//! Accepts WebSocket connections on `/ws` and hands every connection event to
//! the [`parley_core::Gateway`] held in [`AppState`].

mod error;
pub mod http;
mod state;
pub mod ws;

use std::sync::Arc;

use parley_core::IdentityStrategy;
use tokio::net::TcpListener;

pub use error::ServerError;
pub use http::create_router;
pub use state::AppState;

/// Default port for the parley server
pub const DEFAULT_PORT: u16 = 7480;
/// Default host for the parley server
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// The main parley server
pub struct ParleyServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl ParleyServer {
    /// Create a new server with an empty registry
    pub fn new(config: ServerConfig) -> Self {
        let state = Arc::new(AppState::new(config.identity));
        Self { config, state }
    }

    /// Create a server with custom state (for testing)
    pub fn with_state(config: ServerConfig, state: Arc<AppState>) -> Self {
        Self { config, state }
    }

    /// Get the server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get the shared application state
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Run the server, binding to the configured address
    pub async fn run(self) -> Result<(), ServerError> {
        let addr = self.config.addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ServerError::Bind {
                addr: addr.clone(),
                source: e,
            })?;

        tracing::info!("parley server listening on {}", addr);

        self.run_with_listener(listener).await
    }

    /// Run the server on an already-bound listener
    pub async fn run_with_listener(self, listener: TcpListener) -> Result<(), ServerError> {
        tracing::info!(identity = %self.config.identity, "Accepting connections");

        let router = create_router(self.state);
        axum::serve(listener, router)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))?;

        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// How connections derive their session ID
    pub identity: IdentityStrategy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            identity: IdentityStrategy::default(),
        }
    }
}

impl ServerConfig {
    /// Create a new ServerConfig with the specified host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            identity: IdentityStrategy::default(),
        }
    }

    /// Use a different session identity strategy
    pub fn with_identity(mut self, identity: IdentityStrategy) -> Self {
        self.identity = identity;
        self
    }

    /// Returns the socket address string (e.g., "0.0.0.0:7480")
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
