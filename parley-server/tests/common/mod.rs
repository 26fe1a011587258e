//! Shared test utilities for parley-server integration tests

pub mod client;

use std::net::SocketAddr;
use std::sync::Arc;

use parley_server::{AppState, ParleyServer, ServerConfig};
use tokio::net::TcpListener;

/// Start a relay with default config on an ephemeral port
pub async fn create_test_server() -> (Arc<AppState>, SocketAddr) {
    create_test_server_with_config(ServerConfig::default()).await
}

/// Start a relay with `config` on an ephemeral port. The configured host and
/// port are ignored; the returned state is the one the server routes through.
pub async fn create_test_server_with_config(config: ServerConfig) -> (Arc<AppState>, SocketAddr) {
    let state = Arc::new(AppState::new(config.identity));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = ParleyServer::with_state(config, Arc::clone(&state));
    tokio::spawn(server.run_with_listener(listener));

    (state, addr)
}
