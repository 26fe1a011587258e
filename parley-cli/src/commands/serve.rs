//! Parley serve command for running the relay server

use anyhow::Result;
use clap::Args;
use parley_core::IdentityStrategy;
use parley_server::{ParleyServer, ServerConfig};
use tracing::info;

use crate::config::{ConfigLoader, ParleyConfig};

/// Arguments for the serve command
///
/// Flags override values from the config files.
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Session identity strategy (generated or handshake-key)
    #[arg(long)]
    pub identity: Option<IdentityStrategy>,
}

/// Run the serve command
pub async fn run(args: ServeArgs) -> Result<()> {
    let config = server_config(ConfigLoader::load()?, &args);

    info!("Starting parley server on {}", config.addr());

    let server = ParleyServer::new(config);
    tokio::select! {
        result = server.run() => result.map_err(Into::into),
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
            Ok(())
        }
    }
}

/// Apply command-line overrides on top of the loaded config
fn server_config(config: ParleyConfig, args: &ServeArgs) -> ServerConfig {
    let server = config.server;
    ServerConfig::new(
        args.host.clone().unwrap_or(server.host),
        args.port.unwrap_or(server.port),
    )
    .with_identity(args.identity.unwrap_or(server.identity))
}
