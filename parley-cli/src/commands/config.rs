use std::fmt::Write;

use crate::config::{ConfigLayer, ConfigLoader, LayerOrigin, PROJECT_DIR_ENV, RawParleyConfig};
use anyhow::Result;
use clap::{Args, Subcommand};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration, marking values left at defaults
    Show,
    /// List config files in merge order and whether each exists
    Path,
}

pub fn run(args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Show => {
            let raw = ConfigLoader::load_raw(&ConfigLoader::layer_paths())?;
            print!("{}", render_config(raw));
        }
        ConfigCommands::Path => print!("{}", render_layers(&ConfigLoader::layers())),
    }
    Ok(())
}

/// Effective config as TOML; values no file set are marked `# default`
fn render_config(raw: RawParleyConfig) -> String {
    let set = [
        raw.server.host.is_some(),
        raw.server.port.is_some(),
        raw.server.identity.is_some(),
    ];
    let server = ConfigLoader::finalize(raw).server;
    let values = [
        ("host", toml::Value::String(server.host)),
        ("port", toml::Value::Integer(i64::from(server.port))),
        ("identity", toml::Value::String(server.identity.to_string())),
    ];

    let mut out = String::from("[server]\n");
    for ((key, value), explicit) in values.into_iter().zip(set) {
        let _ = write!(out, "{} = {}", key, value);
        if !explicit {
            out.push_str("  # default");
        }
        out.push('\n');
    }
    out
}

fn render_layers(layers: &[ConfigLayer]) -> String {
    let mut out = String::new();
    for (i, layer) in layers.iter().enumerate() {
        let status = if layer.path.exists() { "found" } else { "missing" };
        let _ = writeln!(
            out,
            "{}. {:<8} {} ({})",
            i + 1,
            layer.name,
            layer.path.display(),
            status
        );
        if layer.origin == LayerOrigin::Environment {
            let _ = writeln!(out, "   set by {}", PROJECT_DIR_ENV);
        }
    }
    out.push_str("Later files override earlier ones; command-line flags override both.\n");
    out
}
