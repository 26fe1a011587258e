use super::types::{ParleyConfig, RawParleyConfig, RawServerConfig, ServerSection};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Environment variable that relocates the project config directory
pub const PROJECT_DIR_ENV: &str = "PARLEY_PROJECT_CONFIG_DIR";

const CONFIG_FILE: &str = "config.toml";

/// Where a layer's path was resolved from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerOrigin {
    /// Platform config directory
    Platform,
    /// Redirected by [`PROJECT_DIR_ENV`]
    Environment,
    /// Relative to the working directory
    WorkingDir,
}

/// One config file in the merge order
#[derive(Debug, Clone)]
pub struct ConfigLayer {
    pub name: &'static str,
    pub path: PathBuf,
    pub origin: LayerOrigin,
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user + project)
    pub fn load() -> Result<ParleyConfig> {
        Self::load_layers(&Self::layer_paths())
    }

    /// Load and merge config files in order; later files win. Missing files
    /// are skipped.
    pub fn load_layers(paths: &[PathBuf]) -> Result<ParleyConfig> {
        Ok(Self::finalize(Self::load_raw(paths)?))
    }

    /// Merge config files without applying defaults, so callers can tell
    /// which values were set explicitly
    pub fn load_raw(paths: &[PathBuf]) -> Result<RawParleyConfig> {
        let mut raw = RawParleyConfig::default();
        for path in paths.iter().filter(|p| p.exists()) {
            let layer = Self::read_raw(path)?;
            raw = Self::merge_raw(raw, layer);
        }
        Ok(raw)
    }

    /// Config layers in merge order: user, then project
    pub fn layers() -> Vec<ConfigLayer> {
        let mut layers = Vec::new();
        if let Some(dirs) = ProjectDirs::from("", "", "parley") {
            layers.push(ConfigLayer {
                name: "user",
                path: dirs.config_dir().join(CONFIG_FILE),
                origin: LayerOrigin::Platform,
            });
        }
        layers.push(Self::project_layer(
            std::env::var_os(PROJECT_DIR_ENV).map(PathBuf::from),
        ));
        layers
    }

    pub fn layer_paths() -> Vec<PathBuf> {
        Self::layers().into_iter().map(|layer| layer.path).collect()
    }

    /// Project layer, inside `dir` when the environment redirects it
    fn project_layer(dir: Option<PathBuf>) -> ConfigLayer {
        match dir {
            Some(dir) => ConfigLayer {
                name: "project",
                path: dir.join(CONFIG_FILE),
                origin: LayerOrigin::Environment,
            },
            None => ConfigLayer {
                name: "project",
                path: Path::new(".parley").join(CONFIG_FILE),
                origin: LayerOrigin::WorkingDir,
            },
        }
    }

    fn read_raw(path: &Path) -> Result<RawParleyConfig> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawParleyConfig, overlay: RawParleyConfig) -> RawParleyConfig {
        RawParleyConfig {
            server: RawServerConfig {
                host: overlay.server.host.or(base.server.host),
                port: overlay.server.port.or(base.server.port),
                identity: overlay.server.identity.or(base.server.identity),
            },
        }
    }

    /// Convert raw config to final config with defaults applied
    pub fn finalize(raw: RawParleyConfig) -> ParleyConfig {
        let defaults = ServerSection::default();
        ParleyConfig {
            server: ServerSection {
                host: raw.server.host.unwrap_or(defaults.host),
                port: raw.server.port.unwrap_or(defaults.port),
                identity: raw.server.identity.unwrap_or(defaults.identity),
            },
        }
    }
}
