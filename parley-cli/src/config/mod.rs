mod loader;
mod types;

pub use loader::{ConfigLayer, ConfigLoader, LayerOrigin, PROJECT_DIR_ENV};
pub use types::{ParleyConfig, RawParleyConfig};
