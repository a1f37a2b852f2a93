//! Effective configuration and device for one invocation.

use std::path::Path;

use strided_common::{ConfigError, ConformanceConfig};
use tracing::debug;

use crate::device::DeviceSelection;

/// Shared context handed to every subcommand.
#[derive(Debug, Clone)]
pub struct Session {
    pub config: ConformanceConfig,
    pub device: DeviceSelection,
}

/// Load the config named by `--config`, else the default path if it exists,
/// else defaults plus environment overrides.
///
/// An explicitly named file that cannot be read is an error.
pub fn load_configuration(path: Option<&Path>) -> Result<ConformanceConfig, ConfigError> {
    if let Some(path) = path {
        return ConformanceConfig::load(path);
    }
    let default_path = ConformanceConfig::default_config_path();
    if default_path.is_file() {
        debug!(path = %default_path.display(), "loading default configuration");
        ConformanceConfig::load(&default_path)
    } else {
        ConformanceConfig::from_env()
    }
}
