pub mod batch;
pub mod config;
pub mod process;

use std::path::{Path, PathBuf};

use tracing::debug;

use rutx_core::models::config::RutxConfig;

/// `<config dir>/rutx/config.json`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rutx")
        .join("config.json")
}

/// Load `--config` if given, else the default file if present, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<RutxConfig> {
    if let Some(path) = config_path {
        return Ok(RutxConfig::from_file(Path::new(path))?);
    }

    let path = default_config_path();
    if path.exists() {
        debug!("Using config from {}", path.display());
        Ok(RutxConfig::from_file(&path)?)
    } else {
        Ok(RutxConfig::default())
    }
}
