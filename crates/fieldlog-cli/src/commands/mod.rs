//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod export;
pub mod init;
pub mod parse;
#[cfg(feature = "serve")]
pub mod serve;
pub mod summary;

use std::path::{Path, PathBuf};

use tracing::debug;

use fieldlog_core::models::config::FieldlogConfig;
use fieldlog_core::store::ReportStore;

/// Default configuration file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fieldlog")
        .join("config.json")
}

/// Load configuration from `-c`, else the default location, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<FieldlogConfig> {
    if let Some(path) = config_path {
        return Ok(FieldlogConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Using config at {}", default_path.display());
        Ok(FieldlogConfig::from_file(&default_path)?)
    } else {
        Ok(FieldlogConfig::default())
    }
}

/// Open the configured report database, creating it if needed.
pub fn open_store(config: &FieldlogConfig) -> anyhow::Result<ReportStore> {
    let path = &config.storage.database;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(ReportStore::open_or_create(path)?)
}
