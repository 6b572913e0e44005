pub mod current;
pub mod files;
pub mod tail;
pub mod write;

use std::path::PathBuf;

use anyhow::{Context, Result};
use eventlog_core::{config, LoggerConfig};

/// Load `~/.eventlog/config.yaml` and apply the `--dir` override.
pub fn resolve_config(dir: Option<PathBuf>) -> Result<LoggerConfig> {
    let mut config = config::load().context("failed to load eventlog config")?;
    if let Some(dir) = dir {
        config.directory = dir;
    }
    Ok(config)
}
