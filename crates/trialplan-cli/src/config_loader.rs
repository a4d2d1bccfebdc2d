//! Configuration loading utilities for CLI commands

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use trialplan_core::config::{CliConfigOverrides, LayeredConfig};

/// Config file picked up from the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "trialplan.toml";

/// The explicit file, or `./trialplan.toml` if it exists
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
            fallback.is_file().then_some(fallback)
        }
    }
}

/// Load layered configuration: defaults, file, environment
pub fn load_config(explicit: Option<&Path>) -> Result<LayeredConfig> {
    let mut config = LayeredConfig::with_defaults();
    if let Some(path) = resolve_config_path(explicit) {
        config = config
            .load_from_file(&path)
            .with_context(|| format!("Failed to load configuration file {}", path.display()))?;
    }
    Ok(config.load_from_env())
}

/// Load layered configuration with CLI overrides
pub fn load_config_with_overrides(
    explicit: Option<&Path>,
    overrides: CliConfigOverrides,
) -> Result<LayeredConfig> {
    let mut config = load_config(explicit)?;
    config.update_from_cli(overrides).context("Invalid command-line option")?;
    Ok(config)
}
