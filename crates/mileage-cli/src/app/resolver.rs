//! Config path resolution and loading.

use std::path::PathBuf;

use log::debug;

use crate::cli::Cli;
use crate::config::{default_config_path, read_config, MileageConfig};
use crate::errors::CliError;

/// Resolve the config file path. `--config` (or `MILEAGE_CONFIG`) wins.
pub fn resolve_config_path(cli: &Cli) -> anyhow::Result<PathBuf> {
    if let Some(path) = cli.config.as_deref() {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }
    default_config_path()
}

/// Load the config file, then apply environment overrides.
///
/// A missing default config file is not an error; every section is
/// optional. An explicitly named file must exist.
pub fn load_config(cli: &Cli) -> anyhow::Result<MileageConfig> {
    let path = resolve_config_path(cli)?;
    let explicit = cli.config.is_some();

    let mut config = if path.exists() {
        debug!("Loading config from {}", path.display());
        read_config(&path)?
    } else if explicit {
        return Err(CliError::not_found(
            format!("No config file at {}", path.display()),
            "Create it or drop --config / MILEAGE_CONFIG to use the default location.",
        )
        .into());
    } else {
        debug!("No config at {}, using defaults", path.display());
        MileageConfig::default()
    };

    config.apply_overrides(|name| std::env::var(name).ok());
    Ok(config)
}
