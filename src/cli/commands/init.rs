//! Write the default config file.

use super::{Cli, apply_overrides};
use crate::config::{self, Config, ConfigError};

/// Write defaults (plus any command-line overrides) to the config path.
pub fn cmd_init_config(cli: &Cli, force: bool) -> anyhow::Result<()> {
    let path = match &cli.config {
        Some(path) => path.clone(),
        None => config::config_path().ok_or(ConfigError::NoConfigDir)?,
    };

    if path.exists() && !force {
        return Err(ConfigError::AlreadyExists(path).into());
    }

    let mut config = Config::default();
    apply_overrides(&mut config, cli);
    config::save(&config, &path)?;

    println!("Wrote {}", path.display());
    Ok(())
}
