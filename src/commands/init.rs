use crate::config::{ServicemapConfig, CONFIG_FILE_NAME};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub fn init_config(force: bool) -> Result<()> {
    write_default_config(&PathBuf::from(CONFIG_FILE_NAME), force)?;
    println!("Created {CONFIG_FILE_NAME} configuration file");
    Ok(())
}

/// Write the default configuration to `config_path`. An existing file is
/// only replaced with `force`.
pub fn write_default_config(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        anyhow::bail!("Configuration file already exists. Use --force to overwrite.");
    }

    let contents = format!(
        "# servicemap configuration\n\n{}",
        toml::to_string_pretty(&ServicemapConfig::default())?
    );
    std::fs::write(config_path, contents)
        .with_context(|| format!("Failed to write {}", config_path.display()))
}
