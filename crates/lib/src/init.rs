//! Initialize the configuration directory: create `~/.wathiq` and a `config.json` seeded from a
//! bundled deployment preset.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::presets;

/// Create the config directory and write `config.json` from `preset` if the file does not exist.
/// An existing config is left untouched. Returns the config directory.
pub fn init_config_dir(config_path: &Path, preset: Option<&str>) -> Result<PathBuf> {
    let config_dir = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(config_dir)
        .with_context(|| format!("creating config directory {}", config_dir.display()))?;

    if config_path.exists() {
        log::info!(
            "config already exists at {}, leaving it unchanged",
            config_path.display()
        );
        return Ok(config_dir.to_path_buf());
    }

    let preset = preset.unwrap_or(presets::DEFAULT_PRESET);
    let config = Config {
        deployment: presets::load(preset)?,
        ..Config::default()
    };
    let text = serde_json::to_string_pretty(&config).context("serializing default config")?;
    std::fs::write(config_path, text)
        .with_context(|| format!("writing default config to {}", config_path.display()))?;
    log::info!(
        "created config at {} from preset {}",
        config_path.display(),
        preset
    );
    Ok(config_dir.to_path_buf())
}
