mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./podserve.toml",
        "~/.config/podserve/config.toml",
        "/etc/podserve/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.feed.refresh_interval_secs == 0 {
        anyhow::bail!("feed.refresh_interval_secs must be positive");
    }

    let url = config.feed.external_url.trim();
    if url.is_empty() {
        anyhow::bail!("feed.external_url cannot be empty");
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        anyhow::bail!(
            "feed.external_url must include the protocol (http:// or https://): {}",
            url
        );
    }

    // Fatal later, when the first snapshot is built.
    if !config.feed.root.is_dir() {
        tracing::warn!("Media directory does not exist: {:?}", config.feed.root);
    }

    Ok(())
}
