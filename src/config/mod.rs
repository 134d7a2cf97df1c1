mod env;
mod types;

pub use env::EnvOverrides;
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
///
/// An explicit path must exist. Otherwise `TOOLCRIB_CONFIG` and then the
/// default locations are tried, and a missing file is not an error.
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    if let Ok(path) = std::env::var("TOOLCRIB_CONFIG") {
        if !path.trim().is_empty() {
            return load_config(Path::new(&path));
        }
    }

    let default_paths = ["./toolcrib.toml", "~/.config/toolcrib/config.toml"];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Resolve the configuration `serve` runs with: file (if any), then
/// environment variables on top.
pub fn resolve_config(custom_path: Option<&Path>, env: &EnvOverrides) -> Result<Config> {
    let mut config = load_config_or_default(custom_path)?;
    env.apply(&mut config);
    validate_config(&config)?;
    Ok(config)
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if config.auth.session_timeout_hours == 0 {
        anyhow::bail!("Session timeout must be at least one hour");
    }

    if config.storage.max_upload_bytes == 0 {
        anyhow::bail!("Upload size limit cannot be 0");
    }

    if let Some(ref url) = config.server.public_url {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            anyhow::bail!("public_url must start with http:// or https://: {}", url);
        }
    }

    if config.launcher.admin_password.is_empty() {
        anyhow::bail!("launcher.admin_password cannot be empty");
    }

    Ok(())
}
