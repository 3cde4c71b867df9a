//! TOML config file loading

use std::path::Path;

use tracing::info;

use super::{AppConfig, ConfigError};

/// Environment variable overriding `server.port`
pub const PORT_ENV_VAR: &str = "PORT";

/// Load config from a specific TOML file path.
///
/// Missing fields take their defaults. The result is validated.
pub fn load_from_path(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Parse(format!("failed to read {}: {e}", path.display())))?;

    let config: AppConfig = toml::from_str(&content)
        .map_err(|e| ConfigError::Parse(format!("failed to parse TOML: {e}")))?;

    config.validate()?;

    info!("loaded config from {}", path.display());
    Ok(config)
}

/// Load config from `path` if given, else defaults; then apply `PORT`
pub fn load(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let config = match path {
        Some(path) => load_from_path(path)?,
        None => {
            info!("no config file given, using defaults");
            AppConfig::default()
        }
    };

    apply_port_override(config, std::env::var(PORT_ENV_VAR).ok().as_deref())
}

fn apply_port_override(mut config: AppConfig, port: Option<&str>) -> Result<AppConfig, ConfigError> {
    if let Some(raw) = port {
        config.server.port = raw
            .trim()
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("{PORT_ENV_VAR}={raw}: {e}")))?;
        config.validate()?;
    }
    Ok(config)
}
