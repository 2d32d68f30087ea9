//! Application configuration.

use crate::error::{AppError, AppResult};
use satvis_refresh::RefreshConfig;
use satvis_transport::{GenerateRequest, TransportConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Environment variable overriding the configuration path.
pub const CONFIG_ENV_VAR: &str = "SATVIS_CONFIG";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Backend connection.
    #[serde(default)]
    pub transport: TransportConfig,
    /// Auto refresh.
    #[serde(default)]
    pub refresh: RefreshConfig,
    /// Parameters of the `generate` command.
    #[serde(default)]
    pub generate: GenerateRequest,
}

impl AppConfig {
    /// Load configuration.
    ///
    /// Path precedence: `path` argument > `SATVIS_CONFIG` > `config/default.toml`.
    /// A missing file yields defaults.
    pub fn load(path: Option<String>) -> AppResult<Self> {
        let config_path = path
            .or_else(|| std::env::var(CONFIG_ENV_VAR).ok())
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

        if Path::new(&config_path).exists() {
            Self::from_file(&config_path)
        } else {
            tracing::warn!(path = %config_path, "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;
        Self::from_toml(&content)
    }

    /// Parse and validate TOML.
    pub fn from_toml(content: &str) -> AppResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.transport.timeout_ms == 0 {
            return Err(AppError::Config(
                "transport.timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.refresh.interval_ms == 0 {
            return Err(AppError::Config(
                "refresh.interval_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
