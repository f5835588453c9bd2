//! Configuration loading and environment variable handling

use crate::domains::plugin::PluginConfig;
use crate::error::{ConfigError, ConfigResult};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Environment variable prefix shared with host processes
pub const DEFAULT_ENV_PREFIX: &str = "GOPROC";

/// Configuration loader with environment variable support
pub struct ConfigLoader {
    /// Environment variable prefix
    prefix: String,
}

impl ConfigLoader {
    /// Create a new config loader with default prefix
    pub fn new() -> Self {
        Self {
            prefix: DEFAULT_ENV_PREFIX.to_string(),
        }
    }

    /// Create a new config loader with custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Load configuration from a YAML (or `.json`) file with environment overrides
    pub fn from_file(&self, path: impl AsRef<Path>) -> ConfigResult<PluginConfig> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let mut config: PluginConfig = if is_json {
            serde_json::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };
        log::debug!("Loaded configuration from {}", path.display());

        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env(&self) -> ConfigResult<PluginConfig> {
        let mut config = PluginConfig::default();
        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load configuration with fallback chain
    pub fn load(&self, config_path: Option<impl AsRef<Path>>) -> ConfigResult<PluginConfig> {
        match config_path {
            Some(path) => self.from_file(path),
            None => self.from_env(),
        }
    }

    /// Apply environment variable overrides to configuration
    fn apply_env_overrides(&self, config: &mut PluginConfig) -> ConfigResult<()> {
        self.apply_plugin_overrides(config)?;
        self.apply_logging_overrides(&mut config.logging)?;
        Ok(())
    }

    /// Apply endpoint and timing overrides
    fn apply_plugin_overrides(&self, config: &mut PluginConfig) -> ConfigResult<()> {
        if let Ok(address) = self.get_env_var("PLUGIN_ADDRESS") {
            // An empty variable is the same as an unset one
            if !address.trim().is_empty() {
                config.address = Some(address);
            }
        }

        if let Some(seconds) = self.parse_env_var::<u64>("HANDSHAKE_TIMEOUT")? {
            config.handshake_timeout = Duration::from_secs(seconds);
        }

        if let Some(seconds) = self.parse_env_var::<u64>("ACCEPT_TIMEOUT")? {
            config.accept_timeout = (seconds > 0).then(|| Duration::from_secs(seconds));
        }

        if let Some(millis) = self.parse_env_var::<u64>("RETRY_DELAY_MS")? {
            config.retry_delay = Duration::from_millis(millis);
        }

        Ok(())
    }

    /// Apply logging config overrides
    fn apply_logging_overrides(
        &self,
        config: &mut crate::domains::logging::LoggingConfig,
    ) -> ConfigResult<()> {
        if let Ok(level) = self.get_env_var("LOG_LEVEL") {
            config.level = level.parse().map_err(ConfigError::EnvError)?;
        }

        if let Ok(format) = self.get_env_var("LOG_FORMAT") {
            config.format = format.parse().map_err(ConfigError::EnvError)?;
        }

        Ok(())
    }

    /// Read and parse `{prefix}_{name}`, if set
    fn parse_env_var<T>(&self, name: &str) -> ConfigResult<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get_env_var(name) {
            Ok(raw) => raw.trim().parse().map(Some).map_err(|e| {
                ConfigError::EnvError(format!("Invalid {}_{}: {}", self.prefix, name, e))
            }),
            Err(_) => Ok(None),
        }
    }

    /// Get environment variable with prefix
    fn get_env_var(&self, name: &str) -> Result<String, std::env::VarError> {
        std::env::var(format!("{}_{}", self.prefix, name))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
