//! Plugin runtime configuration

use crate::domains::logging::LoggingConfig;
use crate::error::ConfigResult;
use crate::validation::{check_socket_path_length, validate_positive, Validatable};
use plugwire_ipc::NAMED_PIPE_PREFIX;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable the host uses to hand the plugin its endpoint address
pub const ADDRESS_ENV_VAR: &str = "GOPROC_PLUGIN_ADDRESS";

/// Runtime configuration of a plugin process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    /// Endpoint address: a socket path, or `\\.\pipe\<name>` on Windows.
    /// Blank counts as unset, whichever source it came from.
    pub address: Option<String>,

    /// How long start-up waits for REGISTER_ACK
    #[serde(with = "crate::domains::utils::serde_duration")]
    pub handshake_timeout: Duration,

    /// How long to wait for the host to connect; `None` waits forever
    #[serde(with = "crate::domains::utils::serde_duration_option")]
    pub accept_timeout: Option<Duration>,

    /// Pause after an undecodable frame before reading the next one
    #[serde(with = "crate::domains::utils::serde_duration_millis")]
    pub retry_delay: Duration,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            address: None,
            handshake_timeout: Duration::from_secs(10),
            accept_timeout: Some(Duration::from_secs(30)),
            retry_delay: Duration::from_millis(100),
            logging: LoggingConfig::default(),
        }
    }
}

impl PluginConfig {
    /// Use `address` only when no address is configured yet.
    ///
    /// Empty strings count as unset on both sides.
    pub fn with_fallback_address(mut self, address: Option<String>) -> Self {
        let unset = self.address.as_deref().map_or(true, |a| a.trim().is_empty());
        if unset {
            self.address = address.filter(|a| !a.trim().is_empty());
        }
        self
    }

    /// The configured address, if present and non-empty
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref().filter(|a| !a.trim().is_empty())
    }

    /// Validate this configuration and every nested domain
    pub fn validate_all(&self) -> ConfigResult<()> {
        self.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

impl Validatable for PluginConfig {
    fn validate(&self) -> ConfigResult<()> {
        if let Some(address) = self.address() {
            if !address.starts_with(NAMED_PIPE_PREFIX) {
                check_socket_path_length(address, "address");
            }
        }

        validate_positive(
            self.handshake_timeout.as_millis(),
            "handshake_timeout",
            self.domain_name(),
        )?;

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "plugin"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PluginConfig::default();
        assert_eq!(config.address, None);
        assert_eq!(config.handshake_timeout, Duration::from_secs(10));
        assert_eq!(config.accept_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.retry_delay, Duration::from_millis(100));
        assert!(config.validate_all().is_ok());
    }

    #[test]
    fn test_fallback_address_only_when_unset() {
        let config = PluginConfig::default().with_fallback_address(Some("/tmp/a.sock".into()));
        assert_eq!(config.address(), Some("/tmp/a.sock"));

        let config = PluginConfig {
            address: Some("/tmp/env.sock".into()),
            ..PluginConfig::default()
        }
        .with_fallback_address(Some("/tmp/arg.sock".into()));
        assert_eq!(config.address(), Some("/tmp/env.sock"));

        let config = PluginConfig {
            address: Some(String::new()),
            ..PluginConfig::default()
        }
        .with_fallback_address(Some("/tmp/arg.sock".into()));
        assert_eq!(config.address(), Some("/tmp/arg.sock"));

        let config = PluginConfig::default().with_fallback_address(Some("  ".into()));
        assert_eq!(config.address(), None);
    }

    #[test]
    fn test_zero_handshake_timeout_rejected() {
        let config = PluginConfig {
            handshake_timeout: Duration::ZERO,
            ..PluginConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blank_address_is_unset() {
        for blank in ["", "   "] {
            let config = PluginConfig {
                address: Some(blank.to_string()),
                ..PluginConfig::default()
            };
            assert!(config.validate().is_ok());
            assert_eq!(config.address(), None);
        }

        let config: PluginConfig = serde_yaml::from_str("address: \"\"\n").unwrap();
        assert!(config.validate_all().is_ok());
        assert_eq!(config.address(), None);
    }

    #[test]
    fn test_yaml_units() {
        let yaml = r#"
address: /run/plugwire/math.sock
handshake_timeout: 3
accept_timeout: 0
retry_delay: 250
logging:
  level: debug
  format: json
"#;
        let config: PluginConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.address(), Some("/run/plugwire/math.sock"));
        assert_eq!(config.handshake_timeout, Duration::from_secs(3));
        assert_eq!(config.accept_timeout, None);
        assert_eq!(config.retry_delay, Duration::from_millis(250));
        assert_eq!(config.logging.format, crate::LogFormat::Json);
    }
}
