use serde::{Deserialize, Serialize};

use super::ddns::{DdnsConfig, DdnsMode};
use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::server::ServerConfig;
use super::soa::SoaConfig;

/// Main configuration structure for the DDNS responder
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// DNS listener
    #[serde(default)]
    pub server: ServerConfig,

    /// Registration protocol, static entries and timers
    #[serde(default)]
    pub ddns: DdnsConfig,

    /// Timers published in SOA answers
    #[serde(default)]
    pub soa: SoaConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. ddns.toml in current directory
    /// 3. /etc/ddns/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if std::path::Path::new("ddns.toml").exists() {
            Self::from_file("ddns.toml")?
        } else if std::path::Path::new("/etc/ddns/config.toml").exists() {
            Self::from_file("/etc/ddns/config.toml")?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply command-line overrides to configuration
    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(bind) = overrides.dns_bind {
            self.server.dns_bind = bind;
        }
        if let Some(binding) = overrides.udp_binding {
            self.ddns.udp_binding = binding;
        }
        if let Some(mode) = overrides.mode {
            self.ddns.mode = mode;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ddns.mode.uses_udp()
            && self
                .ddns
                .shared_key
                .as_deref()
                .map_or(true, |k| k.trim().is_empty())
        {
            return Err(ConfigError::Validation(format!(
                "ddns.shared_key is required in '{}' mode",
                self.ddns.mode
            )));
        }

        if self.ddns.registration_ttl_secs == 0 {
            return Err(ConfigError::Validation(
                "ddns.registration_ttl_secs cannot be 0".to_string(),
            ));
        }

        if self.ddns.bk_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "ddns.bk_interval_secs cannot be 0".to_string(),
            ));
        }

        if self.ddns.resync_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "ddns.resync_interval_secs cannot be 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub dns_bind: Option<String>,
    pub udp_binding: Option<String>,
    pub mode: Option<DdnsMode>,
    pub log_level: Option<String>,
}
