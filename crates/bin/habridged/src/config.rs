//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `habridge.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::collections::BTreeSet;
use std::time::Duration;

use serde::Deserialize;

use habridge_adapter_openhab::OpenHabConfig;
use habridge_adapter_virtual::VirtualItemConfig;
use habridge_domain::config::AccessoryConfig;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Which remote server to talk to.
    pub remote: RemoteConfig,
    /// openHAB connection, used with the `openhab` backend.
    pub openhab: OpenHabConfig,
    /// Simulated items, used with the `virtual` backend.
    pub virtual_items: Vec<VirtualItemConfig>,
    /// Accessories to expose.
    pub accessories: Vec<AccessoryConfig>,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Openhab,
    Virtual,
}

/// Remote server selection.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub backend: Backend,
    /// Upper bound of every item lookup, state read and command.
    pub request_timeout_secs: u64,
}

impl RemoteConfig {
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Config {
    /// Load configuration from `habridge.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// result does not validate.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("habridge.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("HABRIDGE_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("HABRIDGE_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("HABRIDGE_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Ok(val) = std::env::var("HABRIDGE_OPENHAB_URL") {
            self.openhab.url = val;
        }
        if let Ok(val) = std::env::var("HABRIDGE_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.remote.request_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "request timeout must be non-zero".to_string(),
            ));
        }
        let mut names = BTreeSet::new();
        for accessory in &self.accessories {
            if !names.insert(accessory.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "accessory {} is declared twice",
                    accessory.name
                )));
            }
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "habridged=info,habridge=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            request_timeout_secs: 10,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use habridge_domain::config::{AccessoryKind, ConfigValue};
    use habridge_domain::item::ItemType;

    use super::*;

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.remote.backend, Backend::Openhab);
        assert_eq!(config.remote.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.openhab.url, "http://localhost:8080");
        assert!(config.accessories.is_empty());
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [server]
            host = '127.0.0.1'
            port = 9090

            [logging]
            filter = 'debug'

            [remote]
            backend = 'virtual'
            request_timeout_secs = 3

            [openhab]
            url = 'http://openhab.local:8080'

            [[virtual_items]]
            name = 'Strip'
            type = 'Color'
            state = '120,50,80'

            [[virtual_items]]
            name = 'Door_Battery'
            type = 'Number:Dimensionless'

            [[accessories]]
            name = 'Strip'
            type = 'light'
            item = 'Strip'

            [[accessories]]
            name = 'Door'
            type = 'battery'
            batteryItem = 'Door_Battery'
            batteryItemThreshold = '20'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.logging.filter, "debug");
        assert_eq!(config.remote.backend, Backend::Virtual);
        assert_eq!(config.remote.request_timeout(), Duration::from_secs(3));
        assert_eq!(config.openhab.url, "http://openhab.local:8080");

        assert_eq!(config.virtual_items.len(), 2);
        assert_eq!(config.virtual_items[0].item_type, ItemType::Color);
        assert_eq!(config.virtual_items[1].item_type, ItemType::Number);
        assert_eq!(config.virtual_items[1].state, "NULL");

        assert_eq!(config.accessories[0].kind, AccessoryKind::Light);
        assert_eq!(config.accessories[1].kind, AccessoryKind::Battery);
        assert_eq!(
            config.accessories[1].get("batteryItemThreshold"),
            Some(&ConfigValue::Text("20".to_string()))
        );
        assert_eq!(config.accessories[1].threshold("batteryItemThreshold").unwrap(), 20.0);
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn should_reject_zero_port() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_zero_timeout() {
        let mut config = Config::default();
        config.remote.request_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_duplicate_accessory_names() {
        let mut config = Config::default();
        config.accessories = vec![
            AccessoryConfig::new("Lamp", AccessoryKind::Light).with("item", "A"),
            AccessoryConfig::new("Lamp", AccessoryKind::Light).with("item", "B"),
        ];
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid configuration: accessory Lamp is declared twice"
        );
    }

    #[test]
    fn should_accept_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_format_bind_addr() {
        let mut config = Config::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 9090;
        assert_eq!(config.bind_addr(), "127.0.0.1:9090");
    }

    #[test]
    fn should_report_parse_error_for_unknown_backend() {
        let result: Result<Config, _> = toml::from_str("[remote]\nbackend = 'zwave'");
        assert!(result.is_err());
    }
}
