//! Per-accessory configuration as consumed by the bridge core.
//!
//! The daemon parses these from `[[accessories]]` tables. Apart from `name`
//! and `type`, every key is free-form: item names (`item`, `batteryItem`,
//! ...), flags (`inverted`, `batteryItemInverted`, ...) and thresholds.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::transform::parse_int;

/// The kinds of accessory the bridge can assemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessoryKind {
    Light,
    #[serde(alias = "motionsensor")]
    Motion,
    Battery,
}

impl AccessoryKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Motion => "motion",
            Self::Battery => "battery",
        }
    }
}

impl fmt::Display for AccessoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single configuration value: an item name, a flag or a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(b) => b.fmt(f),
            Self::Number(n) => n.fmt(f),
            Self::Text(s) => s.fmt(f),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// Configuration of one accessory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessoryConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AccessoryKind,
    #[serde(flatten)]
    pub settings: BTreeMap<String, ConfigValue>,
}

impl AccessoryConfig {
    pub fn new(name: impl Into<String>, kind: AccessoryKind) -> Self {
        Self {
            name: name.into(),
            kind,
            settings: BTreeMap::new(),
        }
    }

    /// Builder-style setter, mostly useful in tests and demos.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.settings.get(key)
    }

    /// Name of the item configured under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::MissingKey`] when the key is absent or
    /// empty.
    pub fn item_name(&self, key: &str) -> Result<String, ConfigurationError> {
        match self.get(key) {
            Some(ConfigValue::Text(name)) if !name.is_empty() => Ok(name.clone()),
            Some(value @ (ConfigValue::Flag(_) | ConfigValue::Number(_))) => Ok(value.to_string()),
            _ => Err(ConfigurationError::MissingKey {
                accessory: self.name.clone(),
                key: key.to_string(),
            }),
        }
    }

    /// Whether the flag under `key` is set. Accepts `true` and `"true"`.
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        match self.get(key) {
            Some(ConfigValue::Flag(value)) => *value,
            Some(ConfigValue::Text(value)) => value == "true",
            Some(ConfigValue::Number(_)) | None => false,
        }
    }

    /// Threshold configured under `key`. Text values are read as integers.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::MissingThreshold`] when absent and
    /// [`ConfigurationError::InvalidThreshold`] when not a number.
    #[allow(clippy::cast_precision_loss)]
    pub fn threshold(&self, key: &str) -> Result<f64, ConfigurationError> {
        let invalid = |value: &ConfigValue| ConfigurationError::InvalidThreshold {
            accessory: self.name.clone(),
            key: key.to_string(),
            value: value.to_string(),
        };
        match self.get(key) {
            None => Err(ConfigurationError::MissingThreshold {
                accessory: self.name.clone(),
                key: key.to_string(),
            }),
            Some(ConfigValue::Number(value)) => Ok(*value),
            Some(value @ ConfigValue::Text(text)) => parse_int(text)
                .map(|v| v as f64)
                .map_err(|_| invalid(value)),
            Some(value @ ConfigValue::Flag(_)) => Err(invalid(value)),
        }
    }
}
