//! Characteristics: typed, observable properties exposed to the accessory host.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::NotFoundError;

/// The characteristics the bridge knows how to drive.
///
/// Names follow the HAP characteristic definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CharacteristicKind {
    On,
    Hue,
    Saturation,
    Brightness,
    MotionDetected,
    StatusLowBattery,
    BatteryLevel,
    ChargingState,
}

impl CharacteristicKind {
    /// Value format the host expects unless overridden.
    #[must_use]
    pub fn default_format(self) -> Format {
        match self {
            Self::On | Self::MotionDetected => Format::Bool,
            Self::Hue | Self::Saturation => Format::Float,
            Self::Brightness => Format::Int,
            Self::StatusLowBattery | Self::BatteryLevel | Self::ChargingState => Format::Uint8,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::On => "On",
            Self::Hue => "Hue",
            Self::Saturation => "Saturation",
            Self::Brightness => "Brightness",
            Self::MotionDetected => "MotionDetected",
            Self::StatusLowBattery => "StatusLowBattery",
            Self::BatteryLevel => "BatteryLevel",
            Self::ChargingState => "ChargingState",
        }
    }
}

impl fmt::Display for CharacteristicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CharacteristicKind {
    type Err = NotFoundError;

    /// Accepts the HAP name (`StatusLowBattery`) or its snake-case form
    /// (`status_low_battery`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "on" => Ok(Self::On),
            "hue" => Ok(Self::Hue),
            "saturation" => Ok(Self::Saturation),
            "brightness" => Ok(Self::Brightness),
            "motiondetected" => Ok(Self::MotionDetected),
            "statuslowbattery" => Ok(Self::StatusLowBattery),
            "batterylevel" => Ok(Self::BatteryLevel),
            "chargingstate" => Ok(Self::ChargingState),
            _ => Err(NotFoundError {
                entity: "Characteristic",
                id: s.to_string(),
            }),
        }
    }
}

/// Wire format of a characteristic value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Bool,
    Uint8,
    Int,
    Float,
    String,
}

/// A characteristic value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CharacteristicValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl CharacteristicValue {
    /// Interpret the value as a boolean. Numbers are `true` when non-zero.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Int(i) => Some(*i != 0),
            Self::Float(f) => Some(*f != 0.0),
            Self::String(_) => None,
        }
    }

    /// Interpret the value as a number.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::Bool(_) | Self::String(_) => None,
        }
    }
}

impl fmt::Display for CharacteristicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => b.fmt(f),
            Self::Int(i) => i.fmt(f),
            Self::Float(v) => v.fmt(f),
            Self::String(s) => s.fmt(f),
        }
    }
}

/// `StatusLowBattery` values.
pub mod status_low_battery {
    pub const NORMAL: i64 = 0;
    pub const LOW: i64 = 1;
}

/// `ChargingState` values.
pub mod charging_state {
    pub const NOT_CHARGING: i64 = 0;
    pub const CHARGING: i64 = 1;
    pub const NOT_CHARGEABLE: i64 = 2;
}
