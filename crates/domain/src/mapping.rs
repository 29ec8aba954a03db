//! State mappings for sensor characteristics fed from Switch, Contact or
//! Number items.

use crate::characteristic::{CharacteristicValue, charging_state, status_low_battery};
use crate::error::TransformError;
use crate::transform::parse_number;

/// Maps `ON`/`OPEN` and `OFF`/`CLOSED` onto two characteristic values.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryMapping {
    pub active: CharacteristicValue,
    pub inactive: CharacteristicValue,
    pub inverted: bool,
}

impl BinaryMapping {
    pub fn new(active: CharacteristicValue, inactive: CharacteristicValue) -> Self {
        Self {
            active,
            inactive,
            inverted: false,
        }
    }

    /// `MotionDetected`: `true` when the item is `ON` or `OPEN`.
    #[must_use]
    pub fn motion() -> Self {
        Self::new(
            CharacteristicValue::Bool(true),
            CharacteristicValue::Bool(false),
        )
    }

    /// `StatusLowBattery`: low when the item is `ON` or `OPEN`.
    #[must_use]
    pub fn low_battery() -> Self {
        Self::new(
            CharacteristicValue::Int(status_low_battery::LOW),
            CharacteristicValue::Int(status_low_battery::NORMAL),
        )
    }

    /// `ChargingState`: charging when the item is `ON` or `OPEN`.
    #[must_use]
    pub fn charging() -> Self {
        Self::new(
            CharacteristicValue::Int(charging_state::CHARGING),
            CharacteristicValue::Int(charging_state::NOT_CHARGING),
        )
    }

    /// Swap the active and inactive states.
    #[must_use]
    pub fn inverted(mut self, inverted: bool) -> Self {
        self.inverted = inverted;
        self
    }

    /// Map a raw `ON`/`OFF`/`OPEN`/`CLOSED` state.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::UnmappedState`] for any other state
    /// (`NULL`, `UNDEF`, …).
    pub fn apply(&self, state: &str) -> Result<CharacteristicValue, TransformError> {
        let active = match state {
            "ON" | "OPEN" => true,
            "OFF" | "CLOSED" => false,
            other => return Err(TransformError::UnmappedState(other.to_string())),
        };
        if active == self.inverted {
            Ok(self.inactive.clone())
        } else {
            Ok(self.active.clone())
        }
    }
}

/// Compares a numeric state against a threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdMapping {
    pub threshold: f64,
    pub below: CharacteristicValue,
    pub otherwise: CharacteristicValue,
}

impl ThresholdMapping {
    /// `StatusLowBattery` from a battery level: low below `threshold`.
    #[must_use]
    pub fn low_battery(threshold: f64) -> Self {
        Self {
            threshold,
            below: CharacteristicValue::Int(status_low_battery::LOW),
            otherwise: CharacteristicValue::Int(status_low_battery::NORMAL),
        }
    }

    /// Map a numeric state.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::InvalidNumber`] when the state is not a
    /// number.
    pub fn apply(&self, state: &str) -> Result<CharacteristicValue, TransformError> {
        let value = parse_number(state)?;
        if value < self.threshold {
            Ok(self.below.clone())
        } else {
            Ok(self.otherwise.clone())
        }
    }
}
