//! Value transformation: raw remote state ⇄ characteristic value.
//!
//! Everything here is pure: no I/O, no state. A [`Transformation`] is the
//! closed set of ways a characteristic can be fed from an item; decoding is a
//! total match over (transformation, item type).
//!
//! The remote server never reports a brightness of `100`, it tops out at `99`.
//! Decoding maps `99 → 100` and encoding maps `100 → 99`; the asymmetry is
//! intentional.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::characteristic::{CharacteristicKind, CharacteristicValue};
use crate::command::Command;
use crate::error::TransformError;
use crate::item::{Item, ItemType};
use crate::mapping::{BinaryMapping, ThresholdMapping};

const REPORTED_MAX: i64 = 99;
const FULL: i64 = 100;

/// Semantic kind of a light channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateType {
    Binary,
    Hue,
    Saturation,
    Brightness,
}

impl StateType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Binary => "binary",
            Self::Hue => "hue",
            Self::Saturation => "saturation",
            Self::Brightness => "brightness",
        }
    }

    /// The characteristic that carries this channel.
    #[must_use]
    pub fn characteristic(self) -> CharacteristicKind {
        match self {
            Self::Binary => CharacteristicKind::On,
            Self::Hue => CharacteristicKind::Hue,
            Self::Saturation => CharacteristicKind::Saturation,
            Self::Brightness => CharacteristicKind::Brightness,
        }
    }

    /// Reverse of [`characteristic`](Self::characteristic).
    #[must_use]
    pub fn for_characteristic(kind: CharacteristicKind) -> Option<Self> {
        match kind {
            CharacteristicKind::On => Some(Self::Binary),
            CharacteristicKind::Hue => Some(Self::Hue),
            CharacteristicKind::Saturation => Some(Self::Saturation),
            CharacteristicKind::Brightness => Some(Self::Brightness),
            CharacteristicKind::MotionDetected
            | CharacteristicKind::StatusLowBattery
            | CharacteristicKind::BatteryLevel
            | CharacteristicKind::ChargingState => None,
        }
    }
}

impl fmt::Display for StateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse the leading integer of `raw`: optional sign, then digits. Anything
/// after the digits is ignored, so `"80.5"` is `80`.
///
/// # Errors
///
/// Returns [`TransformError::InvalidNumber`] when `raw` does not start with
/// an integer.
pub fn parse_int(raw: &str) -> Result<i64, TransformError> {
    let trimmed = raw.trim_start();
    let sign_len = usize::from(trimmed.starts_with(['+', '-']));
    let digits = trimmed[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits == 0 {
        return Err(TransformError::InvalidNumber(raw.to_string()));
    }
    trimmed[..sign_len + digits]
        .parse()
        .map_err(|_| TransformError::InvalidNumber(raw.to_string()))
}

/// Parse the numeric part of a state such as `"21.5"` or `"85 %"`.
///
/// # Errors
///
/// Returns [`TransformError::InvalidNumber`] when no number can be read.
pub fn parse_number(raw: &str) -> Result<f64, TransformError> {
    raw.split_whitespace()
        .next()
        .and_then(|token| token.parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .ok_or_else(|| TransformError::InvalidNumber(raw.to_string()))
}

/// Component `index` of an `H,S,B` tuple.
///
/// # Errors
///
/// Returns [`TransformError::MissingComponent`] for short tuples.
pub fn component(state: &str, index: usize) -> Result<&str, TransformError> {
    state
        .split(',')
        .nth(index)
        .ok_or_else(|| TransformError::MissingComponent {
            state: state.to_string(),
            index,
        })
}

fn unsupported(state_type: StateType, item_type: ItemType, state: &str) -> TransformError {
    TransformError::UnsupportedItemType {
        state_type: state_type.as_str(),
        item_type,
        state: state.to_string(),
    }
}

fn correct_inbound(level: i64) -> i64 {
    if level == REPORTED_MAX { FULL } else { level }
}

#[allow(clippy::float_cmp, clippy::cast_precision_loss)]
fn correct_outbound(level: f64) -> f64 {
    if level == FULL as f64 {
        REPORTED_MAX as f64
    } else {
        level
    }
}

/// Decode a light channel from the raw state of an item.
///
/// # Errors
///
/// Returns [`TransformError`] when the item type cannot carry the channel or
/// the state is malformed.
pub fn decode(
    state_type: StateType,
    item_type: ItemType,
    state: &str,
) -> Result<CharacteristicValue, TransformError> {
    match (state_type, item_type) {
        (StateType::Binary, ItemType::Switch) => Ok(CharacteristicValue::Bool(state == "ON")),
        (StateType::Binary, ItemType::Dimmer) => {
            Ok(CharacteristicValue::Bool(parse_int(state)? > 0))
        }
        (StateType::Binary, ItemType::Color) => {
            Ok(CharacteristicValue::Bool(parse_int(component(state, 2)?)? > 0))
        }
        (StateType::Hue, ItemType::Color) => {
            Ok(CharacteristicValue::Int(parse_int(component(state, 0)?)?))
        }
        (StateType::Saturation, ItemType::Color) => {
            Ok(CharacteristicValue::Int(parse_int(component(state, 1)?)?))
        }
        (StateType::Brightness, ItemType::Dimmer) => {
            Ok(CharacteristicValue::Int(correct_inbound(parse_int(state)?)))
        }
        (StateType::Brightness, ItemType::Color) => Ok(CharacteristicValue::Int(
            correct_inbound(parse_int(component(state, 2)?)?),
        )),
        (_, other) => Err(unsupported(state_type, other, state)),
    }
}

/// Encode a single-channel characteristic value as a command string.
///
/// # Errors
///
/// Returns [`TransformError::UnexpectedValue`] when the value has the wrong
/// shape for the channel.
pub fn encode(state_type: StateType, value: &CharacteristicValue) -> Result<String, TransformError> {
    encode_command(state_type, value).map(|command| command.to_string())
}

/// Encode a single-channel characteristic value as the command carrying it.
///
/// This is the only place the outbound scalar rules live: binary becomes
/// `ON`/`OFF`, brightness is sent with `100 → 99`, hue and saturation as-is.
///
/// # Errors
///
/// Returns [`TransformError::UnexpectedValue`] when the value has the wrong
/// shape for the channel.
pub fn encode_command(
    state_type: StateType,
    value: &CharacteristicValue,
) -> Result<Command, TransformError> {
    let unexpected = || TransformError::UnexpectedValue {
        state_type: state_type.as_str(),
        value: value.to_string(),
    };
    match state_type {
        StateType::Binary => value.as_bool().map(Command::switch).ok_or_else(unexpected),
        StateType::Brightness => {
            let level = value.as_f64().ok_or_else(unexpected)?;
            Ok(Command::Level(correct_outbound(level)))
        }
        StateType::Hue | StateType::Saturation => {
            value.as_f64().map(Command::Level).ok_or_else(unexpected)
        }
    }
}

/// Format a number the way the remote server expects: integers without a
/// fractional part.
#[must_use]
pub fn format_number(value: f64) -> String {
    value.to_string()
}

/// How a characteristic is fed from its backing item.
#[derive(Debug, Clone, PartialEq)]
pub enum Transformation {
    /// A light channel, decoded per item type.
    Channel(StateType),
    /// `ON`/`OFF`/`OPEN`/`CLOSED` mapped onto two characteristic values.
    Binary(BinaryMapping),
    /// A numeric state compared against a threshold.
    Threshold(ThresholdMapping),
    /// A numeric state passed through as-is.
    Numeric,
}

impl Transformation {
    /// Decode a raw state.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError`] when the state cannot be mapped.
    pub fn decode(
        &self,
        item_type: ItemType,
        state: &str,
    ) -> Result<CharacteristicValue, TransformError> {
        match self {
            Self::Channel(state_type) => decode(*state_type, item_type, state),
            Self::Binary(mapping) => mapping.apply(state),
            Self::Threshold(mapping) => mapping.apply(state),
            Self::Numeric => decode_numeric(state),
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn decode_numeric(state: &str) -> Result<CharacteristicValue, TransformError> {
    let value = parse_number(state)?;
    if value.fract() == 0.0 && value.is_finite() {
        Ok(CharacteristicValue::Int(value as i64))
    } else {
        Ok(CharacteristicValue::Float(value))
    }
}

/// Declarative binding of one characteristic to one item.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformationSpec {
    pub item: Item,
    pub accepted: Vec<ItemType>,
    pub transformation: Transformation,
}

impl TransformationSpec {
    pub fn new(item: Item, accepted: &[ItemType], transformation: Transformation) -> Self {
        Self {
            item,
            accepted: accepted.to_vec(),
            transformation,
        }
    }
}
