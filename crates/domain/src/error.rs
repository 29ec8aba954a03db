//! Common error types used across the workspace.
//!
//! Every fallible operation returns [`BridgeError`]. Each variant wraps a
//! typed sub-error so callers can match on the *kind* of failure (a fatal
//! configuration problem, a malformed state, a commit race, a transport
//! failure) instead of inspecting messages.

use std::time::Duration;

use crate::characteristic::CharacteristicKind;
use crate::item::ItemType;

/// Top-level error for the bridge.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("transform error: {0}")]
    Transform(#[from] TransformError),

    #[error("race condition: {0}")]
    RaceCondition(#[from] RaceConditionError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("not found: {0}")]
    NotFound(#[from] NotFoundError),
}

impl BridgeError {
    /// Whether this error must abort the construction of an accessory.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

/// Missing or invalid backing item for a characteristic.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("accessory {accessory} has no `{key}` configured")]
    MissingKey { accessory: String, key: String },

    #[error("item {item} does not exist on the remote server")]
    ItemNotFound { item: String },

    #[error("item {item} has type {actual}, expected one of {}", format_types(.accepted))]
    UnsupportedItemType {
        item: String,
        actual: ItemType,
        accepted: Vec<ItemType>,
    },

    #[error("unknown item type `{0}`")]
    UnknownItemType(String),

    #[error("required `{key}` for {accessory} not defined")]
    MissingThreshold { accessory: String, key: String },

    #[error("`{key}` for {accessory} is not a number: {value}")]
    InvalidThreshold {
        accessory: String,
        key: String,
        value: String,
    },

    #[error("not configuring {characteristic} characteristic for {accessory}: {source}")]
    CharacteristicUnavailable {
        accessory: String,
        characteristic: CharacteristicKind,
        #[source]
        source: Box<BridgeError>,
    },
}

fn format_types(types: &[ItemType]) -> String {
    types
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A raw state that cannot be turned into a characteristic value (or back).
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("unable to parse {state_type} state from {item_type} item: {state}")]
    UnsupportedItemType {
        state_type: &'static str,
        item_type: ItemType,
        state: String,
    },

    #[error("not a number: {0:?}")]
    InvalidNumber(String),

    #[error("state {state:?} has no component {index}")]
    MissingComponent { state: String, index: usize },

    #[error("no mapping for state {0:?}")]
    UnmappedState(String),

    #[error("cannot encode {value} as {state_type} command")]
    UnexpectedValue {
        state_type: &'static str,
        value: String,
    },

    #[error("unable to decode {characteristic} from item {item}: {source}")]
    Decode {
        item: String,
        characteristic: CharacteristicKind,
        #[source]
        source: Box<TransformError>,
    },
}

impl TransformError {
    /// Attach the item and characteristic the failure happened on.
    #[must_use]
    pub fn decoding(self, item: &str, characteristic: CharacteristicKind) -> Self {
        Self::Decode {
            item: item.to_string(),
            characteristic,
            source: Box::new(self),
        }
    }
}

/// A commit that could not produce a coherent command.
#[derive(Debug, thiserror::Error)]
pub enum RaceConditionError {
    #[error("commit for item {item} was called before set")]
    CommitBeforeSet { item: String },

    #[error("unable to retrieve current state of item {item}")]
    CurrentStateUnavailable {
        item: String,
        #[source]
        source: Option<Box<BridgeError>>,
    },
}

/// Failure talking to the remote server.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("{operation} for item {item} timed out after {}ms", .after.as_millis())]
    Timeout {
        item: String,
        operation: &'static str,
        after: Duration,
    },

    #[error("{operation} for item {item} failed with status {status}")]
    Status {
        item: String,
        operation: &'static str,
        status: u16,
    },

    #[error("{operation} for item {item} failed")]
    Request {
        item: String,
        operation: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("state subscription closed")]
    SubscriptionClosed,
}

/// A host request that does not fit the characteristic it targets.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("{characteristic} of {accessory} is read-only")]
    ReadOnly {
        accessory: String,
        characteristic: CharacteristicKind,
    },

    #[error("{characteristic} expects a {expected} value, got {actual}")]
    UnexpectedValue {
        characteristic: CharacteristicKind,
        expected: &'static str,
        actual: String,
    },

    #[error("empty write batch for {accessory}")]
    EmptyBatch { accessory: String },
}

/// The requested accessory or characteristic does not exist.
#[derive(Debug, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_name_item_and_accepted_types_in_type_mismatch() {
        let err = ConfigurationError::UnsupportedItemType {
            item: "Hallway_Light".to_string(),
            actual: ItemType::String,
            accepted: vec![ItemType::Switch, ItemType::Dimmer],
        };
        assert_eq!(
            err.to_string(),
            "item Hallway_Light has type String, expected one of Switch, Dimmer"
        );
    }

    #[test]
    fn should_name_characteristic_when_required_characteristic_fails() {
        let err = ConfigurationError::CharacteristicUnavailable {
            accessory: "Battery".to_string(),
            characteristic: CharacteristicKind::StatusLowBattery,
            source: Box::new(
                ConfigurationError::ItemNotFound {
                    item: "Battery_Low".to_string(),
                }
                .into(),
            ),
        };
        let msg = err.to_string();
        assert!(msg.contains("StatusLowBattery"));
        assert!(msg.contains("Battery"));
        assert!(msg.contains("Battery_Low"));
    }

    #[test]
    fn should_format_timeout_in_milliseconds() {
        let err = TransportError::Timeout {
            item: "Kitchen_Light".to_string(),
            operation: "get_state",
            after: Duration::from_secs(2),
        };
        assert_eq!(
            err.to_string(),
            "get_state for item Kitchen_Light timed out after 2000ms"
        );
    }

    #[test]
    fn should_classify_configuration_errors() {
        let err: BridgeError = ConfigurationError::ItemNotFound {
            item: "x".to_string(),
        }
        .into();
        assert!(err.is_configuration());

        let err: BridgeError = TransformError::InvalidNumber("NULL".to_string()).into();
        assert!(!err.is_configuration());
    }

    #[test]
    fn should_name_item_and_characteristic_in_decode_error() {
        let err: BridgeError = TransformError::InvalidNumber("NULL".to_string())
            .decoding("Kitchen_Light", CharacteristicKind::Brightness)
            .into();
        assert_eq!(
            err.to_string(),
            "transform error: unable to decode Brightness from item Kitchen_Light: not a number: \"NULL\""
        );
    }

    #[test]
    fn should_convert_race_condition_into_bridge_error() {
        let err: BridgeError = RaceConditionError::CommitBeforeSet {
            item: "Light".to_string(),
        }
        .into();
        assert!(matches!(
            err,
            BridgeError::RaceCondition(RaceConditionError::CommitBeforeSet { .. })
        ));
    }
}
