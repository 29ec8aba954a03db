//! Events flowing through the bridge.
//!
//! [`ItemStateChanged`] comes in from the remote server;
//! [`CharacteristicChanged`] goes out to the accessory host.

use serde::{Deserialize, Serialize};

use crate::characteristic::{CharacteristicKind, CharacteristicValue};
use crate::id::{AccessoryId, EventId};
use crate::time::{Timestamp, now};

/// A remote item reported a new state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStateChanged {
    pub item: String,
    pub state: String,
}

impl ItemStateChanged {
    pub fn new(item: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            state: state.into(),
        }
    }
}

/// A characteristic took a new value after a push from the remote server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacteristicChanged {
    pub id: EventId,
    pub accessory_id: AccessoryId,
    pub accessory: String,
    pub characteristic: CharacteristicKind,
    pub value: CharacteristicValue,
    pub timestamp: Timestamp,
}

impl CharacteristicChanged {
    pub fn new(
        accessory: impl Into<String>,
        characteristic: CharacteristicKind,
        value: CharacteristicValue,
    ) -> Self {
        let accessory = accessory.into();
        Self {
            id: EventId::new(),
            accessory_id: AccessoryId::from_name(&accessory),
            accessory,
            characteristic,
            value,
            timestamp: now(),
        }
    }
}
