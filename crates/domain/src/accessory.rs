//! What the accessory host sees of an assembled accessory.

use serde::{Deserialize, Serialize};

use crate::characteristic::{CharacteristicKind, CharacteristicValue, Format};
use crate::config::AccessoryKind;
use crate::id::AccessoryId;

/// A characteristic as exposed to the host.
///
/// A characteristic backed by an item is readable through the remote server
/// and, when `writable`, accepts writes. A characteristic with a
/// `static_value` is a fallback: it always reports that value. `value` is the
/// last value the bridge has seen, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacteristicDescriptor {
    pub kind: CharacteristicKind,
    pub format: Format,
    pub writable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_value: Option<CharacteristicValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<CharacteristicValue>,
}

impl CharacteristicDescriptor {
    /// A characteristic fed from `item` with the kind's default format.
    pub fn bound(kind: CharacteristicKind, item: impl Into<String>, writable: bool) -> Self {
        Self {
            kind,
            format: kind.default_format(),
            writable,
            item: Some(item.into()),
            static_value: None,
            value: None,
        }
    }

    /// A read-only characteristic that always reports `value`.
    #[must_use]
    pub fn fixed(kind: CharacteristicKind, format: Format, value: CharacteristicValue) -> Self {
        Self {
            kind,
            format,
            writable: false,
            item: None,
            static_value: Some(value.clone()),
            value: Some(value),
        }
    }
}

/// An assembled accessory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessorySummary {
    pub id: AccessoryId,
    pub name: String,
    pub kind: AccessoryKind,
    pub characteristics: Vec<CharacteristicDescriptor>,
}

impl AccessorySummary {
    #[must_use]
    pub fn characteristic(&self, kind: CharacteristicKind) -> Option<&CharacteristicDescriptor> {
        self.characteristics.iter().find(|c| c.kind == kind)
    }
}
