//! Item: an addressable unit of state on the remote server.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Declared type of a remote item.
///
/// Dimensioned numbers (`Number:Temperature`, `Number:Dimensionless`, …) are
/// all [`Number`](Self::Number); the dimension is irrelevant to the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ItemType {
    Call,
    Color,
    Contact,
    DateTime,
    Dimmer,
    Group,
    Image,
    Location,
    Number,
    Player,
    Rollershutter,
    String,
    Switch,
}

impl ItemType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Call => "Call",
            Self::Color => "Color",
            Self::Contact => "Contact",
            Self::DateTime => "DateTime",
            Self::Dimmer => "Dimmer",
            Self::Group => "Group",
            Self::Image => "Image",
            Self::Location => "Location",
            Self::Number => "Number",
            Self::Player => "Player",
            Self::Rollershutter => "Rollershutter",
            Self::String => "String",
            Self::Switch => "Switch",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let base = s.split_once(':').map_or(s, |(base, _)| base);
        match base {
            "Call" => Ok(Self::Call),
            "Color" => Ok(Self::Color),
            "Contact" => Ok(Self::Contact),
            "DateTime" => Ok(Self::DateTime),
            "Dimmer" => Ok(Self::Dimmer),
            "Group" => Ok(Self::Group),
            "Image" => Ok(Self::Image),
            "Location" => Ok(Self::Location),
            "Number" => Ok(Self::Number),
            "Player" => Ok(Self::Player),
            "Rollershutter" => Ok(Self::Rollershutter),
            "String" => Ok(Self::String),
            "Switch" => Ok(Self::Switch),
            _ => Err(ConfigurationError::UnknownItemType(s.to_string())),
        }
    }
}

impl TryFrom<String> for ItemType {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ItemType> for String {
    fn from(value: ItemType) -> Self {
        value.as_str().to_string()
    }
}

/// A remote item as known to the bridge: its name and declared type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
}

impl Item {
    pub fn new(name: impl Into<String>, item_type: ItemType) -> Self {
        Self {
            name: name.into(),
            item_type,
        }
    }

    /// Check the declared type against the accepted set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::UnsupportedItemType`] when the item's
    /// type is not in `accepted`.
    pub fn check_type(&self, accepted: &[ItemType]) -> Result<(), ConfigurationError> {
        if accepted.contains(&self.item_type) {
            Ok(())
        } else {
            Err(ConfigurationError::UnsupportedItemType {
                item: self.name.clone(),
                actual: self.item_type,
                accepted: accepted.to_vec(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_plain_item_type() {
        assert_eq!("Color".parse::<ItemType>().unwrap(), ItemType::Color);
        assert_eq!("Switch".parse::<ItemType>().unwrap(), ItemType::Switch);
    }

    #[test]
    fn should_ignore_number_dimension() {
        assert_eq!(
            "Number:Temperature".parse::<ItemType>().unwrap(),
            ItemType::Number
        );
    }

    #[test]
    fn should_reject_unknown_item_type() {
        let result = "Thermostat".parse::<ItemType>();
        assert!(matches!(result, Err(ConfigurationError::UnknownItemType(_))));
    }

    #[test]
    fn should_accept_item_with_listed_type() {
        let item = Item::new("Hallway_Motion", ItemType::Contact);
        assert!(item.check_type(&[ItemType::Switch, ItemType::Contact]).is_ok());
    }

    #[test]
    fn should_reject_item_with_unlisted_type() {
        let item = Item::new("Hallway_Motion", ItemType::Number);
        let err = item
            .check_type(&[ItemType::Switch, ItemType::Contact])
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::UnsupportedItemType {
                actual: ItemType::Number,
                ..
            }
        ));
    }

    #[test]
    fn should_deserialize_item_from_rest_payload() {
        let json = r#"{"name": "Desk_Lamp", "type": "Dimmer"}"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item, Item::new("Desk_Lamp", ItemType::Dimmer));
    }
}
