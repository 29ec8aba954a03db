//! A simulated item and how it reacts to commands.

use serde::Deserialize;

use habridge_domain::item::{Item, ItemType};
use habridge_domain::transform::{format_number, parse_number};

/// Highest level a simulated dimmer or color item ever reports.
const REPORTED_MAX: f64 = 99.0;

/// Declaration of a simulated item, as read from `[[virtual_items]]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VirtualItemConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    #[serde(default = "default_state")]
    pub state: String,
}

fn default_state() -> String {
    "NULL".to_string()
}

/// A simulated item holding its current state.
#[derive(Debug, Clone)]
pub(crate) struct VirtualItem {
    pub item: Item,
    pub state: String,
}

impl VirtualItem {
    pub(crate) fn new(config: VirtualItemConfig) -> Self {
        Self {
            item: Item::new(config.name, config.item_type),
            state: config.state,
        }
    }

    /// The state the item takes after receiving `command`, or `None` when
    /// the item does not accept it.
    pub(crate) fn next_state(&self, command: &str) -> Option<String> {
        match self.item.item_type {
            ItemType::Switch => matches!(command, "ON" | "OFF").then(|| command.to_string()),
            ItemType::Contact => matches!(command, "OPEN" | "CLOSED").then(|| command.to_string()),
            ItemType::Dimmer => match command {
                "ON" => Some(format_number(REPORTED_MAX)),
                "OFF" => Some("0".to_string()),
                other => level(other).map(format_number),
            },
            ItemType::Color => self.next_color(command),
            ItemType::Number => parse_number(command).ok().map(|_| command.to_string()),
            _ => Some(command.to_string()),
        }
    }

    fn next_color(&self, command: &str) -> Option<String> {
        let (hue, saturation) = self
            .state
            .split_once(',')
            .and_then(|(hue, rest)| Some((hue, rest.split_once(',')?.0)))
            .unwrap_or(("0", "0"));
        let parts: Vec<&str> = command.split(',').collect();
        match parts.as_slice() {
            ["ON"] => Some(format!("{hue},{saturation},{}", format_number(REPORTED_MAX))),
            ["OFF"] => Some(format!("{hue},{saturation},0")),
            [brightness] => level(brightness).map(|b| format!("{hue},{saturation},{}", format_number(b))),
            [h, s, b] => {
                let h = h.trim().parse::<f64>().ok()?;
                let s = s.trim().parse::<f64>().ok()?;
                let b = level(b)?;
                Some(format!("{},{},{}", format_number(h), format_number(s), format_number(b)))
            }
            _ => None,
        }
    }
}

fn level(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| (0.0..=100.0).contains(v))
        .map(|v| v.min(REPORTED_MAX))
}
