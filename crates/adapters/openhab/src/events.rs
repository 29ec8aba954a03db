//! Server-sent state change events.
//!
//! openHAB publishes item events on `/rest/events`. Each event carries a
//! JSON document whose `topic` names the item
//! (`openhab/items/<name>/statechanged`, or `smarthome/...` on older
//! servers) and whose `payload` is itself a JSON string holding the new
//! `value`.

use serde::Deserialize;

use habridge_domain::event::ItemStateChanged;

use crate::error::OpenHabError;

/// Topic filter requested from the server.
pub(crate) const TOPICS: &str = "openhab/items/*/statechanged,smarthome/items/*/statechanged";

#[derive(Debug, Deserialize)]
struct RawEvent {
    topic: String,
    payload: String,
}

#[derive(Debug, Deserialize)]
struct StatePayload {
    value: String,
}

/// Parse the `data` of one event.
///
/// Returns `Ok(None)` for events that are not item state changes.
///
/// # Errors
///
/// Returns [`OpenHabError::EventPayload`] when the data is not the expected
/// JSON.
pub fn parse_event(data: &str) -> Result<Option<ItemStateChanged>, OpenHabError> {
    let raw: RawEvent = serde_json::from_str(data).map_err(OpenHabError::EventPayload)?;
    let Some(item) = item_of(&raw.topic) else {
        return Ok(None);
    };
    let payload: StatePayload =
        serde_json::from_str(&raw.payload).map_err(OpenHabError::EventPayload)?;
    Ok(Some(ItemStateChanged::new(item, payload.value)))
}

fn item_of(topic: &str) -> Option<&str> {
    let mut parts = topic.split('/');
    match (parts.next(), parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some("openhab" | "smarthome"), Some("items"), Some(item), Some("statechanged"), None) => {
            Some(item)
        }
        _ => None,
    }
}

/// Splits a byte stream into the `data` of complete server-sent events.
#[derive(Debug, Default)]
pub struct SseBuffer {
    pending: Vec<u8>,
}

impl SseBuffer {
    /// Feed a chunk; returns the data of every event completed by it.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend(chunk.iter().filter(|b| **b != b'\r'));
        let mut events = Vec::new();
        while let Some(end) = self.pending.windows(2).position(|w| w == b"\n\n") {
            let block: Vec<u8> = self.pending.drain(..end + 2).collect();
            let block = String::from_utf8_lossy(&block);
            let data: Vec<&str> = block
                .lines()
                .filter_map(|line| line.strip_prefix("data:"))
                .map(|value| value.strip_prefix(' ').unwrap_or(value))
                .collect();
            if !data.is_empty() {
                events.push(data.join("\n"));
            }
        }
        events
    }
}
