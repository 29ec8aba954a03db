//! openHAB connection configuration.

use std::time::Duration;

use serde::Deserialize;

/// Configuration for the openHAB REST adapter.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpenHabConfig {
    /// Base URL of the openHAB server, without the `/rest` suffix.
    pub url: String,
    /// Delay before reconnecting a dropped event stream, in seconds.
    pub reconnect_delay_secs: u64,
    /// Capacity of the in-process broadcast of state changes.
    pub event_buffer: usize,
}

impl Default for OpenHabConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080".to_string(),
            reconnect_delay_secs: 5,
            event_buffer: 256,
        }
    }
}

impl OpenHabConfig {
    #[must_use]
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }

    pub(crate) fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}
