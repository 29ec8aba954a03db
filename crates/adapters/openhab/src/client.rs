//! REST client implementing [`RemoteStateService`] against openHAB.

use std::sync::Arc;

use reqwest::StatusCode;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Deserialize;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use habridge_app::ports::{RemoteStateService, StateSubscription};
use habridge_domain::error::BridgeError;
use habridge_domain::event::ItemStateChanged;
use habridge_domain::item::{Item, ItemType};

use crate::config::OpenHabConfig;
use crate::error::OpenHabError;
use crate::events::{SseBuffer, TOPICS, parse_event};

#[derive(Debug, Deserialize)]
struct ItemDescription {
    name: String,
    #[serde(rename = "type")]
    item_type: String,
}

/// openHAB REST client.
///
/// State changes are received by a single event stream (see
/// [`start_events`](Self::start_events)) and fanned out to every
/// [`StateSubscription`].
#[derive(Debug, Clone)]
pub struct OpenHabClient {
    http: reqwest::Client,
    config: Arc<OpenHabConfig>,
    sender: broadcast::Sender<ItemStateChanged>,
}

impl OpenHabClient {
    #[must_use]
    pub fn new(config: OpenHabConfig) -> Self {
        let (sender, _) = broadcast::channel(config.event_buffer.max(1));
        Self {
            http: reqwest::Client::new(),
            config: Arc::new(config),
            sender,
        }
    }

    fn item_url(&self, item: &str) -> String {
        format!("{}/rest/items/{item}", self.config.base_url())
    }

    async fn fetch_item(&self, name: &str) -> Result<Item, OpenHabError> {
        let request_error = |source| OpenHabError::Request {
            item: name.to_string(),
            operation: "item",
            source,
        };
        let response = self
            .http
            .get(self.item_url(name))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(request_error)?;
        match response.status() {
            StatusCode::NOT_FOUND => return Err(OpenHabError::ItemNotFound(name.to_string())),
            status if !status.is_success() => {
                return Err(OpenHabError::Status {
                    item: name.to_string(),
                    operation: "item",
                    status: status.as_u16(),
                });
            }
            _ => {}
        }
        let description: ItemDescription = response.json().await.map_err(request_error)?;
        let item_type: ItemType =
            description
                .item_type
                .parse()
                .map_err(|source| OpenHabError::InvalidItem {
                    item: name.to_string(),
                    source,
                })?;
        Ok(Item::new(description.name, item_type))
    }

    async fn fetch_state(&self, item: &str) -> Result<String, OpenHabError> {
        let request_error = |source| OpenHabError::Request {
            item: item.to_string(),
            operation: "get_state",
            source,
        };
        let response = self
            .http
            .get(format!("{}/state", self.item_url(item)))
            .header(ACCEPT, "text/plain")
            .send()
            .await
            .map_err(request_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(OpenHabError::Status {
                item: item.to_string(),
                operation: "get_state",
                status: status.as_u16(),
            });
        }
        response.text().await.map_err(request_error)
    }

    async fn post_command(&self, item: &str, command: &str) -> Result<(), OpenHabError> {
        let response = self
            .http
            .post(self.item_url(item))
            .header(CONTENT_TYPE, "text/plain")
            .body(command.to_string())
            .send()
            .await
            .map_err(|source| OpenHabError::Request {
                item: item.to_string(),
                operation: "send_command",
                source,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(OpenHabError::Status {
                item: item.to_string(),
                operation: "send_command",
                status: status.as_u16(),
            });
        }
        Ok(())
    }

    /// Spawn the task listening to the server's event stream.
    ///
    /// The task reconnects after `reconnect_delay_secs` whenever the stream
    /// fails or ends, and runs until the handle is aborted.
    #[must_use]
    pub fn start_events(&self) -> JoinHandle<()> {
        let client = self.clone();
        tokio::spawn(async move {
            loop {
                if let Err(err) = client.listen().await {
                    tracing::warn!(error = %err, "openHAB event stream failed");
                } else {
                    tracing::info!("openHAB event stream ended");
                }
                tokio::time::sleep(client.config.reconnect_delay()).await;
            }
        })
    }

    async fn listen(&self) -> Result<(), OpenHabError> {
        let url = format!("{}/rest/events", self.config.base_url());
        let mut response = self
            .http
            .get(url)
            .query(&[("topics", TOPICS)])
            .header(ACCEPT, "text/event-stream")
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(OpenHabError::EventStream)?;
        tracing::info!(url = %self.config.base_url(), "connected to openHAB event stream");

        let mut buffer = SseBuffer::default();
        while let Some(chunk) = response.chunk().await.map_err(OpenHabError::EventStream)? {
            for data in buffer.push(&chunk) {
                match parse_event(&data) {
                    Ok(Some(event)) => self.dispatch(event),
                    Ok(None) => {}
                    Err(err) => tracing::debug!(error = %err, "skipping event"),
                }
            }
        }
        Ok(())
    }

    /// Fan a state change out to the subscriptions.
    fn dispatch(&self, event: ItemStateChanged) {
        tracing::trace!(item = %event.item, state = %event.state, "item state changed");
        // no subscriber yet is fine, bindings read the state on demand
        let _ = self.sender.send(event);
    }
}

impl RemoteStateService for OpenHabClient {
    async fn item(&self, name: &str) -> Result<Item, BridgeError> {
        Ok(self.fetch_item(name).await?)
    }

    async fn get_state(&self, item: &str) -> Result<String, BridgeError> {
        Ok(self.fetch_state(item).await?)
    }

    async fn send_command(&self, item: &str, command: &str) -> Result<(), BridgeError> {
        tracing::debug!(item, command, "sending command to openHAB");
        Ok(self.post_command(item, command).await?)
    }

    fn subscribe(&self, item: &str) -> StateSubscription {
        StateSubscription::new(item, self.sender.subscribe())
    }
}
