//! # habridge-adapter-virtual
//!
//! Virtual/demo remote server holding items in memory.
//!
//! Items react to commands the way an openHAB server does (including the
//! dimmer ceiling of `99`) and every state change is pushed to subscribers,
//! so the whole bridge can run without a real server.
//!
//! ## Dependency rule
//!
//! Depends on `habridge-app` (port traits) and `habridge-domain` only.

mod item;

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;

use habridge_app::ports::{RemoteStateService, StateSubscription};
use habridge_domain::error::{BridgeError, ConfigurationError, TransportError};
use habridge_domain::event::ItemStateChanged;
use habridge_domain::item::Item;

pub use item::VirtualItemConfig;
use item::VirtualItem;

/// In-memory remote server.
pub struct VirtualRemote {
    items: Mutex<HashMap<String, VirtualItem>>,
    commands: Mutex<Vec<(String, String)>>,
    sender: broadcast::Sender<ItemStateChanged>,
}

impl VirtualRemote {
    /// Create a server with the given items.
    #[must_use]
    pub fn new(items: impl IntoIterator<Item = VirtualItemConfig>) -> Self {
        let (sender, _) = broadcast::channel(256);
        let items = items
            .into_iter()
            .map(|config| (config.name.clone(), VirtualItem::new(config)))
            .collect();
        Self {
            items: Mutex::new(items),
            commands: Mutex::new(Vec::new()),
            sender,
        }
    }

    /// Change the state of an item from the server side (a sensor firing,
    /// someone flipping a wall switch, ...) and notify subscribers.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::ItemNotFound`] for an unknown item.
    pub fn update_state(&self, item: &str, state: &str) -> Result<(), BridgeError> {
        {
            let mut items = self.lock_items();
            let entry = items.get_mut(item).ok_or_else(|| not_found(item))?;
            entry.state = state.to_string();
        }
        self.notify(item, state);
        Ok(())
    }

    /// Every command the items accepted so far, oldest first. Rejected
    /// commands and commands for unknown items are not recorded.
    #[must_use]
    pub fn commands(&self) -> Vec<(String, String)> {
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn lock_items(&self) -> MutexGuard<'_, HashMap<String, VirtualItem>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, item: &str, state: &str) {
        tracing::debug!(item, state, "virtual item changed");
        // no receivers simply means nobody is subscribed yet
        let _ = self.sender.send(ItemStateChanged::new(item, state));
    }
}

fn not_found(item: &str) -> BridgeError {
    ConfigurationError::ItemNotFound {
        item: item.to_string(),
    }
    .into()
}

impl RemoteStateService for VirtualRemote {
    async fn item(&self, name: &str) -> Result<Item, BridgeError> {
        self.lock_items()
            .get(name)
            .map(|entry| entry.item.clone())
            .ok_or_else(|| not_found(name))
    }

    async fn get_state(&self, item: &str) -> Result<String, BridgeError> {
        self.lock_items()
            .get(item)
            .map(|entry| entry.state.clone())
            .ok_or_else(|| not_found(item))
    }

    async fn send_command(&self, item: &str, command: &str) -> Result<(), BridgeError> {
        let changed = {
            let mut items = self.lock_items();
            let entry = items.get_mut(item).ok_or_else(|| not_found(item))?;
            let next = entry.next_state(command).ok_or_else(|| {
                tracing::warn!(item, command, "virtual item rejected command");
                BridgeError::from(TransportError::Status {
                    item: item.to_string(),
                    operation: "send_command",
                    status: 400,
                })
            })?;
            (next != entry.state).then(|| {
                entry.state.clone_from(&next);
                next
            })
        };
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((item.to_string(), command.to_string()));
        if let Some(state) = changed {
            self.notify(item, &state);
        }
        Ok(())
    }

    fn subscribe(&self, item: &str) -> StateSubscription {
        StateSubscription::new(item, self.sender.subscribe())
    }
}
