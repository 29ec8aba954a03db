//! In-memory test doubles for the ports.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::broadcast;

use habridge_domain::error::{BridgeError, ConfigurationError, TransportError};
use habridge_domain::event::ItemStateChanged;
use habridge_domain::item::{Item, ItemType};

use crate::ports::{RemoteStateService, StateSubscription};

/// A remote server holding items in memory and recording every command.
pub(crate) struct StubRemote {
    items: Mutex<HashMap<String, Item>>,
    states: Mutex<HashMap<String, String>>,
    commands: Mutex<Vec<(String, String)>>,
    failing: Mutex<HashSet<String>>,
    reads: AtomicUsize,
    read_delay: Mutex<Option<Duration>>,
    sender: broadcast::Sender<ItemStateChanged>,
}

impl StubRemote {
    pub(crate) fn new() -> Self {
        let (sender, _) = broadcast::channel(64);
        Self {
            items: Mutex::new(HashMap::new()),
            states: Mutex::new(HashMap::new()),
            commands: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
            reads: AtomicUsize::new(0),
            read_delay: Mutex::new(None),
            sender,
        }
    }

    pub(crate) fn with_item(self, name: &str, item_type: ItemType, state: &str) -> Self {
        self.items
            .lock()
            .unwrap()
            .insert(name.to_string(), Item::new(name, item_type));
        self.states
            .lock()
            .unwrap()
            .insert(name.to_string(), state.to_string());
        self
    }

    pub(crate) fn with_read_delay(self, delay: Duration) -> Self {
        *self.read_delay.lock().unwrap() = Some(delay);
        self
    }

    pub(crate) fn fail_reads(&self, item: &str) {
        self.failing.lock().unwrap().insert(item.to_string());
    }

    pub(crate) fn set_state(&self, item: &str, state: &str) {
        self.states
            .lock()
            .unwrap()
            .insert(item.to_string(), state.to_string());
    }

    /// Update the state and notify subscribers, as the server would.
    pub(crate) fn push(&self, item: &str, state: &str) {
        self.set_state(item, state);
        let _ = self.sender.send(ItemStateChanged::new(item, state));
    }

    pub(crate) fn commands(&self) -> Vec<(String, String)> {
        self.commands.lock().unwrap().clone()
    }

    pub(crate) fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl RemoteStateService for StubRemote {
    async fn item(&self, name: &str) -> Result<Item, BridgeError> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| {
                ConfigurationError::ItemNotFound {
                    item: name.to_string(),
                }
                .into()
            })
    }

    async fn get_state(&self, item: &str) -> Result<String, BridgeError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let delay = *self.read_delay.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self
            .failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(item)
        {
            return Err(TransportError::Status {
                item: item.to_string(),
                operation: "get_state",
                status: 500,
            }
            .into());
        }
        Ok(self
            .states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(item)
            .cloned()
            .unwrap_or_else(|| "NULL".to_string()))
    }

    async fn send_command(&self, item: &str, command: &str) -> Result<(), BridgeError> {
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((item.to_string(), command.to_string()));
        Ok(())
    }

    fn subscribe(&self, item: &str) -> StateSubscription {
        StateSubscription::new(item, self.sender.subscribe())
    }
}
