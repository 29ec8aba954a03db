//! Remote state port: reading, commanding and watching items on the
//! home-automation server.

use std::future::Future;

use tokio::sync::broadcast;

use habridge_domain::error::{BridgeError, TransportError};
use habridge_domain::event::ItemStateChanged;
use habridge_domain::item::Item;

/// Access to the items of the remote server.
///
/// Implementations live in adapter crates (`adapter_openhab`,
/// `adapter_virtual`). Every call may fail with a transport error; wrap an
/// implementation in [`TimedRemote`](crate::services::timeout::TimedRemote)
/// to bound each call.
pub trait RemoteStateService: Send + Sync {
    /// Look up an item and its declared type.
    ///
    /// Fails with [`ConfigurationError::ItemNotFound`] when the item does not
    /// exist.
    ///
    /// [`ConfigurationError::ItemNotFound`]: habridge_domain::error::ConfigurationError::ItemNotFound
    fn item(&self, name: &str) -> impl Future<Output = Result<Item, BridgeError>> + Send;

    /// Current raw state of an item (`ON`, `42`, `120,50,80`, `NULL`, ...).
    fn get_state(&self, item: &str) -> impl Future<Output = Result<String, BridgeError>> + Send;

    /// Send a raw command string to an item.
    fn send_command(
        &self,
        item: &str,
        command: &str,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// Watch the state changes of one item.
    fn subscribe(&self, item: &str) -> StateSubscription;
}

impl<T: RemoteStateService> RemoteStateService for std::sync::Arc<T> {
    fn item(&self, name: &str) -> impl Future<Output = Result<Item, BridgeError>> + Send {
        (**self).item(name)
    }

    fn get_state(&self, item: &str) -> impl Future<Output = Result<String, BridgeError>> + Send {
        (**self).get_state(item)
    }

    fn send_command(
        &self,
        item: &str,
        command: &str,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        (**self).send_command(item, command)
    }

    fn subscribe(&self, item: &str) -> StateSubscription {
        (**self).subscribe(item)
    }
}

/// State changes of a single item, filtered out of a shared broadcast of
/// every item change.
#[derive(Debug)]
pub struct StateSubscription {
    item: String,
    receiver: broadcast::Receiver<ItemStateChanged>,
}

impl StateSubscription {
    pub fn new(item: impl Into<String>, receiver: broadcast::Receiver<ItemStateChanged>) -> Self {
        Self {
            item: item.into(),
            receiver,
        }
    }

    /// Wait for the next state of the watched item.
    ///
    /// Lagging behind the broadcast only skips stale states; the next one is
    /// still delivered.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::SubscriptionClosed`] once the source of
    /// events is gone.
    pub async fn next(&mut self) -> Result<String, BridgeError> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if event.item == self.item => return Ok(event.state),
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(item = %self.item, skipped, "state subscription lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    return Err(TransportError::SubscriptionClosed.into());
                }
            }
        }
    }
}
