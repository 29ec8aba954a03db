//! Bounding every remote call with a timeout.

use std::future::Future;
use std::time::Duration;

use habridge_domain::error::{BridgeError, TransportError};
use habridge_domain::item::Item;

use crate::ports::{RemoteStateService, StateSubscription};

/// Wraps a [`RemoteStateService`] so that no call stays pending forever.
///
/// A call that does not complete within `timeout` resolves to
/// [`TransportError::Timeout`]. Subscriptions are not bounded.
#[derive(Debug, Clone)]
pub struct TimedRemote<R> {
    inner: R,
    timeout: Duration,
}

impl<R> TimedRemote<R> {
    pub fn new(inner: R, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    async fn bounded<T>(
        &self,
        item: &str,
        operation: &'static str,
        call: impl Future<Output = Result<T, BridgeError>>,
    ) -> Result<T, BridgeError> {
        tokio::time::timeout(self.timeout, call)
            .await
            .unwrap_or_else(|_| {
                tracing::warn!(item, operation, timeout = ?self.timeout, "remote call timed out");
                Err(TransportError::Timeout {
                    item: item.to_string(),
                    operation,
                    after: self.timeout,
                }
                .into())
            })
    }
}

impl<R: RemoteStateService> RemoteStateService for TimedRemote<R> {
    async fn item(&self, name: &str) -> Result<Item, BridgeError> {
        self.bounded(name, "item", self.inner.item(name)).await
    }

    async fn get_state(&self, item: &str) -> Result<String, BridgeError> {
        self.bounded(item, "get_state", self.inner.get_state(item))
            .await
    }

    async fn send_command(&self, item: &str, command: &str) -> Result<(), BridgeError> {
        self.bounded(item, "send_command", self.inner.send_command(item, command))
            .await
    }

    fn subscribe(&self, item: &str) -> StateSubscription {
        self.inner.subscribe(item)
    }
}
