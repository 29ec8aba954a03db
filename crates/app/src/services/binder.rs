//! Subscription binder: ties a characteristic to one remote item.
//!
//! A [`Binding`] serves reads by fetching the item's state and decoding it,
//! and keeps a background task that turns every pushed state change into a
//! [`CharacteristicChanged`] for the host. Pushes are one-directional: they
//! never send a command back to the server.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::JoinHandle;

use habridge_domain::characteristic::{CharacteristicKind, CharacteristicValue};
use habridge_domain::config::AccessoryConfig;
use habridge_domain::error::BridgeError;
use habridge_domain::event::CharacteristicChanged;
use habridge_domain::item::{Item, ItemType};
use habridge_domain::transform::{Transformation, TransformationSpec};

use crate::ports::{AccessoryHost, RemoteStateService};

/// Creates [`Binding`]s against one remote server and one host.
#[derive(Clone)]
pub struct SubscriptionBinder<R, H> {
    remote: R,
    host: H,
}

impl<R, H> SubscriptionBinder<R, H>
where
    R: RemoteStateService + Clone + 'static,
    H: AccessoryHost + Clone + 'static,
{
    pub fn new(remote: R, host: H) -> Self {
        Self { remote, host }
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Look up the item configured under `key` and check its type.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the key is missing, the item does
    /// not exist or its type is not in `accepted`. Transport errors from the
    /// lookup are propagated as-is.
    pub async fn resolve_item(
        &self,
        config: &AccessoryConfig,
        key: &str,
        accepted: &[ItemType],
    ) -> Result<Item, BridgeError> {
        let name = config.item_name(key)?;
        let item = self.remote.item(&name).await?;
        item.check_type(accepted)?;
        Ok(item)
    }

    /// Bind `kind` of `accessory` to the item described by `spec`.
    ///
    /// The subscription is registered before this returns, so no state change
    /// happening afterwards is missed.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the item's type is not accepted by
    /// `spec`.
    pub fn bind(
        &self,
        accessory: &str,
        kind: CharacteristicKind,
        spec: TransformationSpec,
    ) -> Result<Binding, BridgeError> {
        spec.item.check_type(&spec.accepted)?;

        let mut subscription = self.remote.subscribe(&spec.item.name);
        let host = self.host.clone();
        let accessory = accessory.to_string();
        let item = spec.item.clone();
        let transformation = spec.transformation.clone();
        let last = LastValue::default();
        let cache = last.clone();

        tracing::debug!(
            accessory = %accessory,
            item = %item.name,
            characteristic = %kind,
            "binding characteristic"
        );

        let task = tokio::spawn(async move {
            loop {
                let state = match subscription.next().await {
                    Ok(state) => state,
                    Err(err) => {
                        tracing::debug!(item = %item.name, error = %err, "state subscription ended");
                        break;
                    }
                };
                let value = match transformation.decode(item.item_type, &state) {
                    Ok(value) => value,
                    Err(err) => {
                        let err = err.decoding(&item.name, kind);
                        tracing::warn!(
                            accessory = %accessory,
                            error = %err,
                            "ignoring pushed state"
                        );
                        continue;
                    }
                };
                cache.store(value.clone());
                let change = CharacteristicChanged::new(accessory.as_str(), kind, value);
                if let Err(err) = host.publish_change(change).await {
                    tracing::warn!(
                        accessory = %accessory,
                        characteristic = %kind,
                        error = %err,
                        "failed to publish characteristic change"
                    );
                }
            }
        });

        Ok(Binding {
            item: spec.item,
            kind,
            transformation: spec.transformation,
            last,
            task,
        })
    }
}

/// Last decoded value of a binding, shared with its push task.
#[derive(Debug, Clone, Default)]
struct LastValue(Arc<Mutex<Option<CharacteristicValue>>>);

impl LastValue {
    fn store(&self, value: CharacteristicValue) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = Some(value);
    }

    fn get(&self) -> Option<CharacteristicValue> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

/// A characteristic bound to a remote item.
///
/// Dropping the binding stops its push task.
#[derive(Debug)]
pub struct Binding {
    item: Item,
    kind: CharacteristicKind,
    transformation: Transformation,
    last: LastValue,
    task: JoinHandle<()>,
}

impl Binding {
    #[must_use]
    pub fn item(&self) -> &Item {
        &self.item
    }

    /// Fetch the item's current state and decode it.
    ///
    /// # Errors
    ///
    /// Returns the transport error of the read, or a transform error naming
    /// the item and characteristic when the state cannot be decoded.
    pub async fn read<R: RemoteStateService>(
        &self,
        remote: &R,
    ) -> Result<CharacteristicValue, BridgeError> {
        let state = remote.get_state(&self.item.name).await?;
        let value = self
            .transformation
            .decode(self.item.item_type, &state)
            .map_err(|err| err.decoding(&self.item.name, self.kind))?;
        self.last.store(value.clone());
        Ok(value)
    }

    /// The value of the latest successful read or push, if any.
    #[must_use]
    pub fn last_value(&self) -> Option<CharacteristicValue> {
        self.last.get()
    }
}

impl Drop for Binding {
    fn drop(&mut self) {
        self.task.abort();
    }
}
