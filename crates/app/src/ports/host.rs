//! Accessory host port: where characteristic changes are pushed to.

use std::future::Future;

use habridge_domain::error::BridgeError;
use habridge_domain::event::CharacteristicChanged;

/// Receives characteristic changes driven by the remote server.
///
/// Reads and writes coming from the host go through
/// [`AccessoryRegistry`](crate::services::registry::AccessoryRegistry); this
/// port only covers the push direction.
pub trait AccessoryHost: Send + Sync {
    /// Publish a new characteristic value to the host.
    fn publish_change(
        &self,
        change: CharacteristicChanged,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;
}

impl<T: AccessoryHost> AccessoryHost for std::sync::Arc<T> {
    fn publish_change(
        &self,
        change: CharacteristicChanged,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        (**self).publish_change(change)
    }
}
