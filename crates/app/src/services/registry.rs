//! Accessory registry: the driving side of the bridge.
//!
//! The host lists accessories, reads characteristics and writes batches
//! through the registry. Accessories are assembled once at startup;
//! an accessory whose required characteristics cannot be bound is skipped
//! and logged, the others keep working.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use habridge_domain::accessory::AccessorySummary;
use habridge_domain::characteristic::{CharacteristicKind, CharacteristicValue};
use habridge_domain::config::AccessoryConfig;
use habridge_domain::error::{BridgeError, NotFoundError};

use crate::accessory::{self, Accessory};
use crate::ports::{AccessoryHost, RemoteStateService};
use crate::services::binder::SubscriptionBinder;

/// Holds the assembled accessories, keyed by name.
pub struct AccessoryRegistry<R, H> {
    binder: SubscriptionBinder<R, H>,
    accessories: RwLock<BTreeMap<String, Arc<Accessory<R>>>>,
}

impl<R, H> AccessoryRegistry<R, H>
where
    R: RemoteStateService + Clone + 'static,
    H: AccessoryHost + Clone + 'static,
{
    pub fn new(remote: R, host: H) -> Self {
        Self {
            binder: SubscriptionBinder::new(remote, host),
            accessories: RwLock::new(BTreeMap::new()),
        }
    }

    /// Assemble every configured accessory, skipping the ones that fail.
    ///
    /// Returns the number of accessories registered.
    pub async fn build(&self, configs: &[AccessoryConfig]) -> usize {
        let mut registered = 0;
        for config in configs {
            match self.add(config).await {
                Ok(summary) => {
                    tracing::info!(
                        accessory = %summary.name,
                        kind = %summary.kind,
                        characteristics = summary.characteristics.len(),
                        "accessory registered"
                    );
                    registered += 1;
                }
                Err(err) => {
                    tracing::error!(accessory = %config.name, error = %err, "skipping accessory");
                }
            }
        }
        registered
    }

    /// Assemble and register one accessory, replacing any accessory with the
    /// same name.
    ///
    /// # Errors
    ///
    /// Returns the configuration error of a required characteristic.
    pub async fn add(&self, config: &AccessoryConfig) -> Result<AccessorySummary, BridgeError> {
        let accessory = accessory::assemble(&self.binder, config).await?;
        let summary = accessory.summary();
        let previous = self
            .accessories
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(config.name.clone(), Arc::new(accessory));
        if previous.is_some() {
            tracing::warn!(accessory = %config.name, "replaced accessory with the same name");
        }
        Ok(summary)
    }

    #[must_use]
    pub fn list(&self) -> Vec<AccessorySummary> {
        self.accessories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|a| a.summary())
            .collect()
    }

    /// # Errors
    ///
    /// Returns [`NotFoundError`] for an unknown accessory.
    pub fn get(&self, name: &str) -> Result<AccessorySummary, BridgeError> {
        self.accessory(name).map(|a| a.summary())
    }

    /// Read a characteristic of an accessory.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] for an unknown accessory or characteristic,
    /// otherwise the error of the read (also logged).
    pub async fn read(
        &self,
        name: &str,
        kind: CharacteristicKind,
    ) -> Result<CharacteristicValue, BridgeError> {
        let accessory = self.accessory(name)?;
        accessory
            .read(kind, self.binder.remote())
            .await
            .inspect_err(|err| {
                tracing::warn!(accessory = name, characteristic = %kind, error = %err, "read failed");
            })
    }

    /// Write a batch of characteristic values to an accessory and commit it.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] for an unknown accessory, otherwise the
    /// validation or commit error (also logged).
    pub async fn write(
        &self,
        name: &str,
        batch: &[(CharacteristicKind, CharacteristicValue)],
    ) -> Result<(), BridgeError> {
        let accessory = self.accessory(name)?;
        accessory.write(batch).await.inspect_err(|err| {
            tracing::warn!(accessory = name, error = %err, "write failed");
        })
    }

    /// Drop every accessory, stopping their subscriptions.
    pub fn teardown(&self) {
        let removed = std::mem::take(
            &mut *self
                .accessories
                .write()
                .unwrap_or_else(PoisonError::into_inner),
        );
        tracing::info!(count = removed.len(), "accessories torn down");
    }

    fn accessory(&self, name: &str) -> Result<Arc<Accessory<R>>, BridgeError> {
        self.accessories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| {
                NotFoundError {
                    entity: "Accessory",
                    id: name.to_string(),
                }
                .into()
            })
    }
}
