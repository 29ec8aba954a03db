//! Accessory assemblers: compose bindings, fallbacks and the commit
//! coordinator into the characteristics of one device kind.

pub mod battery;
mod characteristic;
pub mod light;
pub mod motion_sensor;

pub use characteristic::Characteristic;

use habridge_domain::accessory::{AccessorySummary, CharacteristicDescriptor};
use habridge_domain::characteristic::{CharacteristicKind, CharacteristicValue};
use habridge_domain::config::{AccessoryConfig, AccessoryKind};
use habridge_domain::error::{BridgeError, NotFoundError, ValidationError};
use habridge_domain::id::AccessoryId;

use crate::ports::{AccessoryHost, RemoteStateService};
use crate::services::binder::SubscriptionBinder;
use crate::services::commit::CompositeCommitCoordinator;

/// Config key of the main item of an accessory.
pub const ITEM: &str = "item";
/// Config key inverting a binary sensor.
pub const INVERTED: &str = "inverted";

/// An assembled accessory.
pub struct Accessory<R> {
    id: AccessoryId,
    name: String,
    kind: AccessoryKind,
    characteristics: Vec<Characteristic>,
    coordinator: Option<CompositeCommitCoordinator<R>>,
}

impl<R: RemoteStateService> Accessory<R> {
    pub(crate) fn new(config: &AccessoryConfig) -> Self {
        Self {
            id: AccessoryId::from_name(&config.name),
            name: config.name.clone(),
            kind: config.kind,
            characteristics: Vec::new(),
            coordinator: None,
        }
    }

    pub(crate) fn push(&mut self, characteristic: Option<Characteristic>) {
        self.characteristics.extend(characteristic);
    }

    pub(crate) fn with_coordinator(mut self, coordinator: CompositeCommitCoordinator<R>) -> Self {
        self.coordinator = Some(coordinator);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn summary(&self) -> AccessorySummary {
        AccessorySummary {
            id: self.id,
            name: self.name.clone(),
            kind: self.kind,
            characteristics: self
                .characteristics
                .iter()
                .map(|c| CharacteristicDescriptor {
                    value: c.last_value(),
                    ..c.descriptor().clone()
                })
                .collect(),
        }
    }

    /// # Errors
    ///
    /// Returns [`NotFoundError`] when the accessory has no such
    /// characteristic (never had it, or it was removed as a fallback).
    pub fn characteristic(&self, kind: CharacteristicKind) -> Result<&Characteristic, BridgeError> {
        self.characteristics
            .iter()
            .find(|c| c.kind() == kind)
            .ok_or_else(|| {
                NotFoundError {
                    entity: "Characteristic",
                    id: format!("{}/{kind}", self.name),
                }
                .into()
            })
    }

    /// Read the current value of one characteristic.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] for an unknown characteristic, or the
    /// transport/transform error of the read.
    pub async fn read(
        &self,
        kind: CharacteristicKind,
        remote: &R,
    ) -> Result<CharacteristicValue, BridgeError> {
        self.characteristic(kind)?.read(remote).await
    }

    /// Apply a batch of writes as one commit.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty batch or a write to a
    /// read-only characteristic (nothing is sent in that case), otherwise the
    /// error of the commit.
    pub async fn write(
        &self,
        batch: &[(CharacteristicKind, CharacteristicValue)],
    ) -> Result<(), BridgeError> {
        if batch.is_empty() {
            return Err(ValidationError::EmptyBatch {
                accessory: self.name.clone(),
            }
            .into());
        }
        let read_only = |kind| ValidationError::ReadOnly {
            accessory: self.name.clone(),
            characteristic: kind,
        };

        let mut writes = Vec::with_capacity(batch.len());
        for (kind, value) in batch {
            let channel = self
                .characteristic(*kind)?
                .channel()
                .ok_or_else(|| read_only(*kind))?;
            writes.push((channel, value.clone()));
        }
        let coordinator = self
            .coordinator
            .as_ref()
            .ok_or_else(|| read_only(batch[0].0))?;
        coordinator.apply_batch(&writes).await
    }
}

/// Build the accessory described by `config`.
///
/// # Errors
///
/// Returns a configuration error when a required characteristic cannot be
/// bound.
pub async fn assemble<R, H>(
    binder: &SubscriptionBinder<R, H>,
    config: &AccessoryConfig,
) -> Result<Accessory<R>, BridgeError>
where
    R: RemoteStateService + Clone + 'static,
    H: AccessoryHost + Clone + 'static,
{
    match config.kind {
        AccessoryKind::Light => light::assemble(binder, config).await,
        AccessoryKind::Motion => motion_sensor::assemble(binder, config).await,
        AccessoryKind::Battery => battery::assemble(binder, config).await,
    }
}
