use habridge_domain::accessory::CharacteristicDescriptor;
use habridge_domain::characteristic::{CharacteristicKind, CharacteristicValue, Format};
use habridge_domain::error::BridgeError;
use habridge_domain::transform::StateType;

use crate::ports::RemoteStateService;
use crate::services::binder::Binding;

/// A characteristic of an assembled accessory.
#[derive(Debug)]
pub struct Characteristic {
    descriptor: CharacteristicDescriptor,
    source: Source,
}

#[derive(Debug)]
enum Source {
    Static(CharacteristicValue),
    Bound(Binding),
}

impl Characteristic {
    /// A read-only characteristic that always reports `value`.
    #[must_use]
    pub fn fixed(kind: CharacteristicKind, format: Format, value: CharacteristicValue) -> Self {
        Self {
            descriptor: CharacteristicDescriptor::fixed(kind, format, value.clone()),
            source: Source::Static(value),
        }
    }

    /// A characteristic fed from the item of `binding`.
    #[must_use]
    pub fn bound(kind: CharacteristicKind, binding: Binding, writable: bool) -> Self {
        Self {
            descriptor: CharacteristicDescriptor::bound(kind, binding.item().name.as_str(), writable),
            source: Source::Bound(binding),
        }
    }

    #[must_use]
    pub fn descriptor(&self) -> &CharacteristicDescriptor {
        &self.descriptor
    }

    #[must_use]
    pub fn kind(&self) -> CharacteristicKind {
        self.descriptor.kind
    }

    /// The composite channel a write to this characteristic goes to, if it
    /// accepts writes at all.
    #[must_use]
    pub fn channel(&self) -> Option<StateType> {
        if self.descriptor.writable {
            StateType::for_characteristic(self.descriptor.kind)
        } else {
            None
        }
    }

    /// The static value, or the last value read or pushed for a bound
    /// characteristic.
    #[must_use]
    pub fn last_value(&self) -> Option<CharacteristicValue> {
        match &self.source {
            Source::Static(value) => Some(value.clone()),
            Source::Bound(binding) => binding.last_value(),
        }
    }

    /// Current value: the static value, or the decoded remote state.
    ///
    /// # Errors
    ///
    /// Returns the transport or transform error of a bound read.
    pub async fn read<R: RemoteStateService>(
        &self,
        remote: &R,
    ) -> Result<CharacteristicValue, BridgeError> {
        match &self.source {
            Source::Static(value) => Ok(value.clone()),
            Source::Bound(binding) => binding.read(remote).await,
        }
    }
}
