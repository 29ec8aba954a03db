//! Graceful degradation for characteristics whose backing item may be
//! missing or misconfigured.

use std::future::Future;

use habridge_domain::characteristic::{CharacteristicKind, CharacteristicValue, Format};
use habridge_domain::error::{BridgeError, ConfigurationError};

use crate::accessory::Characteristic;

/// What replaces an optional characteristic that cannot be bound.
#[derive(Debug, Clone, PartialEq)]
pub enum Fallback {
    /// Drop the characteristic from the accessory.
    Remove,
    /// Keep the characteristic with a fixed value, possibly in a different
    /// format than usual.
    Static {
        format: Format,
        value: CharacteristicValue,
    },
}

impl Fallback {
    /// `BatteryLevel` without a numeric item reports the string `"NA"`.
    #[must_use]
    pub fn battery_level_unavailable() -> Self {
        Self::Static {
            format: Format::String,
            value: CharacteristicValue::String("NA".to_string()),
        }
    }

    /// `ChargingState` without an item reports *not chargeable*.
    #[must_use]
    pub fn not_chargeable() -> Self {
        Self::Static {
            format: Format::Uint8,
            value: CharacteristicValue::Int(
                habridge_domain::characteristic::charging_state::NOT_CHARGEABLE,
            ),
        }
    }
}

/// Run `bind` and apply the degradation policy when it fails.
///
/// - success: the bound characteristic;
/// - failure of an optional characteristic: logged at debug level, then the
///   `fallback` (`None` when the characteristic is removed);
/// - failure of a required characteristic: a
///   [`ConfigurationError::CharacteristicUnavailable`] wrapping the cause,
///   which aborts the accessory.
///
/// # Errors
///
/// Only fails when `optional` is `false` and `bind` fails.
pub async fn resolve_optional<F, Fut>(
    accessory: &str,
    kind: CharacteristicKind,
    optional: bool,
    fallback: Fallback,
    bind: F,
) -> Result<Option<Characteristic>, BridgeError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Characteristic, BridgeError>>,
{
    let err = match bind().await {
        Ok(characteristic) => return Ok(Some(characteristic)),
        Err(err) => err,
    };

    if !optional {
        return Err(ConfigurationError::CharacteristicUnavailable {
            accessory: accessory.to_string(),
            characteristic: kind,
            source: Box::new(err),
        }
        .into());
    }

    tracing::debug!(
        accessory,
        characteristic = %kind,
        error = %err,
        ?fallback,
        "optional characteristic unavailable, using fallback"
    );
    Ok(match fallback {
        Fallback::Remove => None,
        Fallback::Static { format, value } => Some(Characteristic::fixed(kind, format, value)),
    })
}
