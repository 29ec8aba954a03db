//! Battery characteristics, shared by every accessory kind that can report a
//! battery, and the standalone battery accessory.
//!
//! | characteristic     | item key                   | accepted types           | fallback         |
//! |--------------------|----------------------------|--------------------------|------------------|
//! | `StatusLowBattery` | `batteryItem`              | Switch, Contact, Number  | removed          |
//! | `BatteryLevel`     | `batteryItem`              | Number                   | `"NA"` (string)  |
//! | `ChargingState`    | `batteryItemChargingState` | Contact, Switch          | not chargeable   |

use habridge_domain::characteristic::CharacteristicKind;
use habridge_domain::config::AccessoryConfig;
use habridge_domain::error::BridgeError;
use habridge_domain::item::ItemType;
use habridge_domain::mapping::{BinaryMapping, ThresholdMapping};
use habridge_domain::transform::{Transformation, TransformationSpec};

use super::{Accessory, Characteristic};
use crate::ports::{AccessoryHost, RemoteStateService};
use crate::services::binder::SubscriptionBinder;
use crate::services::optional::{Fallback, resolve_optional};

pub const BATTERY_ITEM: &str = "batteryItem";
pub const BATTERY_ITEM_THRESHOLD: &str = "batteryItemThreshold";
pub const BATTERY_ITEM_INVERTED: &str = "batteryItemInverted";
pub const BATTERY_ITEM_CHARGING_STATE: &str = "batteryItemChargingState";
pub const BATTERY_ITEM_CHARGING_STATE_INVERTED: &str = "batteryItemChargingStateInverted";

const WARNING_TYPES: &[ItemType] = &[ItemType::Switch, ItemType::Contact, ItemType::Number];
const LEVEL_TYPES: &[ItemType] = &[ItemType::Number];
const CHARGING_TYPES: &[ItemType] = &[ItemType::Contact, ItemType::Switch];

/// `StatusLowBattery` from a Switch/Contact item (optionally inverted) or
/// from a Number item compared against `batteryItemThreshold`.
///
/// # Errors
///
/// Fails only when `optional` is `false` and the characteristic cannot be
/// bound.
pub async fn warning<R, H>(
    binder: &SubscriptionBinder<R, H>,
    config: &AccessoryConfig,
    optional: bool,
) -> Result<Option<Characteristic>, BridgeError>
where
    R: RemoteStateService + Clone + 'static,
    H: AccessoryHost + Clone + 'static,
{
    let kind = CharacteristicKind::StatusLowBattery;
    resolve_optional(&config.name, kind, optional, Fallback::Remove, || async move {
        let item = binder.resolve_item(config, BATTERY_ITEM, WARNING_TYPES).await?;
        let transformation = if item.item_type == ItemType::Number {
            let threshold = config.threshold(BATTERY_ITEM_THRESHOLD)?;
            tracing::debug!(accessory = %config.name, item = %item.name, threshold, "creating battery warning");
            Transformation::Threshold(ThresholdMapping::low_battery(threshold))
        } else {
            let inverted = config.flag(BATTERY_ITEM_INVERTED);
            tracing::debug!(accessory = %config.name, item = %item.name, inverted, "creating battery warning");
            Transformation::Binary(BinaryMapping::low_battery().inverted(inverted))
        };
        let spec = TransformationSpec::new(item, WARNING_TYPES, transformation);
        Ok(Characteristic::bound(kind, binder.bind(&config.name, kind, spec)?, false))
    })
    .await
}

/// `BatteryLevel` from a Number item, `"NA"` otherwise.
///
/// # Errors
///
/// Never fails: the characteristic is optional.
pub async fn level<R, H>(
    binder: &SubscriptionBinder<R, H>,
    config: &AccessoryConfig,
) -> Result<Option<Characteristic>, BridgeError>
where
    R: RemoteStateService + Clone + 'static,
    H: AccessoryHost + Clone + 'static,
{
    let kind = CharacteristicKind::BatteryLevel;
    resolve_optional(
        &config.name,
        kind,
        true,
        Fallback::battery_level_unavailable(),
        || async move {
            let item = binder.resolve_item(config, BATTERY_ITEM, LEVEL_TYPES).await?;
            let spec = TransformationSpec::new(item, LEVEL_TYPES, Transformation::Numeric);
            Ok(Characteristic::bound(kind, binder.bind(&config.name, kind, spec)?, false))
        },
    )
    .await
}

/// `ChargingState` from a Contact/Switch item (optionally inverted), *not
/// chargeable* otherwise.
///
/// # Errors
///
/// Never fails: the characteristic is optional.
pub async fn charging_state<R, H>(
    binder: &SubscriptionBinder<R, H>,
    config: &AccessoryConfig,
) -> Result<Option<Characteristic>, BridgeError>
where
    R: RemoteStateService + Clone + 'static,
    H: AccessoryHost + Clone + 'static,
{
    let kind = CharacteristicKind::ChargingState;
    resolve_optional(&config.name, kind, true, Fallback::not_chargeable(), || async move {
        let item = binder
            .resolve_item(config, BATTERY_ITEM_CHARGING_STATE, CHARGING_TYPES)
            .await?;
        let mapping =
            BinaryMapping::charging().inverted(config.flag(BATTERY_ITEM_CHARGING_STATE_INVERTED));
        let spec = TransformationSpec::new(item, CHARGING_TYPES, Transformation::Binary(mapping));
        Ok(Characteristic::bound(kind, binder.bind(&config.name, kind, spec)?, false))
    })
    .await
}

/// A battery accessory: the warning is required, level and charging state
/// degrade to their fallbacks.
pub(super) async fn assemble<R, H>(
    binder: &SubscriptionBinder<R, H>,
    config: &AccessoryConfig,
) -> Result<Accessory<R>, BridgeError>
where
    R: RemoteStateService + Clone + 'static,
    H: AccessoryHost + Clone + 'static,
{
    let mut accessory = Accessory::new(config);
    accessory.push(level(binder, config).await?);
    accessory.push(charging_state(binder, config).await?);
    accessory.push(warning(binder, config, false).await?);
    Ok(accessory)
}
