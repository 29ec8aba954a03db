//! Light: `On` for a Switch, plus `Brightness` for a Dimmer, plus `Hue` and
//! `Saturation` for a Color item. Every characteristic writes through the
//! composite commit coordinator of the item.

use habridge_domain::config::AccessoryConfig;
use habridge_domain::error::BridgeError;
use habridge_domain::item::ItemType;
use habridge_domain::transform::{StateType, Transformation, TransformationSpec};

use super::{Accessory, Characteristic, ITEM};
use crate::ports::{AccessoryHost, RemoteStateService};
use crate::services::binder::SubscriptionBinder;
use crate::services::commit::CompositeCommitCoordinator;

const ACCEPTED: &[ItemType] = &[ItemType::Switch, ItemType::Dimmer, ItemType::Color];

fn channels(item_type: ItemType) -> &'static [StateType] {
    match item_type {
        ItemType::Color => &[
            StateType::Binary,
            StateType::Hue,
            StateType::Saturation,
            StateType::Brightness,
        ],
        ItemType::Dimmer => &[StateType::Binary, StateType::Brightness],
        _ => &[StateType::Binary],
    }
}

pub(super) async fn assemble<R, H>(
    binder: &SubscriptionBinder<R, H>,
    config: &AccessoryConfig,
) -> Result<Accessory<R>, BridgeError>
where
    R: RemoteStateService + Clone + 'static,
    H: AccessoryHost + Clone + 'static,
{
    let item = binder.resolve_item(config, ITEM, ACCEPTED).await?;
    tracing::debug!(accessory = %config.name, item = %item.name, item_type = %item.item_type, "creating light");

    let mut accessory = Accessory::new(config);
    for channel in channels(item.item_type) {
        let kind = channel.characteristic();
        let spec = TransformationSpec::new(item.clone(), ACCEPTED, Transformation::Channel(*channel));
        let binding = binder.bind(&config.name, kind, spec)?;
        accessory.push(Some(Characteristic::bound(kind, binding, true)));
    }

    let coordinator = CompositeCommitCoordinator::new(item, binder.remote().clone());
    Ok(accessory.with_coordinator(coordinator))
}
