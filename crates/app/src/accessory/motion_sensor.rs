//! Motion sensor: `MotionDetected` from a Switch or Contact item, plus an
//! optional battery warning.

use habridge_domain::characteristic::CharacteristicKind;
use habridge_domain::config::AccessoryConfig;
use habridge_domain::error::BridgeError;
use habridge_domain::item::ItemType;
use habridge_domain::mapping::BinaryMapping;
use habridge_domain::transform::{Transformation, TransformationSpec};

use super::{Accessory, Characteristic, INVERTED, ITEM, battery};
use crate::ports::{AccessoryHost, RemoteStateService};
use crate::services::binder::SubscriptionBinder;
use crate::services::optional::{Fallback, resolve_optional};

const ACCEPTED: &[ItemType] = &[ItemType::Switch, ItemType::Contact];

pub(super) async fn assemble<R, H>(
    binder: &SubscriptionBinder<R, H>,
    config: &AccessoryConfig,
) -> Result<Accessory<R>, BridgeError>
where
    R: RemoteStateService + Clone + 'static,
    H: AccessoryHost + Clone + 'static,
{
    tracing::debug!(accessory = %config.name, "creating motion sensor");
    let kind = CharacteristicKind::MotionDetected;
    let motion = resolve_optional(&config.name, kind, false, Fallback::Remove, || async move {
        let item = binder.resolve_item(config, ITEM, ACCEPTED).await?;
        let mapping = BinaryMapping::motion().inverted(config.flag(INVERTED));
        let spec = TransformationSpec::new(item, ACCEPTED, Transformation::Binary(mapping));
        Ok(Characteristic::bound(kind, binder.bind(&config.name, kind, spec)?, false))
    })
    .await?;

    let mut accessory = Accessory::new(config);
    accessory.push(motion);
    accessory.push(battery::warning(binder, config, true).await?);
    Ok(accessory)
}
