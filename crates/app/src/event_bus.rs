//! In-process fan-out of characteristic changes.

use std::future::Future;

use tokio::sync::broadcast;

use habridge_domain::characteristic::CharacteristicKind;
use habridge_domain::error::BridgeError;
use habridge_domain::event::CharacteristicChanged;

use crate::ports::AccessoryHost;

/// Broadcasts every [`CharacteristicChanged`] to the current subscribers.
///
/// This is the default [`AccessoryHost`]. A change published while nobody
/// listens is dropped; it is not an error because the host reads the
/// current value on its next request anyway.
pub struct InProcessEventBus {
    sender: broadcast::Sender<CharacteristicChanged>,
}

impl InProcessEventBus {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Changes published after this call. Use a [`ChangeFilter`] on the
    /// receiving side to narrow it down.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CharacteristicChanged> {
        self.sender.subscribe()
    }
}

impl AccessoryHost for InProcessEventBus {
    fn publish_change(
        &self,
        change: CharacteristicChanged,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        let accessory = change.accessory.clone();
        let characteristic = change.characteristic;
        match self.sender.send(change) {
            Ok(receivers) => tracing::trace!(
                accessory = %accessory,
                %characteristic,
                receivers,
                "characteristic change published"
            ),
            Err(_) => tracing::trace!(
                accessory = %accessory,
                %characteristic,
                "no subscriber for characteristic change"
            ),
        }
        async { Ok(()) }
    }
}

/// Selects the changes of one accessory and, optionally, one characteristic.
///
/// An empty filter lets everything through.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeFilter {
    pub accessory: Option<String>,
    pub characteristic: Option<CharacteristicKind>,
}

impl ChangeFilter {
    #[must_use]
    pub fn matches(&self, change: &CharacteristicChanged) -> bool {
        self.accessory
            .as_deref()
            .is_none_or(|name| name == change.accessory)
            && self
                .characteristic
                .is_none_or(|kind| kind == change.characteristic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use habridge_domain::characteristic::CharacteristicValue;

    fn change(accessory: &str, kind: CharacteristicKind) -> CharacteristicChanged {
        CharacteristicChanged::new(accessory, kind, CharacteristicValue::Bool(true))
    }

    #[tokio::test]
    async fn should_fan_change_out_to_every_subscriber() {
        let bus = InProcessEventBus::new(16);
        let mut hallway = bus.subscribe();
        let mut sse = bus.subscribe();

        bus.publish_change(change("Hallway", CharacteristicKind::MotionDetected))
            .await
            .unwrap();

        for rx in [&mut hallway, &mut sse] {
            let received = rx.recv().await.unwrap();
            assert_eq!(received.accessory, "Hallway");
            assert_eq!(received.characteristic, CharacteristicKind::MotionDetected);
        }
    }

    #[tokio::test]
    async fn should_drop_change_published_without_subscriber() {
        let bus = InProcessEventBus::new(16);
        bus.publish_change(change("Kitchen", CharacteristicKind::On))
            .await
            .unwrap();

        let mut rx = bus.subscribe();
        bus.publish_change(change("Kitchen", CharacteristicKind::Brightness))
            .await
            .unwrap();
        assert_eq!(
            rx.recv().await.unwrap().characteristic,
            CharacteristicKind::Brightness
        );
    }

    #[test]
    fn should_match_everything_with_empty_filter() {
        let filter = ChangeFilter::default();
        assert!(filter.matches(&change("Kitchen", CharacteristicKind::On)));
        assert!(filter.matches(&change("Door", CharacteristicKind::BatteryLevel)));
    }

    #[test]
    fn should_match_accessory_and_characteristic() {
        let filter = ChangeFilter {
            accessory: Some("Door".to_string()),
            characteristic: Some(CharacteristicKind::StatusLowBattery),
        };
        assert!(filter.matches(&change("Door", CharacteristicKind::StatusLowBattery)));
        assert!(!filter.matches(&change("Door", CharacteristicKind::BatteryLevel)));
        assert!(!filter.matches(&change("Hallway", CharacteristicKind::StatusLowBattery)));
    }
}
