//! Composite commit coordinator: turns a batch of light channel writes into
//! a single command.
//!
//! One coordinator exists per composite item. Writes are recorded into a
//! [`PendingCompositeState`]; a commit plans the command, reads the current
//! state once if tuple components are missing, sends the command and clears
//! the pending state whatever the outcome.
//!
//! # Exclusion
//!
//! The pending state lives behind an async mutex that a commit holds from
//! planning until the state is cleared. Writes and commits arriving in the
//! meantime queue on that mutex (first come, first served) and run once the
//! coordinator is idle again, so a batch never observes state from a
//! commit in flight. [`CompositeCommitCoordinator::phase`] exposes where the
//! coordinator currently is.

use std::sync::atomic::{AtomicU8, Ordering};

use tokio::sync::{Mutex, MutexGuard};

use habridge_domain::characteristic::CharacteristicValue;
use habridge_domain::command::Command;
use habridge_domain::composite::{CommitPlan, PendingCompositeState};
use habridge_domain::error::{BridgeError, RaceConditionError};
use habridge_domain::item::Item;
use habridge_domain::transform::StateType;

use crate::ports::RemoteStateService;

/// Observable state of a [`CompositeCommitCoordinator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Phase {
    /// Nothing pending.
    Idle = 0,
    /// Writes recorded, no commit yet.
    Accumulating = 1,
    /// A commit is in flight; further writes wait.
    Committing = 2,
}

impl Phase {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Accumulating,
            2 => Self::Committing,
            _ => Self::Idle,
        }
    }
}

/// Serializes writes to one composite item.
pub struct CompositeCommitCoordinator<R> {
    item: Item,
    remote: R,
    pending: Mutex<PendingCompositeState>,
    phase: AtomicU8,
}

impl<R: RemoteStateService> CompositeCommitCoordinator<R> {
    pub fn new(item: Item, remote: R) -> Self {
        Self {
            item,
            remote,
            pending: Mutex::new(PendingCompositeState::default()),
            phase: AtomicU8::new(Phase::Idle as u8),
        }
    }

    #[must_use]
    pub fn item(&self) -> &Item {
        &self.item
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        Phase::from_u8(self.phase.load(Ordering::SeqCst))
    }

    /// Record a write to one channel. Waits while a commit is in flight.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the value does not fit the channel;
    /// nothing is recorded in that case.
    pub async fn set(&self, channel: StateType, value: &CharacteristicValue) -> Result<(), BridgeError> {
        let mut pending = self.pending.lock().await;
        pending.set(channel, value)?;
        self.phase.store(Phase::Accumulating as u8, Ordering::SeqCst);
        tracing::trace!(item = %self.item.name, %channel, %value, "recorded composite write");
        Ok(())
    }

    /// Commit whatever was recorded since the last commit.
    ///
    /// # Errors
    ///
    /// - [`RaceConditionError::CommitBeforeSet`] when nothing was recorded (no
    ///   remote call is made);
    /// - [`RaceConditionError::CurrentStateUnavailable`] when the current state
    ///   needed to complete the tuple cannot be read or parsed (no command is
    ///   sent);
    /// - the transport error of the command itself.
    ///
    /// The pending state is cleared in every case.
    pub async fn commit(&self) -> Result<(), BridgeError> {
        let guard = self.begin_commit().await;
        self.run(&guard).await
    }

    /// Record a whole batch and commit it without letting another batch in
    /// between.
    ///
    /// # Errors
    ///
    /// Same as [`set`](Self::set) and [`commit`](Self::commit). A batch with
    /// an invalid value is not committed at all.
    pub async fn apply_batch(
        &self,
        writes: &[(StateType, CharacteristicValue)],
    ) -> Result<(), BridgeError> {
        let mut guard = self.begin_commit().await;
        for (channel, value) in writes {
            guard.pending.set(*channel, value)?;
        }
        self.run(&guard).await
    }

    async fn begin_commit(&self) -> CommitGuard<'_> {
        let pending = self.pending.lock().await;
        self.phase.store(Phase::Committing as u8, Ordering::SeqCst);
        CommitGuard {
            pending,
            phase: &self.phase,
        }
    }

    async fn run(&self, guard: &CommitGuard<'_>) -> Result<(), BridgeError> {
        let name = self.item.name.as_str();
        let command = match guard.pending.plan(&self.item)? {
            CommitPlan::Ready(command) => command,
            CommitPlan::NeedsCurrentState(partial) => {
                let current = self.current_state().await?;
                partial.complete(&current).map_err(|err| {
                    RaceConditionError::CurrentStateUnavailable {
                        item: name.to_string(),
                        source: Some(Box::new(err.into())),
                    }
                })?
            }
        };
        self.send(&command).await
    }

    async fn current_state(&self) -> Result<String, BridgeError> {
        let name = self.item.name.as_str();
        let state = self.remote.get_state(name).await.map_err(|err| {
            RaceConditionError::CurrentStateUnavailable {
                item: name.to_string(),
                source: Some(Box::new(err)),
            }
        })?;
        if state.trim().is_empty() {
            return Err(RaceConditionError::CurrentStateUnavailable {
                item: name.to_string(),
                source: None,
            }
            .into());
        }
        Ok(state)
    }

    async fn send(&self, command: &Command) -> Result<(), BridgeError> {
        let command = command.to_string();
        tracing::debug!(item = %self.item.name, %command, "sending composite command");
        self.remote.send_command(&self.item.name, &command).await
    }
}

/// Holds the pending state for the duration of a commit and resets it when
/// dropped, including when the commit future is cancelled.
struct CommitGuard<'a> {
    pending: MutexGuard<'a, PendingCompositeState>,
    phase: &'a AtomicU8,
}

impl Drop for CommitGuard<'_> {
    fn drop(&mut self) {
        self.pending.clear();
        self.phase.store(Phase::Idle as u8, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::testing::StubRemote;
    use habridge_domain::item::ItemType;

    fn coordinator(
        remote: StubRemote,
        item: &str,
        item_type: ItemType,
    ) -> (Arc<CompositeCommitCoordinator<Arc<StubRemote>>>, Arc<StubRemote>) {
        let remote = Arc::new(remote);
        let coordinator = CompositeCommitCoordinator::new(Item::new(item, item_type), Arc::clone(&remote));
        (Arc::new(coordinator), remote)
    }

    fn int(v: i64) -> CharacteristicValue {
        CharacteristicValue::Int(v)
    }

    fn sent(remote: &StubRemote) -> Vec<String> {
        remote.commands().into_iter().map(|(_, cmd)| cmd).collect()
    }

    #[tokio::test]
    async fn should_send_on_off_for_binary_only() {
        let (coordinator, remote) =
            coordinator(StubRemote::new().with_item("Lamp", ItemType::Switch, "OFF"), "Lamp", ItemType::Switch);

        coordinator.set(StateType::Binary, &CharacteristicValue::Bool(true)).await.unwrap();
        assert_eq!(coordinator.phase(), Phase::Accumulating);
        coordinator.commit().await.unwrap();

        assert_eq!(sent(&remote), vec!["ON"]);
        assert_eq!(remote.reads(), 0);
        assert_eq!(coordinator.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn should_send_99_for_full_dimmer_brightness() {
        let (coordinator, remote) =
            coordinator(StubRemote::new().with_item("Lamp", ItemType::Dimmer, "10"), "Lamp", ItemType::Dimmer);

        coordinator.set(StateType::Brightness, &int(100)).await.unwrap();
        coordinator.commit().await.unwrap();

        assert_eq!(sent(&remote), vec!["99"]);
    }

    #[tokio::test]
    async fn should_compose_tuple_without_reading_when_complete() {
        let (coordinator, remote) =
            coordinator(StubRemote::new().with_item("Strip", ItemType::Color, "0,0,0"), "Strip", ItemType::Color);

        coordinator
            .apply_batch(&[
                (StateType::Hue, int(120)),
                (StateType::Saturation, int(50)),
                (StateType::Brightness, int(60)),
            ])
            .await
            .unwrap();

        assert_eq!(sent(&remote), vec!["120,50,60"]);
        assert_eq!(remote.reads(), 0);
    }

    #[tokio::test]
    async fn should_read_once_and_keep_written_hue() {
        let (coordinator, remote) = coordinator(
            StubRemote::new().with_item("Strip", ItemType::Color, "120,50,80"),
            "Strip",
            ItemType::Color,
        );

        coordinator.set(StateType::Hue, &int(240)).await.unwrap();
        coordinator.commit().await.unwrap();

        assert_eq!(remote.reads(), 1);
        assert_eq!(sent(&remote), vec!["240,50,80"]);
    }

    #[tokio::test]
    async fn should_fill_hue_and_saturation_for_color_brightness() {
        let (coordinator, remote) = coordinator(
            StubRemote::new().with_item("Strip", ItemType::Color, "120,50,80"),
            "Strip",
            ItemType::Color,
        );

        coordinator.apply_batch(&[(StateType::Brightness, int(60))]).await.unwrap();

        assert_eq!(remote.reads(), 1);
        assert_eq!(sent(&remote), vec!["120,50,60"]);
    }

    #[tokio::test]
    async fn should_report_race_when_committing_without_set() {
        let (coordinator, remote) =
            coordinator(StubRemote::new().with_item("Strip", ItemType::Color, "1,2,3"), "Strip", ItemType::Color);

        let err = coordinator.commit().await.unwrap_err();

        assert!(matches!(
            err,
            BridgeError::RaceCondition(RaceConditionError::CommitBeforeSet { .. })
        ));
        assert!(remote.commands().is_empty());
        assert_eq!(remote.reads(), 0);
        assert_eq!(coordinator.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn should_abort_and_clear_when_current_state_unreadable() {
        let (coordinator, remote) =
            coordinator(StubRemote::new().with_item("Strip", ItemType::Color, "1,2,3"), "Strip", ItemType::Color);
        remote.fail_reads("Strip");

        coordinator.set(StateType::Saturation, &int(10)).await.unwrap();
        let err = coordinator.commit().await.unwrap_err();

        assert!(matches!(
            err,
            BridgeError::RaceCondition(RaceConditionError::CurrentStateUnavailable { .. })
        ));
        assert!(remote.commands().is_empty());

        // pending state was cleared: committing again is a race
        let err = coordinator.commit().await.unwrap_err();
        assert!(matches!(
            err,
            BridgeError::RaceCondition(RaceConditionError::CommitBeforeSet { .. })
        ));
    }

    #[tokio::test]
    async fn should_abort_when_current_state_is_empty_or_malformed() {
        let (coordinator, remote) =
            coordinator(StubRemote::new().with_item("Strip", ItemType::Color, ""), "Strip", ItemType::Color);

        coordinator.set(StateType::Hue, &int(10)).await.unwrap();
        let err = coordinator.commit().await.unwrap_err();
        assert!(matches!(
            err,
            BridgeError::RaceCondition(RaceConditionError::CurrentStateUnavailable { source: None, .. })
        ));

        remote.set_state("Strip", "NULL");
        coordinator.set(StateType::Hue, &int(10)).await.unwrap();
        let err = coordinator.commit().await.unwrap_err();
        assert!(matches!(
            err,
            BridgeError::RaceCondition(RaceConditionError::CurrentStateUnavailable { source: Some(_), .. })
        ));
        assert!(remote.commands().is_empty());
    }

    #[tokio::test]
    async fn should_abort_when_current_state_is_not_finite() {
        let (coordinator, remote) = coordinator(
            StubRemote::new().with_item("Strip", ItemType::Color, "NaN,50,80"),
            "Strip",
            ItemType::Color,
        );

        let err = coordinator
            .apply_batch(&[(StateType::Brightness, int(60))])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BridgeError::RaceCondition(RaceConditionError::CurrentStateUnavailable { .. })
        ));
        assert!(remote.commands().is_empty());
        assert_eq!(coordinator.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn should_not_commit_batch_with_invalid_value() {
        let (coordinator, remote) =
            coordinator(StubRemote::new().with_item("Strip", ItemType::Color, "1,2,3"), "Strip", ItemType::Color);

        let err = coordinator
            .apply_batch(&[
                (StateType::Hue, int(10)),
                (StateType::Brightness, CharacteristicValue::String("max".to_string())),
            ])
            .await
            .unwrap_err();

        assert!(matches!(err, BridgeError::Validation(_)));
        assert!(remote.commands().is_empty());
        assert_eq!(coordinator.phase(), Phase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn should_queue_second_batch_until_first_commit_completes() {
        let (coordinator, remote) = coordinator(
            StubRemote::new()
                .with_item("Strip", ItemType::Color, "120,50,80")
                .with_read_delay(Duration::from_millis(100)),
            "Strip",
            ItemType::Color,
        );

        let first = tokio::spawn({
            let coordinator = Arc::clone(&coordinator);
            async move { coordinator.apply_batch(&[(StateType::Hue, int(200))]).await }
        });
        // let the first batch reach its remote read
        tokio::task::yield_now().await;
        assert_eq!(coordinator.phase(), Phase::Committing);

        let second = tokio::spawn({
            let coordinator = Arc::clone(&coordinator);
            async move {
                coordinator
                    .apply_batch(&[(StateType::Saturation, int(10))])
                    .await
            }
        });
        tokio::task::yield_now().await;
        assert_eq!(remote.reads(), 1);

        first.await.unwrap().unwrap();
        second.await.unwrap().unwrap();

        // the second batch did not inherit the hue written by the first
        assert_eq!(sent(&remote), vec!["200,50,80", "120,10,80"]);
        assert_eq!(remote.reads(), 2);
        assert_eq!(coordinator.phase(), Phase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn should_clear_pending_state_when_commit_is_cancelled() {
        let (coordinator, remote) = coordinator(
            StubRemote::new()
                .with_item("Strip", ItemType::Color, "120,50,80")
                .with_read_delay(Duration::from_secs(60)),
            "Strip",
            ItemType::Color,
        );

        coordinator.set(StateType::Hue, &int(200)).await.unwrap();
        let result = tokio::time::timeout(Duration::from_secs(1), coordinator.commit()).await;
        assert!(result.is_err());

        assert_eq!(coordinator.phase(), Phase::Idle);
        assert!(remote.commands().is_empty());
        let err = coordinator.commit().await.unwrap_err();
        assert!(matches!(
            err,
            BridgeError::RaceCondition(RaceConditionError::CommitBeforeSet { .. })
        ));
    }
}
