//! Pending writes to a composite item and the rules that turn them into one
//! command.
//!
//! A light's `On`, `Hue`, `Saturation` and `Brightness` characteristics may
//! all be backed by a single item that only accepts one command encoding
//! every channel. Writes are recorded here first; [`plan`] decides what to
//! send once the batch is complete.
//!
//! [`plan`]: PendingCompositeState::plan

use crate::characteristic::CharacteristicValue;
use crate::command::{Command, Hsb};
use crate::error::{BridgeError, RaceConditionError, TransformError, ValidationError};
use crate::item::{Item, ItemType};
use crate::transform::{StateType, component, encode_command};

/// Channel values written since the last commit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingCompositeState {
    binary: Option<bool>,
    brightness: Option<f64>,
    hue: Option<f64>,
    saturation: Option<f64>,
}

impl PendingCompositeState {
    /// Record a write to one channel, replacing any earlier value.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnexpectedValue`] when the value does not
    /// fit the channel (e.g. a string for brightness).
    pub fn set(
        &mut self,
        channel: StateType,
        value: &CharacteristicValue,
    ) -> Result<(), ValidationError> {
        let unexpected = |expected: &'static str| ValidationError::UnexpectedValue {
            characteristic: channel.characteristic(),
            expected,
            actual: value.to_string(),
        };
        match channel {
            StateType::Binary => {
                self.binary = Some(value.as_bool().ok_or_else(|| unexpected("boolean"))?);
            }
            StateType::Brightness => {
                self.brightness = Some(value.as_f64().ok_or_else(|| unexpected("numeric"))?);
            }
            StateType::Hue => {
                self.hue = Some(value.as_f64().ok_or_else(|| unexpected("numeric"))?);
            }
            StateType::Saturation => {
                self.saturation = Some(value.as_f64().ok_or_else(|| unexpected("numeric"))?);
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.binary.is_none()
            && self.brightness.is_none()
            && self.hue.is_none()
            && self.saturation.is_none()
    }

    /// Drop every pending channel.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Decide which command the pending writes produce for `item`.
    ///
    /// Only `binary` pending sends `ON`/`OFF`. Only `brightness` (no hue or
    /// saturation) sends the encoded level (`100 → 99`), unless the item is a
    /// Color item: a Color item only takes scalars for on/off, so its
    /// brightness goes out as a full tuple. Anything involving hue or
    /// saturation sends a full tuple too, which needs the current state when
    /// a component is missing.
    ///
    /// # Errors
    ///
    /// Returns [`RaceConditionError::CommitBeforeSet`] when nothing is
    /// pending.
    pub fn plan(&self, item: &Item) -> Result<CommitPlan, BridgeError> {
        if self.brightness.is_none() && self.hue.is_none() && self.saturation.is_none() {
            let Some(on) = self.binary else {
                return Err(RaceConditionError::CommitBeforeSet {
                    item: item.name.clone(),
                }
                .into());
            };
            let command = encode_command(StateType::Binary, &CharacteristicValue::Bool(on))?;
            return Ok(CommitPlan::Ready(command));
        }

        if item.item_type != ItemType::Color
            && self.hue.is_none()
            && self.saturation.is_none()
            && let Some(level) = self.brightness
        {
            let command =
                encode_command(StateType::Brightness, &CharacteristicValue::Float(level))?;
            return Ok(CommitPlan::Ready(command));
        }

        let partial = PartialHsb {
            hue: self.hue,
            saturation: self.saturation,
            brightness: self.brightness,
        };
        Ok(match partial.full() {
            Some(hsb) => CommitPlan::Ready(Command::Hsb(hsb)),
            None => CommitPlan::NeedsCurrentState(partial),
        })
    }
}

/// Outcome of [`PendingCompositeState::plan`].
#[derive(Debug, Clone, PartialEq)]
pub enum CommitPlan {
    /// The command can be sent as-is.
    Ready(Command),
    /// Some tuple components must come from the item's current state.
    NeedsCurrentState(PartialHsb),
}

/// A color tuple with some components still unknown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartialHsb {
    pub hue: Option<f64>,
    pub saturation: Option<f64>,
    pub brightness: Option<f64>,
}

impl PartialHsb {
    fn full(self) -> Option<Hsb> {
        Some(Hsb {
            hue: self.hue?,
            saturation: self.saturation?,
            brightness: self.brightness?,
        })
    }

    /// Fill the missing components from the item's current `H,S,B` state.
    /// Components that were written keep their written value.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError`] when the current state is not a complete
    /// numeric tuple.
    pub fn complete(self, current: &str) -> Result<Command, TransformError> {
        let read = |index: usize| -> Result<f64, TransformError> {
            let raw = component(current, index)?;
            raw.trim()
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or_else(|| TransformError::InvalidNumber(raw.to_string()))
        };
        Ok(Command::Hsb(Hsb {
            hue: self.hue.map_or_else(|| read(0), Ok)?,
            saturation: self.saturation.map_or_else(|| read(1), Ok)?,
            brightness: self.brightness.map_or_else(|| read(2), Ok)?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(writes: &[(StateType, CharacteristicValue)]) -> PendingCompositeState {
        let mut state = PendingCompositeState::default();
        for (channel, value) in writes {
            state.set(*channel, value).unwrap();
        }
        state
    }

    fn dimmer() -> Item {
        Item::new("Lamp", ItemType::Dimmer)
    }

    fn color() -> Item {
        Item::new("Strip", ItemType::Color)
    }

    fn ready(plan: CommitPlan) -> String {
        match plan {
            CommitPlan::Ready(cmd) => cmd.to_string(),
            CommitPlan::NeedsCurrentState(partial) => {
                panic!("expected ready command, got {partial:?}")
            }
        }
    }

    #[test]
    fn should_send_switch_command_when_only_binary_pending() {
        let state = pending(&[(StateType::Binary, CharacteristicValue::Bool(true))]);
        assert_eq!(ready(state.plan(&dimmer()).unwrap()), "ON");

        let state = pending(&[(StateType::Binary, CharacteristicValue::Bool(false))]);
        assert_eq!(ready(state.plan(&color()).unwrap()), "OFF");
    }

    #[test]
    fn should_send_corrected_level_when_only_brightness_pending() {
        let state = pending(&[(StateType::Brightness, CharacteristicValue::Int(100))]);
        assert_eq!(ready(state.plan(&dimmer()).unwrap()), "99");

        let state = pending(&[(StateType::Brightness, CharacteristicValue::Int(40))]);
        assert_eq!(ready(state.plan(&dimmer()).unwrap()), "40");
    }

    #[test]
    fn should_compose_tuple_when_only_brightness_pending_on_color() {
        let state = pending(&[(StateType::Brightness, CharacteristicValue::Int(60))]);
        let CommitPlan::NeedsCurrentState(partial) = state.plan(&color()).unwrap() else {
            panic!("expected partial tuple");
        };
        assert_eq!(partial.complete("120,50,80").unwrap().to_string(), "120,50,60");
    }

    #[test]
    fn should_send_decoded_dimmer_state_back_unchanged() {
        use crate::transform::{decode, encode};

        for raw in ["0", "42", "99"] {
            let decoded = decode(StateType::Brightness, ItemType::Dimmer, raw).unwrap();
            let state = pending(&[(StateType::Brightness, decoded.clone())]);
            let sent = ready(state.plan(&dimmer()).unwrap());
            assert_eq!(sent, raw);
            assert_eq!(sent, encode(StateType::Brightness, &decoded).unwrap());
        }

        let decoded = decode(StateType::Binary, ItemType::Dimmer, "42").unwrap();
        let state = pending(&[(StateType::Binary, decoded.clone())]);
        assert_eq!(
            ready(state.plan(&dimmer()).unwrap()),
            encode(StateType::Binary, &decoded).unwrap()
        );
    }

    #[test]
    fn should_ignore_binary_when_brightness_pending() {
        let state = pending(&[
            (StateType::Binary, CharacteristicValue::Bool(true)),
            (StateType::Brightness, CharacteristicValue::Int(30)),
        ]);
        assert_eq!(ready(state.plan(&dimmer()).unwrap()), "30");
    }

    #[test]
    fn should_compose_tuple_when_all_components_pending() {
        let state = pending(&[
            (StateType::Hue, CharacteristicValue::Float(120.0)),
            (StateType::Saturation, CharacteristicValue::Int(50)),
            (StateType::Brightness, CharacteristicValue::Int(60)),
        ]);
        assert_eq!(ready(state.plan(&color()).unwrap()), "120,50,60");
    }

    #[test]
    fn should_require_current_state_when_only_hue_pending() {
        let state = pending(&[(StateType::Hue, CharacteristicValue::Int(200))]);
        let plan = state.plan(&color()).unwrap();
        let CommitPlan::NeedsCurrentState(partial) = plan else {
            panic!("expected partial tuple");
        };
        assert_eq!(partial.complete("120,50,80").unwrap().to_string(), "200,50,80");
    }

    #[test]
    fn should_keep_written_saturation_when_filling_tuple() {
        let state = pending(&[
            (StateType::Saturation, CharacteristicValue::Int(10)),
            (StateType::Brightness, CharacteristicValue::Int(100)),
        ]);
        let CommitPlan::NeedsCurrentState(partial) = state.plan(&color()).unwrap() else {
            panic!("expected partial tuple");
        };
        assert_eq!(partial.complete("120,50,80").unwrap().to_string(), "120,10,100");
    }

    #[test]
    fn should_report_race_when_nothing_pending() {
        let state = PendingCompositeState::default();
        let err = state.plan(&color()).unwrap_err();
        assert!(matches!(
            err,
            BridgeError::RaceCondition(RaceConditionError::CommitBeforeSet { item }) if item == "Strip"
        ));
    }

    #[test]
    fn should_reject_malformed_current_state() {
        let partial = PartialHsb {
            hue: Some(1.0),
            saturation: None,
            brightness: None,
        };
        assert!(partial.complete("NULL").is_err());
        assert!(partial.complete("120,abc,3").is_err());
    }

    #[test]
    fn should_reject_non_finite_components_in_current_state() {
        let state = pending(&[(StateType::Brightness, CharacteristicValue::Int(60))]);
        let CommitPlan::NeedsCurrentState(partial) = state.plan(&color()).unwrap() else {
            panic!("expected partial tuple");
        };
        assert!(matches!(
            partial.complete("NaN,50,80"),
            Err(TransformError::InvalidNumber(raw)) if raw == "NaN"
        ));
        assert!(partial.complete("120,inf,80").is_err());
    }

    #[test]
    fn should_reject_string_for_brightness() {
        let mut state = PendingCompositeState::default();
        let err = state
            .set(StateType::Brightness, &CharacteristicValue::String("x".into()))
            .unwrap_err();
        assert!(matches!(err, ValidationError::UnexpectedValue { .. }));
        assert!(state.is_empty());
    }

    #[test]
    fn should_be_empty_after_clear() {
        let mut state = pending(&[(StateType::Hue, CharacteristicValue::Int(1))]);
        assert!(!state.is_empty());
        state.clear();
        assert!(state.is_empty());
    }
}
