use std::collections::BTreeMap;

use creature_core::{EmotionOracle, EntityId};

/// Per-entity emotion states with optional expiry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EmotionStates {
    /// State code to expiry time, `None` for states that never expire.
    active: BTreeMap<String, Option<u64>>,
    now_ms: u64,
}

impl EmotionStates {
    /// How long a state entered through [`EmotionOracle::try_trigger`] lasts.
    pub const TRIGGER_DURATION_MS: u64 = 10_000;

    pub fn new() -> Self {
        Self::default()
    }

    /// Updates the clock used for expiry and drops expired states.
    pub fn set_clock(&mut self, now_ms: u64) {
        self.now_ms = now_ms;
        self.active
            .retain(|_, expiry| expiry.is_none_or(|at| at > now_ms));
    }

    pub fn enter(&mut self, code: impl Into<String>, duration_ms: Option<u64>) {
        let expiry = duration_ms.map(|duration| self.now_ms + duration);
        self.active.insert(code.into(), expiry);
    }

    pub fn leave(&mut self, code: &str) -> bool {
        self.active.remove(code).is_some()
    }

    pub fn active(&self) -> impl Iterator<Item = &str> {
        self.active.keys().map(String::as_str)
    }
}

impl EmotionOracle for EmotionStates {
    fn is_in_state(&self, code: &str) -> bool {
        self.active
            .get(code)
            .is_some_and(|expiry| expiry.is_none_or(|at| at > self.now_ms))
    }

    fn try_trigger(&mut self, code: &str, _intensity: f32, _cause: Option<EntityId>) -> bool {
        self.enter(code, Some(Self::TRIGGER_DURATION_MS));
        true
    }
}
