use crate::types::EntityId;

/// Emotion-state provider of the owning entity (`fleeondamage`,
/// `aggressiveondamage`, `saturated`, ...).
pub trait EmotionOracle {
    fn is_in_state(&self, code: &str) -> bool;

    /// Attempts to enter a state. Returns whether the state is now active.
    fn try_trigger(&mut self, code: &str, intensity: f32, cause: Option<EntityId>) -> bool;
}
