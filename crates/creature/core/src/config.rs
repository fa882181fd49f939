use crate::error::{ConfigError, ErrorContext};

/// Engine-wide constants and tunable parameters shared by every task manager.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AiSettings {
    /// Real in-game hours that make up one calendar day. Time-of-day checks
    /// rescale the world clock onto a 24 hour virtual day using this value.
    pub hours_per_day: f32,

    /// Base seed mixed with each entity id to seed its task RNG.
    pub world_seed: u64,

    /// Upper bound on manager commands (force start/stop) a single task call
    /// may chain before the manager gives up on the remainder.
    pub max_command_chain: usize,
}

impl AiSettings {
    // ===== compile-time constants =====
    /// Number of concurrency lanes per entity. At most one task runs per slot.
    pub const SLOT_COUNT: usize = 8;
    /// Maximum number of tasks registered on a single entity.
    pub const MAX_TASKS: usize = 64;
    /// Brightest light level reported by the environment oracle.
    pub const MAX_LIGHT_LEVEL: u8 = 32;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_HOURS_PER_DAY: f32 = 24.0;
    pub const DEFAULT_WORLD_SEED: u64 = 0x5eed_c0de;
    pub const DEFAULT_MAX_COMMAND_CHAIN: usize = 16;

    pub fn new() -> Self {
        Self {
            hours_per_day: Self::DEFAULT_HOURS_PER_DAY,
            world_seed: Self::DEFAULT_WORLD_SEED,
            max_command_chain: Self::DEFAULT_MAX_COMMAND_CHAIN,
        }
    }

    pub fn with_world_seed(mut self, world_seed: u64) -> Self {
        self.world_seed = world_seed;
        self
    }

    /// Validates internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when `hours_per_day` is not a
    /// positive finite number or the command chain bound is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.hours_per_day.is_finite() && self.hours_per_day > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "hours_per_day",
                reason: format!("must be positive, got {}", self.hours_per_day),
                context: ErrorContext::default(),
            });
        }
        if self.max_command_chain == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_command_chain",
                reason: "must be at least 1".into(),
                context: ErrorContext::default(),
            });
        }
        Ok(())
    }
}

impl Default for AiSettings {
    fn default() -> Self {
        Self::new()
    }
}
