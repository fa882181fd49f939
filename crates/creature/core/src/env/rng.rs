//! Per-entity random number generation.
//!
//! Every task manager owns one [`TaskRng`], seeded from the world seed and
//! the entity's identity. Nothing in the core draws from a global or
//! thread-local generator, so the behavior of a single entity replays exactly
//! given the same seed and inputs.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::types::EntityId;

/// Deterministic generator owned by one entity's task manager.
#[derive(Clone, Debug)]
pub struct TaskRng {
    inner: ChaCha8Rng,
}

impl TaskRng {
    /// Seeds a generator for `entity` in a world created with `world_seed`.
    pub fn for_entity(world_seed: u64, entity: EntityId) -> Self {
        Self::from_seed(compute_seed(world_seed, entity))
    }

    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Uniform value in `[0, 1)`.
    pub fn next_f32(&mut self) -> f32 {
        self.inner.gen_range(0.0f32..1.0)
    }

    /// Bernoulli trial. Probabilities at or above 1 always succeed without
    /// consuming randomness; at or below 0 they always fail.
    pub fn chance(&mut self, probability: f32) -> bool {
        if probability >= 1.0 {
            return true;
        }
        if probability <= 0.0 {
            return false;
        }
        self.next_f32() < probability
    }

    /// Uniform integer in `[min, max]` inclusive.
    pub fn range_u64(&mut self, min: u64, max: u64) -> u64 {
        if min >= max {
            return min;
        }
        self.inner.gen_range(min..=max)
    }

    /// Uniform value in `[min, max)`, or `min` for an empty interval.
    pub fn range_f32(&mut self, min: f32, max: f32) -> f32 {
        if min >= max {
            return min;
        }
        self.inner.gen_range(min..max)
    }

    /// Uniform value in `[min, max)`, or `min` for an empty interval.
    pub fn range_f64(&mut self, min: f64, max: f64) -> f64 {
        if min >= max {
            return min;
        }
        self.inner.gen_range(min..max)
    }

    /// Symmetric jitter in `[-width / 2, width / 2)`.
    pub fn jitter(&mut self, width: f32) -> f32 {
        if width <= 0.0 {
            return 0.0;
        }
        self.next_f32() * width - width / 2.0
    }
}

/// Mixes the world seed with an entity id.
///
/// Uses SplitMix64/FxHash style multipliers followed by a murmur avalanche so
/// neighbouring ids produce unrelated streams.
pub fn compute_seed(world_seed: u64, entity: EntityId) -> u64 {
    let mut hash = world_seed;
    hash ^= u64::from(entity.index).wrapping_mul(0x9e37_79b9_7f4a_7c15);
    hash ^= u64::from(entity.generation).wrapping_mul(0x517c_c1b7_2722_0a95);

    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51_afd7_ed55_8ccd);
    hash ^= hash >> 33;

    hash
}
