//! Traits describing the world outside the AI core.
//!
//! Oracles expose the spatial entity index, environmental fields, points of
//! interest and the per-entity services (path traverser, animation, sound,
//! emotion states) that tasks consume. The core never implements them: the
//! host bundles its implementations into an [`AgentEnv`] for each entity tick.
//!
//! Read-only oracles are shared references. Services that tasks drive are
//! mutable references owned by the entity being ticked. World mutations go
//! through [`WorldCommands`], which hosts are free to buffer until the end of
//! the entity's tick.
mod animation;
mod commands;
mod emotion;
mod entities;
mod environment;
mod path;
mod poi;
mod rng;

pub use animation::{AnimationOracle, AnimationRequest, SoundOracle, SoundRequest};
pub use commands::{CommandError, DamageRequest, NotificationSink, ProjectileSpec, WorldCommands};
pub use emotion::EmotionOracle;
pub use entities::{EntityOracle, SearchType};
pub use environment::EnvironmentOracle;
pub use path::{MoveRequest, PathStatus, PathTraverser};
pub use poi::{Poi, PoiOracle};
pub use rng::{TaskRng, compute_seed};

/// Everything one entity's task manager may touch during a tick.
///
/// The lifetime `'a` ties the bundle to the host's borrow of its world for
/// the duration of that entity's tick.
pub struct AgentEnv<'a> {
    /// Entity lookup and the spatial index.
    pub entities: &'a dyn EntityOracle,
    /// Light, temperature and line-of-contact queries.
    pub environment: &'a dyn EnvironmentOracle,
    /// Points-of-interest registry.
    pub pois: &'a dyn PoiOracle,
    /// The entity's own path traverser.
    pub path: &'a mut dyn PathTraverser,
    /// The entity's own animation player.
    pub animations: &'a mut dyn AnimationOracle,
    /// Sound playback.
    pub sounds: &'a mut dyn SoundOracle,
    /// The entity's own emotion states.
    pub emotions: &'a mut dyn EmotionOracle,
    /// Deferred world mutations (tags, damage, projectiles).
    pub commands: &'a mut dyn WorldCommands,
    /// Synchronous delivery of notifications to other entities.
    pub notifier: &'a mut dyn NotificationSink,
}
