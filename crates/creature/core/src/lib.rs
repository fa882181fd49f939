//! Per-entity task scheduling engine for autonomous creatures.
//!
//! `creature-core` defines the contract every behavior task implements, the
//! slot-based [`manager::TaskManager`] that arbitrates between tasks each tick,
//! the shared precondition pipeline, the targeting substrate and the concrete
//! tasks built on top of them (including the turret-mode state machine).
//!
//! The crate performs no I/O. Everything outside the AI core (spatial index,
//! path traverser, animation and sound playback, emotion states, world
//! mutation) is reached through the oracle traits in [`env`], which the host
//! bundles into an [`env::AgentEnv`] for each tick.
//!
//! Modules are organized by responsibility:
//! - [`types`] holds ids, vectors, time and entity snapshots
//! - [`env`] declares the external collaborators and the per-entity RNG
//! - [`task`] defines the task contract, shared task state and configuration
//! - [`preconditions`] implements the ordered gate pipeline
//! - [`targeting`] implements target search, filtering and retaliation
//! - [`manager`] hosts the slot scheduler and its builder
//! - [`tasks`] contains the concrete behaviors and the kind registry
pub mod config;
pub mod env;
pub mod error;
pub mod manager;
pub mod preconditions;
pub mod targeting;
pub mod task;
pub mod tasks;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use config::AiSettings;
pub use env::{
    AgentEnv, AnimationOracle, AnimationRequest, CommandError, DamageRequest, EmotionOracle,
    EntityOracle, EnvironmentOracle, MoveRequest, NotificationSink, PathStatus, PathTraverser, Poi,
    PoiOracle, ProjectileSpec, SearchType, SoundOracle, SoundRequest, TaskRng, WorldCommands,
    compute_seed,
};
pub use error::{AiError, ConfigError, ErrorContext, ErrorSeverity};
pub use manager::{TaskManager, TaskManagerBuilder};
pub use preconditions::{PreconditionFailure, Stages};
pub use targeting::{
    CodePattern, HerdFilter, LightCurve, PlayerHostility, TagRule, TargetSource, Targeting,
    TargetingConfig, TargetingConfigBuilder,
};
pub use task::{
    AiTask, Cooldown, DayTimeFrame, ManagerCommand, SoundBinding, AnimationBinding, Span,
    TargetingTask, TaskBase, TaskConfig, TaskConfigBuilder, TaskContext, TaskDirectory,
};
pub use tasks::{Behavior, TaskDefinition, TaskKind};
pub use types::{
    AttackRecord, EntityFlags, EntityId, EntityView, GameMode, NotifyData, PlayerInfo, Vec3,
    WorldTime,
};
