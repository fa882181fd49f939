//! Serde shapes of the on-disk content.
//!
//! These mirror the core configuration types but keep every optional field
//! optional, so files only spell out what differs from the defaults. The
//! conversions funnel through the core builders and report
//! [`ConfigError`](creature_core::ConfigError)s naming the offending task.

mod scenario;
mod targeting;
mod task;

pub use scenario::{
    Blocker, EntitySpec, EnvironmentSpec, LightZone, PlayerSpec, PoiSpec, ScenarioSpec,
    ScriptedAction, ScriptedEvent, vec3,
};
pub use targeting::TargetingSpec;
pub use task::{AnimationSpec, BehaviorSpec, SoundSpec, TaskSpec};
