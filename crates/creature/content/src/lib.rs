//! Data-driven creature content and loaders.
//!
//! This crate turns files into core configuration:
//! - behavior sets, one file per creature, listing its tasks (RON or JSON)
//! - engine settings (TOML)
//! - simulation scenarios placing creatures, POIs and obstacles (RON)
//!
//! The file shapes live in [`formats`]; [`loaders`] reads them from disk and
//! validates them through the `creature-core` builders, so a file that loads
//! is a file the scheduler accepts.

#[cfg(feature = "serde")]
pub mod formats;

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "serde")]
pub use formats::{BehaviorSpec, EntitySpec, ScenarioSpec, ScriptedAction, TargetingSpec, TaskSpec};

#[cfg(feature = "loaders")]
pub use loaders::{BehaviorLoader, BehaviorSet, ConfigLoader, ContentFactory, ScenarioLoader};
