//! Reference world for the creature task scheduler.
//!
//! `creature-core` decides what a creature does; this crate gives it a world
//! to do it in. It owns the entities, implements every oracle the core asks
//! for, and steps all task managers on a fixed tick.
//!
//! Modules are organized by responsibility:
//! - [`world`] hosts the tick loop and the mutation API
//! - [`agent`] bundles each creature's manager with its path, animations and
//!   emotions
//! - [`oracle`] provides the read-only spatial and environment queries
//! - [`scenario`] builds a world from content files
//! - [`events`] records what happened, for logs and assertions
pub mod agent;
pub mod error;
pub mod events;
pub mod oracle;
pub mod scenario;
pub mod world;

pub use agent::{Agent, AgentTable, AnimationCatalog, AnimationPlayer, EmotionStates, LinePath};
pub use error::{Result, RuntimeError};
pub use events::{EventLog, LoggedEvent, WorldEvent};
pub use oracle::{Aabb, EntityRecord, EntityStore, Environment, PoiRegistry};
pub use world::World;
