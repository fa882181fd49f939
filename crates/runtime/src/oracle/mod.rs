//! In-memory implementations of the read-only oracles.
//!
//! The spatial queries are brute force over the arena. Worlds driven by this
//! crate hold tens of entities, not thousands, and a linear scan keeps the
//! query order (and therefore tie breaking) trivially deterministic.
mod entities;
mod environment;
mod poi;

pub use entities::{EntityRecord, EntityStore};
pub use environment::{Aabb, Environment};
pub use poi::PoiRegistry;
