//! Value types shared by the scheduler, the targeting code and the oracles.
mod entity;
mod math;
mod time;

pub use entity::{AttackRecord, EntityFlags, EntityId, EntityView, GameMode, PlayerInfo};
pub use math::Vec3;
pub use time::WorldTime;

/// Payload carried by a task notification.
///
/// Notifications are how one entity's behavior reaches into another's, for
/// example a herd member asking its neighbours to chase the same target.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NotifyData {
    None,
    Entity(EntityId),
    Position(Vec3),
}

impl NotifyData {
    pub fn entity(&self) -> Option<EntityId> {
        match self {
            NotifyData::Entity(id) => Some(*id),
            _ => None,
        }
    }
}
