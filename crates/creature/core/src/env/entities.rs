use crate::types::{EntityId, EntityView, Vec3};

/// Which partition of the spatial index a query walks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SearchType {
    /// Creatures and players.
    #[default]
    Creatures,
    /// Items, projectiles and other inanimate entities.
    Inanimate,
    /// Both partitions.
    All,
}

/// Entity lookup and spatial index.
///
/// Implementations decide how the index is built; the core only needs the
/// best match for a predicate within a radius.
pub trait EntityOracle {
    /// Resolves a handle. Returns `None` for despawned entities and stale
    /// generations.
    fn entity(&self, id: EntityId) -> Option<&EntityView>;

    /// Returns the entity closest to `center` within `range` that satisfies
    /// `predicate`.
    fn nearest_entity(
        &self,
        center: Vec3,
        range: f32,
        search: SearchType,
        predicate: &mut dyn FnMut(&EntityView) -> bool,
    ) -> Option<EntityId>;

    /// Visits every entity within `range` of `center`. The visitor returns
    /// `false` to stop the walk early.
    fn walk_entities(
        &self,
        center: Vec3,
        range: f32,
        search: SearchType,
        visitor: &mut dyn FnMut(&EntityView) -> bool,
    );

    /// Whether `owner` ignores damage dealt by `attacker` (e.g. a tamed
    /// animal and its owner). Such attackers are never retaliated against.
    fn tolerates_damage_from(&self, _owner: EntityId, _attacker: EntityId) -> bool {
        false
    }
}
