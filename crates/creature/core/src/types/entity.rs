use std::collections::BTreeSet;
use std::fmt;

use bitflags::bitflags;

use super::Vec3;

/// Generational handle to an entity slot in the host's entity arena.
///
/// Tasks never hold references to other entities. They keep an `EntityId`
/// and resolve it through [`crate::EntityOracle::entity`] on every access, so
/// a target that died, despawned or had its slot reused resolves to `None`
/// instead of a stale value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId {
    pub index: u32,
    pub generation: u32,
}

impl EntityId {
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Packs the handle into a single integer, used for seeding.
    pub const fn to_bits(self) -> u64 {
        ((self.generation as u64) << 32) | self.index as u64
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

bitflags! {
    /// Physical state bits the precondition and sensing checks look at.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct EntityFlags: u8 {
        const SWIMMING       = 1 << 0;
        const FEET_IN_LIQUID = 1 << 1;
        const ON_GROUND      = 1 << 2;
        const SNEAKING       = 1 << 3;
    }
}

/// Game mode of a player entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum GameMode {
    #[default]
    Survival,
    Creative,
    Spectator,
    Guest,
}

impl GameMode {
    /// Creative and spectator players are invisible to creature senses.
    pub const fn is_exempt(self) -> bool {
        matches!(self, GameMode::Creative | GameMode::Spectator)
    }
}

/// Player-only attributes consulted by the sensing code.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerInfo {
    pub game_mode: GameMode,
    /// Per-player stat scaling how far animals notice this player.
    pub seeking_range_multiplier: f32,
}

impl Default for PlayerInfo {
    fn default() -> Self {
        Self {
            game_mode: GameMode::Survival,
            seeking_range_multiplier: 1.0,
        }
    }
}

/// Most recent damage an entity received.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackRecord {
    pub source: EntityId,
    pub at_ms: u64,
}

/// Read-only snapshot of an entity as seen by the AI.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityView {
    pub id: EntityId,
    /// Entity type code, e.g. `wolf-male`.
    pub code: String,
    pub position: Vec3,
    pub eye_height: f32,
    pub alive: bool,
    pub interactable: bool,
    pub weight: f32,
    /// Herd membership. Zero means the entity belongs to no herd.
    pub herd_id: u64,
    pub tags: BTreeSet<String>,
    pub flags: EntityFlags,
    pub player: Option<PlayerInfo>,
    pub last_attack: Option<AttackRecord>,
    /// Domestication progress in `[0, 1]`. Shrinks detection ranges.
    pub fear_reduction: f32,
}

impl EntityView {
    pub fn new(id: EntityId, code: impl Into<String>, position: Vec3) -> Self {
        Self {
            id,
            code: code.into(),
            position,
            eye_height: 1.0,
            alive: true,
            interactable: true,
            weight: 1.0,
            herd_id: 0,
            tags: BTreeSet::new(),
            flags: EntityFlags::ON_GROUND,
            player: None,
            last_attack: None,
            fear_reduction: 0.0,
        }
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_herd(mut self, herd_id: u64) -> Self {
        self.herd_id = herd_id;
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_player(mut self, player: PlayerInfo) -> Self {
        self.player = Some(player);
        self
    }

    pub fn with_flags(mut self, flags: EntityFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn is_player(&self) -> bool {
        self.player.is_some()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn eye_position(&self) -> Vec3 {
        self.position + Vec3::UP * self.eye_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_bits_pack_generation_high() {
        let id = EntityId::new(7, 2);
        assert_eq!(id.to_bits(), (2u64 << 32) | 7);
        assert_eq!(id.to_string(), "#7v2");
    }

    #[test]
    fn game_mode_exemption() {
        assert!(GameMode::Creative.is_exempt());
        assert!(GameMode::Spectator.is_exempt());
        assert!(!GameMode::Survival.is_exempt());
        assert_eq!("spectator".parse::<GameMode>().unwrap(), GameMode::Spectator);
    }
}
