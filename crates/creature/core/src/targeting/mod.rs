//! Target search, filtering and retaliation shared by targeting tasks.
//!
//! A [`Targeting`] policy owns a task's [`TargetingConfig`] and its current
//! target. The target is held as an [`EntityId`] and resolved through the
//! entity oracle on every access; a despawned or reused slot resolves to
//! nothing and the task re-searches instead of touching a stale entity.
//!
//! # Design
//!
//! Filtering is split into two layers:
//!
//! - [`is_targetable`] decides whether a candidate is the *kind* of entity the
//!   task wants (alive, herd, tags, weight, code exceptions)
//! - [`can_sense`] decides whether the owner can *perceive* it (self,
//!   interactability, skip codes, player rules, distance)
//!
//! A target that was not found by the task's own search (a recent attacker,
//! or one handed over by the manager or a herd notification) is re-checked
//! with [`can_pursue`] instead, so the kind filters do not drop it.
//!
//! Players are handled as an explicit special case inside [`can_sense`]:
//! hostility policy, creative and spectator exemption, and the detection
//! multiplier composed from the light curve, sneaking and the player's stat.
mod config;
mod filter;
mod light;
mod retaliation;
mod sense;
mod tags;

pub use config::{
    CodePattern, HerdFilter, PlayerHostility, TargetingConfig, TargetingConfigBuilder,
};
pub use filter::{is_targetable, weight_fraction};
pub use light::LightCurve;
pub use retaliation::{can_pursue, retaliation_target};
pub use sense::{can_sense, detection_multiplier};
pub use tags::{TagRule, tags_match};

use crate::task::{SenseView, TaskContext};
use crate::types::{EntityId, EntityView};

/// How the current target was obtained.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
pub enum TargetSource {
    /// Found by the task's own search.
    #[default]
    Search,
    /// The owner's recent attacker.
    Retaliation,
    /// Set from outside: a manager hand-off or a herd notification.
    Assigned,
}

/// Targeting policy composed into targeting tasks.
#[derive(Clone, Debug)]
pub struct Targeting {
    config: TargetingConfig,
    target: Option<EntityId>,
    source: TargetSource,
}

impl Targeting {
    pub fn new(config: TargetingConfig) -> Self {
        Self {
            config,
            target: None,
            source: TargetSource::Search,
        }
    }

    pub fn config(&self) -> &TargetingConfig {
        &self.config
    }

    pub fn target(&self) -> Option<EntityId> {
        self.target
    }

    pub fn source(&self) -> TargetSource {
        self.source
    }

    /// Assigns a target from outside the task's own search.
    pub fn set_target(&mut self, target: Option<EntityId>) {
        self.target = target;
        self.source = TargetSource::Assigned;
    }

    pub fn clear_target(&mut self) {
        self.target = None;
        self.source = TargetSource::Search;
    }

    /// Seeking range shrunk by the owner's fear reduction.
    pub fn effective_range(&self, owner: &EntityView) -> f32 {
        self.scaled_range(self.config.seeking_range, owner)
    }

    /// Any task range shrunk by the owner's fear reduction.
    pub fn scaled_range(&self, range: f32, owner: &EntityView) -> f32 {
        range * (1.0 - owner.fear_reduction.clamp(0.0, 1.0))
    }

    pub fn can_sense(
        &self,
        owner: &EntityView,
        candidate: &EntityView,
        range: f32,
        view: &SenseView<'_>,
    ) -> bool {
        can_sense(&self.config, owner, candidate, range, view)
    }

    pub fn is_targetable(
        &self,
        owner: &EntityView,
        candidate: &EntityView,
        range: f32,
        view: &SenseView<'_>,
    ) -> bool {
        is_targetable(&self.config, owner, candidate, range, view)
    }

    /// Best target within `range`: a qualifying recent attacker when
    /// retaliation is enabled, otherwise the nearest targetable entity.
    pub fn find_target(
        &self,
        owner: &EntityView,
        range: f32,
        view: &SenseView<'_>,
    ) -> Option<EntityId> {
        self.search(owner, range, view).map(|(id, _)| id)
    }

    fn search(
        &self,
        owner: &EntityView,
        range: f32,
        view: &SenseView<'_>,
    ) -> Option<(EntityId, TargetSource)> {
        if let Some(attacker) = retaliation_target(&self.config, owner, range, view) {
            return Some((attacker, TargetSource::Retaliation));
        }
        view.entities
            .nearest_entity(
                owner.position,
                range,
                self.config.search_type,
                &mut |candidate: &EntityView| {
                    is_targetable(&self.config, owner, candidate, range, view)
                },
            )
            .map(|id| (id, TargetSource::Search))
    }

    /// Resolves the current target. `None` when unset or gone.
    pub fn resolve<'s>(&self, view: &SenseView<'s>) -> Option<&'s EntityView> {
        self.target.and_then(|id| view.entities.entity(id))
    }

    /// Whether the current target is still worth pursuing: targetable for
    /// searched targets, [`can_pursue`] for attackers and assigned ones.
    pub fn keeps_target(
        &self,
        owner: &EntityView,
        target: &EntityView,
        range: f32,
        view: &SenseView<'_>,
    ) -> bool {
        match self.source {
            TargetSource::Search => self.is_targetable(owner, target, range, view),
            TargetSource::Retaliation | TargetSource::Assigned => {
                can_pursue(&self.config, owner, target, range, view)
            }
        }
    }

    /// The current target still resolves and is still worth pursuing.
    pub fn target_valid(&self, owner: &EntityView, range: f32, view: &SenseView<'_>) -> bool {
        self.resolve(view)
            .is_some_and(|target| self.keeps_target(owner, target, range, view))
    }

    /// Nothing solid between the owner's and the target's eyes.
    pub fn has_direct_contact(
        &self,
        owner: &EntityView,
        target: &EntityView,
        view: &SenseView<'_>,
    ) -> bool {
        view.environment
            .has_direct_contact(owner.eye_position(), target.eye_position())
    }

    /// Searches with the effective seeking range and stores the result.
    pub fn acquire(&mut self, ctx: &TaskContext<'_, '_>) -> Option<EntityId> {
        let found = ctx.owner_view().and_then(|owner| {
            let range = self.effective_range(owner);
            self.search(owner, range, &ctx.sensing())
        });
        self.target = found.map(|(id, _)| id);
        self.source = found.map_or(TargetSource::Search, |(_, source)| source);
        self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;
    use crate::types::{AttackRecord, EntityFlags, GameMode, PlayerInfo, Vec3};

    fn owner_id() -> EntityId {
        EntityId::new(1, 0)
    }

    fn harness_with_owner(owner: EntityView) -> Harness {
        let mut harness = Harness::new(owner.id);
        harness.world.insert(owner);
        harness
    }

    fn check(
        harness: &mut Harness,
        config: &TargetingConfig,
        candidate: EntityId,
        range: f32,
    ) -> bool {
        harness.with_ctx(0, |ctx| {
            let view = ctx.sensing();
            let owner = view.entities.entity(ctx.owner()).unwrap();
            let candidate = view.entities.entity(candidate).unwrap();
            is_targetable(config, owner, candidate, range, &view)
        })
    }

    #[test]
    fn weight_fraction_window_with_code_exception() {
        let owner = EntityView::new(owner_id(), "wolf-male", Vec3::ZERO).with_weight(10.0);
        let mut harness = harness_with_owner(owner);
        let light = EntityId::new(2, 0);
        let heavy = EntityId::new(3, 0);
        harness
            .world
            .insert(EntityView::new(light, "sheep", Vec3::new(3.0, 0.0, 0.0)).with_weight(6.0));
        harness
            .world
            .insert(EntityView::new(heavy, "bear", Vec3::new(4.0, 0.0, 0.0)).with_weight(20.0));

        let config = TargetingConfig::builder(16.0)
            .target_weight(0.3, 0.8)
            .build("meleeattack")
            .unwrap();
        assert!(check(&mut harness, &config, light, 16.0));
        assert!(!check(&mut harness, &config, heavy, 16.0));

        let config = TargetingConfig::builder(16.0)
            .target_weight(0.3, 0.8)
            .entity_code("bea*")
            .build("meleeattack")
            .unwrap();
        assert!(check(&mut harness, &config, heavy, 16.0));
    }

    #[test]
    fn dead_and_herd_filters_run_first() {
        let owner = EntityView::new(owner_id(), "wolf", Vec3::ZERO).with_herd(5);
        let mut harness = harness_with_owner(owner);
        let packmate = EntityId::new(2, 0);
        let stranger = EntityId::new(3, 0);
        let corpse = EntityId::new(4, 0);
        harness
            .world
            .insert(EntityView::new(packmate, "wolf", Vec3::new(1.0, 0.0, 0.0)).with_herd(5));
        harness
            .world
            .insert(EntityView::new(stranger, "wolf", Vec3::new(2.0, 0.0, 0.0)).with_herd(9));
        let mut dead = EntityView::new(corpse, "sheep", Vec3::new(1.0, 0.0, 1.0));
        dead.alive = false;
        harness.world.insert(dead);

        let rivals = TargetingConfig::builder(10.0)
            .herd(HerdFilter::DifferentHerd)
            .build("seekentity")
            .unwrap();
        assert!(!check(&mut harness, &rivals, packmate, 10.0));
        assert!(check(&mut harness, &rivals, stranger, 10.0));
        assert!(!check(&mut harness, &rivals, corpse, 10.0));

        let scavenger = TargetingConfig::builder(10.0)
            .target_dead(true)
            .build("seekentity")
            .unwrap();
        assert!(check(&mut harness, &scavenger, corpse, 10.0));
    }

    #[test]
    fn players_follow_game_mode_and_hostility() {
        let owner = EntityView::new(owner_id(), "wolf", Vec3::ZERO);
        let mut harness = harness_with_owner(owner);
        let survivor = EntityId::new(2, 0);
        let builder = EntityId::new(3, 0);
        harness.world.insert(
            EntityView::new(survivor, "player", Vec3::new(5.0, 0.0, 0.0))
                .with_player(PlayerInfo::default()),
        );
        harness.world.insert(
            EntityView::new(builder, "player", Vec3::new(5.0, 0.0, 0.0)).with_player(PlayerInfo {
                game_mode: GameMode::Creative,
                ..PlayerInfo::default()
            }),
        );

        let config = TargetingConfig::builder(10.0).build("meleeattack").unwrap();
        assert!(check(&mut harness, &config, survivor, 10.0));
        assert!(!check(&mut harness, &config, builder, 10.0));

        let wary = TargetingConfig::builder(10.0)
            .player_hostility(PlayerHostility::IfHostile)
            .build("meleeattack")
            .unwrap();
        assert!(!check(&mut harness, &wary, survivor, 10.0));
        harness.agent.emotions.active.insert("aggressiveondamage".into());
        assert!(check(&mut harness, &wary, survivor, 10.0));

        let never = TargetingConfig::builder(10.0)
            .player_hostility(PlayerHostility::Never)
            .build("meleeattack")
            .unwrap();
        assert!(!check(&mut harness, &never, survivor, 10.0));
    }

    #[test]
    fn sneaking_and_darkness_shrink_player_detection() {
        let owner = EntityView::new(owner_id(), "wolf", Vec3::ZERO);
        let mut harness = harness_with_owner(owner);
        let player = EntityId::new(2, 0);
        harness.world.insert(
            EntityView::new(player, "player", Vec3::new(7.0, 0.0, 0.0))
                .with_player(PlayerInfo::default())
                .with_flags(EntityFlags::SNEAKING | EntityFlags::ON_GROUND),
        );

        let config = TargetingConfig::builder(10.0).build("seekentity").unwrap();
        assert!(!check(&mut harness, &config, player, 10.0));
        assert!(check(&mut harness, &config, player, 12.0));

        let nocturnal = TargetingConfig::builder(20.0)
            .light_curve([0.0, 4.0, 12.0, 16.0])
            .build("seekentity")
            .unwrap();
        harness.world.light = 20;
        assert!(!check(&mut harness, &nocturnal, player, 20.0));
        harness.world.light = 8;
        assert!(check(&mut harness, &nocturnal, player, 20.0));
    }

    #[test]
    fn find_target_prefers_recent_attacker() {
        let attacker = EntityId::new(3, 0);
        let mut owner = EntityView::new(owner_id(), "wolf", Vec3::ZERO);
        owner.last_attack = Some(AttackRecord {
            source: attacker,
            at_ms: 1_000,
        });
        let mut harness = harness_with_owner(owner);
        harness
            .world
            .insert(EntityView::new(EntityId::new(2, 0), "sheep", Vec3::new(1.0, 0.0, 0.0)));
        harness
            .world
            .insert(EntityView::new(attacker, "bear", Vec3::new(6.0, 0.0, 0.0)));

        let mut targeting = Targeting::new(
            TargetingConfig::builder(10.0)
                .retaliate(5_000)
                .build("meleeattack")
                .unwrap(),
        );
        let found = harness.with_ctx(2_000, |ctx| targeting.acquire(ctx));
        assert_eq!(found, Some(attacker));
        assert_eq!(targeting.source(), TargetSource::Retaliation);

        harness.world.tolerated.insert(attacker);
        let found = harness.with_ctx(2_000, |ctx| targeting.acquire(ctx));
        assert_eq!(found, Some(EntityId::new(2, 0)));

        harness.world.tolerated.clear();
        let found = harness.with_ctx(7_000, |ctx| targeting.acquire(ctx));
        assert_eq!(found, Some(EntityId::new(2, 0)));
        assert_eq!(targeting.source(), TargetSource::Search);
    }

    #[test]
    fn attacker_outside_the_kind_filters_is_kept() {
        let bear = EntityId::new(3, 0);
        let mut owner = EntityView::new(owner_id(), "wolf-male", Vec3::ZERO);
        owner.last_attack = Some(AttackRecord {
            source: bear,
            at_ms: 1_000,
        });
        let mut harness = harness_with_owner(owner);
        harness
            .world
            .insert(EntityView::new(bear, "bear", Vec3::new(6.0, 0.0, 0.0)));

        let mut targeting = Targeting::new(
            TargetingConfig::builder(10.0)
                .entity_code("sheep")
                .retaliate(5_000)
                .build("seekentity")
                .unwrap(),
        );
        assert_eq!(harness.with_ctx(2_000, |ctx| targeting.acquire(ctx)), Some(bear));

        let still_valid = |harness: &mut Harness, targeting: &Targeting, now| {
            harness.with_ctx(now, |ctx| {
                let view = ctx.sensing();
                let owner = view.entities.entity(ctx.owner()).unwrap();
                targeting.target_valid(owner, 10.0, &view)
            })
        };
        // Long after the window closed the chase still holds.
        assert!(still_valid(&mut harness, &targeting, 9_000));

        harness.world.tolerated.insert(bear);
        assert!(!still_valid(&mut harness, &targeting, 9_000));
        harness.world.tolerated.clear();

        if let Some(view) = harness.world.get_mut(bear) {
            view.alive = false;
        }
        assert!(!still_valid(&mut harness, &targeting, 9_000));
    }

    #[test]
    fn assigned_target_skips_kind_filters() {
        let owner = EntityView::new(owner_id(), "wolf-female", Vec3::ZERO);
        let mut harness = harness_with_owner(owner);
        let bear = EntityId::new(3, 0);
        harness
            .world
            .insert(EntityView::new(bear, "bear", Vec3::new(6.0, 0.0, 0.0)));

        let mut targeting = Targeting::new(
            TargetingConfig::builder(10.0)
                .entity_code("sheep")
                .build("seekentity")
                .unwrap(),
        );
        targeting.set_target(Some(bear));
        assert_eq!(targeting.source(), TargetSource::Assigned);
        let valid = |harness: &mut Harness, targeting: &Targeting| {
            harness.with_ctx(0, |ctx| {
                let view = ctx.sensing();
                let owner = view.entities.entity(ctx.owner()).unwrap();
                targeting.target_valid(owner, 10.0, &view)
            })
        };
        assert!(valid(&mut harness, &targeting));

        targeting.clear_target();
        assert_eq!(targeting.source(), TargetSource::Search);
        targeting.set_target(Some(bear));
        if let Some(view) = harness.world.get_mut(bear) {
            view.position = Vec3::new(30.0, 0.0, 0.0);
        }
        assert!(!valid(&mut harness, &targeting));
    }

    #[test]
    fn fear_reduction_shrinks_range() {
        let mut owner = EntityView::new(owner_id(), "sheep", Vec3::ZERO);
        owner.fear_reduction = 0.5;
        let targeting = Targeting::new(TargetingConfig::builder(12.0).build("fleeentity").unwrap());
        assert_eq!(targeting.effective_range(&owner), 6.0);
    }
}
