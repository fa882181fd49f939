//! In-memory oracles for unit tests.
use std::collections::{BTreeMap, BTreeSet};

use crate::config::AiSettings;
use crate::env::{
    AgentEnv, AnimationOracle, AnimationRequest, CommandError, DamageRequest, EmotionOracle,
    EntityOracle, EnvironmentOracle, MoveRequest, NotificationSink, PathStatus, PathTraverser, Poi,
    PoiOracle, ProjectileSpec, SearchType, SoundOracle, SoundRequest, TaskRng, WorldCommands,
};
use crate::manager::TaskManager;
use crate::task::{ManagerCommand, TaskContext};
use crate::types::{EntityId, EntityView, NotifyData, Vec3, WorldTime};

/// Shared, read-only part of the world.
#[derive(Debug)]
pub(crate) struct MockWorld {
    entities: BTreeMap<EntityId, EntityView>,
    pub light: u8,
    pub temperature: f32,
    pub line_of_sight: bool,
    pub tolerated: BTreeSet<EntityId>,
    pub pois: Vec<Poi>,
}

impl Default for MockWorld {
    fn default() -> Self {
        Self {
            entities: BTreeMap::new(),
            light: 15,
            temperature: 15.0,
            line_of_sight: true,
            tolerated: BTreeSet::new(),
            pois: Vec::new(),
        }
    }
}

impl MockWorld {
    pub fn insert(&mut self, view: EntityView) {
        self.entities.insert(view.id, view);
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut EntityView> {
        self.entities.get_mut(&id)
    }

    pub fn remove(&mut self, id: EntityId) {
        self.entities.remove(&id);
    }
}

impl EntityOracle for MockWorld {
    fn entity(&self, id: EntityId) -> Option<&EntityView> {
        self.entities.get(&id)
    }

    fn nearest_entity(
        &self,
        center: Vec3,
        range: f32,
        _search: SearchType,
        predicate: &mut dyn FnMut(&EntityView) -> bool,
    ) -> Option<EntityId> {
        let mut best: Option<(f32, EntityId)> = None;
        for view in self.entities.values() {
            let distance = view.position.distance(center);
            if distance > range || !predicate(view) {
                continue;
            }
            if best.is_none_or(|(d, _)| distance < d) {
                best = Some((distance, view.id));
            }
        }
        best.map(|(_, id)| id)
    }

    fn walk_entities(
        &self,
        center: Vec3,
        range: f32,
        _search: SearchType,
        visitor: &mut dyn FnMut(&EntityView) -> bool,
    ) {
        for view in self.entities.values() {
            if view.position.distance(center) <= range && !visitor(view) {
                return;
            }
        }
    }

    fn tolerates_damage_from(&self, _owner: EntityId, attacker: EntityId) -> bool {
        self.tolerated.contains(&attacker)
    }
}

impl EnvironmentOracle for MockWorld {
    fn light_level(&self, _position: Vec3) -> u8 {
        self.light
    }

    fn temperature(&self, _position: Vec3) -> f32 {
        self.temperature
    }

    fn has_direct_contact(&self, _from: Vec3, _to: Vec3) -> bool {
        self.line_of_sight
    }
}

impl PoiOracle for MockWorld {
    fn nearest_poi(
        &self,
        center: Vec3,
        range: f32,
        kind: &str,
        suitable: &mut dyn FnMut(&Poi) -> bool,
    ) -> Option<Poi> {
        self.pois
            .iter()
            .filter(|poi| poi.kind == kind && poi.position.distance(center) <= range)
            .filter(|poi| suitable(poi))
            .min_by(|a, b| {
                a.position
                    .distance(center)
                    .total_cmp(&b.position.distance(center))
            })
            .cloned()
    }

    fn weighted_nearest_poi(
        &self,
        center: Vec3,
        range: f32,
        kind: &str,
        weight: &mut dyn FnMut(&Poi) -> f32,
    ) -> Option<Poi> {
        let mut best: Option<(f32, &Poi)> = None;
        for poi in &self.pois {
            let distance = poi.position.distance(center);
            if poi.kind != kind || distance > range {
                continue;
            }
            let w = weight(poi);
            if w <= 0.0 {
                continue;
            }
            let score = distance / w;
            if best.is_none_or(|(s, _)| score < s) {
                best = Some((score, poi));
            }
        }
        best.map(|(_, poi)| poi.clone())
    }
}

#[derive(Debug)]
pub(crate) struct MockPath {
    pub status: PathStatus,
    pub target: Option<Vec3>,
    pub ready: bool,
    pub requests: Vec<MoveRequest>,
}

impl Default for MockPath {
    fn default() -> Self {
        Self {
            status: PathStatus::Idle,
            target: None,
            ready: true,
            requests: Vec::new(),
        }
    }
}

impl PathTraverser for MockPath {
    fn walk_towards(&mut self, request: MoveRequest) -> bool {
        self.requests.push(request);
        self.target = Some(request.target);
        self.status = PathStatus::Moving;
        true
    }

    fn navigate_to(&mut self, request: MoveRequest) -> bool {
        self.walk_towards(request)
    }

    fn stop(&mut self) {
        self.target = None;
        self.status = PathStatus::Idle;
    }

    fn retarget(&mut self, target: Vec3) {
        self.target = Some(target);
    }

    fn is_active(&self) -> bool {
        self.status == PathStatus::Moving
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn status(&self) -> PathStatus {
        self.status
    }

    fn current_target(&self) -> Option<Vec3> {
        self.target
    }
}

#[derive(Debug, Default)]
pub(crate) struct MockAnimations {
    running: BTreeSet<String>,
    pub started: Vec<String>,
}

impl MockAnimations {
    pub fn contains(&self, code: &str) -> bool {
        self.running.contains(code)
    }

    /// Ends an animation as if it played to completion.
    pub fn complete(&mut self, code: &str) {
        self.running.remove(code);
    }
}

impl AnimationOracle for MockAnimations {
    fn start(&mut self, request: AnimationRequest) {
        self.started.push(request.code.clone());
        self.running.insert(request.code);
    }

    fn stop(&mut self, code: &str) {
        self.running.remove(code);
    }

    fn is_running(&self, code: &str) -> bool {
        self.running.contains(code)
    }

    fn progress(&self, code: &str) -> Option<f32> {
        self.running.contains(code).then_some(0.5)
    }
}

impl SoundOracle for Vec<SoundRequest> {
    fn play(&mut self, request: SoundRequest) {
        self.push(request);
    }
}

#[derive(Debug, Default)]
pub(crate) struct MockEmotions {
    pub active: BTreeSet<String>,
    pub triggered: Vec<(String, Option<EntityId>)>,
}

impl EmotionOracle for MockEmotions {
    fn is_in_state(&self, code: &str) -> bool {
        self.active.contains(code)
    }

    fn try_trigger(&mut self, code: &str, _intensity: f32, cause: Option<EntityId>) -> bool {
        self.triggered.push((code.to_owned(), cause));
        self.active.insert(code.to_owned());
        true
    }
}

#[derive(Debug, Default)]
pub(crate) struct MockCommands {
    pub added_tags: Vec<String>,
    pub removed_tags: Vec<String>,
    pub damage: Vec<DamageRequest>,
    pub projectiles: Vec<ProjectileSpec>,
    pub reject_projectiles: bool,
}

impl WorldCommands for MockCommands {
    fn add_tag(&mut self, _entity: EntityId, tag: &str) {
        self.added_tags.push(tag.to_owned());
    }

    fn remove_tag(&mut self, _entity: EntityId, tag: &str) {
        self.removed_tags.push(tag.to_owned());
    }

    fn apply_damage(&mut self, request: DamageRequest) -> Result<(), CommandError> {
        self.damage.push(request);
        Ok(())
    }

    fn spawn_projectile(&mut self, projectile: ProjectileSpec) -> Result<(), CommandError> {
        if self.reject_projectiles {
            return Err(CommandError::ProjectileUnavailable(projectile.code));
        }
        self.projectiles.push(projectile);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub(crate) struct MockNotifier {
    pub sent: Vec<(EntityId, String, NotifyData)>,
}

impl NotificationSink for MockNotifier {
    fn notify(&mut self, recipient: EntityId, key: &str, data: &NotifyData) -> bool {
        self.sent.push((recipient, key.to_owned(), data.clone()));
        true
    }
}

/// Services owned by the entity under test.
#[derive(Debug, Default)]
pub(crate) struct MockAgent {
    pub path: MockPath,
    pub animations: MockAnimations,
    pub sounds: Vec<SoundRequest>,
    pub emotions: MockEmotions,
    pub commands: MockCommands,
    pub notifier: MockNotifier,
}

impl MockAgent {
    pub fn env<'a>(&'a mut self, world: &'a MockWorld) -> AgentEnv<'a> {
        AgentEnv {
            entities: world,
            environment: world,
            pois: world,
            path: &mut self.path,
            animations: &mut self.animations,
            sounds: &mut self.sounds,
            emotions: &mut self.emotions,
            commands: &mut self.commands,
            notifier: &mut self.notifier,
        }
    }
}

/// One entity, its world and the state a manager would thread through task
/// calls.
pub(crate) struct Harness {
    pub owner: EntityId,
    pub world: MockWorld,
    pub agent: MockAgent,
    pub rng: TaskRng,
    pub settings: AiSettings,
    pub requests: Vec<ManagerCommand>,
    pub hours: f64,
}

impl Harness {
    pub fn new(owner: EntityId) -> Self {
        Self {
            owner,
            world: MockWorld::default(),
            agent: MockAgent::default(),
            rng: TaskRng::from_seed(0x7e57),
            settings: AiSettings::default(),
            requests: Vec::new(),
            hours: 0.0,
        }
    }

    pub fn time(&self, now_ms: u64) -> WorldTime {
        WorldTime::new(now_ms, self.hours, self.settings.hours_per_day)
    }

    /// Runs `f` with a context for a direct task call at `now_ms`.
    pub fn with_ctx<R>(&mut self, now_ms: u64, f: impl FnOnce(&mut TaskContext<'_, '_>) -> R) -> R {
        let time = self.time(now_ms);
        let mut env = self.agent.env(&self.world);
        let mut ctx = TaskContext::new(
            self.owner,
            time,
            &mut env,
            &mut self.rng,
            &mut self.requests,
            &self.settings,
        );
        f(&mut ctx)
    }

    /// Ticks `manager` at `now_ms`.
    pub fn tick(&mut self, manager: &mut TaskManager, now_ms: u64, dt: f32) {
        let time = self.time(now_ms);
        let mut env = self.agent.env(&self.world);
        manager.tick(&mut env, time, dt);
    }
}
