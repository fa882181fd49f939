//! The reference world and its tick loop.
//!
//! # Tick order
//!
//! 1. scripted events due at the current time are applied
//! 2. every agent ticks its task manager, in entity slot order, each one
//!    checked out of the [`AgentTable`] while it runs
//! 3. paths advance and move their owners
//! 4. finished animations are reported to their owners' managers
//! 5. projectiles fly and hit
//! 6. agents whose entity died are stopped and removed
//! 7. the clock advances by one tick
//!
//! # Design
//!
//! Tasks only see the world through the core oracles. Reads go to the entity
//! store as it was when the agent's tick started; mutations are buffered in
//! a [`CommandBuffer`] and applied once the agent is done, so no task ever
//! observes a half-applied tick of its own.
mod commands;
mod projectile;

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use creature_core::{
    AgentEnv, AiSettings, AttackRecord, EntityId, EntityView, NotifyData, TaskDefinition,
    TaskManager, Vec3, WorldTime,
};
use tracing::{debug, warn};

use crate::agent::{Agent, AgentTable, AnimationCatalog, AnimationPlayer};
use crate::error::{Result, RuntimeError};
use crate::events::{EventLog, LoggedEvent, WorldEvent};
use crate::oracle::{EntityRecord, EntityStore, Environment, PoiRegistry};

use commands::{AgentNotifier, Command, CommandBuffer, SoundLog};
use projectile::Projectile;

/// In-memory world driving one task manager per creature.
pub struct World {
    settings: AiSettings,
    time: WorldTime,
    tick_ms: u64,
    hours_per_second: f64,
    entities: EntityStore,
    environment: Environment,
    pois: PoiRegistry,
    agents: AgentTable,
    animations: AnimationCatalog,
    projectile_types: BTreeSet<String>,
    projectiles: Vec<Projectile>,
    handles: BTreeMap<String, EntityId>,
    script: VecDeque<(u64, creature_content::ScriptedAction)>,
    events: EventLog,
}

impl World {
    pub const DEFAULT_TICK_MS: u64 = 50;

    /// Creates an empty world at time zero.
    pub fn new(settings: AiSettings, environment: Environment) -> Self {
        let time = WorldTime::new(0, 0.0, settings.hours_per_day);
        Self {
            settings,
            time,
            tick_ms: Self::DEFAULT_TICK_MS,
            hours_per_second: 1.0 / 60.0,
            entities: EntityStore::new(),
            environment,
            pois: PoiRegistry::new(),
            agents: AgentTable::new(),
            animations: AnimationCatalog::default(),
            projectile_types: BTreeSet::new(),
            projectiles: Vec::new(),
            handles: BTreeMap::new(),
            script: VecDeque::new(),
            events: EventLog::new(),
        }
    }

    pub fn with_tick_ms(mut self, tick_ms: u64) -> Self {
        self.tick_ms = tick_ms.max(1);
        self
    }

    /// Sets the calendar: the hour of day the world starts at and how many
    /// in-game hours pass per simulated second.
    pub fn with_calendar(mut self, start_hour: f32, hours_per_second: f64) -> Self {
        let day = f64::from(self.settings.hours_per_day);
        self.time.total_hours = f64::from(start_hour) / 24.0 * day;
        self.hours_per_second = hours_per_second.max(0.0);
        self
    }

    pub fn with_animations(mut self, lengths: BTreeMap<String, u64>) -> Self {
        self.animations = AnimationCatalog::new(lengths);
        self
    }

    pub fn with_projectile_type(mut self, code: impl Into<String>) -> Self {
        self.projectile_types.insert(code.into());
        self
    }

    // ===== accessors =====

    pub fn settings(&self) -> &AiSettings {
        &self.settings
    }

    pub fn time(&self) -> WorldTime {
        self.time
    }

    pub fn tick_ms(&self) -> u64 {
        self.tick_ms
    }

    pub fn entity(&self, id: EntityId) -> Option<&EntityView> {
        self.entities.get(id).map(|record| &record.view)
    }

    pub fn health(&self, id: EntityId) -> Option<f32> {
        self.entities.get(id).map(|record| record.health)
    }

    pub fn entities(&self) -> &EntityStore {
        &self.entities
    }

    /// Resolves a scenario handle.
    pub fn entity_id(&self, handle: &str) -> Option<EntityId> {
        self.handles.get(handle).copied()
    }

    /// Handles of the named entities, sorted.
    pub fn handles(&self) -> impl Iterator<Item = (&str, EntityId)> {
        self.handles.iter().map(|(name, id)| (name.as_str(), *id))
    }

    pub fn manager(&self, id: EntityId) -> Option<&TaskManager> {
        self.agents.get(id).map(|agent| &agent.manager)
    }

    pub fn agent(&self, id: EntityId) -> Option<&Agent> {
        self.agents.get(id)
    }

    pub fn environment_mut(&mut self) -> &mut Environment {
        &mut self.environment
    }

    pub fn pois_mut(&mut self) -> &mut PoiRegistry {
        &mut self.pois
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<LoggedEvent> {
        self.events.drain()
    }

    // ===== population =====

    /// Places a creature. `build` receives the allocated id.
    pub fn spawn(&mut self, health: f32, build: impl FnOnce(EntityId) -> EntityView) -> EntityId {
        let id = self
            .entities
            .spawn(|id| EntityRecord::creature(build(id), health));
        debug!(entity = %id, "entity spawned");
        id
    }

    /// Names an entity for scripted events and lookups.
    pub fn name(&mut self, handle: impl Into<String>, id: EntityId) {
        self.handles.insert(handle.into(), id);
    }

    /// Builds and attaches a task manager for an existing entity.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Config`] when a task fails to build or the
    /// task set does not initialize.
    pub fn attach_tasks(
        &mut self,
        id: EntityId,
        definitions: impl IntoIterator<Item = TaskDefinition>,
    ) -> Result<()> {
        let code = self
            .entity(id)
            .map(|view| view.code.clone())
            .ok_or_else(|| RuntimeError::UnknownEntity(id.to_string()))?;
        let config_error = |source| RuntimeError::Config {
            entity: code.clone(),
            source,
        };

        let tasks = definitions
            .into_iter()
            .map(TaskDefinition::build)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|err| config_error(err.for_entity(&code)))?;
        let manager = TaskManager::builder(id, code.as_str())
            .settings(self.settings.clone())
            .tasks(tasks)
            .build(&self.time)
            .map_err(config_error)?;

        debug!(entity = %id, code = %code, tasks = manager.len(), "task manager attached");
        self.agents
            .insert(Agent::new(manager, AnimationPlayer::new(self.animations.clone())));
        Ok(())
    }

    pub fn register_projectile_type(&mut self, code: impl Into<String>) {
        self.projectile_types.insert(code.into());
    }

    pub(crate) fn schedule(&mut self, at_ms: u64, action: creature_content::ScriptedAction) {
        let index = self
            .script
            .iter()
            .position(|(due, _)| *due > at_ms)
            .unwrap_or(self.script.len());
        self.script.insert(index, (at_ms, action));
    }

    // ===== simulation =====

    /// Advances the world by one tick.
    pub fn tick(&mut self) {
        self.run_script();

        let dt = self.tick_ms as f32 / 1000.0;
        for id in self.agents.ids() {
            self.run_agent(id, |manager, env, time| manager.tick(env, time, dt));
        }

        self.move_agents(dt);
        self.finish_animations();
        self.fly_projectiles(dt);
        self.bury_dead();
        self.time = self.time.advanced(dt, self.hours_per_second);
    }

    /// Ticks until at least `duration_ms` of simulated time has passed.
    pub fn run_for(&mut self, duration_ms: u64) {
        let end = self.time.elapsed_ms + duration_ms;
        while self.time.elapsed_ms < end {
            self.tick();
        }
    }

    /// Starts `code` on `id` right away, bypassing its preconditions.
    pub fn execute_task(&mut self, id: EntityId, code: &str, target: Option<EntityId>) -> bool {
        self.run_agent(id, |manager, env, time| {
            manager.execute_task(env, time, code, target)
        })
        .unwrap_or(false)
    }

    pub fn stop_task(&mut self, id: EntityId, code: &str) -> bool {
        self.run_agent(id, |manager, env, time| manager.stop_task(env, time, code))
            .unwrap_or(false)
    }

    pub fn set_task_enabled(&mut self, id: EntityId, code: &str, enabled: bool) -> bool {
        self.agents
            .get_mut(id)
            .is_some_and(|agent| agent.manager.set_task_enabled(code, enabled))
    }

    /// Offers a notification to `id`'s tasks from outside the world.
    pub fn notify(&mut self, id: EntityId, key: &str, data: &NotifyData) -> bool {
        self.agents
            .get_mut(id)
            .is_some_and(|agent| agent.manager.notify(key, data))
    }

    /// `source` hits `target`, recording the attack for retaliation.
    pub fn attack(&mut self, source: EntityId, target: EntityId, amount: f32) -> bool {
        self.damage(source, target, amount)
    }

    pub fn teleport(&mut self, id: EntityId, position: Vec3) -> bool {
        match self.entities.get_mut(id) {
            Some(record) => {
                record.view.position = position;
                true
            }
            None => false,
        }
    }

    /// Removes an entity, cancelling its running tasks first.
    pub fn despawn(&mut self, id: EntityId) -> bool {
        self.run_agent(id, |manager, env, time| manager.on_despawn(env, time));
        self.agents.take(id);
        self.projectiles.retain(|projectile| projectile.id != id);
        self.handles.retain(|_, handle| *handle != id);
        let removed = self.entities.remove(id).is_some();
        if removed {
            self.events
                .push(self.time.elapsed_ms, WorldEvent::Despawned { entity: id });
        }
        removed
    }

    /// Puts `id` into an emotion state, expiring after `duration_ms`.
    pub fn set_emotion(&mut self, id: EntityId, state: &str, duration_ms: Option<u64>) -> bool {
        let now = self.time.elapsed_ms;
        match self.agents.get_mut(id) {
            Some(agent) => {
                agent.emotions.set_clock(now);
                agent.emotions.enter(state, duration_ms);
                true
            }
            None => false,
        }
    }

    // ===== internals =====

    /// Checks `id`'s agent out of the table, runs `f` against a fresh
    /// environment and applies what it left behind.
    fn run_agent<R>(
        &mut self,
        id: EntityId,
        f: impl FnOnce(&mut TaskManager, &mut AgentEnv<'_>, WorldTime) -> R,
    ) -> Option<R> {
        let mut agent = self.agents.take(id)?;
        let time = self.time;
        agent.emotions.set_clock(time.elapsed_ms);
        let before = agent.active_tasks();

        let (result, commands, delivered, sounds) = {
            let mut commands = CommandBuffer::new(&self.entities, &self.projectile_types);
            let mut notifier = AgentNotifier::new(&mut self.agents);
            let mut sounds = SoundLog::default();
            let mut env = AgentEnv {
                entities: &self.entities,
                environment: &self.environment,
                pois: &self.pois,
                path: &mut agent.path,
                animations: &mut agent.animations,
                sounds: &mut sounds,
                emotions: &mut agent.emotions,
                commands: &mut commands,
                notifier: &mut notifier,
            };
            let result = f(&mut agent.manager, &mut env, time);
            (
                result,
                commands.into_commands(),
                notifier.into_delivered(),
                sounds.into_played(),
            )
        };

        let after = agent.active_tasks();
        self.agents.insert(agent);

        let now = time.elapsed_ms;
        for task in before.iter().filter(|task| !after.contains(task)) {
            self.events.push(now, WorldEvent::TaskStopped {
                entity: id,
                task: task.clone(),
            });
        }
        for task in after.iter().filter(|task| !before.contains(task)) {
            self.events.push(now, WorldEvent::TaskStarted {
                entity: id,
                task: task.clone(),
            });
        }
        for (recipient, key) in delivered {
            self.events.push(now, WorldEvent::Notified {
                sender: id,
                recipient,
                key,
            });
        }
        for sound in sounds {
            self.events.push(now, WorldEvent::SoundPlayed {
                entity: id,
                asset: sound.asset,
            });
        }
        self.apply(commands);
        Some(result)
    }

    fn apply(&mut self, commands: Vec<Command>) {
        let now = self.time.elapsed_ms;
        for command in commands {
            match command {
                Command::AddTag { entity, tag } => {
                    if let Some(record) = self.entities.get_mut(entity) {
                        record.view.tags.insert(tag.clone());
                        self.events.push(now, WorldEvent::TagAdded { entity, tag });
                    }
                }
                Command::RemoveTag { entity, tag } => {
                    if let Some(record) = self.entities.get_mut(entity) {
                        if record.view.tags.remove(&tag) {
                            self.events.push(now, WorldEvent::TagRemoved { entity, tag });
                        }
                    }
                }
                Command::Damage(request) => {
                    self.damage(request.source, request.target, request.amount);
                }
                Command::Projectile(spec) => self.launch(spec),
            }
        }
    }

    fn damage(&mut self, source: EntityId, target: EntityId, amount: f32) -> bool {
        let now = self.time.elapsed_ms;
        let Some(record) = self.entities.get_mut(target) else {
            return false;
        };
        if !record.view.alive {
            return false;
        }
        record.health -= amount;
        record.view.last_attack = Some(AttackRecord { source, at_ms: now });
        let died = record.health <= 0.0;
        if died {
            record.view.alive = false;
        }

        self.events.push(now, WorldEvent::Damaged {
            source,
            target,
            amount,
        });
        if died {
            debug!(entity = %target, killer = %source, "entity died");
            self.events.push(now, WorldEvent::Died { entity: target });
        }
        true
    }

    fn run_script(&mut self) {
        let now = self.time.elapsed_ms;
        while self.script.front().is_some_and(|(due, _)| *due <= now) {
            let Some((_, action)) = self.script.pop_front() else {
                break;
            };
            if let Err(err) = self.apply_action(&action) {
                warn!(at_ms = now, "scripted event skipped: {err}");
            }
        }
    }

    fn move_agents(&mut self, dt: f32) {
        for agent in self.agents.iter_mut() {
            let Some(record) = self.entities.get_mut(agent.id) else {
                continue;
            };
            if !record.view.alive {
                continue;
            }
            record.view.position = agent.path.step(record.view.position, dt, &self.environment);
        }
    }

    fn finish_animations(&mut self) {
        let tick_ms = self.tick_ms;
        for id in self.agents.ids() {
            let finished = match self.agents.get_mut(id) {
                Some(agent) => agent.animations.step(tick_ms),
                None => continue,
            };
            for code in finished {
                self.run_agent(id, |manager, env, time| {
                    manager.on_animation_stopped(env, time, &code)
                });
            }
        }
    }

    fn bury_dead(&mut self) {
        for id in self.agents.ids() {
            if self.entity(id).is_some_and(|view| view.alive) {
                continue;
            }
            self.run_agent(id, |manager, env, time| manager.on_despawn(env, time));
            self.agents.take(id);
        }
    }
}
