//! Scenario assembly.
//!
//! Turns a parsed [`ScenarioSpec`] plus the loaded behavior sets into a
//! ready-to-run [`World`]. Behaviors are matched by name:
//! - players never get a task manager
//! - an entity whose behavior name has no set stays passive, unless the
//!   scenario named the behavior explicitly, which is an error
//!
//! Scripted events are queued on the world and applied as the clock reaches
//! them.

use std::collections::BTreeMap;

use creature_content::formats::vec3;
use creature_content::{BehaviorSet, EntitySpec, ScenarioSpec, ScriptedAction};
use creature_core::{AiSettings, EntityFlags, EntityId, EntityView, NotifyData, PlayerInfo};
use tracing::{debug, info};

use crate::error::{Result, RuntimeError};
use crate::oracle::{Aabb, Environment};
use crate::world::World;

impl World {
    /// Builds a world from a scenario.
    ///
    /// The scenario seed, when present, overrides `settings.world_seed`.
    ///
    /// # Errors
    ///
    /// Fails when an explicitly named behavior is missing or a behavior set
    /// does not form a valid task manager.
    pub fn from_scenario(
        scenario: &ScenarioSpec,
        behaviors: &BTreeMap<String, BehaviorSet>,
        settings: AiSettings,
    ) -> Result<Self> {
        let settings = match scenario.seed {
            Some(seed) => settings.with_world_seed(seed),
            None => settings,
        };
        info!(
            scenario = %scenario.name,
            entities = scenario.entities.len(),
            seed = settings.world_seed,
            "Creating world from scenario"
        );

        let mut world = World::new(settings, environment(scenario))
            .with_tick_ms(scenario.tick_ms)
            .with_calendar(scenario.start_hour, scenario.hours_per_second)
            .with_animations(scenario.animations.clone());
        for code in &scenario.projectile_types {
            world.register_projectile_type(code.as_str());
        }
        for poi in &scenario.pois {
            world.pois_mut().register(poi.kind.as_str(), vec3(poi.position));
        }

        for spec in &scenario.entities {
            let id = world.spawn(spec.health, |id| entity_view(id, spec));
            world.name(spec.handle(), id);

            if spec.player.is_some() {
                continue;
            }
            match behaviors.get(spec.behavior_name()) {
                Some(set) => world.attach_tasks(id, set.tasks.iter().cloned())?,
                None if spec.behavior.is_some() => {
                    return Err(RuntimeError::UnknownBehavior {
                        entity: spec.handle().to_owned(),
                        behavior: spec.behavior_name().to_owned(),
                    });
                }
                None => {
                    debug!(entity = %spec.handle(), "no behavior set, entity stays passive");
                    continue;
                }
            }
            for state in &spec.emotions {
                world.set_emotion(id, state, None);
            }
        }

        for event in &scenario.events {
            world.schedule(event.at_ms, event.action.clone());
        }
        Ok(world)
    }

    /// Applies one scripted intervention now.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::UnknownEntity`] when a handle does not resolve,
    /// which includes entities that were despawned earlier.
    pub fn apply_action(&mut self, action: &ScriptedAction) -> Result<()> {
        match action {
            ScriptedAction::Attack {
                attacker,
                victim,
                damage,
            } => {
                let (attacker, victim) = (self.resolve(attacker)?, self.resolve(victim)?);
                self.attack(attacker, victim, *damage);
            }
            ScriptedAction::Teleport { entity, position } => {
                let id = self.resolve(entity)?;
                self.teleport(id, vec3(*position));
            }
            ScriptedAction::Despawn { entity } => {
                let id = self.resolve(entity)?;
                self.despawn(id);
            }
            ScriptedAction::Emotion {
                entity,
                state,
                duration_ms,
            } => {
                let id = self.resolve(entity)?;
                self.set_emotion(id, state, *duration_ms);
            }
            ScriptedAction::SetLight { level } => self.environment_mut().set_light(*level),
            ScriptedAction::SetTemperature { value } => {
                self.environment_mut().set_temperature(*value);
            }
            ScriptedAction::Notify { entity, key, about } => {
                let id = self.resolve(entity)?;
                let data = match about {
                    Some(handle) => NotifyData::Entity(self.resolve(handle)?),
                    None => NotifyData::None,
                };
                self.notify(id, key, &data);
            }
        }
        Ok(())
    }

    fn resolve(&self, handle: &str) -> Result<EntityId> {
        self.entity_id(handle)
            .ok_or_else(|| RuntimeError::UnknownEntity(handle.to_owned()))
    }
}

fn environment(scenario: &ScenarioSpec) -> Environment {
    let spec = &scenario.environment;
    let mut environment = Environment::new(spec.light, spec.temperature);
    for zone in &spec.light_zones {
        environment = environment.with_light_zone(vec3(zone.center), zone.radius, zone.level);
    }
    for blocker in &spec.blockers {
        environment = environment.with_blocker(Aabb::new(vec3(blocker.min), vec3(blocker.max)));
    }
    environment
}

fn entity_view(id: EntityId, spec: &EntitySpec) -> EntityView {
    let mut flags = EntityFlags::empty();
    flags.set(EntityFlags::SWIMMING, spec.swimming);
    flags.set(EntityFlags::FEET_IN_LIQUID, spec.feet_in_liquid);
    flags.set(EntityFlags::SNEAKING, spec.sneaking);
    flags.set(EntityFlags::ON_GROUND, !spec.swimming);

    let mut view = EntityView::new(id, spec.code.as_str(), vec3(spec.position))
        .with_weight(spec.weight)
        .with_herd(spec.herd)
        .with_tags(spec.tags.iter().cloned())
        .with_flags(flags);
    if let Some(eye_height) = spec.eye_height {
        view.eye_height = eye_height;
    }
    view.fear_reduction = spec.fear_reduction;
    if let Some(player) = &spec.player {
        view = view.with_player(PlayerInfo {
            game_mode: player.game_mode,
            seeking_range_multiplier: player.seeking_range_multiplier,
        });
    }
    view
}
