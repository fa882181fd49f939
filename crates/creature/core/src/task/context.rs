use crate::config::AiSettings;
use crate::env::{
    AgentEnv, AnimationOracle, EmotionOracle, EntityOracle, EnvironmentOracle, NotificationSink,
    PathTraverser, PoiOracle, SoundOracle, TaskRng, WorldCommands,
};
use crate::types::{EntityId, EntityView, WorldTime};

use super::ManagerCommand;

/// Everything a task call may read or drive.
///
/// Built by the [`crate::TaskManager`] for each individual task call. World
/// reads go through the shared oracles; requests aimed at the manager itself
/// are queued with [`Self::request`] and applied once the call returns, so a
/// task never re-enters its own scheduler.
pub struct TaskContext<'c, 'a> {
    owner: EntityId,
    time: WorldTime,
    env: &'c mut AgentEnv<'a>,
    rng: &'c mut TaskRng,
    requests: &'c mut Vec<ManagerCommand>,
    settings: &'c AiSettings,
}

impl<'c, 'a> TaskContext<'c, 'a> {
    pub fn new(
        owner: EntityId,
        time: WorldTime,
        env: &'c mut AgentEnv<'a>,
        rng: &'c mut TaskRng,
        requests: &'c mut Vec<ManagerCommand>,
        settings: &'c AiSettings,
    ) -> Self {
        Self {
            owner,
            time,
            env,
            rng,
            requests,
            settings,
        }
    }

    pub fn owner(&self) -> EntityId {
        self.owner
    }

    /// Snapshot of the owning entity, `None` once it despawned.
    pub fn owner_view(&self) -> Option<&'a EntityView> {
        self.env.entities.entity(self.owner)
    }

    pub fn time(&self) -> &WorldTime {
        &self.time
    }

    pub fn now_ms(&self) -> u64 {
        self.time.elapsed_ms
    }

    pub fn settings(&self) -> &AiSettings {
        self.settings
    }

    pub fn entities(&self) -> &'a dyn EntityOracle {
        self.env.entities
    }

    pub fn environment(&self) -> &'a dyn EnvironmentOracle {
        self.env.environment
    }

    pub fn pois(&self) -> &'a dyn PoiOracle {
        self.env.pois
    }

    pub fn path(&mut self) -> &mut dyn PathTraverser {
        &mut *self.env.path
    }

    pub fn path_ref(&self) -> &dyn PathTraverser {
        &*self.env.path
    }

    pub fn animations(&mut self) -> &mut dyn AnimationOracle {
        &mut *self.env.animations
    }

    pub fn animations_ref(&self) -> &dyn AnimationOracle {
        &*self.env.animations
    }

    pub fn sounds(&mut self) -> &mut dyn SoundOracle {
        &mut *self.env.sounds
    }

    pub fn emotions(&self) -> &dyn EmotionOracle {
        &*self.env.emotions
    }

    pub fn emotions_mut(&mut self) -> &mut dyn EmotionOracle {
        &mut *self.env.emotions
    }

    pub fn commands(&mut self) -> &mut dyn WorldCommands {
        &mut *self.env.commands
    }

    pub fn notifier(&mut self) -> &mut dyn NotificationSink {
        &mut *self.env.notifier
    }

    pub fn rng(&mut self) -> &mut TaskRng {
        &mut *self.rng
    }

    /// Queues a force-start or force-stop for the owning manager.
    pub fn request(&mut self, command: ManagerCommand) {
        self.requests.push(command);
    }

    /// Read-only view used by the sensing and targeting checks.
    pub fn sensing(&self) -> SenseView<'_> {
        SenseView {
            entities: self.env.entities,
            environment: self.env.environment,
            emotions: &*self.env.emotions,
            now_ms: self.time.elapsed_ms,
        }
    }
}

/// Borrowed oracles needed to decide whether an entity can be sensed or
/// targeted.
#[derive(Clone, Copy)]
pub struct SenseView<'s> {
    pub entities: &'s dyn EntityOracle,
    pub environment: &'s dyn EnvironmentOracle,
    /// Emotion states of the sensing entity.
    pub emotions: &'s dyn EmotionOracle,
    pub now_ms: u64,
}
