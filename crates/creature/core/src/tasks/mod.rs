//! Concrete behaviors and the registry that builds them by kind.
//!
//! Every task composes a [`TaskBase`](crate::TaskBase) and, when it acts on
//! another entity, a [`Targeting`](crate::Targeting) policy. Kind-specific
//! settings are plain validated structs; [`TaskDefinition`] pairs them with
//! the shared [`TaskConfig`] and turns the pair into a boxed [`AiTask`].
mod flee;
mod idle;
mod melee;
mod seek;
mod seek_poi;
mod stay_in_range;
mod turret;
mod wander;

pub use flee::{FleeEntityTask, FleeSettings};
pub use idle::{IdleSettings, IdleTask};
pub use melee::{MeleeAttackTask, MeleeSettings};
pub use seek::{SeekEntityTask, SeekSettings};
pub use seek_poi::{SeekPoiSettings, SeekPoiTask};
pub use stay_in_range::{StayInRangeSettings, StayInRangeTask};
pub use turret::{
    ProjectileSettings, RangeBand, TargetStatus, Transition, TurretInputs, TurretModeTask,
    TurretSettings, TurretState, next_transition,
};
pub use wander::{WanderSettings, WanderTask};

use crate::error::ConfigError;
use crate::targeting::TargetingConfig;
use crate::task::{AiTask, TaskConfig, TaskContext};
use crate::types::{EntityId, NotifyData};

/// Notification asking herd members to chase the carried entity.
pub const NOTIFY_SEEK_ENTITY: &str = "seekEntity";
/// Notification asking herd members to flee from the carried entity.
pub const NOTIFY_FLEE_ENTITY: &str = "fleeEntity";

/// Registered task kinds, by their configuration code.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::EnumIter,
)]
#[strum(serialize_all = "lowercase")]
pub enum TaskKind {
    Idle,
    Wander,
    SeekPoi,
    FleeEntity,
    SeekEntity,
    MeleeAttack,
    StayInRange,
    TurretMode,
}

impl TaskKind {
    /// Whether tasks of this kind carry a target.
    pub const fn is_targeting(self) -> bool {
        matches!(
            self,
            TaskKind::FleeEntity
                | TaskKind::SeekEntity
                | TaskKind::MeleeAttack
                | TaskKind::StayInRange
                | TaskKind::TurretMode
        )
    }
}

/// Kind-specific settings of a task definition.
#[derive(Clone, Debug, PartialEq)]
pub enum Behavior {
    Idle(IdleSettings),
    Wander(WanderSettings),
    SeekPoi(SeekPoiSettings),
    FleeEntity(TargetingConfig, FleeSettings),
    SeekEntity(TargetingConfig, SeekSettings),
    MeleeAttack(TargetingConfig, MeleeSettings),
    StayInRange(TargetingConfig, StayInRangeSettings),
    TurretMode(TargetingConfig, TurretSettings),
}

impl Behavior {
    pub fn kind(&self) -> TaskKind {
        match self {
            Behavior::Idle(_) => TaskKind::Idle,
            Behavior::Wander(_) => TaskKind::Wander,
            Behavior::SeekPoi(_) => TaskKind::SeekPoi,
            Behavior::FleeEntity(..) => TaskKind::FleeEntity,
            Behavior::SeekEntity(..) => TaskKind::SeekEntity,
            Behavior::MeleeAttack(..) => TaskKind::MeleeAttack,
            Behavior::StayInRange(..) => TaskKind::StayInRange,
            Behavior::TurretMode(..) => TaskKind::TurretMode,
        }
    }
}

/// Validated description of one task, ready to be instantiated.
#[derive(Clone, Debug, PartialEq)]
pub struct TaskDefinition {
    pub config: TaskConfig,
    pub behavior: Behavior,
}

impl TaskDefinition {
    pub fn new(config: TaskConfig, behavior: Behavior) -> Self {
        Self { config, behavior }
    }

    pub fn kind(&self) -> TaskKind {
        self.behavior.kind()
    }

    pub fn code(&self) -> &str {
        &self.config.code
    }

    /// Instantiates the task.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the kind-specific settings are invalid.
    pub fn build(self) -> Result<Box<dyn AiTask>, ConfigError> {
        let config = self.config;
        Ok(match self.behavior {
            Behavior::Idle(settings) => Box::new(IdleTask::new(config, settings)?),
            Behavior::Wander(settings) => Box::new(WanderTask::new(config, settings)?),
            Behavior::SeekPoi(settings) => Box::new(SeekPoiTask::new(config, settings)?),
            Behavior::FleeEntity(targeting, settings) => {
                Box::new(FleeEntityTask::new(config, targeting, settings)?)
            }
            Behavior::SeekEntity(targeting, settings) => {
                Box::new(SeekEntityTask::new(config, targeting, settings)?)
            }
            Behavior::MeleeAttack(targeting, settings) => {
                Box::new(MeleeAttackTask::new(config, targeting, settings)?)
            }
            Behavior::StayInRange(targeting, settings) => {
                Box::new(StayInRangeTask::new(config, targeting, settings)?)
            }
            Behavior::TurretMode(targeting, settings) => {
                Box::new(TurretModeTask::new(config, targeting, settings)?)
            }
        })
    }
}

/// Sends `key` to every other member of the owner's herd within `range`.
/// Returns how many recipients accepted.
pub(crate) fn alert_herd(
    ctx: &mut TaskContext<'_, '_>,
    range: f32,
    key: &str,
    data: &NotifyData,
) -> usize {
    let Some(owner) = ctx.owner_view() else {
        return 0;
    };
    if owner.herd_id == 0 {
        return 0;
    }
    let mut members: Vec<EntityId> = Vec::new();
    ctx.entities().walk_entities(
        owner.position,
        range,
        crate::env::SearchType::Creatures,
        &mut |view| {
            if view.id != owner.id && view.alive && view.herd_id == owner.herd_id {
                members.push(view.id);
            }
            true
        },
    );
    members
        .into_iter()
        .filter(|&member| ctx.notifier().notify(member, key, data))
        .count()
}

pub(crate) fn check_positive(
    field: &'static str,
    value: f32,
    task: &str,
) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::value(
            field,
            format!("must be positive, got {value}"),
            task,
        ))
    }
}
