use crate::error::{AiError, ErrorSeverity};
use crate::types::{EntityId, NotifyData, Vec3};

/// Errors reported by world commands. Always recovered by the issuing task.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("projectile type '{0}' is not registered")]
    ProjectileUnavailable(String),

    #[error("entity {0} no longer exists")]
    EntityGone(EntityId),

    #[error("command rejected: {0}")]
    Rejected(String),
}

impl AiError for CommandError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Recoverable
    }

    fn error_code(&self) -> &'static str {
        match self {
            CommandError::ProjectileUnavailable(_) => "COMMAND_PROJECTILE_UNAVAILABLE",
            CommandError::EntityGone(_) => "COMMAND_ENTITY_GONE",
            CommandError::Rejected(_) => "COMMAND_REJECTED",
        }
    }
}

/// Melee damage dealt by one entity to another.
#[derive(Clone, Debug, PartialEq)]
pub struct DamageRequest {
    pub source: EntityId,
    pub target: EntityId,
    pub amount: f32,
}

/// A projectile launched by a ranged task.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectileSpec {
    /// Item/entity code of the projectile.
    pub code: String,
    pub shooter: EntityId,
    pub origin: Vec3,
    /// Initial velocity in blocks per second, dispersion already applied.
    pub velocity: Vec3,
    pub damage: f32,
}

/// World mutations requested by tasks.
///
/// Hosts may apply these immediately or buffer them until the entity's tick
/// ends; tasks read the world only through the oracles and must not expect
/// their own mutations to be visible within the same call.
pub trait WorldCommands {
    fn add_tag(&mut self, entity: EntityId, tag: &str);

    fn remove_tag(&mut self, entity: EntityId, tag: &str);

    fn apply_damage(&mut self, request: DamageRequest) -> Result<(), CommandError>;

    fn spawn_projectile(&mut self, projectile: ProjectileSpec) -> Result<(), CommandError>;
}

/// Synchronous delivery of a notification into another entity's task manager.
///
/// Implementations must not re-enter the caller's own manager and must
/// return `false` (rather than fail) when the recipient has no task that
/// accepts the key.
pub trait NotificationSink {
    fn notify(&mut self, recipient: EntityId, key: &str, data: &NotifyData) -> bool;
}
