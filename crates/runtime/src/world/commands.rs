//! Deferred effects of one agent's tick.

use std::collections::BTreeSet;

use creature_core::{
    CommandError, DamageRequest, EntityId, NotificationSink, NotifyData, ProjectileSpec,
    SoundOracle, SoundRequest, WorldCommands,
};

use crate::agent::AgentTable;
use crate::oracle::EntityStore;

/// A world mutation requested by a task.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Command {
    AddTag { entity: EntityId, tag: String },
    RemoveTag { entity: EntityId, tag: String },
    Damage(DamageRequest),
    Projectile(ProjectileSpec),
}

/// Validates commands against the world as it was when the tick started and
/// buffers them until the tick ends.
pub(crate) struct CommandBuffer<'a> {
    entities: &'a EntityStore,
    projectile_types: &'a BTreeSet<String>,
    commands: Vec<Command>,
}

impl<'a> CommandBuffer<'a> {
    pub(crate) fn new(entities: &'a EntityStore, projectile_types: &'a BTreeSet<String>) -> Self {
        Self {
            entities,
            projectile_types,
            commands: Vec::new(),
        }
    }

    pub(crate) fn into_commands(self) -> Vec<Command> {
        self.commands
    }
}

impl WorldCommands for CommandBuffer<'_> {
    fn add_tag(&mut self, entity: EntityId, tag: &str) {
        self.commands.push(Command::AddTag {
            entity,
            tag: tag.to_owned(),
        });
    }

    fn remove_tag(&mut self, entity: EntityId, tag: &str) {
        self.commands.push(Command::RemoveTag {
            entity,
            tag: tag.to_owned(),
        });
    }

    fn apply_damage(&mut self, request: DamageRequest) -> Result<(), CommandError> {
        if !self.entities.contains(request.target) {
            return Err(CommandError::EntityGone(request.target));
        }
        if !(request.amount.is_finite() && request.amount >= 0.0) {
            return Err(CommandError::Rejected(format!(
                "damage must be non-negative, got {}",
                request.amount
            )));
        }
        self.commands.push(Command::Damage(request));
        Ok(())
    }

    fn spawn_projectile(&mut self, projectile: ProjectileSpec) -> Result<(), CommandError> {
        if !self.projectile_types.contains(&projectile.code) {
            return Err(CommandError::ProjectileUnavailable(projectile.code));
        }
        self.commands.push(Command::Projectile(projectile));
        Ok(())
    }
}

/// Delivers notifications straight into other agents' managers.
///
/// The ticking agent is checked out of the table, so it can never receive
/// its own notification.
pub(crate) struct AgentNotifier<'a> {
    agents: &'a mut AgentTable,
    delivered: Vec<(EntityId, String)>,
}

impl<'a> AgentNotifier<'a> {
    pub(crate) fn new(agents: &'a mut AgentTable) -> Self {
        Self {
            agents,
            delivered: Vec::new(),
        }
    }

    /// Recipients and keys of the notifications that were accepted.
    pub(crate) fn into_delivered(self) -> Vec<(EntityId, String)> {
        self.delivered
    }
}

impl NotificationSink for AgentNotifier<'_> {
    fn notify(&mut self, recipient: EntityId, key: &str, data: &NotifyData) -> bool {
        let Some(agent) = self.agents.get_mut(recipient) else {
            return false;
        };
        let accepted = agent.manager.notify(key, data);
        if accepted {
            self.delivered.push((recipient, key.to_owned()));
        }
        accepted
    }
}

/// Sounds played during one tick.
#[derive(Debug, Default)]
pub(crate) struct SoundLog {
    played: Vec<SoundRequest>,
}

impl SoundLog {
    pub(crate) fn into_played(self) -> Vec<SoundRequest> {
        self.played
    }
}

impl SoundOracle for SoundLog {
    fn play(&mut self, request: SoundRequest) {
        self.played.push(request);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::EntityRecord;
    use creature_core::{EntityView, Vec3};

    #[test]
    fn damage_to_missing_entity_is_refused() {
        let mut store = EntityStore::new();
        let alive =
            store.spawn(|id| EntityRecord::creature(EntityView::new(id, "hare", Vec3::ZERO), 4.0));
        let types = BTreeSet::new();
        let mut buffer = CommandBuffer::new(&store, &types);

        let gone = EntityId::new(9, 0);
        let request = |target| DamageRequest {
            source: alive,
            target,
            amount: 1.0,
        };
        assert_eq!(buffer.apply_damage(request(gone)), Err(CommandError::EntityGone(gone)));
        assert!(buffer.apply_damage(request(alive)).is_ok());
        assert_eq!(buffer.into_commands().len(), 1);
    }

    #[test]
    fn unknown_projectiles_are_refused() {
        let store = EntityStore::new();
        let types = BTreeSet::from(["arrow".to_owned()]);
        let mut buffer = CommandBuffer::new(&store, &types);
        let spec = |code: &str| ProjectileSpec {
            code: code.to_owned(),
            shooter: EntityId::new(0, 0),
            origin: Vec3::ZERO,
            velocity: Vec3::new(1.0, 0.0, 0.0),
            damage: 1.0,
        };

        assert!(buffer.spawn_projectile(spec("arrow")).is_ok());
        assert_eq!(
            buffer.spawn_projectile(spec("rock")),
            Err(CommandError::ProjectileUnavailable("rock".to_owned()))
        );
    }
}
