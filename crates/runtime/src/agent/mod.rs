//! Per-entity services: the scheduler and what it drives.
//!
//! An [`Agent`] bundles one entity's [`TaskManager`] with the mutable oracles
//! it owns (path, animations, emotions). Agents sit in an [`AgentTable`]
//! indexed like the entity arena; the world takes an agent out of the table
//! for the duration of its tick, which is what lets notifications reach every
//! other agent without ever re-entering the one being ticked.
mod animation;
mod emotion;
mod path;

pub use animation::{AnimationCatalog, AnimationPlayer};
pub use emotion::EmotionStates;
pub use path::LinePath;

use creature_core::{EntityId, TaskManager};

pub struct Agent {
    pub id: EntityId,
    pub manager: TaskManager,
    pub path: LinePath,
    pub animations: AnimationPlayer,
    pub emotions: EmotionStates,
}

impl Agent {
    pub fn new(manager: TaskManager, animations: AnimationPlayer) -> Self {
        Self {
            id: manager.owner(),
            manager,
            path: LinePath::new(),
            animations,
            emotions: EmotionStates::new(),
        }
    }

    /// Codes of the running tasks, in slot order.
    pub fn active_tasks(&self) -> Vec<String> {
        self.manager
            .active_tasks()
            .into_iter()
            .map(str::to_owned)
            .collect()
    }
}

/// Agents indexed by entity slot.
#[derive(Default)]
pub struct AgentTable {
    slots: Vec<Option<Agent>>,
}

impl AgentTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, agent: Agent) {
        let index = agent.id.index as usize;
        if self.slots.len() <= index {
            self.slots.resize_with(index + 1, || None);
        }
        self.slots[index] = Some(agent);
    }

    pub fn get(&self, id: EntityId) -> Option<&Agent> {
        self.slots
            .get(id.index as usize)
            .and_then(Option::as_ref)
            .filter(|agent| agent.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Agent> {
        self.slots
            .get_mut(id.index as usize)
            .and_then(Option::as_mut)
            .filter(|agent| agent.id == id)
    }

    /// Removes the agent of `id`. Also used to check an agent out for its
    /// tick; [`AgentTable::insert`] puts it back.
    pub fn take(&mut self, id: EntityId) -> Option<Agent> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.as_ref().is_some_and(|agent| agent.id == id) {
            slot.take()
        } else {
            None
        }
    }

    /// Ids of every agent, in slot order.
    pub fn ids(&self) -> Vec<EntityId> {
        self.slots.iter().flatten().map(|agent| agent.id).collect()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Agent> {
        self.slots.iter_mut().flatten()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
