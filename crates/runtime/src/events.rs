//! Observable world events.
//!
//! The world appends to an [`EventLog`] as it runs. Task transitions are
//! derived by comparing each agent's running tasks before and after its
//! tick, so a task that stops and restarts within one tick is not reported.

use creature_core::EntityId;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WorldEvent {
    TaskStarted { entity: EntityId, task: String },
    TaskStopped { entity: EntityId, task: String },
    Notified {
        sender: EntityId,
        recipient: EntityId,
        key: String,
    },
    Damaged {
        source: EntityId,
        target: EntityId,
        amount: f32,
    },
    Died { entity: EntityId },
    Despawned { entity: EntityId },
    ProjectileLaunched {
        shooter: EntityId,
        projectile: EntityId,
        code: String,
    },
    ProjectileHit {
        projectile: EntityId,
        target: EntityId,
    },
    SoundPlayed { entity: EntityId, asset: String },
    TagAdded { entity: EntityId, tag: String },
    TagRemoved { entity: EntityId, tag: String },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LoggedEvent {
    pub at_ms: u64,
    #[serde(flatten)]
    pub event: WorldEvent,
}

#[derive(Clone, Debug, Default)]
pub struct EventLog {
    entries: Vec<LoggedEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, at_ms: u64, event: WorldEvent) {
        self.entries.push(LoggedEvent { at_ms, event });
    }

    pub fn entries(&self) -> &[LoggedEvent] {
        &self.entries
    }

    /// Hands out everything logged so far and clears the log.
    pub fn drain(&mut self) -> Vec<LoggedEvent> {
        std::mem::take(&mut self.entries)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &WorldEvent> {
        self.entries.iter().map(|entry| &entry.event)
    }

    /// Whether `task` started on `entity` at any point.
    pub fn task_started(&self, entity: EntityId, task: &str) -> bool {
        self.iter().any(|event| {
            matches!(
                event,
                WorldEvent::TaskStarted { entity: e, task: t } if *e == entity && t == task
            )
        })
    }
}
