use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::error::{AiError, ConfigError, ErrorContext, ErrorSeverity};
use crate::targeting::{Targeting, TargetingConfig};
use crate::task::{TargetingTask, TaskBase, TaskConfig, TaskDirectory};
use crate::testing::Harness;
use crate::types::{EntityView, Vec3};

type Log = Rc<RefCell<Vec<String>>>;

#[derive(Debug, Default)]
struct Script {
    wants: bool,
    done: bool,
    blocked: bool,
    accepts: Option<String>,
    on_start: Vec<ManagerCommand>,
}

#[derive(Debug)]
struct Probe {
    base: TaskBase,
    targeting: Targeting,
    script: Rc<RefCell<Script>>,
    log: Log,
    requires: Option<String>,
}

impl Probe {
    fn new(config: TaskConfig, log: &Log) -> (Box<dyn AiTask>, Rc<RefCell<Script>>) {
        let script = Rc::new(RefCell::new(Script::default()));
        let probe = Probe {
            base: TaskBase::new(config),
            targeting: Targeting::new(TargetingConfig::default()),
            script: Rc::clone(&script),
            log: Rc::clone(log),
            requires: None,
        };
        (Box::new(probe), script)
    }

    fn record(&self, event: &str) {
        self.log
            .borrow_mut()
            .push(format!("{}:{}", self.base.code(), event));
    }
}

impl AiTask for Probe {
    fn base(&self) -> &TaskBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut TaskBase {
        &mut self.base
    }

    fn after_initialize(&mut self, directory: &TaskDirectory) -> Result<(), ConfigError> {
        match &self.requires {
            Some(required) if !directory.contains(required) => Err(ConfigError::MissingDependency {
                required: required.clone(),
                context: ErrorContext::default(),
            }),
            _ => Ok(()),
        }
    }

    fn should_execute(&mut self, ctx: &mut TaskContext<'_, '_>) -> bool {
        self.script.borrow().wants && self.base.should_start(ctx)
    }

    fn start_execute(&mut self, ctx: &mut TaskContext<'_, '_>) {
        self.base.start(ctx);
        self.record("start");
        for command in self.script.borrow().on_start.clone() {
            ctx.request(command);
        }
    }

    fn continue_execute(&mut self, ctx: &mut TaskContext<'_, '_>, _dt: f32) -> bool {
        self.record("tick");
        self.base.update(ctx) && !self.script.borrow().done
    }

    fn can_continue_execute(&self, _ctx: &TaskContext<'_, '_>) -> bool {
        !self.script.borrow().blocked
    }

    fn finish_execute(&mut self, ctx: &mut TaskContext<'_, '_>, cancelled: bool) {
        self.base.finish(ctx);
        self.record(if cancelled { "cancel" } else { "finish" });
    }

    fn notify(&mut self, key: &str, _data: &NotifyData) -> bool {
        self.script.borrow().accepts.as_deref() == Some(key)
    }

    fn as_targeting(&self) -> Option<&dyn TargetingTask> {
        Some(self)
    }

    fn as_targeting_mut(&mut self) -> Option<&mut dyn TargetingTask> {
        Some(self)
    }
}

impl TargetingTask for Probe {
    fn targeting(&self) -> &Targeting {
        &self.targeting
    }

    fn targeting_mut(&mut self) -> &mut Targeting {
        &mut self.targeting
    }
}

fn owner() -> EntityId {
    EntityId::new(1, 0)
}

fn harness() -> Harness {
    let mut harness = Harness::new(owner());
    harness.world.insert(EntityView::new(owner(), "wolf", Vec3::ZERO));
    harness
}

fn config(code: &str, slot: usize, priority: f32) -> crate::task::TaskConfigBuilder {
    TaskConfig::builder(code).slot(slot).priority(priority)
}

fn build(tasks: Vec<Box<dyn AiTask>>) -> TaskManager {
    TaskManager::builder(owner(), "wolf")
        .tasks(tasks)
        .build(&WorldTime::default())
        .unwrap()
}

fn events(log: &Log) -> Vec<String> {
    log.borrow().clone()
}

#[test]
fn highest_priority_candidate_wins_empty_slot() {
    let log = Log::default();
    let (low, low_script) = Probe::new(config("low", 0, 1.0).build().unwrap(), &log);
    let (high, high_script) = Probe::new(config("high", 0, 2.0).build().unwrap(), &log);
    low_script.borrow_mut().wants = true;
    high_script.borrow_mut().wants = true;

    let mut manager = build(vec![low, high]);
    let mut harness = harness();
    harness.tick(&mut manager, 0, 0.05);

    assert_eq!(manager.active_task(0), Some("high"));
    assert!(!manager.is_task_active("low"));
    assert_eq!(events(&log), ["high:start", "high:tick"]);
}

#[test]
fn equal_priority_ties_go_to_registration_order() {
    let log = Log::default();
    let (first, first_script) = Probe::new(config("first", 0, 1.0).build().unwrap(), &log);
    let (second, second_script) = Probe::new(config("second", 0, 1.0).build().unwrap(), &log);
    first_script.borrow_mut().wants = true;
    second_script.borrow_mut().wants = true;

    let mut manager = build(vec![first, second]);
    let mut harness = harness();
    for tick in 0..5 {
        harness.tick(&mut manager, tick * 50, 0.05);
    }

    assert_eq!(manager.active_task(0), Some("first"));
}

#[test]
fn preemption_compares_against_cancel_priority() {
    let log = Log::default();
    let (guard, guard_script) = Probe::new(
        config("guard", 0, 1.0).priority_for_cancel(3.0).build().unwrap(),
        &log,
    );
    let (chase, chase_script) = Probe::new(config("chase", 0, 2.0).build().unwrap(), &log);
    let (flee, flee_script) = Probe::new(config("flee", 0, 4.0).build().unwrap(), &log);
    guard_script.borrow_mut().wants = true;

    let mut manager = build(vec![guard, chase, flee]);
    let mut harness = harness();
    harness.tick(&mut manager, 0, 0.05);
    assert_eq!(manager.active_task(0), Some("guard"));

    chase_script.borrow_mut().wants = true;
    harness.tick(&mut manager, 50, 0.05);
    assert_eq!(manager.active_task(0), Some("guard"));

    flee_script.borrow_mut().wants = true;
    harness.tick(&mut manager, 100, 0.05);
    assert_eq!(manager.active_task(0), Some("flee"));

    let log = events(&log);
    let cancel = log.iter().position(|e| e == "guard:cancel").unwrap();
    let start = log.iter().position(|e| e == "flee:start").unwrap();
    assert!(cancel < start);
}

#[test]
fn slots_run_concurrently() {
    let log = Log::default();
    let (look, look_script) = Probe::new(config("look", 1, 1.0).build().unwrap(), &log);
    let (walk, walk_script) = Probe::new(config("walk", 0, 1.0).build().unwrap(), &log);
    look_script.borrow_mut().wants = true;
    walk_script.borrow_mut().wants = true;

    let mut manager = build(vec![look, walk]);
    let mut harness = harness();
    harness.tick(&mut manager, 0, 0.05);

    assert_eq!(manager.active_tasks().as_slice(), ["walk", "look"]);
}

#[test]
fn every_start_is_finished_exactly_once() {
    let log = Log::default();
    let (a, a_script) = Probe::new(config("a", 0, 1.0).build().unwrap(), &log);
    let (b, b_script) = Probe::new(config("b", 0, 2.0).build().unwrap(), &log);
    a_script.borrow_mut().wants = true;

    let mut manager = build(vec![a, b]);
    let mut harness = harness();
    harness.tick(&mut manager, 0, 0.05);
    b_script.borrow_mut().wants = true;
    harness.tick(&mut manager, 50, 0.05);
    b_script.borrow_mut().done = true;
    b_script.borrow_mut().wants = false;
    harness.tick(&mut manager, 100, 0.05);
    harness.tick(&mut manager, 150, 0.05);
    let time = harness.time(200);
    manager.on_despawn(&mut harness.agent.env(&harness.world), time);

    let log = events(&log);
    for code in ["a", "b"] {
        let mut active = false;
        for event in log.iter().filter(|e| e.starts_with(code)) {
            if event.ends_with(":start") {
                assert!(!active, "{code} started twice: {log:?}");
                active = true;
            } else if event.ends_with(":finish") || event.ends_with(":cancel") {
                assert!(active, "{code} finished without start: {log:?}");
                active = false;
            }
        }
        assert!(!active, "{code} left running: {log:?}");
    }
}

#[test]
fn cooldown_blocks_restart_until_elapsed() {
    let log = Log::default();
    let (howl, script) = Probe::new(
        config("howl", 0, 1.0).cooldown_ms(1_000, 1_000).build().unwrap(),
        &log,
    );
    script.borrow_mut().wants = true;
    script.borrow_mut().done = true;

    let mut manager = build(vec![howl]);
    let mut harness = harness();
    harness.tick(&mut manager, 0, 0.05);
    assert!(!manager.is_task_active("howl"));

    harness.tick(&mut manager, 500, 0.05);
    harness.tick(&mut manager, 999, 0.05);
    let starts = events(&log).iter().filter(|e| *e == "howl:start").count();
    assert_eq!(starts, 1);

    harness.tick(&mut manager, 1_000, 0.05);
    let starts = events(&log).iter().filter(|e| *e == "howl:start").count();
    assert_eq!(starts, 2);
}

#[test]
fn long_cooldown_in_hours_is_independent() {
    let log = Log::default();
    let (nap, script) = Probe::new(
        config("nap", 0, 1.0).cooldown_hours(2.0, 2.0).build().unwrap(),
        &log,
    );
    script.borrow_mut().wants = true;
    script.borrow_mut().done = true;

    let mut manager = build(vec![nap]);
    let mut harness = harness();
    harness.hours = 10.0;
    harness.tick(&mut manager, 0, 0.05);
    harness.hours = 11.5;
    harness.tick(&mut manager, 60_000, 0.05);
    assert_eq!(events(&log).iter().filter(|e| *e == "nap:start").count(), 1);

    harness.hours = 12.0;
    harness.tick(&mut manager, 61_000, 0.05);
    assert_eq!(events(&log).iter().filter(|e| *e == "nap:start").count(), 2);
}

#[test]
fn blocked_task_waits_without_finishing() {
    let log = Log::default();
    let (walk, script) = Probe::new(config("walk", 0, 1.0).build().unwrap(), &log);
    script.borrow_mut().wants = true;
    script.borrow_mut().blocked = true;

    let mut manager = build(vec![walk]);
    let mut harness = harness();
    harness.tick(&mut manager, 0, 0.05);
    harness.tick(&mut manager, 50, 0.05);

    assert!(manager.is_task_active("walk"));
    assert_eq!(events(&log), ["walk:start"]);

    script.borrow_mut().blocked = false;
    harness.tick(&mut manager, 100, 0.05);
    assert_eq!(events(&log), ["walk:start", "walk:tick"]);
}

#[test]
fn forced_start_hands_over_target_and_stop_cancels() {
    let log = Log::default();
    let (idle, idle_script) = Probe::new(config("idle", 0, 1.0).build().unwrap(), &log);
    let (chase, _) = Probe::new(config("chase", 0, 0.5).build().unwrap(), &log);
    idle_script.borrow_mut().wants = true;

    let mut manager = build(vec![idle, chase]);
    let mut harness = harness();
    harness.tick(&mut manager, 0, 0.05);

    let prey = EntityId::new(9, 0);
    let time = harness.time(50);
    let started = manager.execute_task(
        &mut harness.agent.env(&harness.world),
        time,
        "chase",
        Some(prey),
    );
    assert!(started);
    assert_eq!(manager.active_task(0), Some("chase"));
    let target = manager
        .task("chase")
        .and_then(|task| task.as_targeting())
        .and_then(|targeting| targeting.target());
    assert_eq!(target, Some(prey));

    let stopped = manager.stop_task(&mut harness.agent.env(&harness.world), time, "chase");
    assert!(stopped);
    assert!(events(&log).contains(&"chase:cancel".to_string()));
    assert!(!manager.execute_task(&mut harness.agent.env(&harness.world), time, "missing", None));
}

#[test]
fn queued_commands_apply_after_the_call() {
    let log = Log::default();
    let (turret, turret_script) = Probe::new(config("turret", 0, 1.0).build().unwrap(), &log);
    let (fallback, _) = Probe::new(config("fallback", 1, 0.1).build().unwrap(), &log);
    turret_script.borrow_mut().wants = true;
    turret_script.borrow_mut().on_start = vec![ManagerCommand::StartTask {
        code: "fallback".into(),
        target: None,
    }];

    let mut manager = build(vec![turret, fallback]);
    let mut harness = harness();
    harness.tick(&mut manager, 0, 0.05);

    assert_eq!(events(&log)[..2], ["turret:start", "fallback:start"]);
    assert!(manager.is_task_active("fallback"));
}

#[test]
fn command_chain_is_bounded() {
    let log = Log::default();
    let (restless, script) = Probe::new(config("restless", 0, 1.0).build().unwrap(), &log);
    script.borrow_mut().wants = true;
    script.borrow_mut().on_start = vec![
        ManagerCommand::StopTask {
            code: "restless".into(),
        },
        ManagerCommand::StartTask {
            code: "restless".into(),
            target: None,
        },
    ];

    let mut manager = TaskManager::builder(owner(), "wolf")
        .settings(AiSettings {
            max_command_chain: 4,
            ..AiSettings::default()
        })
        .task(restless)
        .build(&WorldTime::default())
        .unwrap();
    let mut harness = harness();
    harness.tick(&mut manager, 0, 0.05);

    let log = events(&log);
    assert_eq!(log.iter().filter(|e| *e == "restless:start").count(), 3);
    assert_eq!(log.iter().filter(|e| *e == "restless:cancel").count(), 2);
    assert!(manager.is_task_active("restless"));
}

#[test]
fn notified_task_starts_next_tick() {
    let log = Log::default();
    let (graze, graze_script) = Probe::new(config("graze", 0, 1.0).build().unwrap(), &log);
    let (seek, seek_script) = Probe::new(config("seek", 0, 2.0).build().unwrap(), &log);
    graze_script.borrow_mut().wants = true;
    seek_script.borrow_mut().accepts = Some("seekEntity".into());

    let mut manager = build(vec![graze, seek]);
    let mut harness = harness();
    harness.tick(&mut manager, 0, 0.05);

    assert!(manager.notify("seekEntity", &NotifyData::Entity(EntityId::new(4, 0))));
    assert!(!manager.notify("unrelated", &NotifyData::None));
    assert!(!manager.is_task_active("seek"));

    harness.tick(&mut manager, 50, 0.05);
    assert_eq!(manager.active_task(0), Some("seek"));
    assert!(events(&log).contains(&"graze:cancel".to_string()));
}

#[test]
fn disabled_task_is_cancelled_and_skipped() {
    let log = Log::default();
    let (wander, script) = Probe::new(config("wander", 0, 1.0).build().unwrap(), &log);
    script.borrow_mut().wants = true;

    let mut manager = build(vec![wander]);
    let mut harness = harness();
    harness.tick(&mut manager, 0, 0.05);
    assert!(manager.set_task_enabled("wander", false));
    harness.tick(&mut manager, 50, 0.05);
    harness.tick(&mut manager, 100, 0.05);

    assert!(!manager.is_task_active("wander"));
    assert_eq!(events(&log), ["wander:start", "wander:tick", "wander:cancel"]);
    assert!(!manager.set_task_enabled("missing", true));
}

#[test]
fn builder_rejects_duplicates_and_missing_dependencies() {
    let log = Log::default();
    let (a, _) = Probe::new(config("a", 0, 1.0).build().unwrap(), &log);
    let (b, _) = Probe::new(config("a", 1, 1.0).build().unwrap(), &log);
    let err = TaskManager::builder(owner(), "wolf")
        .tasks([a, b])
        .build(&WorldTime::default())
        .err()
        .unwrap();
    assert_eq!(err.error_code(), "CONFIG_DUPLICATE_TASK");
    assert_eq!(err.context().unwrap().entity_code.as_deref(), Some("wolf"));

    let dependent = Probe {
        base: TaskBase::new(config("turretmode", 0, 1.0).build().unwrap()),
        targeting: Targeting::new(TargetingConfig::default()),
        script: Rc::default(),
        log: Rc::clone(&log),
        requires: Some("stayinrange".into()),
    };
    let err = TaskManager::builder(owner(), "bowtorn")
        .task(Box::new(dependent))
        .build(&WorldTime::default())
        .err()
        .unwrap();
    assert_eq!(err.severity(), ErrorSeverity::Fatal);
    let context = err.context().unwrap();
    assert_eq!(context.task_code.as_deref(), Some("turretmode"));
    assert_eq!(context.entity_code.as_deref(), Some("bowtorn"));
}

#[test]
fn builder_rejects_too_many_tasks() {
    let log = Log::default();
    let tasks: Vec<Box<dyn AiTask>> = (0..=AiSettings::MAX_TASKS)
        .map(|i| Probe::new(config(&format!("task{i}"), 0, 1.0).build().unwrap(), &log).0)
        .collect();
    let err = TaskManager::builder(owner(), "wolf")
        .tasks(tasks)
        .build(&WorldTime::default())
        .err()
        .unwrap();
    assert!(matches!(err, ConfigError::TooManyTasks { .. }));
}

#[test]
fn initial_cooldown_delays_first_start() {
    let log = Log::default();
    let (call, script) = Probe::new(
        config("call", 0, 1.0).initial_cooldown_ms(2_000, 2_000).build().unwrap(),
        &log,
    );
    script.borrow_mut().wants = true;

    let mut manager = build(vec![call]);
    let mut harness = harness();
    harness.tick(&mut manager, 1_999, 0.05);
    assert!(!manager.is_task_active("call"));
    harness.tick(&mut manager, 2_000, 0.05);
    assert!(manager.is_task_active("call"));
}
