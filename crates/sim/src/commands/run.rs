//! Run one scenario to completion.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use creature_content::ContentFactory;
use creature_core::EntityId;
use creature_runtime::{LoggedEvent, World, WorldEvent};
use tracing::info;

/// Run a scenario and print its events
#[derive(Parser)]
pub struct Run {
    /// Scenario name, i.e. `scenarios/<NAME>.ron` in the data directory
    #[arg(value_name = "NAME")]
    scenario: String,

    /// Data directory holding config.toml, behaviors/ and scenarios/
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Simulated run length; defaults to the scenario's own
    #[arg(long, value_name = "MS")]
    duration_ms: Option<u64>,

    /// World seed, overriding both config and scenario
    #[arg(long)]
    seed: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// One readable line per event, then the final state of every entity
    Summary,
    /// One JSON object per event
    Json,
}

impl Run {
    pub fn execute(self) -> Result<()> {
        let factory = ContentFactory::new(super::data_dir(self.data_dir));
        let settings = factory.load_config()?;
        let behaviors = factory.load_behaviors()?;
        let mut scenario = factory.load_scenario(&self.scenario)?;
        if let Some(seed) = self.seed {
            scenario.seed = Some(seed);
        }

        let mut world = World::from_scenario(&scenario, &behaviors, settings)
            .with_context(|| format!("Failed to build scenario '{}'", scenario.name))?;
        let names: BTreeMap<EntityId, String> = world
            .handles()
            .map(|(name, id)| (id, name.to_owned()))
            .collect();

        let duration_ms = self.duration_ms.unwrap_or(scenario.duration_ms);
        info!(scenario = %scenario.name, duration_ms, "Running scenario");
        world.run_for(duration_ms);
        let events = world.drain_events();
        info!(events = events.len(), "Scenario finished");

        match self.format {
            OutputFormat::Json => {
                for event in &events {
                    println!("{}", serde_json::to_string(event)?);
                }
            }
            OutputFormat::Summary => {
                for event in &events {
                    println!("{}", describe(event, &names));
                }
                println!();
                print_state(&world, &names);
            }
        }
        Ok(())
    }
}

fn name(names: &BTreeMap<EntityId, String>, id: EntityId) -> String {
    names.get(&id).cloned().unwrap_or_else(|| id.to_string())
}

fn describe(logged: &LoggedEvent, names: &BTreeMap<EntityId, String>) -> String {
    let n = |id| name(names, id);
    let text = match &logged.event {
        WorldEvent::TaskStarted { entity, task } => format!("{} starts {task}", n(*entity)),
        WorldEvent::TaskStopped { entity, task } => format!("{} stops {task}", n(*entity)),
        WorldEvent::Notified {
            sender,
            recipient,
            key,
        } => format!("{} alerts {} ({key})", n(*sender), n(*recipient)),
        WorldEvent::Damaged {
            source,
            target,
            amount,
        } => format!("{} hits {} for {amount}", n(*source), n(*target)),
        WorldEvent::Died { entity } => format!("{} dies", n(*entity)),
        WorldEvent::Despawned { entity } => format!("{} despawns", n(*entity)),
        WorldEvent::ProjectileLaunched {
            shooter,
            projectile,
            code,
        } => format!("{} launches {code} {projectile}", n(*shooter)),
        WorldEvent::ProjectileHit { projectile, target } => {
            format!("{projectile} hits {}", n(*target))
        }
        WorldEvent::SoundPlayed { entity, asset } => format!("{} plays {asset}", n(*entity)),
        WorldEvent::TagAdded { entity, tag } => format!("{} gains tag {tag}", n(*entity)),
        WorldEvent::TagRemoved { entity, tag } => format!("{} loses tag {tag}", n(*entity)),
    };
    format!("[{:>7} ms] {text}", logged.at_ms)
}

fn print_state(world: &World, names: &BTreeMap<EntityId, String>) {
    for record in world.entities().iter().filter(|record| !record.inanimate) {
        let view = &record.view;
        let tasks = world
            .agent(view.id)
            .map(|agent| agent.active_tasks().join(", "))
            .unwrap_or_default();
        println!(
            "{:<12} {:<10} ({:>6.1}, {:>5.1}, {:>6.1})  hp {:>5.1}{}  [{}]",
            name(names, view.id),
            view.code,
            view.position.x,
            view.position.y,
            view.position.z,
            record.health,
            if view.alive { "" } else { " dead" },
            tasks
        );
    }
}
