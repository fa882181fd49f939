//! Validate a data directory without running anything.

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Parser;
use creature_content::ContentFactory;
use creature_runtime::World;
use tracing::{error, info};

/// Load every behavior and scenario, building each world once
#[derive(Parser)]
pub struct Check {
    /// Data directory holding config.toml, behaviors/ and scenarios/
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,
}

impl Check {
    pub fn execute(self) -> Result<()> {
        let factory = ContentFactory::new(super::data_dir(self.data_dir));
        let settings = factory.load_config()?;
        let behaviors = factory.load_behaviors()?;
        info!(behaviors = behaviors.len(), "Behaviors loaded");
        for (name, set) in &behaviors {
            println!("behavior {name}: {} tasks", set.tasks.len());
        }

        let mut failures = 0;
        for name in factory.scenario_names()? {
            let built = factory.load_scenario(&name).and_then(|scenario| {
                Ok(World::from_scenario(&scenario, &behaviors, settings.clone())?)
            });
            match built {
                Ok(world) => println!("scenario {name}: ok ({} entities)", world.entities().len()),
                Err(err) => {
                    error!(scenario = %name, "{err:#}");
                    println!("scenario {name}: FAILED");
                    failures += 1;
                }
            }
        }

        if failures > 0 {
            bail!("{failures} scenario(s) failed to build");
        }
        Ok(())
    }
}
