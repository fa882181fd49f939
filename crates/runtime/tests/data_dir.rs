//! The shipped data directory loads and every scenario in it runs.

use std::path::PathBuf;

use creature_content::ContentFactory;
use creature_runtime::World;

fn factory() -> ContentFactory {
    ContentFactory::new(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data"))
}

#[test]
fn shipped_scenarios_build_and_run() {
    let factory = factory();
    let settings = factory.load_config().expect("config should load");
    let behaviors = factory.load_behaviors().expect("behaviors should load");
    assert!(behaviors.contains_key("sheep"));
    assert!(behaviors.contains_key("wolf-male"));
    assert!(behaviors.contains_key("skeleton"));

    let names = factory.scenario_names().expect("scenarios should list");
    assert!(!names.is_empty());
    for name in names {
        let scenario = factory.load_scenario(&name).expect("scenario should load");
        let mut world = World::from_scenario(&scenario, &behaviors, settings.clone())
            .unwrap_or_else(|err| panic!("scenario {name} failed to build: {err}"));
        world.run_for(scenario.duration_ms.min(5_000));
        assert!(!world.events().entries().is_empty(), "scenario {name} stayed silent");
    }
}

#[test]
fn meadow_wolf_gets_close_to_the_flock() {
    let factory = factory();
    let settings = factory.load_config().unwrap();
    let behaviors = factory.load_behaviors().unwrap();
    let scenario = factory.load_scenario("meadow").unwrap();
    let mut world = World::from_scenario(&scenario, &behaviors, settings).unwrap();
    let wolf = world.entity_id("wolf").unwrap();

    world.run_for(7_000);
    assert!(world.events().task_started(wolf, "seekentity"));
}
