//! The scenario files shipped with the runner load and play.

use std::path::PathBuf;

use salvo_core::simulation::Layout;
use salvo_headless::{run_batch, run_game, Autopilot, BatchConfig, GameConfig, Outcome, Scenario};

fn scenario_file(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("scenarios")
        .join(name)
}

#[test]
fn test_shipped_scenarios_parse_and_validate() {
    for name in ["standard.ron", "fixed.ron", "swarm.ron"] {
        let scenario = Scenario::load(scenario_file(name)).unwrap();
        scenario.simulation_config(scenario.seed).unwrap();
    }
}

#[test]
fn test_standard_file_matches_builtin() {
    let file = Scenario::load(scenario_file("standard.ron")).unwrap();
    let builtin = Scenario::standard();
    assert_eq!(file.layout, builtin.layout);
    assert_eq!(file.max_ticks, builtin.max_ticks);
    assert_eq!(file.autopilot, builtin.autopilot);
    assert!((file.step - builtin.step).abs() < 1e-6);
}

#[test]
fn test_swarm_overrides_only_what_it_names() {
    let scenario = Scenario::load(scenario_file("swarm.ron")).unwrap();
    let tuning = scenario.tuning.unwrap();
    assert_eq!(tuning.player.health, 300.0);
    assert_eq!(tuning.director.max_spawn_time, 2.5);
    assert_eq!(tuning.director.max_enemies, 500);
}

#[test]
fn test_fixed_file_plays_to_a_result() {
    let scenario = Scenario::load(scenario_file("fixed.ron"))
        .unwrap()
        .with_max_ticks(600);
    assert_eq!(scenario.layout, Layout::Fixed);

    let result = run_game(&GameConfig::new(scenario)).unwrap();
    assert!(result.metrics.duration_ticks <= 600);
    assert!(result.metrics.bullets_fired > 0);
    if result.metrics.outcome == Outcome::Timeout {
        assert_eq!(result.metrics.duration_ticks, 600);
    }
}

#[test]
fn test_batch_from_file_writes_json() {
    let scenario = Scenario::load(scenario_file("swarm.ron"))
        .unwrap()
        .with_autopilot(Autopilot::Weave);
    let dir = tempfile::tempdir().unwrap();
    let config = BatchConfig::new("swarm.ron", 3)
        .with_output(dir.path().to_path_buf())
        .with_max_ticks(120);

    let results = run_batch(config, &scenario);
    let path = dir.path().join("batch_results.json");
    results.save(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["games"].as_array().unwrap().len(), 3);
    assert_eq!(json["summary"]["total_games"], 3);
}
