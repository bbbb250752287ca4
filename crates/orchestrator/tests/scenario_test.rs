//! End-to-end scenario tests: file on disk -> runner -> finished simulation.

use std::fs;
use std::path::{Path, PathBuf};

use fluidsim_kernel::{Axis, ConfigError};
use fluidsim_orchestrator::{create_simulation, OrchestratorError, RunnerState, ScenarioConfig};

fn write_scenario(dir: &Path, name: &str, json: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, json).expect("write scenario");
    path
}

fn shipped_scenarios() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../configs")
}

#[test]
fn scenario_file_runs_to_max_timesteps() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_scenario(
        dir.path(),
        "small.json",
        r#"{
            "name": "small block",
            "lattice": { "lower": [-0.5, -0.5], "upper": [0.5, 0.5], "steps": [5, 5] },
            "max_timesteps": 60,
            "frame_interval": 7
        }"#,
    );

    let mut runner = create_simulation(&path).unwrap();
    assert_eq!(runner.state(), RunnerState::Created);
    runner.start();
    let status = runner.wait().unwrap();

    assert_eq!(status.state, RunnerState::Finished);
    assert_eq!(status.tick, 60);
    let metrics = status.metrics.expect("final metrics published");
    assert_eq!(metrics.tick, 60);
    assert_eq!(metrics.particle_count, 25);
    assert!((metrics.total_mass - 25.0).abs() < 1e-9);

    let frame = runner.latest_frame();
    assert_eq!(frame.len(), 25);
    for p in &frame {
        assert!(p[0].abs() <= 2.5 && p[1].abs() <= 2.5, "{p:?} outside the box");
        assert_eq!(p[2], 0.0);
    }
}

#[test]
fn gravity_pulls_the_block_down() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_scenario(
        dir.path(),
        "fall.json",
        r#"{
            "name": "fall",
            "lattice": { "lower": [-0.3, 1.0], "upper": [0.3, 1.6], "steps": [3, 3] },
            "max_time": 0.5
        }"#,
    );

    let mut runner = create_simulation(&path).unwrap();
    let start_y: f32 = runner.latest_frame().iter().map(|p| p[1]).sum::<f32>() / 9.0;
    runner.start();
    runner.wait().unwrap();
    let end_y: f32 = runner.latest_frame().iter().map(|p| p[1]).sum::<f32>() / 9.0;

    assert!(end_y < start_y - 0.5, "mean y went from {start_y} to {end_y}");
}

#[test]
fn untiled_domain_is_rejected_before_running() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_scenario(
        dir.path(),
        "untiled.json",
        r#"{ "name": "untiled", "domain": { "half_width": 2.5, "half_height": 2.4 }, "max_timesteps": 1 }"#,
    );

    match create_simulation(&path) {
        Err(OrchestratorError::Config(ConfigError::UntiledDomain { axis, .. })) => {
            assert_eq!(axis, Axis::Y)
        }
        Err(other) => panic!("expected a configuration error, got {other}"),
        Ok(_) => panic!("untiled domain accepted"),
    }
}

#[test]
fn missing_and_malformed_files() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.json");
    assert!(matches!(
        create_simulation(&missing),
        Err(OrchestratorError::Io { .. })
    ));

    let broken = write_scenario(dir.path(), "broken.json", "{ \"name\": \"x\", ");
    assert!(matches!(
        create_simulation(&broken),
        Err(OrchestratorError::Json(_))
    ));
}

#[test]
fn shipped_scenarios_are_valid() {
    let entries = fs::read_dir(shipped_scenarios()).expect("configs directory");
    let mut checked = 0;
    for entry in entries {
        let path = entry.unwrap().path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let config = ScenarioConfig::load(&path)
            .unwrap_or_else(|e| panic!("{} failed to load: {e}", path.display()));
        assert!(config.has_stop_condition(), "{} never stops", path.display());
        checked += 1;
    }
    assert!(checked >= 1);
}
