//! Orchestration Layer
//!
//! This crate drives the planar SPH kernel from scenario files:
//! - JSON scenario parsing and validation
//! - Initial particle placement
//! - Simulation runner with lifecycle management

#![warn(missing_docs)]

pub mod config;
pub mod domain;
pub mod error;
pub mod runner;

pub use config::ScenarioConfig;
pub use error::OrchestratorError;
pub use runner::{RunLimits, RunnerState, RunnerStatus, SimulationRunner};

use fluidsim_kernel::SimulationStepper;
use std::path::Path;

impl From<&ScenarioConfig> for RunLimits {
    fn from(config: &ScenarioConfig) -> Self {
        Self {
            max_timesteps: config.max_timesteps,
            max_time: config.max_time,
        }
    }
}

/// Build a seeded, headless stepper for a validated scenario.
pub fn build_stepper(config: &ScenarioConfig) -> Result<SimulationStepper, OrchestratorError> {
    let mut stepper = SimulationStepper::new(config.simulation_config())?;
    stepper.seed(domain::setup_domain(config))?;
    Ok(stepper)
}

/// Wrap a scenario's stepper in a [`SimulationRunner`] that has not yet started.
pub fn create_runner(config: &ScenarioConfig) -> Result<SimulationRunner, OrchestratorError> {
    let stepper = build_stepper(config)?;
    tracing::info!("Creating simulation runner for '{}'", config.name);
    Ok(SimulationRunner::new(
        Box::new(stepper),
        RunLimits::from(config),
        config.frame_interval,
    ))
}

/// Create a complete simulation from a scenario file
///
/// This function performs the full simulation setup pipeline:
/// 1. Load and validate the scenario
/// 2. Build the kernel configuration and check the domain tiles
/// 3. Seed the particle lattice
/// 4. Wrap the stepper in a SimulationRunner for lifecycle management
///
/// # Example
/// ```no_run
/// use fluidsim_orchestrator::create_simulation;
///
/// let runner = create_simulation("configs/dam_break.json")?;
/// runner.start();
/// let status = runner.join()?;
/// println!("finished after {} ticks", status.tick);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn create_simulation(
    config_path: impl AsRef<Path>,
) -> Result<SimulationRunner, OrchestratorError> {
    let config_path = config_path.as_ref();
    tracing::info!("Creating simulation from scenario: {}", config_path.display());

    let config = ScenarioConfig::load(config_path)?;
    tracing::info!(
        "Scenario loaded: {} ({} particles)",
        config.name,
        config.lattice.particle_count()
    );

    let runner = create_runner(&config)?;
    tracing::info!("Simulation ready to start");
    Ok(runner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fluidsim_kernel::{SeedError, SimulationKernel};

    #[test]
    fn test_build_stepper_seeds_lattice() {
        let config = ScenarioConfig::from_json_str(r#"{ "name": "t", "max_timesteps": 5 }"#).unwrap();
        let stepper = build_stepper(&config).unwrap();
        assert_eq!(stepper.particle_count(), 100);
        assert_eq!(stepper.tick(), 0);
        assert!(stepper.grid().is_consistent());
    }

    #[test]
    fn test_unvalidated_lattice_outside_domain_is_seed_error() {
        let mut config = ScenarioConfig::from_json_str(r#"{ "name": "t" }"#).unwrap();
        config.lattice.upper = [3.0, 0.5];
        match build_stepper(&config) {
            Err(OrchestratorError::Seed(SeedError::OutsideDomain { .. })) => {}
            other => panic!("expected seed error, got {:?}", other.map(|s| s.tick())),
        }
    }

    #[test]
    fn test_run_limits_from_scenario() {
        let config =
            ScenarioConfig::from_json_str(r#"{ "name": "t", "max_time": 1.5 }"#).unwrap();
        let limits = RunLimits::from(&config);
        assert_eq!(limits.max_timesteps, None);
        assert_eq!(limits.max_time, Some(1.5));
    }
}
