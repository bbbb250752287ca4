//! Headless simulation runner
//!
//! Usage: `fluidsim <scenario.json> [--frame-out <path>]`
//!
//! Loads a scenario, runs it to its stop condition, logs diagnostics and
//! optionally writes the final particle positions as JSON.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use fluidsim_orchestrator::{create_runner, OrchestratorError, RunnerState, ScenarioConfig};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "usage: fluidsim <scenario.json> [--frame-out <path>]";

#[derive(Debug)]
struct Args {
    scenario: PathBuf,
    frame_out: Option<PathBuf>,
}

/// Final frame as written by `--frame-out`.
#[derive(Serialize)]
struct FrameFile<'a> {
    scenario: &'a str,
    tick: u64,
    sim_time: f64,
    positions: Vec<[f32; 3]>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut scenario = None;
    let mut frame_out = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--frame-out" => {
                let path = args.next().ok_or("--frame-out needs a path")?;
                frame_out = Some(PathBuf::from(path));
            }
            "-h" | "--help" => return Err(USAGE.to_string()),
            _ if scenario.is_none() => scenario = Some(PathBuf::from(arg)),
            _ => return Err(format!("unexpected argument '{arg}'")),
        }
    }
    let scenario = scenario.ok_or("missing scenario file")?;
    Ok(Args {
        scenario,
        frame_out,
    })
}

fn run(args: &Args) -> Result<RunnerState, OrchestratorError> {
    let config = ScenarioConfig::load(&args.scenario)?;
    if !config.has_stop_condition() {
        return Err(OrchestratorError::Invalid(
            "headless runs need max_timesteps or max_time".to_string(),
        ));
    }

    let mut runner = create_runner(&config)?;
    runner.start();
    let status = runner.wait()?;

    if let Some(metrics) = status.metrics {
        tracing::info!(
            "Tick {}: {} particles, total mass {:.4}, kinetic energy {:.4}, mean density {:.3}, max |rho - rho0| {:.3}",
            metrics.tick,
            metrics.particle_count,
            metrics.total_mass,
            metrics.kinetic_energy,
            metrics.mean_density,
            metrics.max_density_deviation,
        );
    }

    if let Some(path) = &args.frame_out {
        let frame = FrameFile {
            scenario: &config.name,
            tick: status.tick,
            sim_time: status.sim_time,
            positions: runner.latest_frame(),
        };
        let json = serde_json::to_string_pretty(&frame)?;
        fs::write(path, json).map_err(|source| OrchestratorError::Write {
            path: path.clone(),
            source,
        })?;
        tracing::info!("Wrote final frame to {}", path.display());
    }

    Ok(status.state)
}

fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fluidsim=info,fluidsim_orchestrator=info,fluidsim_kernel=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}\n{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    match run(&args) {
        Ok(RunnerState::Finished) => ExitCode::SUCCESS,
        Ok(state) => {
            tracing::error!("Simulation ended in state {:?}", state);
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args, String> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_scenario_only() {
        let parsed = args(&["tank.json"]).unwrap();
        assert_eq!(parsed.scenario, PathBuf::from("tank.json"));
        assert_eq!(parsed.frame_out, None);
    }

    #[test]
    fn test_frame_out_either_side() {
        let before = args(&["--frame-out", "out.json", "tank.json"]).unwrap();
        let after = args(&["tank.json", "--frame-out", "out.json"]).unwrap();
        assert_eq!(before.frame_out, Some(PathBuf::from("out.json")));
        assert_eq!(after.scenario, before.scenario);
        assert_eq!(after.frame_out, before.frame_out);
    }

    #[test]
    fn test_bad_arguments() {
        assert!(args(&[]).is_err());
        assert!(args(&["tank.json", "--frame-out"]).is_err());
        assert!(args(&["a.json", "b.json"]).is_err());
    }
}
