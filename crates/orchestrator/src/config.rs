//! Scenario files: JSON description of one simulation run.

use std::fs;
use std::path::Path;

use fluidsim_kernel::SimulationConfig;
use serde::{Deserialize, Serialize};

use crate::error::OrchestratorError;

/// One simulation run: domain, physics constants, initial fluid block and
/// stop conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Human-readable scenario name
    pub name: String,
    /// Domain half extents
    #[serde(default)]
    pub domain: DomainExtents,
    /// Kernel support radius and grid cell size
    #[serde(default = "default_smoothing_distance")]
    pub smoothing_distance: f32,
    /// Downward gravitational acceleration
    #[serde(default = "default_gravity")]
    pub gravity: f32,
    /// Viscosity coefficient
    #[serde(default = "default_viscosity")]
    pub viscosity: f32,
    /// Fraction of wall-normal speed kept after a bounce
    #[serde(default = "default_dampening")]
    pub dampening: f32,
    /// Fixed timestep (seconds)
    #[serde(default = "default_delta_time")]
    pub delta_time: f32,
    /// Rest density
    #[serde(default = "default_target_density")]
    pub target_density: f32,
    /// Initial block of fluid
    #[serde(default)]
    pub lattice: LatticeBlock,
    /// Mass of every seeded particle
    #[serde(default = "default_particle_mass")]
    pub particle_mass: f32,
    /// Velocity of every seeded particle
    #[serde(default)]
    pub initial_velocity: [f32; 2],
    /// Stop after this many timesteps
    pub max_timesteps: Option<u64>,
    /// Stop after this much simulated time (seconds)
    pub max_time: Option<f64>,
    /// Publish the shared frame every this many ticks
    #[serde(default = "default_frame_interval")]
    pub frame_interval: u64,
}

/// Half extents of the domain box centered on the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomainExtents {
    /// Half width
    pub half_width: f32,
    /// Half height
    pub half_height: f32,
}

/// Rectangular lattice of particles, inclusive of both corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatticeBlock {
    /// Lower-left corner
    pub lower: [f32; 2],
    /// Upper-right corner
    pub upper: [f32; 2],
    /// Particles along x and y
    pub steps: [usize; 2],
}

impl Default for DomainExtents {
    fn default() -> Self {
        let defaults = SimulationConfig::default();
        Self {
            half_width: defaults.half_width,
            half_height: defaults.half_height,
        }
    }
}

impl Default for LatticeBlock {
    /// A 10 x 10 block spanning the middle half of the default domain.
    fn default() -> Self {
        Self {
            lower: [-0.625, -0.625],
            upper: [0.625, 0.625],
            steps: [10, 10],
        }
    }
}

impl LatticeBlock {
    /// Number of particles the lattice produces.
    pub fn particle_count(&self) -> usize {
        self.steps[0] * self.steps[1]
    }
}

// Default values
fn default_smoothing_distance() -> f32 {
    SimulationConfig::default().smoothing_distance
}

fn default_gravity() -> f32 {
    SimulationConfig::default().gravity
}

fn default_viscosity() -> f32 {
    SimulationConfig::default().viscosity
}

fn default_dampening() -> f32 {
    SimulationConfig::default().dampening
}

fn default_delta_time() -> f32 {
    SimulationConfig::default().delta_time
}

fn default_target_density() -> f32 {
    SimulationConfig::default().target_density
}

fn default_particle_mass() -> f32 {
    1.0
}

fn default_frame_interval() -> u64 {
    1
}

impl ScenarioConfig {
    /// Load and validate a scenario from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, OrchestratorError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| OrchestratorError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Parse and validate a scenario from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self, OrchestratorError> {
        let config: ScenarioConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Kernel configuration for this scenario.
    pub fn simulation_config(&self) -> SimulationConfig {
        SimulationConfig {
            half_width: self.domain.half_width,
            half_height: self.domain.half_height,
            smoothing_distance: self.smoothing_distance,
            gravity: self.gravity,
            viscosity: self.viscosity,
            dampening: self.dampening,
            delta_time: self.delta_time,
            target_density: self.target_density,
        }
    }

    /// Validate the scenario
    pub fn validate(&self) -> Result<(), OrchestratorError> {
        self.simulation_config().validate()?;

        if self.name.trim().is_empty() {
            return Err(invalid("name must not be empty"));
        }

        // Lattice
        let lattice = &self.lattice;
        if lattice.steps[0] == 0 || lattice.steps[1] == 0 {
            return Err(invalid("lattice steps must be at least 1 on both axes"));
        }
        let corners = [lattice.lower, lattice.upper];
        if corners.iter().flatten().any(|c| !c.is_finite()) {
            return Err(invalid("lattice corners must be finite"));
        }
        if lattice.lower[0] > lattice.upper[0] || lattice.lower[1] > lattice.upper[1] {
            return Err(invalid("lattice lower corner must not exceed upper corner"));
        }
        let half = [self.domain.half_width, self.domain.half_height];
        let outside = corners
            .iter()
            .any(|c| c[0].abs() > half[0] || c[1].abs() > half[1]);
        if outside {
            return Err(invalid("lattice extends outside the domain"));
        }

        if !(self.particle_mass.is_finite() && self.particle_mass > 0.0) {
            return Err(invalid("particle_mass must be positive"));
        }
        if self.initial_velocity.iter().any(|v| !v.is_finite()) {
            return Err(invalid("initial_velocity must be finite"));
        }

        // Stop conditions
        if let Some(max_timesteps) = self.max_timesteps {
            if max_timesteps == 0 {
                return Err(invalid("max_timesteps must be at least 1"));
            }
        }
        if let Some(max_time) = self.max_time {
            if !(max_time.is_finite() && max_time > 0.0) {
                return Err(invalid("max_time must be positive"));
            }
        }

        if self.frame_interval == 0 {
            return Err(invalid("frame_interval must be at least 1"));
        }

        Ok(())
    }

    /// `true` if the run ends on its own.
    pub fn has_stop_condition(&self) -> bool {
        self.max_timesteps.is_some() || self.max_time.is_some()
    }
}

fn invalid(message: &str) -> OrchestratorError {
    OrchestratorError::Invalid(message.to_string())
}
