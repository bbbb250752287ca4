//! Planar SPH Fluid Simulation Kernel
//!
//! This crate provides the core of a 2D smoothed-particle-hydrodynamics fluid
//! simulation. It is renderer-agnostic: final positions leave the kernel
//! through the single-method [`PositionSink`] trait.
//!
//! # Modules
//! - [`sph`] -- Compact-support smoothing kernels (density, pressure gradient, viscosity).
//! - [`neighbor`] -- Uniform bucket grid with O(1) cell moves and 3x3 neighborhoods.
//! - [`particle`] -- Struct-of-arrays particle storage and the [`Seed`] input.
//! - [`eos`] -- Linear pressure-density relation and shared pair pressure.
//! - [`solver`] -- Density pass and pressure/viscosity force pass.
//! - [`boundary`] -- Wall clamping with dampened reflection.
//! - [`stepper`] -- [`SimulationStepper`], one full tick per call.
//! - [`config`] -- Immutable [`SimulationConfig`] and its validation.
//! - [`sink`] -- The renderer seam.
//!
//! # Example
//! ```
//! use fluidsim_kernel::{Seed, SimulationConfig, SimulationStepper};
//!
//! let mut stepper = SimulationStepper::new(SimulationConfig::default())?;
//! stepper.seed(Seed::lattice([-0.6, -0.6], [0.6, 0.6], [5, 5], 1.0))?;
//! for _ in 0..10 {
//!     stepper.step();
//! }
//! assert_eq!(stepper.particles().len(), 25);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]

pub mod boundary;
pub mod config;
pub mod eos;
pub mod error;
pub mod neighbor;
pub mod particle;
pub mod sink;
pub mod solver;
pub mod sph;
pub mod stepper;

pub use boundary::BoundaryHandler;
pub use config::{Axis, SimulationConfig};
pub use error::{ConfigError, SeedError};
pub use neighbor::NeighborGrid;
pub use particle::{ParticleArrays, Seed};
pub use sink::{FrameBuffer, NullSink, PositionSink};
pub use sph::{density_kernel, pressure_gradient_kernel, viscosity_laplacian_kernel};
pub use stepper::SimulationStepper;

// ---------------------------------------------------------------------------
// SimulationKernel trait
// ---------------------------------------------------------------------------

/// Diagnostics over the whole particle population at one instant.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StepMetrics {
    /// Completed ticks.
    pub tick: u64,
    /// Number of particles (constant after seeding).
    pub particle_count: usize,
    /// Sum of particle masses.
    pub total_mass: f64,
    /// Total kinetic energy.
    pub kinetic_energy: f64,
    /// Mean density from the last density pass.
    pub mean_density: f32,
    /// Largest `|rho - rho0|` from the last density pass.
    pub max_density_deviation: f32,
}

/// Trait that simulation back-ends implement so a runner can drive them
/// without knowing the renderer sink type.
///
/// A `SimulationKernel` owns particle data and advances it by one fixed
/// timestep per [`step`](Self::step). A step is atomic from the caller's
/// point of view; stopping a simulation just means not calling it again.
pub trait SimulationKernel {
    /// Execute one simulation tick.
    fn step(&mut self);

    /// Read back current particle state.
    fn particles(&self) -> &ParticleArrays;

    /// Get current diagnostics.
    fn metrics(&self) -> StepMetrics;

    /// Number of completed ticks.
    fn tick(&self) -> u64;

    /// Simulated time in seconds.
    fn elapsed(&self) -> f64;

    /// Number of particles in the simulation.
    fn particle_count(&self) -> usize {
        self.particles().len()
    }
}
