//! One-tick orchestration of the SPH pipeline.
//!
//! Each [`SimulationStepper::step`] advances every particle by exactly
//! `delta_time`, in phases that each cover all particles before the next one
//! starts:
//!
//! 1. gravity kick and predicted positions
//! 2. density pass
//! 3. force pass (pressure + viscosity accelerations)
//! 4. integration, wall collisions, grid re-bucketing, position publish
//!
//! Phases 2 and 3 only read the state frozen by the previous phase. Grid
//! membership changes only in phase 4.

use crate::boundary::BoundaryHandler;
use crate::config::SimulationConfig;
use crate::error::{ConfigError, SeedError};
use crate::neighbor::NeighborGrid;
use crate::particle::{ParticleArrays, Seed};
use crate::sink::{NullSink, PositionSink};
use crate::solver::{self, ForceParams};
use crate::{SimulationKernel, StepMetrics};

/// Owns particle state and the bucket grid, and advances them one tick at a
/// time, publishing final positions to `S`.
pub struct SimulationStepper<S = NullSink> {
    config: SimulationConfig,
    particles: ParticleArrays,
    grid: NeighborGrid,
    boundary: BoundaryHandler,
    sink: S,
    /// Per-particle acceleration from the force pass.
    ax: Vec<f32>,
    ay: Vec<f32>,
    tick: u64,
    /// Particles that touched a wall during the last tick.
    wall_hits: usize,
}

impl SimulationStepper<NullSink> {
    /// Create a stepper that publishes nowhere.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        Self::with_sink(config, NullSink)
    }
}

impl<S: PositionSink> SimulationStepper<S> {
    /// Validate `config`, build the grid, and attach the renderer sink.
    ///
    /// Fails with [`ConfigError::UntiledDomain`] when the domain is not an
    /// exact multiple of the smoothing distance.
    pub fn with_sink(config: SimulationConfig, sink: S) -> Result<Self, ConfigError> {
        config.validate()?;
        let grid = NeighborGrid::new(config.half_width, config.half_height, config.smoothing_distance)?;
        let [cols, rows] = grid.dims();
        tracing::info!(
            "Spatial grid ready: {}x{} cells of {:.4}, domain [-{}, {}] x [-{}, {}]",
            cols,
            rows,
            config.smoothing_distance,
            config.half_width,
            config.half_width,
            config.half_height,
            config.half_height,
        );

        Ok(Self {
            config,
            particles: ParticleArrays::new(),
            grid,
            boundary: BoundaryHandler::new(config.half_extents(), config.dampening),
            sink,
            ax: Vec::new(),
            ay: Vec::new(),
            tick: 0,
            wall_hits: 0,
        })
    }

    /// Populate the particle store and grid. Allowed once, before stepping.
    pub fn seed(&mut self, seed: Seed) -> Result<(), SeedError> {
        if !self.particles.is_empty() {
            return Err(SeedError::AlreadySeeded {
                existing: self.particles.len(),
            });
        }
        let Seed {
            positions,
            velocities,
            masses,
        } = seed;
        if positions.len() != velocities.len() || positions.len() != masses.len() {
            return Err(SeedError::LengthMismatch {
                positions: positions.len(),
                velocities: velocities.len(),
                masses: masses.len(),
            });
        }
        for (index, (&position, &mass)) in positions.iter().zip(&masses).enumerate() {
            if !(mass.is_finite() && mass > 0.0) {
                return Err(SeedError::InvalidMass { index, mass });
            }
            let finite = position[0].is_finite() && position[1].is_finite();
            if !finite || !self.boundary.contains(position) {
                return Err(SeedError::OutsideDomain {
                    index,
                    x: position[0],
                    y: position[1],
                });
            }
        }

        let [half_w, half_h] = self.config.half_extents();
        let on_wall = positions
            .iter()
            .filter(|p| p[0].abs() == half_w || p[1].abs() == half_h)
            .count();
        if on_wall > 0 {
            tracing::warn!("{} particles seeded exactly on a wall; they bounce on the first tick", on_wall);
        }

        let n = positions.len();
        let mut particles = ParticleArrays::with_capacity(n);
        for ((position, velocity), mass) in positions.into_iter().zip(velocities).zip(masses) {
            let id = particles.push_particle(position, velocity, mass);
            self.grid.insert(id, self.grid.cell_index_of(position));
        }
        self.particles = particles;
        self.ax = vec![0.0; n];
        self.ay = vec![0.0; n];

        tracing::info!(
            "Seeded {} particles, total mass {:.4}",
            n,
            self.particles.total_mass()
        );
        Ok(())
    }

    /// Advance the simulation by one `delta_time`.
    pub fn step(&mut self) {
        let dt = self.config.delta_time;

        self.apply_gravity_and_predict(dt);

        solver::compute_density(&mut self.particles, &self.grid, self.config.smoothing_distance);

        let params = self.force_params();
        solver::compute_accelerations(&self.particles, &self.grid, &params, &mut self.ax, &mut self.ay);

        self.wall_hits = 0;
        for i in 0..self.particles.len() {
            self.integrate(i, dt);
            if self.boundary.resolve(&mut self.particles, i) {
                self.wall_hits += 1;
            }
            self.rebucket(i);
            self.sink.set_position(i, self.particles.render_position(i));
        }

        self.tick += 1;
        tracing::trace!(tick = self.tick, wall_hits = self.wall_hits, "step complete");
    }

    /// Gravity is the only force applied to velocity before prediction.
    fn apply_gravity_and_predict(&mut self, dt: f32) {
        let p = &mut self.particles;
        let dvy = -self.config.gravity * dt;
        for i in 0..p.len() {
            p.vy[i] += dvy;
            p.pred_x[i] = p.x[i] + p.vx[i] * dt;
            p.pred_y[i] = p.y[i] + p.vy[i] * dt;
        }
    }

    /// Kick by the force-pass acceleration, then drift.
    #[inline]
    fn integrate(&mut self, i: usize, dt: f32) {
        let p = &mut self.particles;
        p.vx[i] += self.ax[i] * dt;
        p.vy[i] += self.ay[i] * dt;
        p.x[i] += p.vx[i] * dt;
        p.y[i] += p.vy[i] * dt;
    }

    /// Keep the particle registered in the cell of its current position.
    #[inline]
    fn rebucket(&mut self, i: usize) {
        let old_cell = self.grid.cell_of(i);
        let new_cell = self.grid.cell_index_of(self.particles.position(i));
        if new_cell != old_cell {
            self.grid.move_particle(i, old_cell, new_cell);
        }
    }

    fn force_params(&self) -> ForceParams {
        ForceParams {
            smoothing_distance: self.config.smoothing_distance,
            viscosity: self.config.viscosity,
            target_density: self.config.target_density,
        }
    }

    /// The configuration this stepper was built with.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Read-only particle state.
    pub fn particles(&self) -> &ParticleArrays {
        &self.particles
    }

    /// Read-only bucket grid.
    pub fn grid(&self) -> &NeighborGrid {
        &self.grid
    }

    /// The attached renderer sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Acceleration computed for particle `i` by the last force pass.
    pub fn last_acceleration(&self, i: usize) -> [f32; 2] {
        [self.ax[i], self.ay[i]]
    }

    /// Particles that touched a wall during the last tick.
    pub fn last_wall_hits(&self) -> usize {
        self.wall_hits
    }

    /// Number of completed ticks.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Simulated time, `tick * delta_time`.
    pub fn elapsed(&self) -> f64 {
        self.tick as f64 * self.config.delta_time as f64
    }

    /// Particle count per grid cell, row-major from the bottom row.
    pub fn cell_occupancy(&self) -> Vec<usize> {
        self.grid.occupancy()
    }

    /// Snapshot diagnostics over all particles.
    pub fn metrics(&self) -> StepMetrics {
        let p = &self.particles;
        let target = self.config.target_density;
        let max_density_deviation = p
            .density
            .iter()
            .map(|&rho| (rho - target).abs())
            .fold(0.0_f32, f32::max);
        let mean_density = if p.is_empty() {
            0.0
        } else {
            p.density.iter().map(|&rho| rho as f64).sum::<f64>() as f32 / p.len() as f32
        };

        StepMetrics {
            tick: self.tick,
            particle_count: p.len(),
            total_mass: p.total_mass(),
            kinetic_energy: p.kinetic_energy(),
            mean_density,
            max_density_deviation,
        }
    }
}

impl<S: PositionSink> SimulationKernel for SimulationStepper<S> {
    fn step(&mut self) {
        SimulationStepper::step(self);
    }

    fn particles(&self) -> &ParticleArrays {
        &self.particles
    }

    fn metrics(&self) -> StepMetrics {
        SimulationStepper::metrics(self)
    }

    fn tick(&self) -> u64 {
        self.tick
    }

    fn elapsed(&self) -> f64 {
        SimulationStepper::elapsed(self)
    }
}
