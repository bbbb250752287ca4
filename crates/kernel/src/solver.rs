//! Density summation and pressure/viscosity forces.
//!
//! Both passes read predicted positions only. The density pass must finish
//! for every particle before any force is evaluated, because each pair force
//! reads both particles' densities from the current tick.
//!
//! Candidate neighbors are the members of the particle's registered cell and
//! its in-grid neighbors; the kernels' compact support does the distance
//! filtering.

use crate::eos::shared_pressure;
use crate::neighbor::NeighborGrid;
use crate::particle::ParticleArrays;
use crate::sph::{density_kernel, pressure_gradient_kernel, viscosity_laplacian_kernel};

/// Physical constants the force pass needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceParams {
    /// Smoothing distance `h`.
    pub smoothing_distance: f32,
    /// Viscosity coefficient `mu`.
    pub viscosity: f32,
    /// Target density `rho0`.
    pub target_density: f32,
}

/// Offset `predicted[j] - predicted[i]`, its length, and the unit direction.
///
/// Coincident particles get a zero direction instead of a division by zero.
#[inline]
fn pair_geometry(particles: &ParticleArrays, i: usize, j: usize) -> (f32, [f32; 2]) {
    let dx = particles.pred_x[j] - particles.pred_x[i];
    let dy = particles.pred_y[j] - particles.pred_y[i];
    let dist = (dx * dx + dy * dy).sqrt();
    let dir = if dist > 0.0 {
        [dx / dist, dy / dist]
    } else {
        [0.0, 0.0]
    };
    (dist, dir)
}

/// Density of particle `i` from the 3x3 neighborhood of its cell.
///
/// ```text
/// rho_i = sum_j m_j * W(|x*_i - x*_j|, h)      (j = i included)
/// ```
pub fn density_at(particles: &ParticleArrays, grid: &NeighborGrid, i: usize, h: f32) -> f32 {
    let px = particles.pred_x[i];
    let py = particles.pred_y[i];
    let mut rho = 0.0_f32;
    grid.for_each_candidate(grid.cell_of(i), |j| {
        let dx = px - particles.pred_x[j];
        let dy = py - particles.pred_y[j];
        let r = (dx * dx + dy * dy).sqrt();
        rho += particles.mass[j] * density_kernel(r, h);
    });
    rho
}

/// Density pass over all particles.
pub fn compute_density(particles: &mut ParticleArrays, grid: &NeighborGrid, h: f32) {
    for i in 0..particles.len() {
        let rho = density_at(particles, grid, i, h);
        particles.density[i] = rho;
    }
}

/// Pressure force exerted on `i` by `j`.
///
/// ```text
/// F = P_ij * dir_ij * m_i * dW/dr(r_ij) / rho_j
/// ```
///
/// Zero when `rho_j == 0`, when the particles coincide, or when they are at
/// least `h` apart.
pub fn pressure_contribution(
    particles: &ParticleArrays,
    i: usize,
    j: usize,
    params: &ForceParams,
) -> [f32; 2] {
    let density_j = particles.density[j];
    if density_j == 0.0 {
        return [0.0, 0.0];
    }
    let (dist, dir) = pair_geometry(particles, i, j);
    let shared = shared_pressure(particles.density[i], density_j, params.target_density);
    let scale = shared * particles.mass[i] * pressure_gradient_kernel(dist, params.smoothing_distance)
        / density_j;
    [scale * dir[0], scale * dir[1]]
}

/// Viscous force exerted on `i` by `j`, before scaling by `mu`.
///
/// ```text
/// F = m_j * (v_j - v_i) * lap W_v(r_ij) / rho_j
/// ```
pub fn viscosity_contribution(
    particles: &ParticleArrays,
    i: usize,
    j: usize,
    params: &ForceParams,
) -> [f32; 2] {
    let density_j = particles.density[j];
    if density_j == 0.0 {
        return [0.0, 0.0];
    }
    let (dist, _) = pair_geometry(particles, i, j);
    let scale =
        particles.mass[j] * viscosity_laplacian_kernel(dist, params.smoothing_distance) / density_j;
    [
        scale * (particles.vx[j] - particles.vx[i]),
        scale * (particles.vy[j] - particles.vy[i]),
    ]
}

/// Net force on particle `i`: `mu * viscosity + pressure`, summed over the
/// 3x3 neighborhood excluding `i` itself.
pub fn net_force(
    particles: &ParticleArrays,
    grid: &NeighborGrid,
    i: usize,
    params: &ForceParams,
) -> [f32; 2] {
    let mut pressure = [0.0_f32; 2];
    let mut viscosity = [0.0_f32; 2];

    grid.for_each_candidate(grid.cell_of(i), |j| {
        if j == i {
            return;
        }
        let p = pressure_contribution(particles, i, j, params);
        let v = viscosity_contribution(particles, i, j, params);
        pressure[0] += p[0];
        pressure[1] += p[1];
        viscosity[0] += v[0];
        viscosity[1] += v[1];
    });

    [
        params.viscosity * viscosity[0] + pressure[0],
        params.viscosity * viscosity[1] + pressure[1],
    ]
}

/// Force pass: per-particle acceleration `F_i / rho_i` into `ax`/`ay`.
///
/// Reads densities, predicted positions and velocities as frozen snapshots;
/// nothing in `particles` is modified, so every particle sees the same state
/// regardless of evaluation order. A zero density yields zero acceleration.
pub fn compute_accelerations(
    particles: &ParticleArrays,
    grid: &NeighborGrid,
    params: &ForceParams,
    ax: &mut [f32],
    ay: &mut [f32],
) {
    debug_assert_eq!(ax.len(), particles.len());
    debug_assert_eq!(ay.len(), particles.len());

    for i in 0..particles.len() {
        let density_i = particles.density[i];
        if density_i == 0.0 {
            ax[i] = 0.0;
            ay[i] = 0.0;
            continue;
        }
        let force = net_force(particles, grid, i, params);
        ax[i] = force[0] / density_i;
        ay[i] = force[1] / density_i;
    }
}
