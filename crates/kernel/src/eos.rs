//! Pressure-density relation.
//!
//! Pressure is the linear deviation of density from the target density. Pair
//! interactions use the average of both particles' deviations so that the
//! force on `i` from `j` is the negation of the force on `j` from `i`.

/// Linear equation of state: `P = rho - rho0`.
///
/// Negative (tension) when the particle is below the target density.
#[inline]
pub fn density_deviation(density: f32, target_density: f32) -> f32 {
    density - target_density
}

/// Pressure shared by a pair of particles.
///
/// ```text
/// P_ij = ((rho_i - rho0) + (rho_j - rho0)) / 2
/// ```
#[inline]
pub fn shared_pressure(density_i: f32, density_j: f32, target_density: f32) -> f32 {
    0.5 * (density_deviation(density_i, target_density)
        + density_deviation(density_j, target_density))
}
