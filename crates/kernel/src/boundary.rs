//! Wall collisions for the axis-aligned domain box.
//!
//! A particle touching or crossing a wall is clamped onto it and the velocity
//! component along that axis is reflected and scaled by the dampening
//! constant (inelastic bounce).

use crate::particle::ParticleArrays;

/// Clamps particles into `[-half_width, half_width] x [-half_height, half_height]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryHandler {
    half_extents: [f32; 2],
    dampening: f32,
}

impl BoundaryHandler {
    /// Create a handler for the given half extents and dampening constant.
    pub fn new(half_extents: [f32; 2], dampening: f32) -> Self {
        Self {
            half_extents,
            dampening,
        }
    }

    /// Domain half extents `[half_width, half_height]`.
    pub fn half_extents(&self) -> [f32; 2] {
        self.half_extents
    }

    /// Resolve one axis of one particle. Returns `true` if it hit the wall.
    #[inline]
    fn resolve_axis(&self, pos: &mut f32, vel: &mut f32, half_extent: f32) -> bool {
        if pos.abs() >= half_extent {
            *pos = pos.signum() * half_extent;
            *vel *= -self.dampening;
            true
        } else {
            false
        }
    }

    /// Resolve wall collisions for particle `i`. Returns `true` on any hit.
    pub fn resolve(&self, particles: &mut ParticleArrays, i: usize) -> bool {
        let hit_x = self.resolve_axis(&mut particles.x[i], &mut particles.vx[i], self.half_extents[0]);
        let hit_y = self.resolve_axis(&mut particles.y[i], &mut particles.vy[i], self.half_extents[1]);
        hit_x || hit_y
    }

    /// `true` if the position lies inside the closed domain box.
    pub fn contains(&self, position: [f32; 2]) -> bool {
        position[0].abs() <= self.half_extents[0] && position[1].abs() <= self.half_extents[1]
    }
}
