//! Immutable physical and domain parameters for a simulation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Tolerance on `(2 * half_extent) % smoothing_distance` when checking that
/// the domain tiles into whole cells, as a fraction of the smoothing distance.
pub const TILING_EPSILON: f32 = 1.0e-4;

/// In-plane axis, used to report which extent failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Horizontal axis (half-width).
    X,
    /// Vertical axis (half-height); gravity acts along -Y.
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => f.write_str("x"),
            Axis::Y => f.write_str("y"),
        }
    }
}

/// Simulation parameters, fixed for the lifetime of a stepper.
///
/// The domain is the box `[-half_width, half_width] x [-half_height, half_height]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Domain half-width.
    pub half_width: f32,
    /// Domain half-height.
    pub half_height: f32,
    /// Kernel support radius; also the grid cell edge length.
    pub smoothing_distance: f32,
    /// Downward gravitational acceleration magnitude.
    pub gravity: f32,
    /// Viscosity coefficient (mu).
    pub viscosity: f32,
    /// Fraction of velocity kept (with sign flip) after a wall hit.
    ///
    /// Any value in the closed range `[0, 1]` is accepted: 0 makes particles
    /// stick to the wall, 1 is a perfectly elastic bounce.
    pub dampening: f32,
    /// Fixed timestep.
    pub delta_time: f32,
    /// Rest density the pressure term drives towards.
    pub target_density: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            half_width: 2.5,
            half_height: 2.5,
            smoothing_distance: 0.5,
            gravity: 10.0,
            viscosity: 0.1,
            dampening: 0.6,
            delta_time: 1.0 / 120.0,
            target_density: 30.0,
        }
    }
}

impl SimulationConfig {
    /// Half extents as `[half_width, half_height]`.
    pub fn half_extents(&self) -> [f32; 2] {
        [self.half_width, self.half_height]
    }

    /// Number of grid cells along each axis, `[cols, rows]`.
    ///
    /// Only meaningful once [`validate`](Self::validate) has passed.
    pub fn grid_dims(&self) -> [usize; 2] {
        [
            cells_along(self.half_width, self.smoothing_distance),
            cells_along(self.half_height, self.smoothing_distance),
        ]
    }

    /// Check every field, including exact tiling of the domain by cells.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("half_width", self.half_width)?;
        positive("half_height", self.half_height)?;
        positive("smoothing_distance", self.smoothing_distance)?;
        positive("delta_time", self.delta_time)?;
        finite("gravity", self.gravity)?;
        finite("target_density", self.target_density)?;

        if !self.viscosity.is_finite() || self.viscosity < 0.0 {
            return Err(ConfigError::OutOfRange {
                field: "viscosity",
                value: self.viscosity,
                min: 0.0,
                max: f32::MAX,
            });
        }
        if !(0.0..=1.0).contains(&self.dampening) {
            return Err(ConfigError::OutOfRange {
                field: "dampening",
                value: self.dampening,
                min: 0.0,
                max: 1.0,
            });
        }

        check_tiling(Axis::X, self.half_width, self.smoothing_distance)?;
        check_tiling(Axis::Y, self.half_height, self.smoothing_distance)?;
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { field, value })
    }
}

/// The full extent passes when its remainder is near 0 or near a whole cell,
/// since float division can land just under `h`.
pub(crate) fn check_tiling(axis: Axis, half_extent: f32, h: f32) -> Result<(), ConfigError> {
    let extent = 2.0 * half_extent;
    let rem = extent % h;
    let eps = TILING_EPSILON * h;
    if rem <= eps || rem >= h - eps {
        Ok(())
    } else {
        Err(ConfigError::UntiledDomain {
            axis,
            extent,
            smoothing_distance: h,
        })
    }
}

pub(crate) fn cells_along(half_extent: f32, h: f32) -> usize {
    ((2.0 * half_extent) / h).round().max(1.0) as usize
}
