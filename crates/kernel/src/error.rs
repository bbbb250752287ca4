//! Error types surfaced by the kernel.
//!
//! Only construction and seeding can fail. Coincident particles and zero
//! densities are resolved inside the solver and never reach the caller.

use crate::config::Axis;

/// Invalid [`SimulationConfig`](crate::SimulationConfig), raised before any stepping.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// The domain extent along `axis` cannot be tiled by square cells.
    #[error(
        "domain extent {extent} along {axis} is not a multiple of smoothing distance {smoothing_distance}"
    )]
    UntiledDomain {
        /// Offending axis.
        axis: Axis,
        /// Full extent (twice the half-extent).
        extent: f32,
        /// Configured cell size.
        smoothing_distance: f32,
    },

    /// A field that must be strictly positive and finite is not.
    #[error("{field} must be positive and finite, got {value}")]
    NotPositive {
        /// Field name.
        field: &'static str,
        /// Rejected value.
        value: f32,
    },

    /// A field that must be finite is NaN or infinite.
    #[error("{field} must be finite, got {value}")]
    NotFinite {
        /// Field name.
        field: &'static str,
        /// Rejected value.
        value: f32,
    },

    /// A field lies outside its closed admissible range.
    #[error("{field} must lie in [{min}, {max}], got {value}")]
    OutOfRange {
        /// Field name.
        field: &'static str,
        /// Rejected value.
        value: f32,
        /// Lower bound (inclusive).
        min: f32,
        /// Upper bound (inclusive).
        max: f32,
    },
}

/// Misuse of [`SimulationStepper::seed`](crate::SimulationStepper::seed).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SeedError {
    /// The position, velocity and mass arrays disagree in length.
    #[error(
        "seed arrays disagree in length: {positions} positions, {velocities} velocities, {masses} masses"
    )]
    LengthMismatch {
        /// Number of positions.
        positions: usize,
        /// Number of velocities.
        velocities: usize,
        /// Number of masses.
        masses: usize,
    },

    /// A particle mass is zero, negative or not finite.
    #[error("particle {index} has invalid mass {mass}")]
    InvalidMass {
        /// Particle id.
        index: usize,
        /// Rejected mass.
        mass: f32,
    },

    /// A starting position lies outside `[-width, width] x [-height, height]`.
    #[error("particle {index} at ({x}, {y}) lies outside the domain")]
    OutsideDomain {
        /// Particle id.
        index: usize,
        /// X coordinate.
        x: f32,
        /// Y coordinate.
        y: f32,
    },

    /// Particles are created once; the store already holds a population.
    #[error("simulation already seeded with {existing} particles")]
    AlreadySeeded {
        /// Size of the existing population.
        existing: usize,
    },
}
