//! SPH smoothing kernels for a planar domain.
//!
//! All three kernels share the compact support `r < h` and use 2D
//! normalization, so `density_kernel` integrates to one over the disc of
//! radius `h`:
//!
//! ```text
//! W(r)        =  10 / (pi h^5) * (h - r)^3     (density, spiky-cubic)
//! dW/dr(r)    = -30 / (pi h^5) * (h - r)^2     (pressure gradient)
//! lap W_v(r)  =  40 / (pi h^5) * (h - r)       (viscosity Laplacian)
//! ```
//!
//! The gradient constant is the exact derivative of the density kernel, so
//! the sign is folded in: a positive shared pressure pushes particles apart.
//! Every function is pure and safe to call from any thread.

use std::f32::consts::PI;

/// Normalization of the 2D cubic density kernel: `10 / pi`.
const DENSITY_NORM_2D: f32 = 10.0 / PI;

/// Normalization of its radial derivative: `-30 / pi`.
const GRADIENT_NORM_2D: f32 = -30.0 / PI;

/// Normalization of the 2D viscosity Laplacian: `40 / pi`.
const LAPLACIAN_NORM_2D: f32 = 40.0 / PI;

#[inline]
fn h5(h: f32) -> f32 {
    let h2 = h * h;
    h2 * h2 * h
}

/// Density kernel `W(r, h)`.
///
/// # Arguments
/// * `r` - Distance between two particles (>= 0).
/// * `h` - Smoothing distance (support radius).
pub fn density_kernel(r: f32, h: f32) -> f32 {
    if r >= h {
        return 0.0;
    }
    let s = h - r;
    DENSITY_NORM_2D / h5(h) * s * s * s
}

/// Radial derivative of [`density_kernel`], non-positive on `[0, h)`.
pub fn pressure_gradient_kernel(r: f32, h: f32) -> f32 {
    if r >= h {
        return 0.0;
    }
    let s = h - r;
    GRADIENT_NORM_2D / h5(h) * s * s
}

/// Viscosity Laplacian kernel, non-negative on `[0, h)`.
pub fn viscosity_laplacian_kernel(r: f32, h: f32) -> f32 {
    if r >= h {
        return 0.0;
    }
    LAPLACIAN_NORM_2D / h5(h) * (h - r)
}
