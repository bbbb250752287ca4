//! Two-particle symmetry tests.
//!
//! Verifies Newton's 3rd law for the pressure term, momentum conservation
//! for an isolated pair, and that a pair exactly one smoothing distance
//! apart does not interact.

use fluidsim_kernel::solver::{pressure_contribution, viscosity_contribution, ForceParams};
use fluidsim_kernel::{Seed, SimulationConfig, SimulationStepper};

fn weightless() -> SimulationConfig {
    SimulationConfig {
        gravity: 0.0,
        ..SimulationConfig::default()
    }
}

fn params(config: &SimulationConfig) -> ForceParams {
    ForceParams {
        smoothing_distance: config.smoothing_distance,
        viscosity: config.viscosity,
        target_density: config.target_density,
    }
}

/// Two unit-mass particles separated by `dist` along the x-axis, centered at the origin.
fn pair(dist: f32, velocities: [[f32; 2]; 2]) -> SimulationStepper {
    let mut stepper = SimulationStepper::new(weightless()).expect("valid config");
    let seed = Seed::new(
        vec![[-0.5 * dist, 0.0], [0.5 * dist, 0.0]],
        velocities.to_vec(),
        vec![1.0, 1.0],
    );
    stepper.seed(seed).expect("valid seed");
    stepper
}

#[test]
fn forces_equal_and_opposite() {
    let mut stepper = pair(0.3, [[0.0, 0.0], [0.0, 0.0]]);
    stepper.step();

    let p = stepper.particles();
    let params = params(stepper.config());
    let on_0 = pressure_contribution(p, 0, 1, &params);
    let on_1 = pressure_contribution(p, 1, 0, &params);

    let tol = 1.0e-6;
    assert!(on_0[0].abs() > tol, "pair inside support should interact");
    assert!(
        (on_0[0] + on_1[0]).abs() < tol,
        "fx not equal and opposite: {} vs {}",
        on_0[0],
        on_1[0]
    );
    assert!((on_0[1] + on_1[1]).abs() < tol);

    // The force is along the x-axis only (by symmetry)
    assert!(on_0[1].abs() < tol, "fy should be ~0 for x-axis alignment, got {}", on_0[1]);

    let a0 = stepper.last_acceleration(0);
    let a1 = stepper.last_acceleration(1);
    assert!((a0[0] + a1[0]).abs() < tol, "a0={a0:?}, a1={a1:?}");
    assert!((a0[1] + a1[1]).abs() < tol);
}

#[test]
fn viscosity_is_reciprocal() {
    let mut stepper = pair(0.2, [[0.0, 0.4], [0.0, -0.4]]);
    stepper.step();

    let p = stepper.particles();
    let params = params(stepper.config());
    let on_0 = viscosity_contribution(p, 0, 1, &params);
    let on_1 = viscosity_contribution(p, 1, 0, &params);
    assert!(on_0[1] < 0.0, "slower neighbor should drag particle 0 down");
    assert!((on_0[1] + on_1[1]).abs() < 1.0e-5, "{on_0:?} vs {on_1:?}");
}

#[test]
fn momentum_conserved() {
    let mut stepper = pair(0.2, [[0.0, 0.5], [0.0, -0.5]]);

    let momentum = |s: &SimulationStepper| {
        let p = s.particles();
        let px: f32 = (0..p.len()).map(|i| p.mass[i] * p.vx[i]).sum();
        let py: f32 = (0..p.len()).map(|i| p.mass[i] * p.vy[i]).sum();
        (px, py)
    };

    let (initial_px, initial_py) = momentum(&stepper);
    assert!(initial_px.abs() < 1.0e-10 && initial_py.abs() < 1.0e-10);

    for _ in 0..10 {
        stepper.step();
    }

    let (final_px, final_py) = momentum(&stepper);
    let tol = 1.0e-5;
    assert!((final_px - initial_px).abs() < tol, "px drifted to {final_px}");
    assert!((final_py - initial_py).abs() < tol, "py drifted to {final_py}");
}

#[test]
fn pair_at_support_radius_does_not_interact() {
    let h = weightless().smoothing_distance;
    let mut stepper = pair(h, [[0.0, 0.0], [0.0, 0.0]]);
    stepper.step();

    let p = stepper.particles();
    let params = params(stepper.config());
    assert_eq!(pressure_contribution(p, 0, 1, &params), [0.0, 0.0]);
    assert_eq!(pressure_contribution(p, 1, 0, &params), [0.0, 0.0]);
    assert_eq!(viscosity_contribution(p, 0, 1, &params), [0.0, 0.0]);

    assert_eq!(stepper.last_acceleration(0), [0.0, 0.0]);
    assert_eq!(stepper.last_acceleration(1), [0.0, 0.0]);
    assert_eq!(p.position(0), [-0.5 * h, 0.0]);
    assert_eq!(p.position(1), [0.5 * h, 0.0]);
    assert_eq!(p.velocity(0), [0.0, 0.0]);
    assert_eq!(p.velocity(1), [0.0, 0.0]);
}
