//! A small lattice of fluid released under gravity in the default box.
//!
//! Checks the invariants that must hold after every tick: every particle
//! stays inside the closed domain, the population and its mass never
//! change, the grid registration matches positions, and every particle is
//! published exactly once per tick.

use fluidsim_kernel::{FrameBuffer, Seed, SimulationConfig, SimulationStepper};

const TICKS: usize = 600;

fn released_lattice() -> SimulationStepper<FrameBuffer> {
    let mut stepper = SimulationStepper::with_sink(SimulationConfig::default(), FrameBuffer::new())
        .expect("valid config");
    stepper
        .seed(Seed::lattice([-0.6, -0.6], [0.6, 0.6], [5, 5], 1.0))
        .expect("valid seed");
    stepper
}

#[test]
fn particles_never_leave_the_box() {
    let mut stepper = released_lattice();
    let [half_w, half_h] = stepper.config().half_extents();

    for tick in 0..TICKS {
        stepper.step();
        let p = stepper.particles();
        for i in 0..p.len() {
            let [x, y] = p.position(i);
            assert!(x.is_finite() && y.is_finite(), "particle {i} non-finite at tick {tick}");
            assert!(
                x.abs() <= half_w && y.abs() <= half_h,
                "particle {i} escaped to ({x}, {y}) at tick {tick}"
            );
        }
    }
}

#[test]
fn population_and_mass_are_conserved() {
    let mut stepper = released_lattice();
    let initial = stepper.metrics();
    assert_eq!(initial.particle_count, 25);
    assert!((initial.total_mass - 25.0).abs() < 1.0e-9);

    for _ in 0..TICKS {
        stepper.step();
    }

    let last = stepper.metrics();
    assert_eq!(last.tick, TICKS as u64);
    assert_eq!(last.particle_count, initial.particle_count);
    assert_eq!(last.total_mass, initial.total_mass);
    assert_eq!(stepper.grid().particle_count(), 25);
    assert_eq!(stepper.cell_occupancy().iter().sum::<usize>(), 25);
    assert!(stepper.grid().is_consistent());
}

#[test]
fn fluid_settles_toward_the_floor() {
    let mut stepper = released_lattice();
    let [_, half_h] = stepper.config().half_extents();
    let mean_y = |s: &SimulationStepper<FrameBuffer>| {
        let p = s.particles();
        p.y.iter().sum::<f32>() / p.len() as f32
    };

    let start = mean_y(&stepper);
    for _ in 0..TICKS {
        stepper.step();
    }
    let end = mean_y(&stepper);

    assert!(end < start, "mean height went from {start} to {end}");
    assert!(end < -0.5 * half_h, "fluid should pool in the lower half, mean y = {end}");
}

#[test]
fn every_tick_publishes_every_particle() {
    let mut stepper = released_lattice();
    for _ in 0..10 {
        stepper.step();
    }

    let frame = stepper.sink();
    assert_eq!(frame.writes(), 250);
    assert_eq!(frame.positions().len(), 25);
    for i in 0..25 {
        assert_eq!(frame.positions()[i], stepper.particles().render_position(i));
        assert_eq!(frame.positions()[i][2], 0.0);
    }
}

#[test]
fn grid_tracks_positions_every_tick() {
    let mut stepper = released_lattice();
    for tick in 0..120 {
        stepper.step();
        let grid = stepper.grid();
        for i in 0..stepper.particles().len() {
            let expected = grid.cell_index_of(stepper.particles().position(i));
            assert_eq!(grid.cell_of(i), expected, "particle {i} at tick {tick}");
            assert!(grid.members(expected).contains(&i));
        }
    }
}
