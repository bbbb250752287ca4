//! Particle storage in struct-of-arrays layout, plus the seeding input.

/// Struct-of-arrays particle storage.
///
/// All arrays are parallel: index `i` across every array is particle id `i`.
/// Ids are dense and stable; particles are never created or destroyed once
/// the store is seeded.
#[derive(Debug, Clone, Default)]
pub struct ParticleArrays {
    // ---- Positions ----
    /// X positions
    pub x: Vec<f32>,
    /// Y positions
    pub y: Vec<f32>,

    // ---- Velocities ----
    /// X velocities
    pub vx: Vec<f32>,
    /// Y velocities
    pub vy: Vec<f32>,

    // ---- Predicted positions (gravity-only lookahead) ----
    /// Predicted X positions
    pub pred_x: Vec<f32>,
    /// Predicted Y positions
    pub pred_y: Vec<f32>,

    // ---- Scalar fields ----
    /// Particle mass
    pub mass: Vec<f32>,
    /// Density from the most recent density pass
    pub density: Vec<f32>,
}

impl ParticleArrays {
    /// Create an empty particle collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty collection with room for `n` particles.
    pub fn with_capacity(n: usize) -> Self {
        Self {
            x: Vec::with_capacity(n),
            y: Vec::with_capacity(n),
            vx: Vec::with_capacity(n),
            vy: Vec::with_capacity(n),
            pred_x: Vec::with_capacity(n),
            pred_y: Vec::with_capacity(n),
            mass: Vec::with_capacity(n),
            density: Vec::with_capacity(n),
        }
    }

    /// Return the number of particles currently stored.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Return `true` if there are no particles.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Append a particle. The predicted position starts at the position and
    /// density at zero. Returns the new particle id.
    pub fn push_particle(&mut self, position: [f32; 2], velocity: [f32; 2], mass: f32) -> usize {
        let id = self.len();
        self.x.push(position[0]);
        self.y.push(position[1]);
        self.vx.push(velocity[0]);
        self.vy.push(velocity[1]);
        self.pred_x.push(position[0]);
        self.pred_y.push(position[1]);
        self.mass.push(mass);
        self.density.push(0.0);
        id
    }

    /// Current position of particle `i`.
    #[inline]
    pub fn position(&self, i: usize) -> [f32; 2] {
        [self.x[i], self.y[i]]
    }

    /// Current position of particle `i` lifted to 3D with `z = 0`, the form a
    /// renderer's "move this object" call expects.
    #[inline]
    pub fn render_position(&self, i: usize) -> [f32; 3] {
        [self.x[i], self.y[i], 0.0]
    }

    /// Current velocity of particle `i`.
    #[inline]
    pub fn velocity(&self, i: usize) -> [f32; 2] {
        [self.vx[i], self.vy[i]]
    }

    /// Predicted position of particle `i`.
    #[inline]
    pub fn predicted(&self, i: usize) -> [f32; 2] {
        [self.pred_x[i], self.pred_y[i]]
    }

    /// Sum of all particle masses, accumulated in f64.
    pub fn total_mass(&self) -> f64 {
        self.mass.iter().map(|&m| m as f64).sum()
    }

    /// Total kinetic energy `sum 0.5 m |v|^2`, accumulated in f64.
    pub fn kinetic_energy(&self) -> f64 {
        (0..self.len())
            .map(|i| {
                let vx = self.vx[i] as f64;
                let vy = self.vy[i] as f64;
                0.5 * self.mass[i] as f64 * (vx * vx + vy * vy)
            })
            .sum()
    }
}

/// Initial particle population handed to
/// [`SimulationStepper::seed`](crate::SimulationStepper::seed).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Seed {
    /// Starting positions.
    pub positions: Vec<[f32; 2]>,
    /// Starting velocities.
    pub velocities: Vec<[f32; 2]>,
    /// Particle masses.
    pub masses: Vec<f32>,
}

impl Seed {
    /// Bundle explicit per-particle arrays. Lengths are checked at seeding.
    pub fn new(positions: Vec<[f32; 2]>, velocities: Vec<[f32; 2]>, masses: Vec<f32>) -> Self {
        Self {
            positions,
            velocities,
            masses,
        }
    }

    /// Rectangular lattice of `steps[0] x steps[1]` particles at rest,
    /// spaced evenly from `lower` to `upper` inclusive on each axis.
    ///
    /// A single step along an axis places that column (or row) at `lower`.
    pub fn lattice(lower: [f32; 2], upper: [f32; 2], steps: [usize; 2], mass: f32) -> Self {
        let xs = linspace(lower[0], upper[0], steps[0]);
        let ys = linspace(lower[1], upper[1], steps[1]);
        let n = xs.len() * ys.len();

        let mut positions = Vec::with_capacity(n);
        for &x in &xs {
            for &y in &ys {
                positions.push([x, y]);
            }
        }

        Self {
            positions,
            velocities: vec![[0.0, 0.0]; n],
            masses: vec![mass; n],
        }
    }

    /// Number of particles described.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Return `true` if the seed describes no particles.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

fn linspace(lower: f32, upper: f32, steps: usize) -> Vec<f32> {
    match steps {
        0 => Vec::new(),
        1 => vec![lower],
        _ => {
            let last = steps - 1;
            let step = (upper - lower) / last as f32;
            (0..steps)
                .map(|k| if k == last { upper } else { lower + k as f32 * step })
                .collect()
        }
    }
}
