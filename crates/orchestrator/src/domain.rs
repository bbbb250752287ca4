//! Domain setup: initial particle placement for a scenario.

use fluidsim_kernel::Seed;

use crate::config::ScenarioConfig;

/// Build the initial particle set: a rectangular lattice of equal-mass
/// particles sharing the scenario's initial velocity.
pub fn setup_domain(config: &ScenarioConfig) -> Seed {
    let lattice = &config.lattice;
    let mut seed = Seed::lattice(lattice.lower, lattice.upper, lattice.steps, config.particle_mass);
    seed.velocities.fill(config.initial_velocity);

    tracing::info!(
        "Domain setup complete: {} particles in a {}x{} lattice, spacing ({:.4}, {:.4})",
        seed.len(),
        lattice.steps[0],
        lattice.steps[1],
        spacing(lattice.lower[0], lattice.upper[0], lattice.steps[0]),
        spacing(lattice.lower[1], lattice.upper[1], lattice.steps[1]),
    );

    seed
}

fn spacing(lower: f32, upper: f32, steps: usize) -> f32 {
    if steps > 1 {
        (upper - lower) / (steps - 1) as f32
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario(json: &str) -> ScenarioConfig {
        ScenarioConfig::from_json_str(json).unwrap()
    }

    #[test]
    fn test_default_lattice() {
        let config = scenario(r#"{ "name": "default" }"#);
        let seed = setup_domain(&config);
        assert_eq!(seed.len(), 100);
        assert!(seed.masses.iter().all(|&m| m == 1.0));
        assert!(seed.velocities.iter().all(|&v| v == [0.0, 0.0]));
        assert_eq!(seed.positions[0], [-0.625, -0.625]);
        assert_eq!(seed.positions[99], [0.625, 0.625]);
    }

    #[test]
    fn test_initial_velocity_and_mass_applied() {
        let config = scenario(
            r#"{
                "name": "jet",
                "lattice": { "lower": [-1.0, 0.0], "upper": [-0.5, 0.5], "steps": [3, 2] },
                "particle_mass": 0.25,
                "initial_velocity": [2.0, -1.0]
            }"#,
        );
        let seed = setup_domain(&config);
        assert_eq!(seed.len(), 6);
        assert!(seed.masses.iter().all(|&m| m == 0.25));
        assert!(seed.velocities.iter().all(|&v| v == [2.0, -1.0]));
        assert!(seed
            .positions
            .iter()
            .all(|p| (-1.0..=-0.5).contains(&p[0]) && (0.0..=0.5).contains(&p[1])));
    }

    #[test]
    fn test_single_particle_lattice() {
        let config = scenario(
            r#"{ "name": "one", "lattice": { "lower": [0.3, 0.4], "upper": [0.3, 0.4], "steps": [1, 1] } }"#,
        );
        let seed = setup_domain(&config);
        assert_eq!(seed.positions, vec![[0.3, 0.4]]);
        assert_eq!(spacing(0.3, 0.3, 1), 0.0);
    }
}
