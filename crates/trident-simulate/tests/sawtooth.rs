//! Integrated sawtooth triggering with refractory suppression.

use trident_common::{SimulationConfig, TimeConfig};
use trident_simulate::{RunOutcome, build_simulation};

/// A low-q₀ startup: the configured plasma current pushes `q(0)` below 1,
/// so the first step must fire a crash; the refractory interval outlasts
/// the run, so exactly one fires.
#[test]
fn first_step_crashes_and_refractory_suppresses_the_rest() {
    let mut config = SimulationConfig::default();
    config.mesh.n_cells = 24;
    config.mesh.major_radius = 3.0;
    config.mesh.minor_radius = 1.0;
    config.mesh.toroidal_field = 5.0;

    config.evolution.ion_heat = true;
    config.evolution.electron_heat = false;
    config.evolution.density = false;
    config.evolution.current = false;

    config.sources.ohmic.enabled = false;
    config.sources.exchange.enabled = false;

    // q(0) = π·a²·Bφ/(R0·μ0·I_p) for the peaked seed current: 4.63 MA
    // lands q(0) near 0.9.
    config.initial.plasma_current_ma = 4.63;
    config.initial.current_peaking = 1.0;

    config.mhd.sawtooth_enabled = true;
    config.mhd.sawtooth.q_critical = 1.0;
    config.mhd.sawtooth.inversion_radius = 0.3;
    config.mhd.sawtooth.min_interval = 0.01;

    config.scheme.theta = 1.0;
    config.time = TimeConfig {
        start: 0.0,
        end: 5e-3,
        initial_dt: 1e-3,
        adaptive: None,
    };

    let mut simulation = build_simulation(config).unwrap();

    // The seed state must actually sit below the trigger.
    let q = trident_geometry::safety_factor(
        &trident_geometry::CircularGeometryBuilder::new(24, 3.0, 1.0, 5.0)
            .build()
            .unwrap(),
        simulation.profiles().psi(),
    )
    .unwrap();
    assert!(q[0] < 1.0, "seed q(0) = {} must trigger", q[0]);

    let result = simulation.run(None).unwrap();
    assert!(matches!(result.outcome, RunOutcome::Completed));
    assert_eq!(result.statistics.steps_accepted, 5);

    // One crash on the first step; the flattened core flux and the 0.01 s
    // refractory interval both keep later steps quiescent.
    assert_eq!(result.statistics.crashes, 1);
    result.profiles.validate_positive().unwrap();
}
