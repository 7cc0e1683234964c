//! Steady-state diffusion scenarios against analytic references.

use ndarray::Array1;

use trident_common::consts::MW_PER_M3_TO_EV_PER_M3_S;
use trident_common::{SimulationConfig, TimeConfig};
use trident_physics::sources::{
    CompositeSource, SourceInputs, SourceModel, integrated_powers,
};
use trident_physics::transport::ConstantTransport;
use trident_physics::{
    BoundaryCondition, BoundaryConditions, CoreProfiles, FieldBoundary, PlasmaComposition,
    Result as PhysicsResult, SourceCategory, SourceContribution, SourceMetadata,
};
use trident_simulate::{RunOutcome, build_simulation};

/// Uniform volumetric ion heating, for analytic references.
struct UniformIonHeat {
    /// Heating density **in \[MW/m³\]**.
    mw_per_m3: f64,
}

impl SourceModel for UniformIonHeat {
    fn name(&self) -> &'static str {
        "uniform ion heat"
    }

    fn category(&self) -> SourceCategory {
        SourceCategory::Auxiliary
    }

    fn contribute<'tape>(
        &self,
        inputs: &SourceInputs<'_, 'tape>,
    ) -> PhysicsResult<SourceContribution<'tape>> {
        let n = inputs.geometry.mesh().n_cells();
        Ok(SourceContribution {
            q_i: Some(inputs.tape.constant(Array1::from_elem(n, self.mw_per_m3))),
            ..SourceContribution::default()
        })
    }

    fn metadata(
        &self,
        profiles: &CoreProfiles,
        geometry: &trident_geometry::Geometry,
        composition: &PlasmaComposition,
    ) -> PhysicsResult<SourceMetadata> {
        integrated_powers(self, profiles, geometry, composition)
    }
}

/// Shared scenario configuration: 50 cells, a = 1 m, R0 = 3 m, Bφ = 5 T,
/// χ = 1 m²/s, flat static density of 1e20 m⁻³, only Tᵢ evolving.
fn diffusion_config() -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.mesh.n_cells = 50;
    config.mesh.major_radius = 3.0;
    config.mesh.minor_radius = 1.0;
    config.mesh.toroidal_field = 5.0;

    config.evolution.ion_heat = true;
    config.evolution.electron_heat = false;
    config.evolution.density = false;
    config.evolution.current = false;

    config.transport.chi_i = 1.0;
    config.transport.chi_e = 1.0;
    config.transport.particle_d = 0.5;
    config.transport.particle_v = 0.0;

    config.boundaries.ion_temperature = 100.0;
    config.boundaries.electron_temperature = 100.0;
    config.boundaries.density = 1e20;

    config.initial.ion_temperature = 1000.0;
    config.initial.electron_temperature = 100.0;
    config.initial.density = 1e20; // flat: core equals edge

    config.sources.ohmic.enabled = false;
    config.sources.exchange.enabled = false;

    config.scheme.theta = 1.0;
    config.time = TimeConfig {
        start: 0.0,
        end: 10.0,
        initial_dt: 0.1,
        adaptive: None,
    };
    config
}

#[test]
fn uniform_source_reaches_the_parabolic_steady_state() {
    let mut simulation = build_simulation(diffusion_config()).unwrap();

    let mut sources = CompositeSource::new();
    sources.push(Box::new(UniformIonHeat { mw_per_m3: 0.1 }));
    simulation
        .initialize(
            Box::new(ConstantTransport::new(1.0, 1.0, 0.5, 0.0).unwrap()),
            sources,
            None,
        )
        .unwrap();

    let result = simulation.run(None).unwrap();
    assert!(matches!(result.outcome, RunOutcome::Completed));
    assert_eq!(result.statistics.steps_accepted, 100);

    // With constant face areas, a uniform source and a symmetric axis, the
    // steady profile is T(r) = T_edge + S·(a² − r²)/(2·nₑ·χ), S in
    // eV/(m³·s).
    let source_rate = 0.1 * MW_PER_M3_TO_EV_PER_M3_S;
    let n_cells = simulation.profiles().n_cells();
    let cell_radii =
        Array1::from_shape_fn(n_cells, |i| (i as f64 + 0.5) * (1.0 / n_cells as f64));
    let analytic = cell_radii
        .mapv(|r| 100.0 + source_rate * (1.0 - r * r) / (2.0 * 1e20 * 1.0));

    let ti = result.profiles.ti();
    let mut error_squared = 0.0;
    let mut norm_squared = 0.0;
    for i in 0..n_cells {
        error_squared += (ti[i] - analytic[i]).powi(2);
        norm_squared += analytic[i].powi(2);
    }
    let relative_l2 = (error_squared / norm_squared).sqrt();
    assert!(
        relative_l2 < 0.02,
        "L² deviation from the analytic steady state: {relative_l2:.4}"
    );
}

#[test]
fn axis_constraint_reaches_the_linear_steady_state() {
    let mut simulation = build_simulation(diffusion_config()).unwrap();
    simulation
        .initialize(
            Box::new(ConstantTransport::new(1.0, 1.0, 0.5, 0.0).unwrap()),
            CompositeSource::new(),
            None,
        )
        .unwrap();

    // Fixed 10 keV at the axis face, 100 eV at the edge face.
    let mut bcs = BoundaryConditions::from_config(
        &diffusion_config().boundaries,
        0.0,
    );
    bcs.ti = FieldBoundary {
        left: BoundaryCondition::Value(10_000.0),
        right: BoundaryCondition::Value(100.0),
    };
    simulation.set_boundary_conditions(bcs);

    let result = simulation.run(None).unwrap();
    assert!(matches!(result.outcome, RunOutcome::Completed));

    // Constant flux through constant face areas makes the steady profile
    // linear between the two fixed faces; the cell centers sample
    // T(r) = 10000 + (100 − 10000)·r/a exactly.
    let ti = result.profiles.ti();
    let dr = 1.0 / 50.0;
    for (i, &value) in ti.iter().enumerate() {
        let r = (i as f64 + 0.5) * dr;
        let line = 10_000.0 + (100.0 - 10_000.0) * r;
        assert!(
            (value - line).abs() / line < 1e-3,
            "cell {i}: {value} is off the linear profile value {line}"
        );
    }
    for i in 1..50 {
        assert!(ti[i] < ti[i - 1], "steady profile must fall monotonically");
    }

    // Midpoint of the two central cells lands on (10000 + 100)/2 ± 1%.
    let midpoint = 0.5 * (ti[24] + ti[25]);
    let expected = 0.5 * (10_000.0 + 100.0);
    assert!(
        (midpoint - expected).abs() / expected < 0.01,
        "midpoint {midpoint} deviates from {expected} by more than 1%"
    );
}
