//! Wiring a [`Simulation`] from the configuration tree.

use trident_common::consts::MU_0;
use trident_common::{GeometryType, SimulationConfig, TransportModelKind};
use trident_geometry::{CircularGeometryBuilder, GeometryError};
use trident_physics::sources::{
    BootstrapCurrent, Bremsstrahlung, CompositeSource, EcrhHeating, ExternalCurrent, FusionPower,
    GasPuff, ImpurityRadiation, IonElectronExchange, OhmicHeating,
};
use trident_physics::transport::{BohmGyroBohm, ConstantTransport, TransportModel};
use trident_physics::{BoundaryConditions, CoreProfiles, PlasmaComposition, ScalingReference};

use crate::conservation::ConservationMonitor;
use crate::mhd::SawtoothModel;
use crate::newton::NewtonSolver;
use crate::runner::{Simulation, SimulationStatus, new_control};
use crate::stepper::AdaptiveStepper;
use crate::Result;

/// Default relative drift threshold of the conservation monitor.
const CONSERVATION_TOLERANCE: f64 = 0.01;

/// Builds a ready-to-run [`Simulation`] from a configuration tree.
///
/// All configuration errors surface here, before the first step; stepping
/// never re-validates.
pub fn build_simulation(mut config: SimulationConfig) -> Result<Simulation> {
    config.validate()?;

    let geometry = match config.mesh.geometry_type {
        GeometryType::Circular => CircularGeometryBuilder::new(
            config.mesh.n_cells,
            config.mesh.major_radius,
            config.mesh.minor_radius,
            config.mesh.toroidal_field,
        )
        .build()?,
        GeometryType::Chease => {
            return Err(GeometryError::Unsupported { family: "chease" }.into());
        }
        GeometryType::Eqdsk => {
            return Err(GeometryError::Unsupported { family: "eqdsk" }.into());
        }
    };

    let composition = PlasmaComposition::from_config(&config.composition)?;
    let profiles = CoreProfiles::initial(&geometry, &config.initial, &config.boundaries)?;

    let transport: Box<dyn TransportModel> = match config.transport.model {
        TransportModelKind::Constant => Box::new(ConstantTransport::from_config(&config.transport)?),
        TransportModelKind::BohmGyroBohm => Box::new(BohmGyroBohm::new(
            config.transport.bohm_coeff,
            config.transport.gyro_bohm_coeff,
            &composition,
        )?),
    };

    let mut sources = CompositeSource::new();
    let source_config = &config.sources;
    if source_config.ohmic.enabled {
        sources.push(Box::new(OhmicHeating));
    }
    if source_config.fusion.enabled {
        sources.push(Box::new(FusionPower::new(
            source_config.fusion.deuterium_fraction,
            source_config.fusion.tritium_fraction,
        )?));
    }
    if source_config.exchange.enabled {
        sources.push(Box::new(IonElectronExchange));
    }
    if source_config.ecrh.enabled {
        sources.push(Box::new(EcrhHeating::new(&source_config.ecrh, &geometry)?));
    }
    if source_config.bremsstrahlung.enabled {
        sources.push(Box::new(Bremsstrahlung));
    }
    if source_config.gas_puff.enabled {
        sources.push(Box::new(GasPuff::new(&source_config.gas_puff, &geometry)?));
    }
    if source_config.impurity_radiation.enabled {
        sources.push(Box::new(ImpurityRadiation::new(
            source_config.impurity_radiation.species,
            source_config.impurity_radiation.fraction,
        )?));
    }
    if source_config.bootstrap.enabled {
        sources.push(Box::new(BootstrapCurrent::new(&source_config.bootstrap)?));
    }
    if source_config.external_current.enabled {
        sources.push(Box::new(ExternalCurrent::new(
            &source_config.external_current,
            &geometry,
        )?));
    }

    // The flux edge gradient carries the configured plasma current:
    // ∂ψ/∂r|_a = a·B_θ(a) = μ0·I_p/(2π).
    let psi_edge_gradient =
        MU_0 * config.initial.plasma_current_ma * 1e6 / std::f64::consts::TAU;
    let bcs = BoundaryConditions::from_config(&config.boundaries, psi_edge_gradient);

    let sawtooth = config
        .mhd
        .sawtooth_enabled
        .then(|| SawtoothModel::from_config(&config.mhd.sawtooth));

    let scaling = ScalingReference::for_state(config.mesh.n_cells);
    let newton = NewtonSolver::from_config(&config.solver);
    let stepper = AdaptiveStepper::from_config(&config.time, config.solver.tolerance);

    Ok(Simulation {
        geometry,
        transport,
        sources,
        composition,
        bcs,
        evolution: config.evolution,
        scaling,
        theta: config.scheme.theta,
        ohmic_active: source_config.ohmic.enabled,
        newton,
        stepper,
        sawtooth,
        monitor: ConservationMonitor::new(CONSERVATION_TOLERANCE, false),
        profiles,
        time: config.time.start,
        dt: config.time.initial_dt,
        t_start: config.time.start,
        t_end: config.time.end,
        save_interval: config.output.save_interval,
        status: SimulationStatus::Idle,
        control: new_control(),
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_config_builds() {
        let simulation = build_simulation(SimulationConfig::default()).unwrap();
        assert_eq!(simulation.status(), SimulationStatus::Idle);
        assert_eq!(simulation.profiles().n_cells(), 50);
        let _ = format!("{simulation:?}");
    }

    #[test]
    fn file_backed_geometries_are_rejected() {
        let mut config = SimulationConfig::default();
        config.mesh.geometry_type = GeometryType::Chease;
        assert!(build_simulation(config).is_err());
    }

    #[test]
    fn disabled_sources_leave_an_empty_composite() {
        let mut config = SimulationConfig::default();
        config.sources.ohmic.enabled = false;
        config.sources.exchange.enabled = false;
        let simulation = build_simulation(config).unwrap();
        assert!(simulation.sources.is_empty());
    }
}
