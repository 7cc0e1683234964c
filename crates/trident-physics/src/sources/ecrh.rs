//! ECRH auxiliary heating: Gaussian deposition, 100% to electrons.

use ndarray::Array1;

use trident_common::EcrhConfig;
use trident_common::units::mw_to_watt;
use trident_geometry::Geometry;

use crate::sources::{SourceInputs, SourceModel, integrated_powers};
use crate::{
    CoreProfiles, PhysicsError, PlasmaComposition, Result, SourceCategory, SourceContribution,
    SourceMetadata,
};

/// Gaussian electron heating centered at `ρ_dep` with 3σ width `w`,
/// normalized so that `∫P dV` equals the configured total power.
///
/// The deposition profile is fixed at construction; an ECCD current-drive
/// component is provided separately by the external-current model.
#[derive(Debug, Clone)]
pub struct EcrhHeating {
    /// Deposition profile **in \[MW/m³\]**.
    profile: Array1<f64>,
}

impl EcrhHeating {
    /// Builds the normalized deposition profile.
    pub fn new(config: &EcrhConfig, geometry: &Geometry) -> Result<Self> {
        if config.power_mw <= 0.0 {
            return Err(PhysicsError::InvalidParameter {
                model: "ecrh",
                name: "power_mw",
                reason: format!("must be positive, got {}", config.power_mw),
            });
        }
        if config.width <= 0.0 {
            return Err(PhysicsError::InvalidParameter {
                model: "ecrh",
                name: "width",
                reason: "must be positive".into(),
            });
        }
        if !(0.0..=1.0).contains(&config.deposition_rho) {
            return Err(PhysicsError::InvalidParameter {
                model: "ecrh",
                name: "deposition_rho",
                reason: "must lie in [0, 1]".into(),
            });
        }

        let sigma = config.width / 3.0;
        let rho = geometry.mesh().normalized_cell_radii();
        let shape = rho.mapv(|value| {
            let distance = value - config.deposition_rho;
            (-distance * distance / (2.0 * sigma * sigma)).exp()
        });
        let integral = geometry.volume_integral(&shape);
        let normalization = mw_to_watt(config.power_mw) / integral;
        // W/m³ shape scaled back into MW/m³.
        let profile = shape.mapv(|value| value * normalization * 1e-6);
        Ok(Self { profile })
    }
}

impl SourceModel for EcrhHeating {
    fn name(&self) -> &'static str {
        "ecrh"
    }

    fn category(&self) -> SourceCategory {
        SourceCategory::Auxiliary
    }

    fn contribute<'tape>(
        &self,
        inputs: &SourceInputs<'_, 'tape>,
    ) -> Result<SourceContribution<'tape>> {
        Ok(SourceContribution {
            q_e: Some(inputs.tape.constant(self.profile.clone())),
            ..SourceContribution::default()
        })
    }

    fn metadata(
        &self,
        profiles: &CoreProfiles,
        geometry: &Geometry,
        composition: &PlasmaComposition,
    ) -> Result<SourceMetadata> {
        integrated_powers(self, profiles, geometry, composition)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use trident_common::{BoundariesConfig, InitialConfig};
    use trident_geometry::CircularGeometryBuilder;

    #[test]
    fn deposition_integrates_to_the_configured_power() {
        let geometry = CircularGeometryBuilder::new(50, 3.0, 1.0, 5.0).build().unwrap();
        let config = EcrhConfig {
            enabled: true,
            power_mw: 12.5,
            deposition_rho: 0.3,
            width: 0.2,
        };
        let model = EcrhHeating::new(&config, &geometry).unwrap();
        let profiles = CoreProfiles::initial(
            &geometry,
            &InitialConfig::default(),
            &BoundariesConfig::default(),
        )
        .unwrap();
        let entry = model
            .metadata(&profiles, &geometry, &PlasmaComposition::default())
            .unwrap();
        assert_relative_eq!(entry.electron_power, 12.5e6, max_relative = 1e-9);
        assert!(entry.ion_power.abs() < f64::EPSILON);
    }

    #[test]
    fn deposition_peaks_at_the_requested_radius() {
        let geometry = CircularGeometryBuilder::new(100, 3.0, 1.0, 5.0).build().unwrap();
        let config = EcrhConfig {
            enabled: true,
            power_mw: 5.0,
            deposition_rho: 0.5,
            width: 0.15,
        };
        let model = EcrhHeating::new(&config, &geometry).unwrap();
        let peak = model
            .profile
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap_or(0);
        let rho_peak = geometry.mesh().normalized_cell_radii()[peak];
        assert!((rho_peak - 0.5).abs() < 0.02, "peak at ρ = {rho_peak}");
    }

    #[test]
    fn non_positive_power_is_rejected() {
        let geometry = CircularGeometryBuilder::new(10, 3.0, 1.0, 5.0).build().unwrap();
        let config = EcrhConfig {
            power_mw: 0.0,
            ..EcrhConfig::default()
        };
        assert!(EcrhHeating::new(&config, &geometry).is_err());
    }
}
