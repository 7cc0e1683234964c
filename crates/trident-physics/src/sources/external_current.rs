//! Prescribed external (ECCD-like) current drive.

use ndarray::Array1;

use trident_common::ExternalCurrentConfig;
use trident_geometry::Geometry;

use crate::sources::{SourceInputs, SourceModel, integrated_powers};
use crate::{
    CoreProfiles, PhysicsError, PlasmaComposition, Result, SourceCategory, SourceContribution,
    SourceMetadata,
};

/// Gaussian current-density deposition normalized so the driven current
/// through the poloidal cross section equals the configured total.
#[derive(Debug, Clone)]
pub struct ExternalCurrent {
    /// Driven current density **in \[MA/m²\]**.
    profile: Array1<f64>,
}

impl ExternalCurrent {
    /// Builds the normalized deposition profile.
    pub fn new(config: &ExternalCurrentConfig, geometry: &Geometry) -> Result<Self> {
        if config.total_ma <= 0.0 {
            return Err(PhysicsError::InvalidParameter {
                model: "external current",
                name: "total_ma",
                reason: format!("must be positive, got {}", config.total_ma),
            });
        }
        if config.width <= 0.0 {
            return Err(PhysicsError::InvalidParameter {
                model: "external current",
                name: "width",
                reason: "must be positive".into(),
            });
        }

        let sigma = config.width / 3.0;
        let rho = geometry.mesh().normalized_cell_radii();
        let shape = rho.mapv(|value| {
            let distance = value - config.deposition_rho;
            (-distance * distance / (2.0 * sigma * sigma)).exp()
        });

        // Current threads the poloidal cross section: dA = 2πr·dr.
        let radii = geometry.cell_radii();
        let dr = geometry.mesh().dr();
        let cross_section_integral = ndarray::Zip::from(&shape)
            .and(&radii)
            .fold(0.0, |acc, &s, &r| acc + s * std::f64::consts::TAU * r * dr);
        let normalization = config.total_ma / cross_section_integral;

        Ok(Self {
            profile: shape.mapv(|value| value * normalization),
        })
    }

    /// Total driven current **in \[MA\]**.
    pub fn total_current_ma(&self, geometry: &Geometry) -> f64 {
        let radii = geometry.cell_radii();
        let dr = geometry.mesh().dr();
        ndarray::Zip::from(&self.profile)
            .and(&radii)
            .fold(0.0, |acc, &j, &r| acc + j * std::f64::consts::TAU * r * dr)
    }
}

impl SourceModel for ExternalCurrent {
    fn name(&self) -> &'static str {
        "external current"
    }

    fn category(&self) -> SourceCategory {
        SourceCategory::Other
    }

    fn contribute<'tape>(
        &self,
        inputs: &SourceInputs<'_, 'tape>,
    ) -> Result<SourceContribution<'tape>> {
        Ok(SourceContribution {
            s_j: Some(inputs.tape.constant(self.profile.clone())),
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
