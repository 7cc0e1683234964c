//! Edge gas-puff particle fuelling.

use ndarray::Array1;

use trident_common::GasPuffConfig;
use trident_geometry::Geometry;

use crate::sources::{SourceInputs, SourceModel, integrated_powers};
use crate::{
    CoreProfiles, PhysicsError, PlasmaComposition, Result, SourceCategory, SourceContribution,
    SourceMetadata,
};

/// Neutral fuelling from the edge with an e-folding penetration depth,
/// normalized so that `∫Sₙ dV` equals the configured throughput.
#[derive(Debug, Clone)]
pub struct GasPuff {
    /// Particle source profile **in \[m⁻³/s\]**.
    profile: Array1<f64>,
}

impl GasPuff {
    /// Builds the normalized fuelling profile.
    pub fn new(config: &GasPuffConfig, geometry: &Geometry) -> Result<Self> {
        if config.rate <= 0.0 {
            return Err(PhysicsError::InvalidParameter {
                model: "gas puff",
                name: "rate",
                reason: format!("must be positive, got {}", config.rate),
            });
        }
        if config.decay_length <= 0.0 {
            return Err(PhysicsError::InvalidParameter {
                model: "gas puff",
                name: "decay_length",
                reason: "must be positive".into(),
            });
        }

        let rho = geometry.mesh().normalized_cell_radii();
        let shape = rho.mapv(|value| (-(1.0 - value) / config.decay_length).exp());
        let normalization = config.rate / geometry.volume_integral(&shape);
        Ok(Self {
            profile: shape.mapv(|value| value * normalization),
        })
    }
}

impl SourceModel for GasPuff {
    fn name(&self) -> &'static str {
        "gas puff"
    }

    fn category(&self) -> SourceCategory {
        SourceCategory::Other
    }

    fn contribute<'tape>(
        &self,
        inputs: &SourceInputs<'_, 'tape>,
    ) -> Result<SourceContribution<'tape>> {
        Ok(SourceContribution {
            s_n: Some(inputs.tape.constant(self.profile.clone())),
            ..SourceContribution::default()
        })
    }

    fn metadata(
        &self,
        profiles: &CoreProfiles,
        geometry: &Geometry,
        composition: &PlasmaComposition,
    ) -> Result<SourceMetadata> {
        // Particle sources carry no power; the entry stays zeroed.
        integrated_powers(self, profiles, geometry, composition)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use trident_geometry::CircularGeometryBuilder;

    #[test]
    fn fuelling_is_edge_localized_and_normalized() {
        let geometry = CircularGeometryBuilder::new(50, 3.0, 1.0, 5.0).build().unwrap();
        let config = GasPuffConfig {
            enabled: true,
            rate: 2e21,
            decay_length: 0.05,
        };
        let model = GasPuff::new(&config, &geometry).unwrap();

        let total = geometry.volume_integral(&model.profile);
        assert_relative_eq!(total, 2e21, max_relative = 1e-9);
        // The source must fall off towards the axis.
        assert!(model.profile[49] > model.profile[25]);
        assert!(model.profile[0] < 1e-3 * model.profile[49]);
    }

    #[test]
    fn non_positive_rate_is_rejected() {
        let geometry = CircularGeometryBuilder::new(10, 3.0, 1.0, 5.0).build().unwrap();
        let config = GasPuffConfig {
            rate: -1.0,
            ..GasPuffConfig::default()
        };
        assert!(GasPuff::new(&config, &geometry).is_err());
    }
}
