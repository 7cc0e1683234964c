//! Spatially constant transport coefficients.

use ndarray::Array1;

use trident_common::TransportConfig;
use trident_geometry::Geometry;

use crate::CoreProfiles;
use crate::transport::{TransportCoefficients, TransportModel};
use crate::{PhysicsError, Result};

/// Constant χᵢ, χₑ, D, V across the radius.
#[derive(Debug, Clone)]
pub struct ConstantTransport {
    /// Ion heat diffusivity **in \[m²/s\]**.
    chi_i: f64,
    /// Electron heat diffusivity **in \[m²/s\]**.
    chi_e: f64,
    /// Particle diffusivity **in \[m²/s\]**.
    d: f64,
    /// Pinch velocity **in \[m/s\]**.
    v: f64,
}

impl ConstantTransport {
    /// Creates the model, rejecting negative diffusivities.
    pub fn new(chi_i: f64, chi_e: f64, d: f64, v: f64) -> Result<Self> {
        for (name, value) in [("chi_i", chi_i), ("chi_e", chi_e), ("d", d)] {
            if value < 0.0 || !value.is_finite() {
                return Err(PhysicsError::InvalidParameter {
                    model: "constant transport",
                    name,
                    reason: format!("diffusivity must be non-negative and finite, got {value}"),
                });
            }
        }
        Ok(Self { chi_i, chi_e, d, v })
    }

    /// Creates the model from the transport configuration section.
    pub fn from_config(config: &TransportConfig) -> Result<Self> {
        Self::new(config.chi_i, config.chi_e, config.particle_d, config.particle_v)
    }
}

impl TransportModel for ConstantTransport {
    fn name(&self) -> &'static str {
        "constant"
    }

    fn coefficients(
        &self,
        profiles: &CoreProfiles,
        geometry: &Geometry,
    ) -> Result<TransportCoefficients> {
        let n = geometry.mesh().n_cells();
        if profiles.n_cells() != n {
            return Err(PhysicsError::ShapeMismatch {
                name: "profiles",
                expected: n,
                got: profiles.n_cells(),
            });
        }
        Ok(TransportCoefficients {
            chi_i: Array1::from_elem(n, self.chi_i),
            chi_e: Array1::from_elem(n, self.chi_e),
            d: Array1::from_elem(n, self.d),
            v: Array1::from_elem(n, self.v),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use trident_common::{BoundariesConfig, InitialConfig};
    use trident_geometry::CircularGeometryBuilder;

    #[test]
    fn fills_the_mesh() {
        let geometry = CircularGeometryBuilder::new(20, 3.0, 1.0, 5.0).build().unwrap();
        let profiles = CoreProfiles::initial(
            &geometry,
            &InitialConfig::default(),
            &BoundariesConfig::default(),
        )
        .unwrap();
        let model = ConstantTransport::new(1.0, 1.5, 0.5, -0.2).unwrap();
        let coefficients = model.coefficients(&profiles, &geometry).unwrap();
        coefficients.validate(20).unwrap();
        assert_relative_eq!(coefficients.chi_e[7], 1.5);
        assert_relative_eq!(coefficients.v[0], -0.2);
    }

    #[test]
    fn negative_diffusivity_is_rejected_at_construction() {
        assert!(ConstantTransport::new(-1.0, 1.0, 0.5, 0.0).is_err());
    }
}
