//! Transport models: χᵢ, χₑ, D, V on cells.

mod bgb;
mod constant;

pub use bgb::BohmGyroBohm;
pub use constant::ConstantTransport;

use ndarray::Array1;

use trident_geometry::Geometry;

use crate::CoreProfiles;
use crate::{PhysicsError, Result};

/// Lower clamp of the heat and particle diffusivities **in \[m²/s\]**.
pub const CHI_MIN: f64 = 0.05;

/// Upper clamp of the heat and particle diffusivities **in \[m²/s\]**.
pub const CHI_MAX: f64 = 100.0;

/// Cell-centered transport coefficients.
///
/// Diffusivities are non-negative; the pinch velocity may be negative
/// (inward).
#[derive(Debug, Clone)]
pub struct TransportCoefficients {
    /// Ion heat diffusivity **in \[m²/s\]**.
    pub chi_i: Array1<f64>,
    /// Electron heat diffusivity **in \[m²/s\]**.
    pub chi_e: Array1<f64>,
    /// Particle diffusivity **in \[m²/s\]**.
    pub d: Array1<f64>,
    /// Pinch velocity **in \[m/s\]**.
    pub v: Array1<f64>,
}

impl TransportCoefficients {
    /// Validates shapes against the mesh and the sign invariants.
    pub fn validate(&self, n_cells: usize) -> Result<()> {
        for (name, array) in [
            ("chi_i", &self.chi_i),
            ("chi_e", &self.chi_e),
            ("d", &self.d),
            ("v", &self.v),
        ] {
            if array.len() != n_cells {
                return Err(PhysicsError::ShapeMismatch {
                    name,
                    expected: n_cells,
                    got: array.len(),
                });
            }
        }
        for (name, array) in [("chi_i", &self.chi_i), ("chi_e", &self.chi_e), ("d", &self.d)] {
            let min = array.iter().copied().fold(f64::INFINITY, f64::min);
            if min < 0.0 {
                return Err(PhysicsError::NonPositive { field: name, min });
            }
        }
        Ok(())
    }
}

/// A transport model maps the current state to coefficients. Models are
/// stateless and evaluated once per time step (the coefficients are frozen
/// across Newton iterations of that step).
pub trait TransportModel: Send + Sync {
    /// Model name, for diagnostics.
    fn name(&self) -> &'static str;

    /// Computes the coefficients at the given state.
    fn coefficients(
        &self,
        profiles: &CoreProfiles,
        geometry: &Geometry,
    ) -> Result<TransportCoefficients>;
}
