//! The four evolved core profiles.

use ndarray::Array1;

use trident_common::consts::{DENSITY_FLOOR, MU_0, TEMPERATURE_FLOOR};
use trident_common::{BoundariesConfig, InitialConfig};
use trident_geometry::Geometry;

use crate::{PhysicsError, Result};

/// Cell-centered profiles of the four evolved fields.
///
/// Invariants: all four arrays share one length; `Tᵢ`, `Tₑ` and `nₑ` are
/// strictly positive on every *committed* state (solver iterates live in
/// flattened form and are only converted back here at commit time).
#[derive(Debug, Clone)]
pub struct CoreProfiles {
    /// Ion temperature **in \[eV\]**.
    ti: Array1<f64>,
    /// Electron temperature **in \[eV\]**.
    te: Array1<f64>,
    /// Electron density **in \[m⁻³\]**.
    ne: Array1<f64>,
    /// Poloidal flux **in \[Wb\]**.
    psi: Array1<f64>,
}

impl CoreProfiles {
    /// Assembles profiles, enforcing the cross-profile shape invariant.
    pub fn new(
        ti: Array1<f64>,
        te: Array1<f64>,
        ne: Array1<f64>,
        psi: Array1<f64>,
    ) -> Result<Self> {
        let n = ti.len();
        for (name, array) in [("te", &te), ("ne", &ne), ("psi", &psi)] {
            if array.len() != n {
                return Err(PhysicsError::ShapeMismatch {
                    name,
                    expected: n,
                    got: array.len(),
                });
            }
        }
        Ok(Self { ti, te, ne, psi })
    }

    /// Builds the initial state: parabolic temperature and density profiles
    /// `X(ρ) = (X₀ − X_edge)(1 − ρ²)^α + X_edge` and a flux profile
    /// consistent with a peaked current density carrying the configured
    /// plasma current.
    pub fn initial(
        geometry: &Geometry,
        initial: &InitialConfig,
        boundaries: &BoundariesConfig,
    ) -> Result<Self> {
        let rho = geometry.mesh().normalized_cell_radii();

        let parabola = |core: f64, edge: f64| {
            rho.mapv(|value| (core - edge) * (1.0 - value * value).powf(initial.peaking) + edge)
        };

        let ti = parabola(initial.ion_temperature, boundaries.ion_temperature);
        let te = parabola(initial.electron_temperature, boundaries.electron_temperature);
        let ne = parabola(initial.density, boundaries.density);
        let psi = initial_flux(geometry, initial.plasma_current_ma * 1e6, initial.current_peaking);

        let profiles = Self::new(ti, te, ne, psi)?;
        profiles.validate_positive()?;
        Ok(profiles)
    }

    /// Ion temperature **in \[eV\]**.
    pub fn ti(&self) -> &Array1<f64> {
        &self.ti
    }

    /// Electron temperature **in \[eV\]**.
    pub fn te(&self) -> &Array1<f64> {
        &self.te
    }

    /// Electron density **in \[m⁻³\]**.
    pub fn ne(&self) -> &Array1<f64> {
        &self.ne
    }

    /// Poloidal flux **in \[Wb\]**.
    pub fn psi(&self) -> &Array1<f64> {
        &self.psi
    }

    /// Number of cells.
    pub fn n_cells(&self) -> usize {
        self.ti.len()
    }

    /// Checks the positivity invariant on `Tᵢ`, `Tₑ`, `nₑ`.
    pub fn validate_positive(&self) -> Result<()> {
        for (name, array) in [("ti", &self.ti), ("te", &self.te), ("ne", &self.ne)] {
            let min = array.iter().copied().fold(f64::INFINITY, f64::min);
            if !(min > 0.0) {
                return Err(PhysicsError::NonPositive { field: name, min });
            }
        }
        Ok(())
    }

    /// Returns a copy with the temperature and density floors applied.
    pub fn floored(&self) -> Self {
        Self {
            ti: self.ti.mapv(|value| value.max(TEMPERATURE_FLOOR)),
            te: self.te.mapv(|value| value.max(TEMPERATURE_FLOOR)),
            ne: self.ne.mapv(|value| value.max(DENSITY_FLOOR)),
            psi: self.psi.clone(),
        }
    }

    /// Replaces individual profiles, keeping the others.
    pub fn with_fields(
        &self,
        ti: Option<Array1<f64>>,
        te: Option<Array1<f64>>,
        ne: Option<Array1<f64>>,
        psi: Option<Array1<f64>>,
    ) -> Result<Self> {
        Self::new(
            ti.unwrap_or_else(|| self.ti.clone()),
            te.unwrap_or_else(|| self.te.clone()),
            ne.unwrap_or_else(|| self.ne.clone()),
            psi.unwrap_or_else(|| self.psi.clone()),
        )
    }

    /// Electron (and quasi-neutral ion) pressure `nₑ(Tᵢ+Tₑ)` **in
    /// \[eV·m⁻³\]**.
    pub fn total_pressure_ev(&self) -> Array1<f64> {
        &self.ne * &(&self.ti + &self.te)
    }
}

/// Integrates the flux profile of a peaked parametric current density
/// `j(r) = j₀(1 − (r/a)²)^ν` normalized to `total_current` ampere:
/// `I_enc(r) = I_p·[1 − (1 − ρ²)^{ν+1}]`, `∂ψ/∂r = r·B_θ = μ0·I_enc/(2π)`.
fn initial_flux(geometry: &Geometry, total_current: f64, nu: f64) -> Array1<f64> {
    let radii = geometry.cell_radii();
    let a = geometry.minor_radius();

    let dpsi_dr = |r: f64| {
        let rho2 = (r / a).powi(2).min(1.0);
        let enclosed = total_current * (1.0 - (1.0 - rho2).powf(nu + 1.0));
        MU_0 * enclosed / std::f64::consts::TAU
    };

    // Cumulative trapezoid from the axis (ψ(0) = 0).
    let mut psi = Array1::zeros(radii.len());
    let mut previous_r = 0.0;
    let mut previous_f = 0.0;
    let mut accumulated = 0.0;
    for (i, &r) in radii.iter().enumerate() {
        let f = dpsi_dr(r);
        accumulated += 0.5 * (previous_f + f) * (r - previous_r);
        psi[i] = accumulated;
        previous_r = r;
        previous_f = f;
    }
    psi
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use trident_geometry::CircularGeometryBuilder;

    fn create_geometry() -> Geometry {
        CircularGeometryBuilder::new(50, 3.0, 1.0, 5.0).build().unwrap()
    }

    #[test]
    fn initial_profiles_hit_core_and_edge() {
        let geometry = create_geometry();
        let initial = InitialConfig::default();
        let boundaries = BoundariesConfig::default();
        let profiles = CoreProfiles::initial(&geometry, &initial, &boundaries).unwrap();

        // The innermost cell sits close to the configured core value.
        assert!(profiles.ti()[0] > 0.95 * initial.ion_temperature);
        // The outermost cell approaches the edge value from above.
        let last = profiles.te().len() - 1;
        assert!(profiles.te()[last] >= boundaries.electron_temperature);
        assert!(profiles.te()[last] < 2.0 * boundaries.electron_temperature + 1.0);
    }

    #[test]
    fn initial_flux_is_monotone_from_axis() {
        let geometry = create_geometry();
        let profiles = CoreProfiles::initial(
            &geometry,
            &InitialConfig::default(),
            &BoundariesConfig::default(),
        )
        .unwrap();
        let psi = profiles.psi();
        for i in 1..psi.len() {
            assert!(psi[i] > psi[i - 1], "ψ must increase away from the axis");
        }
    }

    #[test]
    fn initial_flux_carries_the_configured_current() {
        let geometry = create_geometry();
        let initial = InitialConfig {
            plasma_current_ma: 10.0,
            ..InitialConfig::default()
        };
        let profiles =
            CoreProfiles::initial(&geometry, &initial, &BoundariesConfig::default()).unwrap();

        // B_θ at the edge must match μ0·Ip/(2πa).
        let b_theta = trident_geometry::poloidal_field(&geometry, profiles.psi()).unwrap();
        let expected = MU_0 * 10.0e6 / (std::f64::consts::TAU * 1.0);
        let last = b_theta.len() - 1;
        assert_relative_eq!(b_theta[last], expected, max_relative = 0.05);
    }

    #[test]
    fn mismatched_shapes_are_rejected() {
        let result = CoreProfiles::new(
            Array1::ones(10),
            Array1::ones(10),
            Array1::ones(9),
            Array1::zeros(10),
        );
        assert!(matches!(
            result,
            Err(PhysicsError::ShapeMismatch { name: "ne", expected: 10, got: 9 })
        ));
    }

    #[test]
    fn floors_restore_positivity() {
        let profiles = CoreProfiles::new(
            Array1::from_vec(vec![-5.0, 100.0]),
            Array1::from_vec(vec![50.0, 100.0]),
            Array1::from_vec(vec![1e17, 1e19]),
            Array1::zeros(2),
        )
        .unwrap();
        assert!(profiles.validate_positive().is_err());
        let floored = profiles.floored();
        floored.validate_positive().unwrap();
        assert_relative_eq!(floored.ti()[0], TEMPERATURE_FLOOR);
        assert_relative_eq!(floored.ne()[0], DENSITY_FLOOR);
    }
}
