//! Bohm–gyroBohm mixed transport model.
//!
//! `χ_B` scales with the Bohm diffusivity `T_e/(eB)` times the normalized
//! electron-pressure gradient and `q²`; `χ_gB` with the Bohm diffusivity
//! times the normalized gyroradius `ρ_s/a`. The electron channel is the
//! weighted sum, the ion channel twice the electron one, and particle
//! transport is the bounded harmonic mix of the two with a mild inward
//! pinch.

use ndarray::Array1;

use trident_common::consts::{ELEMENTARY_CHARGE, EV_TO_J};
use trident_geometry::{Geometry, radial_gradient, safety_factor};

use crate::transport::{CHI_MAX, CHI_MIN, TransportCoefficients, TransportModel};
use crate::{CoreProfiles, PhysicsError, PlasmaComposition, Result};

/// The Bohm–gyroBohm model.
#[derive(Debug, Clone)]
pub struct BohmGyroBohm {
    /// Bohm-branch weight.
    bohm_coeff: f64,
    /// gyroBohm-branch weight.
    gyro_bohm_coeff: f64,
    /// Main-ion mass **in \[kg\]**, for the gyroradius.
    main_ion_mass: f64,
}

impl BohmGyroBohm {
    /// Creates the model, rejecting negative weights.
    pub fn new(
        bohm_coeff: f64,
        gyro_bohm_coeff: f64,
        composition: &PlasmaComposition,
    ) -> Result<Self> {
        for (name, value) in [("bohm_coeff", bohm_coeff), ("gyro_bohm_coeff", gyro_bohm_coeff)] {
            if value < 0.0 || !value.is_finite() {
                return Err(PhysicsError::InvalidParameter {
                    model: "bohm-gyrobohm",
                    name,
                    reason: format!("weight must be non-negative and finite, got {value}"),
                });
            }
        }
        Ok(Self {
            bohm_coeff,
            gyro_bohm_coeff,
            main_ion_mass: composition.main_ion_mass(),
        })
    }
}

impl TransportModel for BohmGyroBohm {
    fn name(&self) -> &'static str {
        "bohm-gyrobohm"
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

        let b = geometry.toroidal_field().abs();
        let a = geometry.minor_radius();
        let q = safety_factor(geometry, profiles.psi())?;

        let te_joule = profiles.te().mapv(|value| value * EV_TO_J);
        let pe = profiles.ne() * &te_joule;
        let grad_pe = radial_gradient(&pe, geometry.mesh().dr());

        let mut chi_e = Array1::zeros(n);
        for i in 0..n {
            let bohm_diffusivity = te_joule[i] / (ELEMENTARY_CHARGE * b);
            let pressure_length = (a * grad_pe[i] / pe[i]).abs();
            let chi_bohm = self.bohm_coeff * bohm_diffusivity * pressure_length * q[i] * q[i];
            let rho_s = (self.main_ion_mass * te_joule[i]).sqrt() / (ELEMENTARY_CHARGE * b);
            let chi_gyro_bohm = self.gyro_bohm_coeff * bohm_diffusivity * (rho_s / a);
            chi_e[i] = (chi_bohm + chi_gyro_bohm).clamp(CHI_MIN, CHI_MAX);
        }

        let chi_i = chi_e.mapv(|value| (2.0 * value).clamp(CHI_MIN, CHI_MAX));
        // Bounded harmonic mix keeps D below the smaller heat channel.
        let d = ndarray::Zip::from(&chi_i)
            .and(&chi_e)
            .map_collect(|&i, &e| (i * e / (i + e)).clamp(CHI_MIN, CHI_MAX));
        let radii = geometry.cell_radii();
        let v = ndarray::Zip::from(&d)
            .and(&radii)
            .map_collect(|&diffusivity, &r| -0.5 * diffusivity * r / (a * a));

        Ok(TransportCoefficients { chi_i, chi_e, d, v })
    }
}
