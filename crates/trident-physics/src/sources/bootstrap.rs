//! Sauter bootstrap current (simplified).
//!
//! `J_BS = −C_BS(ν*, f_t, ε)·∇p/Bφ` with the trapped-particle coefficients
//! `L31`, `L32`, `L34` from the Sauter polynomial fits, evaluated at an
//! effective trapped fraction that degrades with collisionality. The
//! magnitude clamp is symmetric, preserving the sign — counter-current at
//! the edge is physical.

use trident_common::consts::EV_TO_J;
use trident_common::units::{a_to_ma, ma_to_a};
use trident_common::BootstrapConfig;
use trident_geometry::Geometry;
use trident_tensor::Var;

use crate::calculus::radial_gradient_var;
use crate::sources::{SourceInputs, SourceModel, integrated_powers};
use crate::{
    CoreProfiles, PhysicsError, PlasmaComposition, Result, SourceCategory, SourceContribution,
    SourceMetadata, coulomb_log_ei_var,
};

/// Collisionality prefactor of `ν*_e = 6.92e-18·q·R·nₑ·Z_eff·lnΛ/(Tₑ²·ε^{3/2})`.
const NU_STAR_PREFACTOR: f64 = 6.92e-18;

/// Simplified Sauter bootstrap current drive.
#[derive(Debug, Clone)]
pub struct BootstrapCurrent {
    /// Sign-preserving magnitude clamp **in \[A/m²\]**.
    clamp_a_per_m2: f64,
}

impl BootstrapCurrent {
    /// Creates the model from its configuration section.
    pub fn new(config: &BootstrapConfig) -> Result<Self> {
        if config.magnitude_clamp <= 0.0 {
            return Err(PhysicsError::InvalidParameter {
                model: "bootstrap",
                name: "magnitude_clamp",
                reason: format!("must be positive, got {}", config.magnitude_clamp),
            });
        }
        Ok(Self {
            clamp_a_per_m2: ma_to_a(config.magnitude_clamp),
        })
    }
}

/// Sauter `L31` polynomial at effective trapped fraction `x`.
fn l31_polynomial<'tape>(x: Var<'tape>, z: f64) -> Var<'tape> {
    x * ((1.0 + 1.4 / (z + 1.0)))
        - x.powi(2) * (1.9 / (z + 1.0))
        + x.powi(3) * (0.3 / (z + 1.0))
        + x.powi(4) * (0.2 / (z + 1.0))
}

/// Sauter `L32` (electron-electron part) polynomial.
fn l32_polynomial<'tape>(x: Var<'tape>, z: f64) -> Var<'tape> {
    let first = (x - x.powi(4)) * ((0.05 + 0.62 * z) / (z * (1.0 + 0.44 * z)));
    let second =
        (x.powi(2) - x.powi(4) - (x.powi(3) - x.powi(4)) * 1.2) * (1.0 / (1.0 + 0.22 * z));
    let third = x.powi(4) * (1.2 / (1.0 + 0.5 * z));
    first + second + third
}

impl SourceModel for BootstrapCurrent {
    fn name(&self) -> &'static str {
        "bootstrap"
    }

    fn category(&self) -> SourceCategory {
        SourceCategory::Other
    }

    fn contribute<'tape>(
        &self,
        inputs: &SourceInputs<'_, 'tape>,
    ) -> Result<SourceContribution<'tape>> {
        let tape = inputs.tape;
        let fields = inputs.fields;
        let geometry = inputs.geometry;
        let z = inputs.composition.z_eff();

        // Geometry-only quantities enter as constants.
        let epsilon = geometry.inverse_aspect_ratio();
        let trapped = tape.constant(epsilon.mapv(|eps| 1.0 - (1.0 - eps).sqrt()));
        let sqrt_epsilon = tape.constant(epsilon.mapv(f64::sqrt));
        let eps_32 = tape.constant(epsilon.mapv(|eps| eps.powf(1.5).max(1e-9)));
        let q = tape.constant(inputs.safety_factor.clone());

        // Electron collisionality at the evolving state.
        let ln_lambda = coulomb_log_ei_var(fields.ne, fields.te);
        let nu_star = q
            * fields.ne
            * ln_lambda
            * (NU_STAR_PREFACTOR * geometry.major_radius() * z)
            / (fields.te.powi(2) * eps_32);

        // Effective trapped fraction degraded by collisionality.
        let x = trapped
            / (1.0
                + (1.0 - trapped * 0.1) * nu_star.maximum(0.0).sqrt()
                + (1.0 - trapped) * nu_star * (0.5 / z));

        let l31 = l31_polynomial(x, z);
        let l32 = l32_polynomial(x, z);
        let l34 = l31;

        // Total pressure gradient in Pa/m.
        let pressure = fields.ne * (fields.ti + fields.te) * EV_TO_J;
        let grad_p = radial_gradient_var(pressure, geometry.mesh().dr());

        let c_bs = sqrt_epsilon * (l31 + (l32 + l34) * 0.5);
        let j_bs = -(c_bs * grad_p) * (1.0 / geometry.toroidal_field());
        let clamped = j_bs.clamp(-self.clamp_a_per_m2, self.clamp_a_per_m2);

        Ok(SourceContribution {
            s_j: Some(clamped * a_to_ma(1.0)),
            ..SourceContribution::default()
        })
    }

    fn metadata(
        &self,
        profiles: &CoreProfiles,
        geometry: &Geometry,
        composition: &PlasmaComposition,
    ) -> Result<SourceMetadata> {
        // Current drive carries no heating power.
        integrated_powers(self, profiles, geometry, composition)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use trident_common::{BoundariesConfig, InitialConfig};
    use trident_geometry::{CircularGeometryBuilder, safety_factor};
    use trident_tensor::Tape;
    use crate::FieldVars;

    fn bootstrap_profile(clamp_ma: f64) -> (ndarray::Array1<f64>, Geometry) {
        let geometry = CircularGeometryBuilder::new(40, 3.0, 1.0, 5.0).build().unwrap();
        let profiles = CoreProfiles::initial(
            &geometry,
            &InitialConfig::default(),
            &BoundariesConfig::default(),
        )
        .unwrap();
        let composition = PlasmaComposition::default();
        let model = BootstrapCurrent::new(&BootstrapConfig {
            enabled: true,
            magnitude_clamp: clamp_ma,
        })
        .unwrap();

        let tape = Tape::new();
        let fields = FieldVars::from_profiles(&tape, &profiles);
        let q = safety_factor(&geometry, profiles.psi()).unwrap();
        let inputs = SourceInputs {
            tape: &tape,
            fields: &fields,
            geometry: &geometry,
            composition: &composition,
            safety_factor: &q,
        };
        let contribution = model.contribute(&inputs).unwrap();
        (contribution.s_j.unwrap().value(), geometry)
    }

    #[test]
    fn peaked_pressure_drives_co_current_in_the_gradient_region() {
        let (j_bs, _) = bootstrap_profile(10.0);
        // ∇p < 0 on a peaked profile, so J_BS must be positive off-axis.
        let mid = j_bs.len() / 2;
        assert!(j_bs[mid] > 0.0, "J_BS(mid) = {}", j_bs[mid]);
        // Near the axis the gradient (and ε) vanish.
        assert!(j_bs[0].abs() < j_bs[mid].abs());
    }

    #[test]
    fn clamp_preserves_sign() {
        let (unclamped, _) = bootstrap_profile(100.0);
        let (clamped, _) = bootstrap_profile(1e-4);
        for i in 0..clamped.len() {
            assert!(clamped[i].abs() <= 1e-4 + 1e-15);
            if unclamped[i].abs() > 1e-4 {
                assert_eq!(
                    clamped[i].signum(),
                    unclamped[i].signum(),
                    "clamp must preserve the sign"
                );
            }
        }
    }

    #[test]
    fn non_positive_clamp_is_rejected() {
        assert!(
            BootstrapCurrent::new(&BootstrapConfig {
                enabled: true,
                magnitude_clamp: 0.0,
            })
            .is_err()
        );
    }
}
