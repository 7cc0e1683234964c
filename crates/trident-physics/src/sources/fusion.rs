//! D-T fusion heating with the Bosch–Hale reactivity parameterization and
//! the alpha slowing-down power split.

use trident_geometry::Geometry;
use trident_tensor::Var;

use crate::sources::{SourceInputs, SourceModel, integrated_powers};
use crate::{
    CoreProfiles, PhysicsError, PlasmaComposition, Result, SourceCategory, SourceContribution,
    SourceMetadata,
};

// Bosch–Hale 1992 D-T parameterization, valid for Tᵢ in [0.2, 1000] keV.
/// Gamow constant `B_G` **in \[√keV\]**.
const BOSCH_HALE_BG: f64 = 34.3827;
/// Reduced mass energy `m_r c²` **in \[keV\]**.
const BOSCH_HALE_MRC2: f64 = 1.124_656e6;
/// Fit coefficient C1.
const C1: f64 = 1.173_02e-9;
/// Fit coefficient C2.
const C2: f64 = 1.513_61e-2;
/// Fit coefficient C3.
const C3: f64 = 7.518_86e-2;
/// Fit coefficient C4.
const C4: f64 = 4.606_43e-3;
/// Fit coefficient C5.
const C5: f64 = 1.35e-2;
/// Fit coefficient C6.
const C6: f64 = -1.0675e-4;
/// Fit coefficient C7.
const C7: f64 = 1.366e-5;

/// Validity window of the fit **in \[keV\]**.
const TI_MIN_KEV: f64 = 0.2;
/// Validity window of the fit **in \[keV\]**.
const TI_MAX_KEV: f64 = 1000.0;

/// Energy per D-T reaction **in \[J\]** (17.6 MeV).
const E_FUSION_J: f64 = 17.6e6 * 1.602_176_634e-19;
/// Alpha share of the reaction energy (3.5 MeV / 17.6 MeV).
const ALPHA_FRACTION: f64 = 0.2;
/// Alpha birth energy **in \[keV\]**.
const E_ALPHA_KEV: f64 = 3.5e3;

/// Clamp range of the alpha-to-ion heating fraction.
const ION_FRACTION_MIN: f64 = 0.05;
/// Clamp range of the alpha-to-ion heating fraction.
const ION_FRACTION_MAX: f64 = 0.5;

/// D-T reactivity `⟨σv⟩(Tᵢ)` **in \[m³/s\]**, `ti` **in \[eV\]**.
///
/// Monotone increasing up to ≈70 keV and bounded below 1e-21 m³/s.
pub fn reactivity(ti: f64) -> f64 {
    let t = (ti * 1e-3).clamp(TI_MIN_KEV, TI_MAX_KEV);
    let numerator = t * (C2 + t * (C4 + t * C6));
    let denominator = 1.0 + t * (C3 + t * (C5 + t * C7));
    let theta = t / (1.0 - numerator / denominator);
    let xi = (BOSCH_HALE_BG * BOSCH_HALE_BG / (4.0 * theta)).powf(1.0 / 3.0);
    let sigma_v_cm3 =
        C1 * theta * (xi / (BOSCH_HALE_MRC2 * t.powi(3))).sqrt() * (-3.0 * xi).exp();
    sigma_v_cm3 * 1e-6
}

/// Tape-variable variant of [`reactivity`], used inside the residual.
pub fn reactivity_var(ti: Var<'_>) -> Var<'_> {
    let t = (ti * 1e-3).clamp(TI_MIN_KEV, TI_MAX_KEV);
    let numerator = t * (C2 + t * (C4 + t * C6));
    let denominator = 1.0 + t * (C3 + t * (C5 + t * C7));
    let theta = t / (1.0 - numerator / denominator);
    let xi = ((BOSCH_HALE_BG * BOSCH_HALE_BG / 4.0) / theta).powf(1.0 / 3.0);
    let sigma_v_cm3 =
        C1 * theta * (xi / (t.powi(3) * BOSCH_HALE_MRC2)).sqrt() * (xi * -3.0).exp();
    sigma_v_cm3 * 1e-6
}

/// D-T fusion alpha heating.
#[derive(Debug, Clone)]
pub struct FusionPower {
    /// Deuterium fraction of the fuel mix.
    deuterium_fraction: f64,
    /// Tritium fraction of the fuel mix.
    tritium_fraction: f64,
}

impl FusionPower {
    /// Creates the model, rejecting unphysical fuel mixes.
    pub fn new(deuterium_fraction: f64, tritium_fraction: f64) -> Result<Self> {
        let sum = deuterium_fraction + tritium_fraction;
        if deuterium_fraction < 0.0 || tritium_fraction < 0.0 {
            return Err(PhysicsError::InvalidParameter {
                model: "fusion",
                name: "fuel fractions",
                reason: "must be non-negative".into(),
            });
        }
        if sum <= 0.0 || sum > 1.0 + 1e-12 {
            return Err(PhysicsError::InvalidParameter {
                model: "fusion",
                name: "fuel fractions",
                reason: format!("must sum into (0, 1], got {sum}"),
            });
        }
        Ok(Self {
            deuterium_fraction,
            tritium_fraction,
        })
    }

    /// Alpha-to-ion heating fraction from the slowing-down critical energy
    /// `E_c ≈ 18·Tₑ[keV]`, clamped to `[0.05, 0.5]`.
    fn ion_fraction<'tape>(te: Var<'tape>) -> Var<'tape> {
        let e_c = te * 1e-3 * 18.0;
        let fraction = e_c / (e_c + E_ALPHA_KEV / 5.0);
        fraction.clamp(ION_FRACTION_MIN, ION_FRACTION_MAX)
    }
}

impl SourceModel for FusionPower {
    fn name(&self) -> &'static str {
        "fusion"
    }

    fn category(&self) -> SourceCategory {
        SourceCategory::Fusion
    }

    fn contribute<'tape>(
        &self,
        inputs: &SourceInputs<'_, 'tape>,
    ) -> Result<SourceContribution<'tape>> {
        let dilution = inputs.composition.dilution();
        let n_d = inputs.fields.ne * (self.deuterium_fraction * dilution);
        let n_t = inputs.fields.ne * (self.tritium_fraction * dilution);
        let sigma_v = reactivity_var(inputs.fields.ti);

        // Volumetric fusion power in W/m³; only the alpha share stays in
        // the plasma (neutrons leave).
        let p_fusion = n_d * n_t * sigma_v * E_FUSION_J;
        let p_alpha = p_fusion * ALPHA_FRACTION;

        let f_ion = Self::ion_fraction(inputs.fields.te);
        let q_i = f_ion * p_alpha * 1e-6;
        let q_e = (1.0 - f_ion) * p_alpha * 1e-6;

        Ok(SourceContribution {
            q_i: Some(q_i),
            q_e: Some(q_e),
            ..SourceContribution::default()
        })
    }

    fn metadata(
        &self,
        profiles: &CoreProfiles,
        geometry: &Geometry,
        composition: &PlasmaComposition,
    ) -> Result<SourceMetadata> {
        let mut entry = integrated_powers(self, profiles, geometry, composition)?;
        // q_i + q_e integrate to the alpha power; the total fusion power
        // includes the neutrons.
        entry.alpha_power = entry.ion_power + entry.electron_power;
        entry.fusion_power = entry.alpha_power / ALPHA_FRACTION;
        Ok(entry)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use trident_common::{BoundariesConfig, InitialConfig};
    use trident_geometry::CircularGeometryBuilder;
    use trident_tensor::Tape;

    #[test]
    fn reactivity_has_the_literature_magnitude() {
        // ⟨σv⟩ at 10 keV is ≈1.1e-22 m³/s, at 20 keV ≈4.2e-22 m³/s.
        let at_10 = reactivity(10e3);
        let at_20 = reactivity(20e3);
        assert!((0.8e-22..1.5e-22).contains(&at_10), "⟨σv⟩(10 keV) = {at_10}");
        assert!((3.5e-22..5.0e-22).contains(&at_20), "⟨σv⟩(20 keV) = {at_20}");
    }

    #[test]
    fn reactivity_is_monotone_and_bounded_on_the_burn_range() {
        let mut previous = 0.0;
        let mut ti = 0.2e3;
        while ti <= 70e3 {
            let value = reactivity(ti);
            assert!(value > previous, "⟨σv⟩ must increase on [0.2, 70] keV");
            assert!(value < 1e-21, "⟨σv⟩ must stay bounded");
            previous = value;
            ti += 0.5e3;
        }
    }

    #[test]
    fn var_reactivity_matches_scalar() {
        let tape = Tape::new();
        let ti = tape.leaf(ndarray::arr1(&[15e3, 30e3]));
        let value = reactivity_var(ti).value();
        assert_relative_eq!(value[0], reactivity(15e3), max_relative = 1e-12);
        assert_relative_eq!(value[1], reactivity(30e3), max_relative = 1e-12);
    }

    #[test]
    fn zero_fuel_mix_is_rejected() {
        assert!(FusionPower::new(0.0, 0.0).is_err());
        assert!(FusionPower::new(-0.1, 0.5).is_err());
        assert!(FusionPower::new(0.5, 0.5).is_ok());
    }

    #[test]
    fn alpha_power_is_one_fifth_of_fusion_power() {
        let geometry = CircularGeometryBuilder::new(25, 6.2, 2.0, 5.3).build().unwrap();
        let initial = InitialConfig {
            ion_temperature: 15e3,
            electron_temperature: 15e3,
            density: 1.5e20,
            ..InitialConfig::default()
        };
        let profiles =
            CoreProfiles::initial(&geometry, &initial, &BoundariesConfig::default()).unwrap();
        let model = FusionPower::new(0.5, 0.5).unwrap();
        let entry = model
            .metadata(&profiles, &geometry, &PlasmaComposition::default())
            .unwrap();

        assert!(entry.fusion_power > 0.0);
        assert_relative_eq!(entry.alpha_power, 0.2 * entry.fusion_power, max_relative = 1e-9);
        // The split must land inside the clamp window.
        let ion_share = entry.ion_power / entry.alpha_power;
        assert!((ION_FRACTION_MIN..=ION_FRACTION_MAX).contains(&ion_share));
    }
}
