//! Ohmic heating and neoclassical Spitzer resistivity.

use ndarray::Array1;

use trident_geometry::Geometry;
use trident_tensor::{Tape, Var};

use crate::calculus::current_density_var;
use crate::sources::{SourceInputs, SourceModel, integrated_powers};
use crate::{
    CoreProfiles, FieldVars, PlasmaComposition, Result, SourceCategory, SourceContribution,
    SourceMetadata, coulomb_log_ei_var,
};

/// Spitzer prefactor of `η = 5.2e-5·Z_eff·lnΛ/Tₑ^{3/2}` **in \[Ω·m·eV^{3/2}\]**.
const SPITZER_PREFACTOR: f64 = 5.2e-5;

/// Tape-variable parallel resistivity with the neoclassical correction
/// `(1 + 1.46·√ε)` **in \[Ω·m\]**.
pub fn spitzer_resistivity_var<'tape>(
    tape: &'tape Tape,
    fields: &FieldVars<'tape>,
    geometry: &Geometry,
    composition: &PlasmaComposition,
) -> Var<'tape> {
    let ln_lambda = coulomb_log_ei_var(fields.ne, fields.te);
    let spitzer = SPITZER_PREFACTOR * composition.z_eff() * ln_lambda / fields.te.powf(1.5);
    let neoclassical = tape.constant(
        geometry
            .inverse_aspect_ratio()
            .mapv(|eps| 1.0 + 1.46 * eps.sqrt()),
    );
    spitzer * neoclassical
}

/// Materialized resistivity at a committed state **in \[Ω·m\]**.
pub fn spitzer_resistivity(
    profiles: &CoreProfiles,
    geometry: &Geometry,
    composition: &PlasmaComposition,
) -> Array1<f64> {
    let tape = Tape::new();
    let fields = FieldVars::from_profiles(&tape, profiles);
    spitzer_resistivity_var(&tape, &fields, geometry, composition).value()
}

/// Ohmic dissipation `Q_e = η·j²`, with `j` recomputed from the evolving
/// flux. Couples to the ψ equation through the resistivity.
#[derive(Debug, Clone)]
pub struct OhmicHeating;

impl SourceModel for OhmicHeating {
    fn name(&self) -> &'static str {
        "ohmic"
    }

    fn category(&self) -> SourceCategory {
        SourceCategory::Ohmic
    }

    fn contribute<'tape>(
        &self,
        inputs: &SourceInputs<'_, 'tape>,
    ) -> Result<SourceContribution<'tape>> {
        let eta = spitzer_resistivity_var(
            inputs.tape,
            inputs.fields,
            inputs.geometry,
            inputs.composition,
        );
        let j = current_density_var(inputs.tape, inputs.geometry, inputs.fields.psi);
        // η·j² is W/m³; the ledger and the equations carry MW/m³.
        let q_e = eta * j.powi(2) * 1e-6;
        Ok(SourceContribution {
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
        entry.ohmic_power = entry.electron_power;
        Ok(entry)
    }
}
