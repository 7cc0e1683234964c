//! Classical ion–electron collisional energy exchange.

use trident_common::consts::{ELECTRON_MASS, EV_TO_J};
use trident_geometry::Geometry;

use crate::sources::{SourceInputs, SourceModel, integrated_powers};
use crate::{
    CoreProfiles, PlasmaComposition, Result, SourceCategory, SourceContribution, SourceMetadata,
    coulomb_log_ei_var,
};

/// Electron collision-time prefactor `τ_e = 3.44e11·Tₑ^{3/2}/(nₑ·lnΛ)` with
/// `Tₑ` **in \[eV\]** and `nₑ` **in \[m⁻³\]**.
const TAU_E_PREFACTOR: f64 = 3.44e11;

/// Collisional temperature equilibration `Q_ie ∝ (mₑ/mᵢ)·nₑ·(Tₑ − Tᵢ)/τ_e`.
///
/// The ledger entry is conservative by construction: the electron channel
/// loses exactly what the ion channel gains.
#[derive(Debug, Clone)]
pub struct IonElectronExchange;

impl SourceModel for IonElectronExchange {
    fn name(&self) -> &'static str {
        "ion-electron exchange"
    }

    fn category(&self) -> SourceCategory {
        SourceCategory::Exchange
    }

    fn contribute<'tape>(
        &self,
        inputs: &SourceInputs<'_, 'tape>,
    ) -> Result<SourceContribution<'tape>> {
        let fields = inputs.fields;
        let mass_ratio = ELECTRON_MASS / inputs.composition.main_ion_mass();

        let ln_lambda = coulomb_log_ei_var(fields.ne, fields.te);
        let tau_e = TAU_E_PREFACTOR * fields.te.powf(1.5) / (fields.ne * ln_lambda);

        // W/m³, positive when the electrons are hotter.
        let q_ie = (fields.ne * (fields.te - fields.ti) * (3.0 * mass_ratio * EV_TO_J)) / tau_e;

        Ok(SourceContribution {
            q_i: Some(q_ie * 1e-6),
            q_e: Some(-q_ie * 1e-6),
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
