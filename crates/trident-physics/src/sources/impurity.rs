//! Impurity line radiation with a coronal-fit species table.

use trident_common::ImpuritySpecies;
use trident_geometry::Geometry;

use crate::sources::{SourceInputs, SourceModel, integrated_powers};
use crate::{
    CoreProfiles, PhysicsError, PlasmaComposition, Result, SourceCategory, SourceContribution,
    SourceMetadata,
};

/// One coronal-fit entry: `L_z(Tₑ) = c_z·(Tₑ[keV])^{α_z}` **in \[W·m³\]**.
struct CoolingFit {
    /// Charge number.
    z: f64,
    /// Cooling factor at 1 keV **in \[W·m³\]**.
    coeff: f64,
    /// Temperature exponent.
    exponent: f64,
}

/// Species table. Low-Z radiators burn through with temperature; tungsten
/// stays strong across the core range.
fn cooling_fit(species: ImpuritySpecies) -> CoolingFit {
    match species {
        ImpuritySpecies::Carbon => CoolingFit { z: 6.0, coeff: 4.0e-34, exponent: -0.7 },
        ImpuritySpecies::Oxygen => CoolingFit { z: 8.0, coeff: 8.0e-34, exponent: -0.6 },
        ImpuritySpecies::Neon => CoolingFit { z: 10.0, coeff: 1.6e-33, exponent: -0.5 },
        ImpuritySpecies::Argon => CoolingFit { z: 18.0, coeff: 8.0e-33, exponent: -0.3 },
        ImpuritySpecies::Iron => CoolingFit { z: 26.0, coeff: 4.0e-32, exponent: -0.2 },
        ImpuritySpecies::Tungsten => CoolingFit { z: 74.0, coeff: 2.0e-31, exponent: 0.1 },
    }
}

/// Line radiation `P = nₑ·n_z·L_z(Tₑ)`, with `n_z` a fixed fraction of the
/// electron density.
#[derive(Debug, Clone)]
pub struct ImpurityRadiation {
    /// Radiating species.
    species: ImpuritySpecies,
    /// Impurity density as a fraction of `nₑ`.
    fraction: f64,
}

impl ImpurityRadiation {
    /// Creates the model, rejecting unphysical impurity fractions.
    pub fn new(species: ImpuritySpecies, fraction: f64) -> Result<Self> {
        if !(0.0..=0.1).contains(&fraction) {
            return Err(PhysicsError::InvalidParameter {
                model: "impurity radiation",
                name: "fraction",
                reason: format!("must lie in [0, 0.1], got {fraction}"),
            });
        }
        Ok(Self { species, fraction })
    }

    /// Charge number of the configured species.
    pub fn charge(&self) -> f64 {
        cooling_fit(self.species).z
    }
}

impl SourceModel for ImpurityRadiation {
    fn name(&self) -> &'static str {
        "impurity radiation"
    }

    fn category(&self) -> SourceCategory {
        SourceCategory::Radiation
    }

    fn contribute<'tape>(
        &self,
        inputs: &SourceInputs<'_, 'tape>,
    ) -> Result<SourceContribution<'tape>> {
        let fit = cooling_fit(self.species);
        let te_kev = (inputs.fields.te * 1e-3).maximum(1e-2);
        let cooling = te_kev.powf(fit.exponent) * fit.coeff;
        let radiated = inputs.fields.ne.powi(2) * cooling * self.fraction;
        Ok(SourceContribution {
            q_e: Some(-radiated * 1e-6),
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
        entry.radiation_power = -entry.electron_power;
        Ok(entry)
    }
}
