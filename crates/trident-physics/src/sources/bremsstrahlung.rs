//! Bremsstrahlung radiation loss.

use trident_geometry::Geometry;

use crate::sources::{SourceInputs, SourceModel, integrated_powers};
use crate::{
    CoreProfiles, PlasmaComposition, Result, SourceCategory, SourceContribution, SourceMetadata,
};

/// Prefactor of `P_br = 1.69e-38·Z_eff·nₑ²·√Tₑ[eV]` **in \[W·m³·eV^{-1/2}\]**.
const BREMSSTRAHLUNG_PREFACTOR: f64 = 1.69e-38;

/// Free-free radiation `∝ nₑ²·Z_eff·√Tₑ`, booked as a negative electron
/// heating term.
#[derive(Debug, Clone)]
pub struct Bremsstrahlung;

impl SourceModel for Bremsstrahlung {
    fn name(&self) -> &'static str {
        "bremsstrahlung"
    }

    fn category(&self) -> SourceCategory {
        SourceCategory::Radiation
    }

    fn contribute<'tape>(
        &self,
        inputs: &SourceInputs<'_, 'tape>,
    ) -> Result<SourceContribution<'tape>> {
        let fields = inputs.fields;
        let z_eff = inputs.composition.z_eff();
        let radiated =
            fields.ne.powi(2) * fields.te.maximum(0.0).sqrt() * (BREMSSTRAHLUNG_PREFACTOR * z_eff);
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

#[cfg(test)]
mod test {
    use super::*;
    use ndarray::Array1;
    use trident_geometry::CircularGeometryBuilder;

    #[test]
    fn radiates_the_literature_magnitude() {
        // nₑ = 1e20 m⁻³, Tₑ = 10 keV, Z_eff = 1 → ≈0.017 MW/m³.
        let geometry = CircularGeometryBuilder::new(10, 3.0, 1.0, 5.0).build().unwrap();
        let profiles = CoreProfiles::new(
            Array1::from_elem(10, 10e3),
            Array1::from_elem(10, 10e3),
            Array1::from_elem(10, 1e20),
            Array1::from_shape_fn(10, |i| 0.1 * (i as f64 + 0.5).powi(2)),
        )
        .unwrap();
        let composition = PlasmaComposition::from_config(&trident_common::CompositionConfig {
            z_eff: 1.0,
            ..trident_common::CompositionConfig::default()
        })
        .unwrap();
        let entry = Bremsstrahlung
            .metadata(&profiles, &geometry, &composition)
            .unwrap();

        assert!(entry.electron_power < 0.0, "bremsstrahlung must cool electrons");
        assert!(entry.radiation_power > 0.0);
        let density = entry.radiation_power / geometry.total_volume();
        assert!(
            (1e4..3e4).contains(&density),
            "P_br = {density} W/m³ is off the expected magnitude"
        );
    }
}
