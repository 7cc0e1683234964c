//! Per-equation finite-volume coefficients assembled from physics outputs.
//!
//! | field | `d_face`            | `v_face`     | `source_cell`      | transient |
//! |-------|---------------------|--------------|--------------------|-----------|
//! | `Tᵢ`  | `(nₑ·χᵢ)` harmonic  | 0            | `Qᵢ` in eV/(m³·s)  | `nₑ`      |
//! | `Tₑ`  | `(nₑ·χₑ)` harmonic  | 0            | `Qₑ` in eV/(m³·s)  | `nₑ`      |
//! | `nₑ`  | `D` harmonic        | `V` arithm.  | `Sₙ`               | 1         |
//! | `ψ`   | `η/μ0` harmonic     | 0            | `η·R0·j` in Wb/s   | 1         |
//!
//! Heating sources arrive in MW/m³ and pass through the single MW →
//! eV/(m³·s) bridge before entering the temperature equations. The current
//! source arrives in MA/m² (the canonical unit) and is converted to A/m²
//! here. The density floor is applied inside this builder so that the
//! temperature equations never divide by a vanishing transient
//! coefficient.

use ndarray::Array1;

use trident_common::consts::{
    DENSITY_FLOOR, MAX_CURRENT_SOURCE_MA_PER_M2, MAX_HEATING_MW_PER_M3, MAX_PARTICLE_SOURCE,
    MU_0, MW_PER_M3_TO_EV_PER_M3_S,
};
use trident_common::units::ma_to_a;
use trident_geometry::Geometry;
use trident_physics::transport::TransportCoefficients;
use trident_physics::{FieldVars, SourceContribution};
use trident_tensor::{Tape, Var};

use crate::face::{arithmetic_face_var, harmonic_face_var};

/// Coefficients of one evolved equation.
#[derive(Debug, Clone, Copy)]
pub struct EquationCoeffs<'tape> {
    /// Face diffusivity (`nFaces` entries).
    pub d_face: Var<'tape>,
    /// Face convection velocity (`nFaces` entries).
    pub v_face: Var<'tape>,
    /// Explicit source on cells, in field-units per second.
    pub source_cell: Var<'tape>,
    /// Implicit linear source coefficient on cells **in \[1/s\]**.
    pub source_mat_cell: Var<'tape>,
    /// Multiplier on `∂·/∂t` on cells.
    pub transient_coeff: Var<'tape>,
}

/// One [`EquationCoeffs`] per evolved field.
#[derive(Debug, Clone, Copy)]
pub struct Block1DCoeffs<'tape> {
    /// Ion temperature equation.
    pub ti: EquationCoeffs<'tape>,
    /// Electron temperature equation.
    pub te: EquationCoeffs<'tape>,
    /// Electron density equation.
    pub ne: EquationCoeffs<'tape>,
    /// Poloidal flux equation.
    pub psi: EquationCoeffs<'tape>,
}

/// Everything the builder reads.
pub(crate) struct CoeffInputs<'ctx, 'tape> {
    /// The recording tape of the enclosing evaluation.
    pub tape: &'tape Tape,
    /// The four fields at the evaluation state.
    pub fields: &'ctx FieldVars<'tape>,
    /// Transport coefficients, frozen at the step's committed state.
    pub transport: &'ctx TransportCoefficients,
    /// Summed source contributions at the evaluation state.
    pub contribution: SourceContribution<'tape>,
    /// Parallel resistivity on cells, when the ohmic model is active.
    pub resistivity: Option<Var<'tape>>,
    /// Device geometry.
    pub geometry: &'ctx Geometry,
}

/// Unit-magnitude plausibility gate, active in debug builds only.
fn debug_gate(name: &'static str, var: Option<&Var<'_>>, limit: f64) {
    if cfg!(debug_assertions) {
        if let Some(value) = var {
            let max = value
                .value()
                .iter()
                .fold(0.0_f64, |acc, &entry| acc.max(entry.abs()));
            debug_assert!(
                max < limit,
                "{name} magnitude {max:.3e} exceeds the plausibility gate {limit:.3e}"
            );
        }
    }
}

/// Assembles the coupled block coefficients.
pub(crate) fn build_block_coeffs<'tape>(inputs: &CoeffInputs<'_, 'tape>) -> Block1DCoeffs<'tape> {
    let tape = inputs.tape;
    let geometry = inputs.geometry;
    let n = geometry.mesh().n_cells();

    debug_gate("q_i", inputs.contribution.q_i.as_ref(), MAX_HEATING_MW_PER_M3);
    debug_gate("q_e", inputs.contribution.q_e.as_ref(), MAX_HEATING_MW_PER_M3);
    debug_gate("s_n", inputs.contribution.s_n.as_ref(), MAX_PARTICLE_SOURCE);
    debug_gate("s_j", inputs.contribution.s_j.as_ref(), MAX_CURRENT_SOURCE_MA_PER_M2);

    let zero_cells = tape.constant(Array1::zeros(n));
    let zero_faces = tape.constant(Array1::zeros(n + 1));
    let unit_cells = tape.constant(Array1::ones(n));

    let ne_floored = inputs.fields.ne.maximum(DENSITY_FLOOR);

    // Temperature equations.
    let chi_i = tape.constant(inputs.transport.chi_i.clone());
    let chi_e = tape.constant(inputs.transport.chi_e.clone());
    let ti_coeffs = EquationCoeffs {
        d_face: harmonic_face_var(ne_floored * chi_i),
        v_face: zero_faces,
        source_cell: inputs
            .contribution
            .q_i
            .map_or(zero_cells, |q| q * MW_PER_M3_TO_EV_PER_M3_S),
        source_mat_cell: zero_cells,
        transient_coeff: ne_floored,
    };
    let te_coeffs = EquationCoeffs {
        d_face: harmonic_face_var(ne_floored * chi_e),
        v_face: zero_faces,
        source_cell: inputs
            .contribution
            .q_e
            .map_or(zero_cells, |q| q * MW_PER_M3_TO_EV_PER_M3_S),
        source_mat_cell: zero_cells,
        transient_coeff: ne_floored,
    };

    // Density equation.
    let particle_d = tape.constant(inputs.transport.d.clone());
    let particle_v = tape.constant(inputs.transport.v.clone());
    let ne_coeffs = EquationCoeffs {
        d_face: harmonic_face_var(particle_d),
        v_face: arithmetic_face_var(particle_v),
        source_cell: inputs.contribution.s_n.unwrap_or(zero_cells),
        source_mat_cell: zero_cells,
        transient_coeff: unit_cells,
    };

    // Flux equation: diffusivity η/μ0 and the non-inductive drive
    // η·R0·j_ni, with j_ni converted from the canonical MA/m².
    let psi_coeffs = match inputs.resistivity {
        Some(eta) => EquationCoeffs {
            d_face: harmonic_face_var(eta * (1.0 / MU_0)),
            v_face: zero_faces,
            source_cell: inputs.contribution.s_j.map_or(zero_cells, |s_j| {
                eta * s_j * (ma_to_a(1.0) * geometry.major_radius())
            }),
            source_mat_cell: zero_cells,
            transient_coeff: unit_cells,
        },
        None => EquationCoeffs {
            d_face: zero_faces,
            v_face: zero_faces,
            source_cell: zero_cells,
            source_mat_cell: zero_cells,
            transient_coeff: unit_cells,
        },
    };

    Block1DCoeffs {
        ti: ti_coeffs,
        te: te_coeffs,
        ne: ne_coeffs,
        psi: psi_coeffs,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use trident_common::{BoundariesConfig, InitialConfig};
    use trident_geometry::CircularGeometryBuilder;
    use trident_physics::transport::{ConstantTransport, TransportModel};
    use trident_physics::{CoreProfiles, PlasmaComposition};

    fn setup(n: usize) -> (Geometry, CoreProfiles, TransportCoefficients) {
        let geometry = CircularGeometryBuilder::new(n, 3.0, 1.0, 5.0).build().unwrap();
        let profiles = CoreProfiles::initial(
            &geometry,
            &InitialConfig::default(),
            &BoundariesConfig::default(),
        )
        .unwrap();
        let transport = ConstantTransport::new(1.0, 1.5, 0.5, -0.2)
            .unwrap()
            .coefficients(&profiles, &geometry)
            .unwrap();
        (geometry, profiles, transport)
    }

    #[test]
    fn shapes_and_unit_conversion() {
        let (geometry, profiles, transport) = setup(20);
        let tape = Tape::new();
        let fields = FieldVars::from_profiles(&tape, &profiles);
        let one_mw = tape.constant(Array1::from_elem(20, 1.0));
        let inputs = CoeffInputs {
            tape: &tape,
            fields: &fields,
            transport: &transport,
            contribution: SourceContribution {
                q_i: Some(one_mw),
                ..SourceContribution::default()
            },
            resistivity: None,
            geometry: &geometry,
        };
        let block = build_block_coeffs(&inputs);

        assert_eq!(block.ti.d_face.len(), 21);
        assert_eq!(block.ti.source_cell.len(), 20);
        assert_eq!(block.ne.v_face.len(), 21);

        // 1 MW/m³ becomes the canonical eV/(m³·s) rate.
        assert_relative_eq!(
            block.ti.source_cell.value()[5],
            MW_PER_M3_TO_EV_PER_M3_S,
            max_relative = 1e-12
        );
        // The temperature transient coefficient is the (floored) density.
        assert_relative_eq!(
            block.ti.transient_coeff.value()[0],
            profiles.ne()[0],
            max_relative = 1e-12
        );
        // The density transient coefficient is one.
        assert_relative_eq!(block.ne.transient_coeff.value()[7], 1.0);
    }

    #[test]
    fn density_floor_guards_the_transient_coefficient() {
        let (geometry, profiles, transport) = setup(10);
        let hollow = profiles
            .with_fields(None, None, Some(Array1::from_elem(10, 1e12)), None)
            .unwrap();
        let tape = Tape::new();
        let fields = FieldVars::from_profiles(&tape, &hollow);
        let inputs = CoeffInputs {
            tape: &tape,
            fields: &fields,
            transport: &transport,
            contribution: SourceContribution::default(),
            resistivity: None,
            geometry: &geometry,
        };
        let block = build_block_coeffs(&inputs);
        assert_relative_eq!(block.te.transient_coeff.value()[0], DENSITY_FLOOR);
    }

    #[test]
    fn resistivity_feeds_the_flux_equation() {
        let (geometry, profiles, transport) = setup(15);
        let composition = PlasmaComposition::default();
        let tape = Tape::new();
        let fields = FieldVars::from_profiles(&tape, &profiles);
        let eta = trident_physics::sources::spitzer_resistivity_var(
            &tape,
            &fields,
            &geometry,
            &composition,
        );
        let s_j = tape.constant(Array1::from_elem(15, 2.0)); // MA/m²
        let inputs = CoeffInputs {
            tape: &tape,
            fields: &fields,
            transport: &transport,
            contribution: SourceContribution {
                s_j: Some(s_j),
                ..SourceContribution::default()
            },
            resistivity: Some(eta),
            geometry: &geometry,
        };
        let block = build_block_coeffs(&inputs);

        let eta_value = eta.value();
        // d_face interior is the harmonic mean of η/μ0.
        let expected = 2.0 / (MU_0 / eta_value[4] + MU_0 / eta_value[5]);
        assert_relative_eq!(block.psi.d_face.value()[5], expected, max_relative = 1e-9);
        // Source is η·R0·j with j = 2 MA/m² = 2e6 A/m².
        assert_relative_eq!(
            block.psi.source_cell.value()[4],
            eta_value[4] * 3.0 * 2.0e6,
            max_relative = 1e-12
        );
    }
}
