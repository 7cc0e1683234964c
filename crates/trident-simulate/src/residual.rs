//! The θ-method finite-volume residual over the flattened scaled state.
//!
//! One [`ResidualContext`] is prepared per attempted step. It owns
//! everything the residual needs (geometry, frozen transport coefficients,
//! the source composite, boundary constraints, the old state and its
//! explicit flux divergence), so the Newton solver sees a plain function
//! of the scaled state vector. Sources and state-dependent coefficients
//! are rebuilt from tape variables at every evaluation, which is what
//! carries the implicit coupling between the four equations.

use ndarray::{Array1, Array2, s};

use trident_common::EvolutionConfig;
use trident_common::consts::MIN_SCALE;
use trident_geometry::{Geometry, safety_factor};
use trident_physics::sources::{CompositeSource, SourceInputs, spitzer_resistivity_var};
use trident_physics::transport::TransportCoefficients;
use trident_physics::{
    BoundaryCondition, BoundaryConditions, CoreProfiles, FieldBoundary, FieldVars, FlattenedState,
    ScalingReference,
};
use trident_tensor::{Tape, Var, concat};

use crate::Result;
use crate::coeffs::{Block1DCoeffs, CoeffInputs, EquationCoeffs, build_block_coeffs};
use crate::face::power_law_face_value_var;

/// Everything one step's residual evaluations need.
pub(crate) struct ResidualContext<'sim> {
    /// Device geometry.
    geometry: &'sim Geometry,
    /// Transport coefficients, frozen at the committed state.
    transport: TransportCoefficients,
    /// Source composite.
    sources: &'sim CompositeSource,
    /// Plasma composition.
    composition: &'sim trident_physics::PlasmaComposition,
    /// Boundary constraints.
    bcs: &'sim BoundaryConditions,
    /// Per-field evolve flags.
    evolution: EvolutionConfig,
    /// State scaling.
    scaling: &'sim ScalingReference,
    /// Time-discretization blend.
    theta: f64,
    /// Whether the ohmic model supplies a resistivity.
    ohmic_active: bool,
    /// Attempted step size **in \[s\]**.
    dt: f64,
    /// Safety factor at the committed state (frozen).
    q_cell: Array1<f64>,
    /// Committed state, physical units.
    old_state: FlattenedState,
    /// Committed state, scaled units.
    old_scaled: Array1<f64>,
    /// Explicit flux divergence per equation at the committed state;
    /// `None` for fully implicit stepping (θ = 1).
    old_flux_divergence: Option<[Array1<f64>; 4]>,
}

impl<'sim> ResidualContext<'sim> {
    /// Prepares a step context at the committed `profiles` with step `dt`.
    #[expect(clippy::too_many_arguments, reason = "one-shot internal constructor")]
    pub(crate) fn prepare(
        geometry: &'sim Geometry,
        transport: TransportCoefficients,
        sources: &'sim CompositeSource,
        composition: &'sim trident_physics::PlasmaComposition,
        bcs: &'sim BoundaryConditions,
        evolution: EvolutionConfig,
        scaling: &'sim ScalingReference,
        theta: f64,
        ohmic_active: bool,
        profiles: &CoreProfiles,
        dt: f64,
    ) -> Result<Self> {
        let q_cell = safety_factor(geometry, profiles.psi())?;
        let old_state = FlattenedState::from_profiles(profiles);
        let old_scaled = old_state.scaled(scaling);

        let mut context = Self {
            geometry,
            transport,
            sources,
            composition,
            bcs,
            evolution,
            scaling,
            theta,
            ohmic_active,
            dt,
            q_cell,
            old_state,
            old_scaled,
            old_flux_divergence: None,
        };

        if theta < 1.0 {
            let explicit = context.explicit_divergence()?;
            context.old_flux_divergence = Some(explicit);
        }
        Ok(context)
    }

    /// The committed state in scaled coordinates (the Newton start vector).
    pub(crate) fn old_scaled(&self) -> &Array1<f64> {
        &self.old_scaled
    }

    /// Number of cells.
    fn n_cells(&self) -> usize {
        self.old_state.n_cells()
    }

    /// Evaluates the scaled residual at a scaled state.
    pub(crate) fn residual(&self, x_scaled: &Array1<f64>) -> Result<Array1<f64>> {
        let tape = Tape::new();
        let input = tape.leaf(x_scaled.clone());
        let output = self.residual_var(&tape, input)?;
        Ok(output.value())
    }

    /// Evaluates the residual and assembles its Jacobian in one recorded
    /// pass (VJP column sweeps over the same tape).
    pub(crate) fn residual_and_jacobian(
        &self,
        x_scaled: &Array1<f64>,
    ) -> Result<(Array1<f64>, Array2<f64>)> {
        let tape = Tape::new();
        let input = tape.leaf(x_scaled.clone());
        let output = self.residual_var(&tape, input)?;
        let residual = output.value();
        let jacobian = tape.jacobian_of(output, input);
        Ok((residual, jacobian))
    }

    /// Records the residual on `tape`.
    fn residual_var<'tape>(&self, tape: &'tape Tape, x_scaled: Var<'tape>) -> Result<Var<'tape>> {
        let n = self.n_cells();
        let x_phys = self.scaling.unscale_var(tape, x_scaled);
        let fields = FieldVars::from_flat(x_phys, n);

        let coeffs = self.block_coeffs(tape, &fields)?;

        let reference = self.scaling.values();
        let old = self.old_state.values();

        let mut pieces = Vec::with_capacity(4);
        let field_vars = [fields.ti, fields.te, fields.ne, fields.psi];
        let equation_coeffs = [coeffs.ti, coeffs.te, coeffs.ne, coeffs.psi];
        let boundaries = [self.bcs.ti, self.bcs.te, self.bcs.ne, self.bcs.psi];
        let evolve = self.evolve_flags();

        for (index, (((f_new, eq), boundary), evolved)) in field_vars
            .into_iter()
            .zip(equation_coeffs)
            .zip(boundaries)
            .zip(evolve)
            .enumerate()
        {
            let range = s![index * n..(index + 1) * n];
            let f_old = old.slice(range).to_owned();
            let scale = reference[index * n] + MIN_SCALE;

            let piece = if evolved {
                self.equation_residual(
                    tape,
                    f_new,
                    &f_old,
                    &eq,
                    boundary,
                    scale,
                    self.old_flux_divergence.as_ref().map(|ops| &ops[index]),
                )
            } else {
                // Identity rows hold non-evolved fields at their values.
                let old_scaled_piece =
                    tape.constant(self.old_scaled.slice(range).to_owned());
                x_scaled.slice(index * n..(index + 1) * n) - old_scaled_piece
            };
            pieces.push(piece);
        }

        Ok(concat(&pieces))
    }

    /// Per-field evolve flags in state order.
    fn evolve_flags(&self) -> [bool; 4] {
        [
            self.evolution.ion_heat,
            self.evolution.electron_heat,
            self.evolution.density,
            self.evolution.current,
        ]
    }

    /// Builds the block coefficients at the evaluation state.
    fn block_coeffs<'tape>(
        &self,
        tape: &'tape Tape,
        fields: &FieldVars<'tape>,
    ) -> Result<Block1DCoeffs<'tape>> {
        let inputs = SourceInputs {
            tape,
            fields,
            geometry: self.geometry,
            composition: self.composition,
            safety_factor: &self.q_cell,
        };
        let contribution = self.sources.contribute(&inputs)?;
        let resistivity = if self.ohmic_active {
            Some(spitzer_resistivity_var(
                tape,
                fields,
                self.geometry,
                self.composition,
            ))
        } else {
            None
        };
        Ok(build_block_coeffs(&CoeffInputs {
            tape,
            fields,
            transport: &self.transport,
            contribution,
            resistivity,
            geometry: self.geometry,
        }))
    }

    /// One equation's scaled residual:
    /// `Δf/r + dt/(V·tc·r)·[θ·divF_new + (1−θ)·divF_old − V·(src + mat·f)]`.
    fn equation_residual<'tape>(
        &self,
        tape: &'tape Tape,
        f_new: Var<'tape>,
        f_old: &Array1<f64>,
        coeffs: &EquationCoeffs<'tape>,
        boundary: FieldBoundary,
        scale: f64,
        old_divergence: Option<&Array1<f64>>,
    ) -> Var<'tape> {
        let n = self.n_cells();
        let volumes = tape.constant(self.geometry.volumes().clone());
        let f_old_var = tape.constant(f_old.clone());

        let flux = self.face_fluxes(tape, f_new, coeffs, boundary);
        let divergence = flux.slice(1..n + 1) - flux.slice(0..n);

        // The flux divergence is θ-blended; the source stays implicit.
        let source = volumes * (coeffs.source_cell + coeffs.source_mat_cell * f_new);
        let blended_divergence = match old_divergence {
            Some(old) => {
                let old_var = tape.constant(old.clone());
                divergence * self.theta + old_var * (1.0 - self.theta)
            }
            None => divergence,
        };
        let spatial = blended_divergence - source;

        let time_term = (f_new - f_old_var) * (1.0 / scale);
        let weight = self.dt / scale;
        let capacity = volumes * coeffs.transient_coeff;
        time_term + spatial * weight / capacity
    }

    /// Conservative face fluxes of one equation (`nFaces` entries).
    fn face_fluxes<'tape>(
        &self,
        tape: &'tape Tape,
        f: Var<'tape>,
        coeffs: &EquationCoeffs<'tape>,
        boundary: FieldBoundary,
    ) -> Var<'tape> {
        let n = self.n_cells();
        let dr = self.geometry.mesh().dr();
        let areas = tape.constant(self.geometry.face_areas().clone());
        let half_cell = dr / 2.0;

        // Interior faces 1..n.
        let gradient = (f.slice(1..n) - f.slice(0..n - 1)) * (1.0 / dr);
        let d_interior = coeffs.d_face.slice(1..n);
        let v_interior = coeffs.v_face.slice(1..n);
        let transported = power_law_face_value_var(f, v_interior, d_interior, dr);
        let interior =
            areas.slice(1..n) * (-(d_interior * gradient) + v_interior * transported);

        // Boundary faces replace the flux by the constrained form.
        let left = {
            let area = areas.slice(0..1);
            let d = coeffs.d_face.slice(0..1);
            let v = coeffs.v_face.slice(0..1);
            match boundary.left {
                BoundaryCondition::Gradient(g) => area * (d * (-g) + v * f.slice(0..1)),
                BoundaryCondition::Value(value) => {
                    let gradient = (f.slice(0..1) - value) * (1.0 / half_cell);
                    area * (-(d * gradient) + v * value)
                }
            }
        };
        let right = {
            let area = areas.slice(n..n + 1);
            let d = coeffs.d_face.slice(n..n + 1);
            let v = coeffs.v_face.slice(n..n + 1);
            match boundary.right {
                BoundaryCondition::Gradient(g) => {
                    area * (d * (-g) + v * f.slice(n - 1..n))
                }
                BoundaryCondition::Value(value) => {
                    let gradient = (value - f.slice(n - 1..n)) * (1.0 / half_cell);
                    area * (-(d * gradient) + v * value)
                }
            }
        };

        concat(&[left, interior, right])
    }

    /// Flux divergences of all four equations at the committed state,
    /// materialized (used for the explicit θ part).
    fn explicit_divergence(&self) -> Result<[Array1<f64>; 4]> {
        let n = self.n_cells();
        let tape = Tape::new();
        let input = tape.leaf(self.old_scaled.clone());
        let x_phys = self.scaling.unscale_var(&tape, input);
        let fields = FieldVars::from_flat(x_phys, n);
        let coeffs = self.block_coeffs(&tape, &fields)?;

        let divergence = |f: Var<'_>, eq: &EquationCoeffs<'_>, boundary: FieldBoundary| {
            let flux = self.face_fluxes(&tape, f, eq, boundary);
            (flux.slice(1..n + 1) - flux.slice(0..n)).value()
        };

        Ok([
            divergence(fields.ti, &coeffs.ti, self.bcs.ti),
            divergence(fields.te, &coeffs.te, self.bcs.te),
            divergence(fields.ne, &coeffs.ne, self.bcs.ne),
            divergence(fields.psi, &coeffs.psi, self.bcs.psi),
        ])
    }
}
