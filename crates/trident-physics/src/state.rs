//! The flattened solver state, its scaling, and the tape-variable view.

use ndarray::{Array1, s};

use trident_common::consts::{DENSITY_SCALE, FLUX_SCALE, MIN_SCALE, TEMPERATURE_SCALE};
use trident_tensor::{Tape, Var};

use crate::CoreProfiles;
use crate::{PhysicsError, Result};

/// The flattened state vector `[Tᵢ; Tₑ; nₑ; ψ]` over `nCells`.
///
/// Layout: `Tᵢ` occupies `[0, n)`, `Tₑ` `[n, 2n)`, `nₑ` `[2n, 3n)` and `ψ`
/// `[3n, 4n)`. Construction validates the cross-profile shapes; a vector
/// whose length is not `4·nCells` never exists.
#[derive(Debug, Clone)]
pub struct FlattenedState {
    /// The packed values, in physical units.
    values: Array1<f64>,
    /// Number of cells per field.
    n_cells: usize,
}

impl FlattenedState {
    /// Packs profiles into a flattened state.
    pub fn from_profiles(profiles: &CoreProfiles) -> Self {
        let n = profiles.n_cells();
        let mut values = Array1::zeros(4 * n);
        values.slice_mut(s![0..n]).assign(profiles.ti());
        values.slice_mut(s![n..2 * n]).assign(profiles.te());
        values.slice_mut(s![2 * n..3 * n]).assign(profiles.ne());
        values.slice_mut(s![3 * n..4 * n]).assign(profiles.psi());
        Self { values, n_cells: n }
    }

    /// Wraps a raw vector, validating its length against `n_cells`.
    pub fn from_values(values: Array1<f64>, n_cells: usize) -> Result<Self> {
        if values.len() != 4 * n_cells {
            return Err(PhysicsError::ShapeMismatch {
                name: "flattened state",
                expected: 4 * n_cells,
                got: values.len(),
            });
        }
        Ok(Self { values, n_cells })
    }

    /// The packed values.
    pub fn values(&self) -> &Array1<f64> {
        &self.values
    }

    /// Number of cells per field.
    pub fn n_cells(&self) -> usize {
        self.n_cells
    }

    /// Total length (`4·nCells`).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the state is empty (never true for a constructed state).
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Unpacks into profiles. Shapes are valid by construction; positivity
    /// is checked separately at commit time.
    pub fn to_profiles(&self) -> Result<CoreProfiles> {
        let n = self.n_cells;
        CoreProfiles::new(
            self.values.slice(s![0..n]).to_owned(),
            self.values.slice(s![n..2 * n]).to_owned(),
            self.values.slice(s![2 * n..3 * n]).to_owned(),
            self.values.slice(s![3 * n..4 * n]).to_owned(),
        )
    }

    /// Scales into solver coordinates: `x̃ = x / (r + ε)`.
    pub fn scaled(&self, reference: &ScalingReference) -> Array1<f64> {
        reference.scale(&self.values)
    }

    /// Builds a state from solver coordinates: `x = x̃·(r + ε)`.
    pub fn from_scaled(
        scaled: &Array1<f64>,
        reference: &ScalingReference,
        n_cells: usize,
    ) -> Result<Self> {
        Self::from_values(reference.unscale(scaled), n_cells)
    }
}

/// Per-entry scaling references keeping the Jacobian well-conditioned:
/// temperatures scale with 10³ eV, density with 10²⁰ m⁻³, flux with 1 Wb.
///
/// Both directions use the same `(r + ε)` factor, so
/// `unscale(scale(x)) == x` to within 1 ULP per element.
#[derive(Debug, Clone)]
pub struct ScalingReference {
    /// Reference magnitudes, one per state entry (without the ε floor).
    values: Array1<f64>,
}

impl ScalingReference {
    /// The standard references for a state over `n_cells`.
    pub fn for_state(n_cells: usize) -> Self {
        let mut values = Array1::zeros(4 * n_cells);
        values.slice_mut(s![0..2 * n_cells]).fill(TEMPERATURE_SCALE);
        values
            .slice_mut(s![2 * n_cells..3 * n_cells])
            .fill(DENSITY_SCALE);
        values.slice_mut(s![3 * n_cells..4 * n_cells]).fill(FLUX_SCALE);
        Self { values }
    }

    /// The reference magnitudes.
    pub fn values(&self) -> &Array1<f64> {
        &self.values
    }

    /// `x̃ = x / (r + ε)`.
    pub fn scale(&self, x: &Array1<f64>) -> Array1<f64> {
        ndarray::Zip::from(x)
            .and(&self.values)
            .map_collect(|&value, &reference| value / (reference + MIN_SCALE))
    }

    /// `x = x̃ · (r + ε)`.
    pub fn unscale(&self, x: &Array1<f64>) -> Array1<f64> {
        ndarray::Zip::from(x)
            .and(&self.values)
            .map_collect(|&value, &reference| value * (reference + MIN_SCALE))
    }

    /// Tape-variable unscaling, for use inside the Newton residual. `x` must
    /// live on `tape`.
    pub fn unscale_var<'tape>(&self, tape: &'tape Tape, x: Var<'tape>) -> Var<'tape> {
        let factors = tape.constant(self.values.mapv(|reference| reference + MIN_SCALE));
        x * factors
    }

    /// Tape-variable scaling, the inverse of [`ScalingReference::unscale_var`].
    pub fn scale_var<'tape>(&self, tape: &'tape Tape, x: Var<'tape>) -> Var<'tape> {
        let factors = tape.constant(self.values.mapv(|reference| (reference + MIN_SCALE).recip()));
        x * factors
    }
}

/// The four fields of one state, as tape variables in physical units.
#[derive(Debug, Clone, Copy)]
pub struct FieldVars<'tape> {
    /// Ion temperature **in \[eV\]**.
    pub ti: Var<'tape>,
    /// Electron temperature **in \[eV\]**.
    pub te: Var<'tape>,
    /// Electron density **in \[m⁻³\]**.
    pub ne: Var<'tape>,
    /// Poloidal flux **in \[Wb\]**.
    pub psi: Var<'tape>,
}

impl<'tape> FieldVars<'tape> {
    /// Slices a flattened (physical-units) state variable into fields.
    ///
    /// # Panics
    ///
    /// Panics if `flat` does not have `4·n_cells` entries.
    pub fn from_flat(flat: Var<'tape>, n_cells: usize) -> Self {
        assert_eq!(flat.len(), 4 * n_cells, "flattened state must have 4n entries");
        Self {
            ti: flat.slice(0..n_cells),
            te: flat.slice(n_cells..2 * n_cells),
            ne: flat.slice(2 * n_cells..3 * n_cells),
            psi: flat.slice(3 * n_cells..4 * n_cells),
        }
    }

    /// Lifts committed profiles onto a tape as constants.
    pub fn from_profiles(tape: &'tape Tape, profiles: &CoreProfiles) -> Self {
        Self {
            ti: tape.constant(profiles.ti().clone()),
            te: tape.constant(profiles.te().clone()),
            ne: tape.constant(profiles.ne().clone()),
            psi: tape.constant(profiles.psi().clone()),
        }
    }
}
