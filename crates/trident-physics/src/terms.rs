//! Source terms: the materialized arrays and the tape-variable
//! contributions they are built from.

use ndarray::Array1;

use trident_tensor::Var;

use crate::SourceMetadataCollection;
use crate::{PhysicsError, Result};

/// Materialized source terms on cells, with the per-model metadata ledger.
///
/// The metadata collection is always present; a composite with no models
/// yields the canonical empty collection, never an absent one.
#[derive(Debug, Clone)]
pub struct SourceTerms {
    /// Ion heating **in \[MW/m³\]**.
    pub q_i: Array1<f64>,
    /// Electron heating **in \[MW/m³\]**.
    pub q_e: Array1<f64>,
    /// Particle source **in \[m⁻³/s\]**.
    pub s_n: Array1<f64>,
    /// Current source **in \[MA/m²\]**.
    pub s_j: Array1<f64>,
    /// Per-model power ledger.
    pub metadata: SourceMetadataCollection,
}

impl SourceTerms {
    /// All-zero terms with an empty ledger.
    pub fn zeros(n_cells: usize) -> Self {
        Self {
            q_i: Array1::zeros(n_cells),
            q_e: Array1::zeros(n_cells),
            s_n: Array1::zeros(n_cells),
            s_j: Array1::zeros(n_cells),
            metadata: SourceMetadataCollection::empty(),
        }
    }

    /// Validates the arrays against the mesh size.
    pub fn validate(&self, n_cells: usize) -> Result<()> {
        for (name, array) in [
            ("q_i", &self.q_i),
            ("q_e", &self.q_e),
            ("s_n", &self.s_n),
            ("s_j", &self.s_j),
        ] {
            if array.len() != n_cells {
                return Err(PhysicsError::ShapeMismatch {
                    name,
                    expected: n_cells,
                    got: array.len(),
                });
            }
        }
        Ok(())
    }
}

/// One model's source contribution as tape variables. `None` fields
/// contribute nothing to the corresponding equation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceContribution<'tape> {
    /// Ion heating **in \[MW/m³\]**.
    pub q_i: Option<Var<'tape>>,
    /// Electron heating **in \[MW/m³\]**.
    pub q_e: Option<Var<'tape>>,
    /// Particle source **in \[m⁻³/s\]**.
    pub s_n: Option<Var<'tape>>,
    /// Current source **in \[MA/m²\]**.
    pub s_j: Option<Var<'tape>>,
}

impl<'tape> SourceContribution<'tape> {
    /// Adds another contribution field-wise.
    pub fn add(self, other: Self) -> Self {
        let combine = |a: Option<Var<'tape>>, b: Option<Var<'tape>>| match (a, b) {
            (Some(x), Some(y)) => Some(x + y),
            (Some(x), None) => Some(x),
            (None, Some(y)) => Some(y),
            (None, None) => None,
        };
        Self {
            q_i: combine(self.q_i, other.q_i),
            q_e: combine(self.q_e, other.q_e),
            s_n: combine(self.s_n, other.s_n),
            s_j: combine(self.s_j, other.s_j),
        }
    }
}
