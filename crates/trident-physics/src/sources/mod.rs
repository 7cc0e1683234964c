//! Source models and their composition.
//!
//! A source model contributes tape-variable terms (so the Newton residual
//! can recompute them at every iteration, carrying the implicit coupling)
//! and a metadata ledger entry with its integrated powers. The composite
//! sums contributions in declaration order and always yields a metadata
//! collection — empty when no models are registered, never absent.

mod bootstrap;
mod bremsstrahlung;
mod ecrh;
mod exchange;
mod external_current;
mod fusion;
mod gas_puff;
mod impurity;
mod ohmic;

pub use bootstrap::BootstrapCurrent;
pub use bremsstrahlung::Bremsstrahlung;
pub use ecrh::EcrhHeating;
pub use exchange::IonElectronExchange;
pub use external_current::ExternalCurrent;
pub use fusion::FusionPower;
pub use gas_puff::GasPuff;
pub use impurity::ImpurityRadiation;
pub use ohmic::{OhmicHeating, spitzer_resistivity, spitzer_resistivity_var};

use ndarray::Array1;

use trident_common::units::mw_to_watt;
use trident_geometry::{Geometry, safety_factor};
use trident_tensor::Tape;

use crate::Result;
use crate::{
    CoreProfiles, FieldVars, PlasmaComposition, SourceCategory, SourceContribution,
    SourceMetadata, SourceMetadataCollection, SourceTerms,
};

/// Everything a source model may read while contributing terms.
///
/// The safety factor is frozen at the step's committed state; every other
/// field dependence flows through the tape variables.
pub struct SourceInputs<'ctx, 'tape> {
    /// The recording tape of the enclosing evaluation.
    pub tape: &'tape Tape,
    /// The four fields, in physical units.
    pub fields: &'ctx FieldVars<'tape>,
    /// Device geometry.
    pub geometry: &'ctx Geometry,
    /// Plasma composition.
    pub composition: &'ctx PlasmaComposition,
    /// Cell-centered safety factor at the step's committed state.
    pub safety_factor: &'ctx Array1<f64>,
}

impl std::fmt::Debug for SourceInputs<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceInputs")
            .field("n_cells", &self.geometry.mesh().n_cells())
            .finish()
    }
}

/// A physics source model. Pure and deterministic; fallible only at
/// construction.
pub trait SourceModel: Send + Sync {
    /// Model name, used in the metadata ledger.
    fn name(&self) -> &'static str;

    /// Power-balance category.
    fn category(&self) -> SourceCategory;

    /// Contributes terms at the state carried by `inputs`.
    fn contribute<'tape>(
        &self,
        inputs: &SourceInputs<'_, 'tape>,
    ) -> Result<SourceContribution<'tape>>;

    /// Integrated scalar powers at the given committed state.
    ///
    /// Most models forward to [`integrated_powers`], which evaluates
    /// [`SourceModel::contribute`] on a scratch tape and integrates the
    /// heating channels; models with extra ledger fields extend the entry.
    fn metadata(
        &self,
        profiles: &CoreProfiles,
        geometry: &Geometry,
        composition: &PlasmaComposition,
    ) -> Result<SourceMetadata>;
}

/// Evaluates a model's contribution at a committed state and integrates the
/// heating channels into a ledger entry.
pub fn integrated_powers(
    model: &dyn SourceModel,
    profiles: &CoreProfiles,
    geometry: &Geometry,
    composition: &PlasmaComposition,
) -> Result<SourceMetadata> {
    let tape = Tape::new();
    let fields = FieldVars::from_profiles(&tape, profiles);
    let q = safety_factor(geometry, profiles.psi())?;
    let inputs = SourceInputs {
        tape: &tape,
        fields: &fields,
        geometry,
        composition,
        safety_factor: &q,
    };
    let contribution = model.contribute(&inputs)?;

    let mut entry = SourceMetadata::new(model.name(), model.category());
    if let Some(var) = contribution.q_i {
        entry.ion_power = mw_to_watt(geometry.volume_integral(&var.value()));
    }
    if let Some(var) = contribution.q_e {
        entry.electron_power = mw_to_watt(geometry.volume_integral(&var.value()));
    }
    Ok(entry)
}

/// An ordered collection of source models acting as one.
#[derive(Default)]
pub struct CompositeSource {
    /// Models in declaration order.
    models: Vec<Box<dyn SourceModel>>,
}

impl CompositeSource {
    /// An empty composite.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a model.
    pub fn push(&mut self, model: Box<dyn SourceModel>) {
        self.models.push(model);
    }

    /// Number of registered models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Whether no models are registered.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Whether a model with the given ledger name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.models.iter().any(|model| model.name() == name)
    }

    /// Sums all contributions at the state carried by `inputs`.
    pub fn contribute<'tape>(
        &self,
        inputs: &SourceInputs<'_, 'tape>,
    ) -> Result<SourceContribution<'tape>> {
        let mut total = SourceContribution::default();
        for model in &self.models {
            total = total.add(model.contribute(inputs)?);
        }
        Ok(total)
    }

    /// Aggregates the per-model ledgers. Empty collection for an empty
    /// composite.
    pub fn metadata_collection(
        &self,
        profiles: &CoreProfiles,
        geometry: &Geometry,
        composition: &PlasmaComposition,
    ) -> Result<SourceMetadataCollection> {
        let mut collection = SourceMetadataCollection::empty();
        for model in &self.models {
            collection.push(model.metadata(profiles, geometry, composition)?);
        }
        Ok(collection)
    }

    /// Materializes the summed terms and the aggregated ledger at a
    /// committed state.
    pub fn compute_terms(
        &self,
        profiles: &CoreProfiles,
        geometry: &Geometry,
        composition: &PlasmaComposition,
    ) -> Result<SourceTerms> {
        let n = geometry.mesh().n_cells();
        let tape = Tape::new();
        let fields = FieldVars::from_profiles(&tape, profiles);
        let q = safety_factor(geometry, profiles.psi())?;
        let inputs = SourceInputs {
            tape: &tape,
            fields: &fields,
            geometry,
            composition,
            safety_factor: &q,
        };
        let contribution = self.contribute(&inputs)?;

        let materialize =
            |field: Option<trident_tensor::Var<'_>>| field.map_or_else(|| Array1::zeros(n), |var| var.value());

        Ok(SourceTerms {
            q_i: materialize(contribution.q_i),
            q_e: materialize(contribution.q_e),
            s_n: materialize(contribution.s_n),
            s_j: materialize(contribution.s_j),
            metadata: self.metadata_collection(profiles, geometry, composition)?,
        })
    }
}

impl std::fmt::Debug for CompositeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeSource")
            .field(
                "models",
                &self.models.iter().map(|model| model.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
