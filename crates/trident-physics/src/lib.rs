//! # TRIDENT physics
//!
//! The evolved plasma state and the physics models that drive it: core
//! profiles, the flattened solver state with its scaling, boundary
//! conditions, transport models, and the source models with their
//! power-balance metadata ledger.
//!
//! Source models are pure: their terms are recomputed from tape variables
//! inside every Newton residual evaluation, which is what carries the
//! implicit inter-equation coupling (exchange, resistivity, bootstrap).

mod bcs;
mod calculus;
mod composition;
mod error;
mod metadata;
mod profiles;
mod state;
mod terms;

pub mod sources;
pub mod transport;

pub use bcs::{BoundaryCondition, BoundaryConditions, FieldBoundary};
pub use calculus::{current_density_var, radial_gradient_var};
pub use composition::{PlasmaComposition, coulomb_log_ei, coulomb_log_ei_var};
pub use error::PhysicsError;
pub use metadata::{SourceCategory, SourceMetadata, SourceMetadataCollection};
pub use profiles::CoreProfiles;
pub use state::{FieldVars, FlattenedState, ScalingReference};
pub use terms::{SourceContribution, SourceTerms};

/// Crate-level result type.
pub type Result<T> = std::result::Result<T, PhysicsError>;
