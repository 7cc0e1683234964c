//! # TRIDENT simulate
//!
//! The coupled implicit transport solver: finite-volume coefficient
//! builder, θ-method residual over the flattened state, Newton–Raphson
//! with a VJP-assembled Jacobian, adaptive time stepping, the sawtooth
//! applicator, derived diagnostics, the conservation monitor, and the
//! orchestrating [`Simulation`].

mod coeffs;
mod conservation;
mod derived;
mod error;
mod face;
mod mhd;
mod newton;
mod progress;
mod record;
mod residual;
mod runner;
mod setup;
mod stepper;

pub use conservation::{ConservationMonitor, ConservationReport};
pub use derived::{DerivedQuantities, compute_derived};
pub use error::SimulationError;
pub use mhd::{SawtoothModel, SawtoothOutcome};
pub use progress::{ProgressReport, SimulationPbar};
pub use record::{EvolutionRecord, RunStatistics};
pub use runner::{
    RunOutcome, Simulation, SimulationControl, SimulationResult, SimulationStatus,
};
pub use setup::build_simulation;

pub use coeffs::{Block1DCoeffs, EquationCoeffs};
pub use face::{arithmetic_face, harmonic_face, power_law_alpha};

/// Crate-level result type.
pub type Result<T> = std::result::Result<T, SimulationError>;
