//! # TRIDENT common
//!
//! Shared foundations for the TRIDENT workspace: physical constants, the
//! single unit-conversion table, solver defaults, and the typed simulation
//! configuration tree with its cross-field validation.
//!
//! Everything here is plain data; no simulation logic lives in this crate.

mod config;
mod error;

pub mod consts;
pub mod units;

pub use config::{
    AdaptiveConfig, BoundariesConfig, BoundaryKind, CompositionConfig, EvolutionConfig,
    GeometryType, ImpuritySpecies, InitialConfig, MeshConfig, MhdConfig, OutputConfig,
    OutputFormat, SawtoothConfig, SchemeConfig, SimulationConfig, SolverConfig, SolverKind,
    SourcesConfig, TimeConfig, TransportConfig, TransportModelKind,
};
pub use config::{
    BootstrapConfig, BremsstrahlungConfig, EcrhConfig, ExchangeConfig, ExternalCurrentConfig,
    FusionConfig, GasPuffConfig, ImpurityRadiationConfig, OhmicConfig,
};

pub use error::ConfigError;

/// Crate-level result type.
pub type Result<T> = std::result::Result<T, ConfigError>;
