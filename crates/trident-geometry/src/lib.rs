//! # TRIDENT geometry
//!
//! The radial mesh and the cylindrical-approximation geometry of the
//! device: cell volumes, face areas, metric factors, and the magnetic
//! quantities derived from the poloidal flux (safety factor, shear,
//! poloidal field, current density).
//!
//! Everything here is pure data computed once at construction; no I/O.

mod error;
mod geometry;
mod mesh;
mod qfactor;

pub use error::GeometryError;
pub use geometry::{CircularGeometryBuilder, Geometry};
pub use mesh::Mesh;
pub use qfactor::{current_density, magnetic_shear, poloidal_field, safety_factor};

pub use geometry::radial_gradient;

/// Crate-level result type.
pub type Result<T> = std::result::Result<T, GeometryError>;
