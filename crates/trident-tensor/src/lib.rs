//! # TRIDENT tensor
//!
//! The array/linear-algebra facade consumed by the rest of the workspace:
//! a 1-D, eager-valued recording tape ([`Tape`]/[`Var`]) with element-wise
//! arithmetic, reductions, slicing/concatenation, value-based selection,
//! an explicit evaluation barrier, and reverse-mode vector-Jacobian
//! products; plus a dense LU solver with partial pivoting.
//!
//! ## Evaluation-barrier contract
//!
//! Values are computed eagerly, but every operation records a node that
//! keeps its parents alive for the reverse sweep. The contract with callers
//! is:
//!
//! + a [`Tape`] is scoped to one residual/function evaluation and dropped
//!   afterwards — recorded history never outlives a time step;
//! + scalars are read through [`Var::item`]/[`Var::value`], which
//!   materialize the value out of the graph;
//! + [`jacobian`] frees each column's adjoint buffers before the next
//!   cotangent is seeded.
//!
//! A lazy or GPU-resident host library replacing this crate must honour the
//! same three points.

mod error;
mod grad;
mod linalg;
mod ops;
mod tape;

pub use error::TensorError;
pub use grad::{jacobian, vjp};
pub use linalg::solve;
pub use ops::{concat, select};
pub use tape::{Tape, Var};

/// Crate-level result type.
pub type Result<T> = std::result::Result<T, TensorError>;
