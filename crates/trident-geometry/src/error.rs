/// Custom error types.
#[derive(thiserror::Error, Debug)]
pub enum GeometryError {
    /// Array lengths inconsistent with the mesh. Indicates a programming
    /// error upstream; never recoverable.
    #[error("shape mismatch in `{name}`: expected length {expected}, got {got}")]
    ShapeMismatch {
        /// Name of the offending array.
        name: &'static str,
        /// Expected length (nCells or nCells+1).
        expected: usize,
        /// Actual length.
        got: usize,
    },

    /// A construction parameter is out of range.
    #[error("invalid geometry parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Human-readable reason.
        reason: String,
    },

    /// The requested geometry family needs an equilibrium file from the
    /// persistence collaborator.
    #[error("geometry family `{family}` requires external equilibrium data")]
    Unsupported {
        /// The requested family.
        family: &'static str,
    },
}
