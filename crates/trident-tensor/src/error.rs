/// Custom error types.
#[derive(thiserror::Error, Debug)]
pub enum TensorError {
    /// The linear system matrix is singular to working precision.
    #[error("singular matrix: |pivot| = {pivot:.3e} at elimination column {column}")]
    SingularMatrix {
        /// Magnitude of the failing pivot.
        pivot: f64,
        /// Elimination column at which factorization broke down.
        column: usize,
    },

    /// Array lengths inconsistent with the requested operation.
    #[error("shape mismatch: expected length {expected}, got {got}")]
    ShapeMismatch {
        /// Expected length.
        expected: usize,
        /// Actual length.
        got: usize,
    },

    /// NaN or Inf encountered where a finite value is required.
    #[error("non-finite value encountered in {context}")]
    NonFinite {
        /// Where the value was detected.
        context: &'static str,
    },
}
