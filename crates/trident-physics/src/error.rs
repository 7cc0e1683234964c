/// Custom error types.
#[derive(thiserror::Error, Debug)]
pub enum PhysicsError {
    /// A model parameter is out of its physical range. Raised at model
    /// construction only; models are total at runtime.
    #[error("model `{model}`, parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Model name.
        model: &'static str,
        /// Parameter name.
        name: &'static str,
        /// Human-readable reason.
        reason: String,
    },

    /// Array lengths inconsistent with each other or with the mesh.
    #[error("shape mismatch in `{name}`: expected length {expected}, got {got}")]
    ShapeMismatch {
        /// Name of the offending array.
        name: &'static str,
        /// Expected length.
        expected: usize,
        /// Actual length.
        got: usize,
    },

    /// A profile violates the positivity invariant.
    #[error("profile `{field}` is not strictly positive (min = {min:.3e})")]
    NonPositive {
        /// Offending field name.
        field: &'static str,
        /// Minimum value found.
        min: f64,
    },

    /// Forwarded geometry error.
    #[error(transparent)]
    Geometry(#[from] trident_geometry::GeometryError),
}
