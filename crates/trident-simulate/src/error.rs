/// Custom error types.
#[derive(thiserror::Error, Debug)]
pub enum SimulationError {
    /// Forwarded configuration error (fatal at initialization).
    #[error(transparent)]
    Config(#[from] trident_common::ConfigError),

    /// Forwarded geometry error.
    #[error(transparent)]
    Geometry(#[from] trident_geometry::GeometryError),

    /// Forwarded physics error.
    #[error(transparent)]
    Physics(#[from] trident_physics::PhysicsError),

    /// Forwarded tensor/linear-algebra error.
    #[error(transparent)]
    Tensor(#[from] trident_tensor::TensorError),

    /// Newton–Raphson failed to converge within its iteration budget.
    /// Recovered by the stepper through Δt reduction; fatal only after the
    /// retry budget is spent.
    #[error("solver failed to converge after {iterations} iterations (‖R‖ = {residual:.3e})")]
    SolverConvergence {
        /// Iterations performed.
        iterations: usize,
        /// Final scaled residual norm.
        residual: f64,
    },

    /// NaN/Inf detected in the residual or Jacobian. Recovered by Δt
    /// halving within the retry budget.
    #[error("non-finite values in {context}")]
    NumericalInstability {
        /// Where the values were detected.
        context: &'static str,
    },
}

impl SimulationError {
    /// Whether the stepper may retry this failure with a smaller Δt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::SolverConvergence { .. } | Self::NumericalInstability { .. }
        ) || matches!(self, Self::Tensor(trident_tensor::TensorError::SingularMatrix { .. }))
    }
}
