//! Newton–Raphson over the scaled flattened state.

use ndarray::Array1;

use trident_common::SolverConfig;
use trident_common::SolverKind;

use crate::residual::ResidualContext;
use crate::{Result, SimulationError};

/// Euclidean norm.
fn l2_norm(values: &Array1<f64>) -> f64 {
    values.dot(values).sqrt()
}

/// Newton–Raphson parameters.
#[derive(Debug, Clone)]
pub(crate) struct NewtonSolver {
    /// Residual/step tolerance in scaled coordinates.
    tolerance: f64,
    /// Iteration budget per step.
    max_iterations: usize,
    /// Backtracking line search on the Newton direction.
    line_search: bool,
    /// Accept the single linearized step without a convergence loop.
    single_step: bool,
}

/// A converged (or accepted) solution.
#[derive(Debug, Clone)]
pub(crate) struct NewtonSolution {
    /// The solution in scaled coordinates.
    pub x_scaled: Array1<f64>,
    /// Iterations spent.
    pub iterations: usize,
    /// Final scaled residual norm.
    pub residual_norm: f64,
}

impl NewtonSolver {
    /// Builds the solver from its configuration section.
    pub(crate) fn from_config(config: &SolverConfig) -> Self {
        Self {
            tolerance: config.tolerance,
            max_iterations: config.max_iterations,
            line_search: config.kind == SolverKind::Optimizer,
            single_step: config.kind == SolverKind::Linear,
        }
    }

    /// Solves `R(x̃) = 0` starting from `x0`.
    ///
    /// Near-singular Jacobians and non-finite values surface as retryable
    /// errors; the adaptive stepper reduces Δt and tries again.
    pub(crate) fn solve(
        &self,
        context: &ResidualContext<'_>,
        x0: Array1<f64>,
    ) -> Result<NewtonSolution> {
        let mut x = x0;
        let mut iterations = 0;

        loop {
            let (residual, jacobian) = context.residual_and_jacobian(&x)?;
            if residual.iter().any(|value| !value.is_finite()) {
                return Err(SimulationError::NumericalInstability {
                    context: "residual",
                });
            }
            let norm = l2_norm(&residual);
            if norm < self.tolerance {
                return Ok(NewtonSolution {
                    x_scaled: x,
                    iterations,
                    residual_norm: norm,
                });
            }
            if jacobian.iter().any(|value| !value.is_finite()) {
                return Err(SimulationError::NumericalInstability {
                    context: "jacobian",
                });
            }

            let delta = trident_tensor::solve(&jacobian, &(-&residual))?;
            iterations += 1;

            let (next, next_norm) = if self.line_search {
                self.backtrack(context, &x, &delta, norm)?
            } else {
                let next = &x + &delta;
                let next_norm = l2_norm(&context.residual(&next)?);
                (next, next_norm)
            };

            let step_norm = l2_norm(&(&next - &x));
            x = next;

            if self.single_step || next_norm < self.tolerance || step_norm < self.tolerance {
                return Ok(NewtonSolution {
                    x_scaled: x,
                    iterations,
                    residual_norm: next_norm,
                });
            }
            if iterations >= self.max_iterations {
                return Err(SimulationError::SolverConvergence {
                    iterations,
                    residual: next_norm,
                });
            }
        }
    }

    /// Halves the Newton step until the residual stops growing.
    fn backtrack(
        &self,
        context: &ResidualContext<'_>,
        x: &Array1<f64>,
        delta: &Array1<f64>,
        reference_norm: f64,
    ) -> Result<(Array1<f64>, f64)> {
        let mut step = 1.0;
        loop {
            let candidate = x + &(delta * step);
            let norm = l2_norm(&context.residual(&candidate)?);
            if norm.is_finite() && (norm <= reference_norm || step <= 1.0 / 16.0) {
                return Ok((candidate, norm));
            }
            step /= 2.0;
            if step < 1.0 / 64.0 {
                log::debug!("line search exhausted, taking the smallest step");
                return Ok((candidate, norm));
            }
        }
    }
}
