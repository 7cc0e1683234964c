//! Adaptive step-size control.
//!
//! The per-step life cycle is an explicit state machine:
//! `Proposed(dt) → Solved | Rejected(reason)`. A rejected proposal halves
//! Δt and retries within the runner's retry budget; no control flow rides
//! on exceptions.

use trident_common::TimeConfig;
use trident_common::consts::ADAPTIVE_ORDER;
use trident_physics::transport::TransportCoefficients;

use crate::newton::NewtonSolution;

/// Outcome of one step proposal at a given Δt.
#[derive(Debug, Clone)]
pub(crate) enum StepOutcome {
    /// The proposal converged.
    Solved(NewtonSolution),
    /// The proposal failed; a retryable rejection shrinks Δt.
    Rejected {
        /// Failure description for the log.
        reason: String,
        /// Whether a smaller Δt may rescue the proposal.
        retryable: bool,
    },
}

/// Δt controller.
#[derive(Debug, Clone)]
pub(crate) struct AdaptiveStepper {
    /// Smallest admissible Δt **in \[s\]**; `None` disables adaptation.
    min_dt: Option<f64>,
    /// Largest admissible Δt **in \[s\]**.
    max_dt: f64,
    /// Controller safety factor.
    safety: f64,
    /// Target residual norm of the controller.
    tolerance: f64,
}

impl AdaptiveStepper {
    /// Builds the controller from the time section. A missing `adaptive`
    /// block fixes Δt at its initial value.
    pub(crate) fn from_config(time: &TimeConfig, tolerance: f64) -> Self {
        match &time.adaptive {
            Some(adaptive) => Self {
                min_dt: Some(adaptive.min_dt),
                max_dt: adaptive.max_dt,
                safety: adaptive.safety_factor,
                tolerance,
            },
            None => Self {
                min_dt: None,
                max_dt: time.initial_dt,
                safety: 1.0,
                tolerance,
            },
        }
    }

    /// Whether adaptation is enabled.
    pub(crate) fn is_adaptive(&self) -> bool {
        self.min_dt.is_some()
    }

    /// Next Δt after an accepted step with converged residual norm `err`:
    /// `Δt·safety·(tol/err)^{1/k}`, growth and shrink bounded, clamped to
    /// the configured range.
    pub(crate) fn next_dt_on_success(&self, dt: f64, err: f64) -> f64 {
        let Some(min_dt) = self.min_dt else {
            return dt;
        };
        let err = err.max(1e-30);
        let factor = (self.safety * (self.tolerance / err).powf(1.0 / ADAPTIVE_ORDER))
            .clamp(0.3, 2.0);
        (dt * factor).clamp(min_dt, self.max_dt)
    }

    /// Next Δt after a rejected step: halved, `None` once the floor is hit.
    pub(crate) fn next_dt_on_failure(&self, dt: f64) -> Option<f64> {
        let halved = dt / 2.0;
        match self.min_dt {
            Some(min_dt) if halved < min_dt => None,
            _ => Some(halved),
        }
    }

    /// Advisory CFL checks. The implicit scheme does not require them;
    /// exceeding them is logged, never enforced.
    pub(crate) fn cfl_advisories(
        &self,
        transport: &TransportCoefficients,
        dr: f64,
        dt: f64,
    ) {
        let v_max = transport
            .v
            .iter()
            .fold(0.0_f64, |acc, &value| acc.max(value.abs()));
        if v_max > 0.0 && dt > dr / v_max {
            log::warn!(
                "Δt = {dt:.3e} s exceeds the convective CFL Δx/v_max = {:.3e} s (advisory)",
                dr / v_max
            );
        }

        let d_max = transport
            .chi_i
            .iter()
            .chain(transport.chi_e.iter())
            .chain(transport.d.iter())
            .fold(0.0_f64, |acc, &value| acc.max(value));
        if d_max > 0.0 && dt > 0.5 * dr * dr / d_max {
            log::warn!(
                "Δt = {dt:.3e} s exceeds the diffusive CFL Δx²/2D_max = {:.3e} s (advisory)",
                0.5 * dr * dr / d_max
            );
        }
    }
}
