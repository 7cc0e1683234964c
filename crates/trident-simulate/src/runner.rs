//! The simulation orchestrator.
//!
//! Owns the authoritative `(profiles, t, Δt)` and drives the per-step
//! sequence: transport and sources → coefficients → Newton–Raphson →
//! commit → MHD events → derived quantities → conservation check →
//! advance. Pause and cancellation are cooperative, observed at step
//! boundaries only; the current step always completes.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::{Duration, Instant};

use trident_common::EvolutionConfig;
use trident_geometry::Geometry;
use trident_physics::sources::CompositeSource;
use trident_physics::transport::TransportModel;
use trident_physics::{BoundaryConditions, CoreProfiles, FlattenedState, PlasmaComposition,
    ScalingReference};

use trident_common::consts::MAX_STEP_RETRIES;

use crate::conservation::ConservationMonitor;
use crate::derived::{DerivedQuantities, compute_derived};
use crate::mhd::{SawtoothModel, SawtoothOutcome};
use crate::newton::NewtonSolver;
use crate::progress::{ProgressReport, ProgressThrottle};
use crate::record::{EvolutionRecord, RunStatistics};
use crate::residual::ResidualContext;
use crate::stepper::{AdaptiveStepper, StepOutcome};
use crate::Result;

/// Control states shared with [`SimulationControl`].
const STATE_RUNNING: u8 = 0;
/// Pause requested.
const STATE_PAUSED: u8 = 1;
/// Cancellation requested.
const STATE_CANCELLED: u8 = 2;

/// Cooperative control handle. Clonable; requests are observed at the next
/// step boundary.
#[derive(Debug, Clone)]
pub struct SimulationControl {
    /// Shared control word.
    state: Arc<AtomicU8>,
}

impl SimulationControl {
    /// A handle in the running state.
    fn new() -> Self {
        Self {
            state: Arc::new(AtomicU8::new(STATE_RUNNING)),
        }
    }

    /// Requests a pause at the next step boundary.
    pub fn request_pause(&self) {
        // Cancellation wins over pause.
        let _ = self.state.compare_exchange(
            STATE_RUNNING,
            STATE_PAUSED,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
    }

    /// Resumes a paused run.
    pub fn resume(&self) {
        let _ = self.state.compare_exchange(
            STATE_PAUSED,
            STATE_RUNNING,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
    }

    /// Requests cancellation; the current step completes first.
    pub fn cancel(&self) {
        self.state.store(STATE_CANCELLED, Ordering::SeqCst);
    }

    /// Whether a pause is requested or active.
    pub fn is_paused(&self) -> bool {
        self.state.load(Ordering::SeqCst) == STATE_PAUSED
    }

    /// Whether cancellation is requested.
    pub fn is_cancelled(&self) -> bool {
        self.state.load(Ordering::SeqCst) == STATE_CANCELLED
    }
}

/// Lifecycle of a [`Simulation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationStatus {
    /// Initialized, not yet run.
    Idle,
    /// Inside `run`.
    Running,
    /// Waiting at a step boundary for `resume`.
    Paused,
    /// Cancelled by the control handle.
    Cancelled,
    /// Reached the configured end time.
    Completed,
    /// Ran out of retries or hit a non-recoverable error.
    Failed,
}

/// Terminal disposition of a run. Cancellation and failure are outcomes,
/// not errors: the result always carries the last good profiles.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// Reached the configured end time.
    Completed,
    /// Cancelled at a step boundary.
    Cancelled,
    /// Stepping failed; the reason is diagnostic.
    Failed {
        /// Failure description.
        reason: String,
    },
}

/// Everything a finished (or interrupted) run hands back.
#[derive(Debug)]
pub struct SimulationResult {
    /// Final (last good) profiles.
    pub profiles: CoreProfiles,
    /// Diagnostics at the final state.
    pub derived: DerivedQuantities,
    /// Scalar time series and snapshots.
    pub record: EvolutionRecord,
    /// Counters and timings.
    pub statistics: RunStatistics,
    /// Terminal disposition.
    pub outcome: RunOutcome,
}

/// The transport simulation: state, models and solver wired together.
pub struct Simulation {
    /// Device geometry.
    pub(crate) geometry: Geometry,
    /// Transport model.
    pub(crate) transport: Box<dyn TransportModel>,
    /// Source composite.
    pub(crate) sources: CompositeSource,
    /// Plasma composition.
    pub(crate) composition: PlasmaComposition,
    /// Boundary constraints.
    pub(crate) bcs: BoundaryConditions,
    /// Per-field evolve flags.
    pub(crate) evolution: EvolutionConfig,
    /// State scaling.
    pub(crate) scaling: ScalingReference,
    /// Time-discretization blend θ.
    pub(crate) theta: f64,
    /// Whether the ohmic model supplies a resistivity.
    pub(crate) ohmic_active: bool,
    /// Nonlinear solver.
    pub(crate) newton: NewtonSolver,
    /// Δt controller.
    pub(crate) stepper: AdaptiveStepper,
    /// Sawtooth applicator.
    pub(crate) sawtooth: Option<SawtoothModel>,
    /// Conservation monitor.
    pub(crate) monitor: ConservationMonitor,
    /// Authoritative profiles.
    pub(crate) profiles: CoreProfiles,
    /// Current simulated time **in \[s\]**.
    pub(crate) time: f64,
    /// Current step size **in \[s\]**.
    pub(crate) dt: f64,
    /// Start of the simulated interval **in \[s\]**.
    pub(crate) t_start: f64,
    /// End of the simulated interval **in \[s\]**.
    pub(crate) t_end: f64,
    /// Snapshot stride **in \[s\]**.
    pub(crate) save_interval: Option<f64>,
    /// Lifecycle state.
    pub(crate) status: SimulationStatus,
    /// Cooperative control word.
    pub(crate) control: SimulationControl,
}

impl Simulation {
    /// Current profiles.
    pub fn profiles(&self) -> &CoreProfiles {
        &self.profiles
    }

    /// Current simulated time **in \[s\]**.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Current step size **in \[s\]**.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Lifecycle state.
    pub fn status(&self) -> SimulationStatus {
        self.status
    }

    /// A clonable control handle for pause/resume/cancel from another
    /// thread.
    pub fn control(&self) -> SimulationControl {
        self.control.clone()
    }

    /// Requests a pause at the next step boundary.
    pub fn pause(&self) {
        self.control.request_pause();
    }

    /// Resumes a paused run.
    pub fn resume(&self) {
        self.control.resume();
    }

    /// Whether a pause is requested or active.
    pub fn is_paused(&self) -> bool {
        self.control.is_paused()
    }

    /// Replaces the conservation monitor (pure-conservation test harness).
    pub fn set_conservation_monitor(&mut self, monitor: ConservationMonitor) {
        self.monitor = monitor;
    }

    /// Replaces the physics models. Must precede [`Simulation::run`].
    pub fn initialize(
        &mut self,
        transport: Box<dyn TransportModel>,
        sources: CompositeSource,
        mhd: Option<SawtoothModel>,
    ) -> Result<()> {
        if self.status != SimulationStatus::Idle {
            return Err(trident_common::ConfigError::Inconsistent {
                keys: "initialize/run",
                reason: "models must be initialized before the run starts".into(),
            }
            .into());
        }
        self.ohmic_active = sources.contains("ohmic");
        self.transport = transport;
        self.sources = sources;
        self.sawtooth = mhd;
        Ok(())
    }

    /// Replaces the boundary constraints (scenario surface; must precede
    /// [`Simulation::run`]).
    pub fn set_boundary_conditions(&mut self, bcs: BoundaryConditions) {
        self.bcs = bcs;
    }

    /// Replaces the initial profiles. Must precede [`Simulation::run`].
    pub fn set_profiles(&mut self, profiles: CoreProfiles) -> Result<()> {
        if profiles.n_cells() != self.geometry.mesh().n_cells() {
            return Err(trident_physics::PhysicsError::ShapeMismatch {
                name: "profiles",
                expected: self.geometry.mesh().n_cells(),
                got: profiles.n_cells(),
            }
            .into());
        }
        profiles.validate_positive()?;
        self.profiles = profiles;
        Ok(())
    }

    /// Advances from the current time to the configured end.
    ///
    /// Errors are reserved for programming/configuration mistakes; solver
    /// exhaustion, cancellation and instability return a [`RunOutcome`]
    /// carrying the last good profiles and a diagnostic reason.
    pub fn run(
        &mut self,
        mut progress: Option<&mut dyn FnMut(ProgressReport)>,
    ) -> Result<SimulationResult> {
        let started = Instant::now();
        let span = self.t_end - self.t_start;
        let n = self.geometry.mesh().n_cells();

        let mut statistics = RunStatistics::default();
        let mut record = EvolutionRecord::new(self.save_interval);
        let mut throttle = ProgressThrottle::new();
        self.status = SimulationStatus::Running;

        // A meaningful result even for zero-step runs.
        let mut derived = {
            let metadata =
                self.sources
                    .metadata_collection(&self.profiles, &self.geometry, &self.composition)?;
            compute_derived(&self.profiles, &self.geometry, &metadata, &self.composition)?
        };

        let outcome = loop {
            // ==================== Step boundary: pause / cancel

            while self.control.is_paused() {
                self.status = SimulationStatus::Paused;
                std::thread::sleep(Duration::from_millis(10));
            }
            if self.control.is_cancelled() {
                break RunOutcome::Cancelled;
            }
            self.status = SimulationStatus::Running;

            if self.t_end - self.time <= 1e-12 * span {
                break RunOutcome::Completed;
            }

            // ==================== Per-step physics at the committed state

            let mut dt = self.dt.min(self.t_end - self.time);
            let transport = self.transport.coefficients(&self.profiles, &self.geometry)?;
            transport.validate(n)?;
            self.stepper
                .cfl_advisories(&transport, self.geometry.mesh().dr(), dt);

            // ==================== Proposal / retry state machine

            let mut retries = 0;
            let mut failure: Option<String> = None;
            let solution = loop {
                let context = ResidualContext::prepare(
                    &self.geometry,
                    transport.clone(),
                    &self.sources,
                    &self.composition,
                    &self.bcs,
                    self.evolution,
                    &self.scaling,
                    self.theta,
                    self.ohmic_active,
                    &self.profiles,
                    dt,
                )?;
                let outcome = match self.newton.solve(&context, context.old_scaled().clone()) {
                    Ok(solution) => StepOutcome::Solved(solution),
                    Err(error) => StepOutcome::Rejected {
                        retryable: error.is_retryable(),
                        reason: error.to_string(),
                    },
                };
                match outcome {
                    StepOutcome::Solved(solution) => {
                        statistics.newton_iterations += solution.iterations;
                        break Some(solution);
                    }
                    StepOutcome::Rejected { reason, retryable } => {
                        statistics.steps_rejected += 1;
                        let next = (retryable && retries < MAX_STEP_RETRIES)
                            .then(|| self.stepper.next_dt_on_failure(dt))
                            .flatten();
                        match next {
                            Some(next_dt) => {
                                retries += 1;
                                log::debug!(
                                    "step at t = {:.4e} rejected ({reason}); retrying with Δt = {next_dt:.3e}",
                                    self.time
                                );
                                dt = next_dt;
                            }
                            None => {
                                failure = Some(reason);
                                break None;
                            }
                        }
                    }
                }
            };
            let Some(solution) = solution else {
                let reason =
                    failure.unwrap_or_else(|| "step proposal rejected".into());
                log::warn!("stepping failed at t = {:.4e} s: {reason}", self.time);
                break RunOutcome::Failed { reason };
            };

            // ==================== Commit

            let state = FlattenedState::from_scaled(&solution.x_scaled, &self.scaling, n)?;
            let mut profiles = state.to_profiles()?.floored();
            profiles.validate_positive()?;
            self.time += dt;
            statistics.steps_accepted += 1;

            // ==================== MHD events

            if let Some(sawtooth) = &mut self.sawtooth {
                let (mixed, sawtooth_outcome) =
                    sawtooth.apply(&profiles, &self.geometry, self.time)?;
                if matches!(sawtooth_outcome, SawtoothOutcome::Crashed { .. }) {
                    statistics.crashes += 1;
                }
                profiles = mixed;
            }

            // ==================== Diagnostics and conservation

            let metadata =
                self.sources
                    .metadata_collection(&profiles, &self.geometry, &self.composition)?;
            derived = compute_derived(&profiles, &self.geometry, &metadata, &self.composition)?;

            let (report, corrected) = self.monitor.check(&profiles, &self.geometry, self.time)?;
            if let Some(corrected) = corrected {
                profiles = corrected;
                statistics.corrections += 1;
            }
            log::debug!(
                "t = {:.4e} s: W = {:.4} MJ, drift = {:.3e}, dE/dt = {:.3e} W",
                self.time,
                derived.w_thermal_mj,
                report.energy_drift,
                report.de_dt
            );

            self.profiles = profiles;
            record.push_step(self.time, dt, &derived, &self.profiles);

            // ==================== Adapt Δt and report

            self.dt = self.stepper.next_dt_on_success(dt, solution.residual_norm);

            if let Some(callback) = progress.as_mut() {
                if throttle.ready() {
                    callback(ProgressReport {
                        fraction: ((self.time - self.t_start) / span).clamp(0.0, 1.0),
                        time: self.time,
                        dt,
                        step: statistics.steps_accepted,
                        snapshot: Some(self.profiles.clone()),
                    });
                }
            }
        };

        self.status = match &outcome {
            RunOutcome::Completed => SimulationStatus::Completed,
            RunOutcome::Cancelled => SimulationStatus::Cancelled,
            RunOutcome::Failed { .. } => SimulationStatus::Failed,
        };
        statistics.duration = started.elapsed();
        record.finish();

        Ok(SimulationResult {
            profiles: self.profiles.clone(),
            derived,
            record,
            statistics,
            outcome,
        })
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("geometry", &self.geometry)
            .field("transport", &self.transport.name())
            .field("sources", &self.sources)
            .field("t", &format!("{:.5e}", self.time))
            .field("Δt", &format!("{:.3e}", self.dt))
            .field("interval", &format!("[{:.3e}, {:.3e}]", self.t_start, self.t_end))
            .field("status", &self.status)
            .finish()
    }
}

/// A control word freshly created for a [`Simulation`].
pub(crate) fn new_control() -> SimulationControl {
    SimulationControl::new()
}
