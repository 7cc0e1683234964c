//! Per-step time series and run statistics.

use std::time::Duration;

use trident_physics::CoreProfiles;

use crate::DerivedQuantities;

/// The initial capacity of the time series Vecs.
const RECORD_INIT_CAPACITY: usize = 2000;

/// Scalar time series of a run, plus optional profile snapshots.
#[derive(Clone)]
pub struct EvolutionRecord {
    /// Simulated time **in \[s\]**.
    pub time: Vec<f64>,
    /// Accepted step sizes **in \[s\]**.
    pub dt: Vec<f64>,
    /// Thermal stored energy **in \[MJ\]**.
    pub w_thermal_mj: Vec<f64>,
    /// Energy confinement time **in \[s\]**.
    pub tau_e: Vec<f64>,
    /// Fusion gain.
    pub q_fusion: Vec<f64>,
    /// On-axis safety factor.
    pub q0: Vec<f64>,
    /// Volume-averaged density **in \[m⁻³\]**.
    pub ne_avg: Vec<f64>,
    /// Normalized beta.
    pub beta_n: Vec<f64>,
    /// Profile snapshots `(t, profiles)` at the configured stride.
    pub snapshots: Vec<(f64, CoreProfiles)>,
    /// Snapshot stride **in \[s\]**; `None` records scalars only.
    save_interval: Option<f64>,
    /// Time of the last snapshot.
    last_snapshot: f64,
}

impl EvolutionRecord {
    /// Creates a record with the configured snapshot stride.
    pub fn new(save_interval: Option<f64>) -> Self {
        Self {
            time: Vec::with_capacity(RECORD_INIT_CAPACITY),
            dt: Vec::with_capacity(RECORD_INIT_CAPACITY),
            w_thermal_mj: Vec::with_capacity(RECORD_INIT_CAPACITY),
            tau_e: Vec::with_capacity(RECORD_INIT_CAPACITY),
            q_fusion: Vec::with_capacity(RECORD_INIT_CAPACITY),
            q0: Vec::with_capacity(RECORD_INIT_CAPACITY),
            ne_avg: Vec::with_capacity(RECORD_INIT_CAPACITY),
            beta_n: Vec::with_capacity(RECORD_INIT_CAPACITY),
            snapshots: Vec::new(),
            save_interval,
            last_snapshot: f64::NEG_INFINITY,
        }
    }

    /// Number of recorded steps.
    pub fn steps_stored(&self) -> usize {
        self.time.len()
    }

    /// Appends one accepted step.
    pub fn push_step(
        &mut self,
        time: f64,
        dt: f64,
        derived: &DerivedQuantities,
        profiles: &CoreProfiles,
    ) {
        self.time.push(time);
        self.dt.push(dt);
        self.w_thermal_mj.push(derived.w_thermal_mj);
        self.tau_e.push(derived.tau_e);
        self.q_fusion.push(derived.q_fusion);
        self.q0.push(derived.q0);
        self.ne_avg.push(derived.ne_avg);
        self.beta_n.push(derived.beta_n);

        if let Some(interval) = self.save_interval {
            if time - self.last_snapshot >= interval {
                self.snapshots.push((time, profiles.clone()));
                self.last_snapshot = time;
            }
        }
    }

    /// Shrinks the series after the run.
    pub fn finish(&mut self) {
        self.time.shrink_to_fit();
        self.dt.shrink_to_fit();
        self.w_thermal_mj.shrink_to_fit();
        self.tau_e.shrink_to_fit();
        self.q_fusion.shrink_to_fit();
        self.q0.shrink_to_fit();
        self.ne_avg.shrink_to_fit();
        self.beta_n.shrink_to_fit();
        self.snapshots.shrink_to_fit();
    }
}

impl std::fmt::Debug for EvolutionRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvolutionRecord")
            .field(
                "time",
                &format!(
                    "[{:.5}, {:.5}]",
                    self.time.first().unwrap_or(&f64::NAN),
                    self.time.last().unwrap_or(&f64::NAN),
                ),
            )
            .field("steps stored", &self.steps_stored())
            .field("snapshots", &self.snapshots.len())
            .finish()
    }
}

/// Counters and timings of one run.
#[derive(Debug, Clone, Default)]
pub struct RunStatistics {
    /// Accepted steps.
    pub steps_accepted: usize,
    /// Rejected step proposals.
    pub steps_rejected: usize,
    /// Total Newton iterations across accepted and rejected proposals.
    pub newton_iterations: usize,
    /// Sawtooth crashes fired.
    pub crashes: usize,
    /// Conservation corrections applied.
    pub corrections: usize,
    /// Wall-clock duration of the run.
    pub duration: Duration,
}
