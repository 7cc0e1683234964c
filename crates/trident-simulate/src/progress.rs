//! Progress reporting at bounded frequency.

use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};

use trident_common::consts::PROGRESS_MAX_RATE_HZ;
use trident_physics::CoreProfiles;

/// The run progress bar style.
const RUN_PBAR_STYLE: &str = concat!(
    "🕜 {elapsed_precise} ",
    "[{wide_bar:.cyan/blue}] ",
    "{spinner:.bold} ",
    "{percent:>3}% ",
    "({eta}) ",
    "{msg}",
);

/// The run progress bar chars (filled, current, to do).
const RUN_PROGRESS_CHARS: &str = "#>-";

/// One progress observation, dispatched at most ~10 Hz.
#[derive(Debug, Clone)]
pub struct ProgressReport {
    /// Completed fraction of the simulated interval, in `[0, 1]`.
    pub fraction: f64,
    /// Current simulated time **in \[s\]**.
    pub time: f64,
    /// Last accepted Δt **in \[s\]**.
    pub dt: f64,
    /// Accepted step count.
    pub step: usize,
    /// Current profiles; cloned only when a report is actually dispatched.
    pub snapshot: Option<CoreProfiles>,
}

/// Rate limiter for callback dispatch.
#[derive(Debug)]
pub(crate) struct ProgressThrottle {
    /// Minimum interval between dispatches.
    min_interval: Duration,
    /// Last dispatch.
    last: Option<Instant>,
}

impl ProgressThrottle {
    /// A throttle at the maximum dispatch rate.
    pub(crate) fn new() -> Self {
        Self {
            min_interval: Duration::from_secs_f64(1.0 / PROGRESS_MAX_RATE_HZ),
            last: None,
        }
    }

    /// Whether a report may be dispatched now; arms the throttle if so.
    pub(crate) fn ready(&mut self) -> bool {
        let now = Instant::now();
        match self.last {
            Some(last) if now.duration_since(last) < self.min_interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

/// An indicatif progress bar consuming [`ProgressReport`]s.
pub struct SimulationPbar {
    /// The wrapped bar, scaled to per-mille resolution.
    pbar: ProgressBar,
}

impl std::fmt::Debug for SimulationPbar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationPbar")
            .field("position", &self.pbar.position())
            .finish()
    }
}

impl SimulationPbar {
    /// Initializes the progress bar.
    pub fn new() -> Self {
        let style = ProgressStyle::with_template(RUN_PBAR_STYLE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars(RUN_PROGRESS_CHARS);
        let pbar = ProgressBar::new(1000).with_style(style);
        pbar.enable_steady_tick(Duration::from_millis(100));
        Self { pbar }
    }

    /// Applies one report.
    pub fn update(&self, report: &ProgressReport) {
        self.pbar
            .set_position((report.fraction.clamp(0.0, 1.0) * 1000.0) as u64);
        self.pbar.set_message(format!(
            "t = {:.4e} s, Δt = {:.2e} s, step {}",
            report.time, report.dt, report.step
        ));
    }

    /// Completes the bar.
    pub fn finish(&self) {
        self.pbar.println("✅️ Simulation done");
        self.pbar.finish();
    }
}

impl Default for SimulationPbar {
    fn default() -> Self {
        Self::new()
    }
}
