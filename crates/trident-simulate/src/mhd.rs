//! Sawtooth crash applicator.

use trident_common::SawtoothConfig;
use trident_geometry::{Geometry, safety_factor};
use trident_physics::CoreProfiles;

use crate::Result;

/// Outcome of a sawtooth check.
#[derive(Debug, Clone)]
pub enum SawtoothOutcome {
    /// No crash this step.
    Quiescent,
    /// A crash fired at the given on-axis safety factor.
    Crashed {
        /// `q(0)` that triggered the crash.
        q0: f64,
    },
}

/// Sawtooth crash model: when `q(0)` drops below the critical value and the
/// refractory interval has passed, the profiles inside the inversion radius
/// are flattened to their volume averages instantaneously (the mixing time
/// is far below any transport Δt).
#[derive(Debug, Clone)]
pub struct SawtoothModel {
    /// Crash trigger threshold on `q(0)`.
    q_critical: f64,
    /// Normalized inversion radius.
    inversion_radius: f64,
    /// Refractory interval **in \[s\]**.
    min_interval: f64,
    /// Time of the last crash.
    last_crash: Option<f64>,
}

impl SawtoothModel {
    /// Builds the model from its configuration section.
    pub fn from_config(config: &SawtoothConfig) -> Self {
        Self {
            q_critical: config.q_critical,
            inversion_radius: config.inversion_radius,
            min_interval: config.min_interval,
            last_crash: None,
        }
    }

    /// Time of the last crash, if any.
    pub fn last_crash(&self) -> Option<f64> {
        self.last_crash
    }

    /// Checks the trigger at `time` and applies the crash.
    ///
    /// Returns the (possibly unchanged) profiles. Post-crash profiles
    /// satisfy the positivity invariants: averages of positive fields are
    /// positive, and the region's flux content is preserved exactly by the
    /// volume-average replacement.
    pub fn apply(
        &mut self,
        profiles: &CoreProfiles,
        geometry: &Geometry,
        time: f64,
    ) -> Result<(CoreProfiles, SawtoothOutcome)> {
        let q = safety_factor(geometry, profiles.psi())?;
        let q0 = q[0];
        if q0 >= self.q_critical {
            return Ok((profiles.clone(), SawtoothOutcome::Quiescent));
        }
        if let Some(last) = self.last_crash {
            if time - last <= self.min_interval {
                return Ok((profiles.clone(), SawtoothOutcome::Quiescent));
            }
        }

        let rho = geometry.mesh().normalized_cell_radii();
        let volumes = geometry.volumes();
        let in_region: Vec<usize> = rho
            .iter()
            .enumerate()
            .filter(|&(_, &value)| value <= self.inversion_radius)
            .map(|(index, _)| index)
            .collect();
        if in_region.is_empty() {
            return Ok((profiles.clone(), SawtoothOutcome::Quiescent));
        }

        let region_volume: f64 = in_region.iter().map(|&index| volumes[index]).sum();
        let mix = |field: &ndarray::Array1<f64>| {
            let average = in_region
                .iter()
                .map(|&index| field[index] * volumes[index])
                .sum::<f64>()
                / region_volume;
            let mut mixed = field.clone();
            for &index in &in_region {
                mixed[index] = average;
            }
            mixed
        };

        let mixed = profiles.with_fields(
            Some(mix(profiles.ti())),
            Some(mix(profiles.te())),
            Some(mix(profiles.ne())),
            Some(mix(profiles.psi())),
        )?;

        self.last_crash = Some(time);
        log::debug!("sawtooth crash at t = {time:.4e} s (q0 = {q0:.3})");
        Ok((mixed, SawtoothOutcome::Crashed { q0 }))
    }
}
