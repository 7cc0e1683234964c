//! Global conservation monitoring with bounded corrective rescaling.

use trident_common::consts::EV_TO_J;
use trident_geometry::Geometry;
use trident_physics::CoreProfiles;

use crate::Result;

/// Clamp of the multiplicative correction factor.
const CORRECTION_CLAMP: f64 = 0.2;

/// Drift report of one observation.
#[derive(Debug, Clone, Default)]
pub struct ConservationReport {
    /// Thermal energy **in \[J\]**.
    pub energy: f64,
    /// Relative drift against the initial energy.
    pub energy_drift: f64,
    /// Energy rate `dE/dt` against the previous observation **in \[W\]**.
    pub de_dt: f64,
    /// Total particle content **in \[particles\]**.
    pub particles: f64,
    /// Relative drift against the initial particle content.
    pub particle_drift: f64,
    /// Whether a correction was applied this step.
    pub corrected: bool,
}

/// Tracks global energy and particle content against their initial values
/// and optionally applies a bounded multiplicative correction.
///
/// Intended strictly for pure-conservation testing; in production runs the
/// monitor only reports. Non-finite observations short-circuit into no-ops.
#[derive(Debug, Clone)]
pub struct ConservationMonitor {
    /// Relative drift threshold that arms the correction.
    tolerance: f64,
    /// Whether corrections are applied at all.
    apply_correction: bool,
    /// Initial energy **in \[J\]**.
    initial_energy: Option<f64>,
    /// Initial particle content.
    initial_particles: Option<f64>,
    /// Previous observation `(t, E)`.
    previous: Option<(f64, f64)>,
}

impl ConservationMonitor {
    /// Creates a monitor with the given drift `tolerance` (default 1%).
    pub fn new(tolerance: f64, apply_correction: bool) -> Self {
        Self {
            tolerance,
            apply_correction,
            initial_energy: None,
            initial_particles: None,
            previous: None,
        }
    }

    /// Thermal energy of a state **in \[J\]**.
    fn thermal_energy(profiles: &CoreProfiles, geometry: &Geometry) -> f64 {
        let density = profiles
            .total_pressure_ev()
            .mapv(|value| 1.5 * value * EV_TO_J);
        geometry.volume_integral(&density)
    }

    /// Observes the state at `time`, possibly returning corrected profiles.
    ///
    /// The correction rescales `Tᵢ` and `Tₑ` equally by `E₀/E`, clamped to
    /// ±20%; drifts beyond the clamp are logged and corrected only up to
    /// the clamp.
    pub fn check(
        &mut self,
        profiles: &CoreProfiles,
        geometry: &Geometry,
        time: f64,
    ) -> Result<(ConservationReport, Option<CoreProfiles>)> {
        let energy = Self::thermal_energy(profiles, geometry);
        let particles = geometry.volume_integral(profiles.ne());

        if !energy.is_finite() || !particles.is_finite() {
            log::warn!("non-finite conservation observation skipped");
            return Ok((ConservationReport::default(), None));
        }

        let initial_energy = *self.initial_energy.get_or_insert(energy);
        let initial_particles = *self.initial_particles.get_or_insert(particles);

        let de_dt = match self.previous {
            Some((previous_time, previous_energy)) if time > previous_time => {
                (energy - previous_energy) / (time - previous_time)
            }
            _ => 0.0,
        };
        self.previous = Some((time, energy));

        let mut report = ConservationReport {
            energy,
            energy_drift: (energy - initial_energy) / initial_energy,
            de_dt,
            particles,
            particle_drift: (particles - initial_particles) / initial_particles,
            corrected: false,
        };

        if !self.apply_correction || report.energy_drift.abs() <= self.tolerance {
            return Ok((report, None));
        }

        let raw_factor = initial_energy / energy;
        let factor = raw_factor.clamp(1.0 - CORRECTION_CLAMP, 1.0 + CORRECTION_CLAMP);
        if (raw_factor - factor).abs() > f64::EPSILON {
            log::warn!(
                "energy drift {:.2}% beyond the correction clamp; applying the bounded factor {factor:.3}",
                100.0 * report.energy_drift
            );
        }

        let corrected = profiles.with_fields(
            Some(profiles.ti().mapv(|value| value * factor)),
            Some(profiles.te().mapv(|value| value * factor)),
            None,
            None,
        )?;
        report.corrected = true;
        // The corrected state becomes the new reference trajectory point.
        self.previous = Some((time, Self::thermal_energy(&corrected, geometry)));
        Ok((report, Some(corrected)))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array1;
    use trident_geometry::CircularGeometryBuilder;

    fn flat_profiles(temperature: f64) -> CoreProfiles {
        CoreProfiles::new(
            Array1::from_elem(20, temperature),
            Array1::from_elem(20, temperature),
            Array1::from_elem(20, 8e19),
            Array1::from_shape_fn(20, |i| 0.01 * (i as f64 + 0.5).powi(2)),
        )
        .unwrap()
    }

    #[test]
    fn small_drift_is_reported_but_not_corrected() {
        let geometry = CircularGeometryBuilder::new(20, 3.0, 1.0, 5.0).build().unwrap();
        let mut monitor = ConservationMonitor::new(0.01, true);

        let (report, corrected) = monitor.check(&flat_profiles(5e3), &geometry, 0.0).unwrap();
        assert_relative_eq!(report.energy_drift, 0.0);
        assert!(corrected.is_none());

        // 0.5% drift stays below the 1% tolerance.
        let (report, corrected) = monitor
            .check(&flat_profiles(5e3 * 1.005), &geometry, 0.1)
            .unwrap();
        assert!(report.energy_drift > 0.0);
        assert!(corrected.is_none());
        assert!(report.de_dt > 0.0);
    }

    #[test]
    fn correction_restores_the_initial_energy_within_one_step() {
        let geometry = CircularGeometryBuilder::new(20, 3.0, 1.0, 5.0).build().unwrap();
        let mut monitor = ConservationMonitor::new(0.01, true);
        let (_, _) = monitor.check(&flat_profiles(5e3), &geometry, 0.0).unwrap();

        // 5% drift arms the correction.
        let drifted = flat_profiles(5e3 * 1.05);
        let (report, corrected) = monitor.check(&drifted, &geometry, 0.1).unwrap();
        assert!(report.corrected);
        let corrected = corrected.expect("correction expected");

        let restored = ConservationMonitor::thermal_energy(&corrected, &geometry);
        let initial =
            ConservationMonitor::thermal_energy(&flat_profiles(5e3), &geometry);
        assert_relative_eq!(restored, initial, max_relative = 1e-9);
    }

    #[test]
    fn oversized_drift_is_clamped() {
        let geometry = CircularGeometryBuilder::new(20, 3.0, 1.0, 5.0).build().unwrap();
        let mut monitor = ConservationMonitor::new(0.01, true);
        let (_, _) = monitor.check(&flat_profiles(5e3), &geometry, 0.0).unwrap();

        // 50% drift: the factor clamps at 0.8.
        let (_, corrected) = monitor.check(&flat_profiles(7.5e3), &geometry, 0.1).unwrap();
        let corrected = corrected.expect("correction expected");
        assert_relative_eq!(corrected.ti()[0], 7.5e3 * 0.8, max_relative = 1e-12);
    }

    #[test]
    fn disabled_monitor_never_corrects() {
        let geometry = CircularGeometryBuilder::new(20, 3.0, 1.0, 5.0).build().unwrap();
        let mut monitor = ConservationMonitor::new(0.01, false);
        let (_, _) = monitor.check(&flat_profiles(5e3), &geometry, 0.0).unwrap();
        let (report, corrected) = monitor.check(&flat_profiles(9e3), &geometry, 0.1).unwrap();
        assert!(report.energy_drift > 0.5);
        assert!(corrected.is_none());
    }
}
