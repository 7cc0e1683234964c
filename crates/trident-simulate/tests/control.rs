//! Cooperative pause/resume/cancel at step boundaries.

use std::time::Duration;

use trident_common::{SimulationConfig, TimeConfig};
use trident_simulate::{ProgressReport, RunOutcome, SimulationStatus, build_simulation};

fn small_config() -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.mesh.n_cells = 12;
    config.evolution.ion_heat = true;
    config.evolution.electron_heat = false;
    config.sources.ohmic.enabled = false;
    config.sources.exchange.enabled = false;
    config.time = TimeConfig {
        start: 0.0,
        end: 0.1,
        initial_dt: 1e-2,
        adaptive: None,
    };
    config
}

#[test]
fn cancellation_returns_the_last_good_profiles() {
    let mut simulation = build_simulation(small_config()).unwrap();
    simulation.control().cancel();

    let result = simulation.run(None).unwrap();
    assert!(matches!(result.outcome, RunOutcome::Cancelled));
    assert_eq!(simulation.status(), SimulationStatus::Cancelled);
    assert_eq!(result.statistics.steps_accepted, 0);
    result.profiles.validate_positive().unwrap();
}

#[test]
fn pause_is_observed_and_resume_continues_to_completion() {
    let mut simulation = build_simulation(small_config()).unwrap();
    let control = simulation.control();

    control.request_pause();
    assert!(simulation.is_paused());

    let resumer = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(50));
        control.resume();
    });

    let started = std::time::Instant::now();
    let result = simulation.run(None).unwrap();
    resumer.join().expect("resumer thread must not panic");

    assert!(matches!(result.outcome, RunOutcome::Completed));
    assert_eq!(simulation.status(), SimulationStatus::Completed);
    assert!(
        started.elapsed() >= Duration::from_millis(45),
        "the run must have waited for the resume"
    );
    assert_eq!(result.statistics.steps_accepted, 10);
}

#[test]
fn progress_reports_carry_a_sane_fraction() {
    let mut simulation = build_simulation(small_config()).unwrap();
    let mut reports: Vec<ProgressReport> = Vec::new();
    let mut callback = |report: ProgressReport| reports.push(report);

    let result = simulation.run(Some(&mut callback)).unwrap();
    assert!(matches!(result.outcome, RunOutcome::Completed));

    // The throttle may swallow reports, but whatever arrives is ordered
    // and within [0, 1].
    for window in reports.windows(2) {
        assert!(window[0].fraction <= window[1].fraction);
    }
    for report in &reports {
        assert!((0.0..=1.0).contains(&report.fraction));
        assert!(report.dt > 0.0);
    }
}
