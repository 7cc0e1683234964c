//! Ohmically heated startup with ECRH assist and a progress bar.
//!
//! ```sh
//! cargo run --example ohmic-startup --release
//! ```

use trident_common::{SimulationConfig, TimeConfig};
use trident_simulate::{SimulationPbar, build_simulation};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut config = SimulationConfig::default();
    config.mesh.n_cells = 50;
    config.evolution.ion_heat = true;
    config.evolution.electron_heat = true;

    config.sources.ohmic.enabled = true;
    config.sources.exchange.enabled = true;
    config.sources.ecrh.enabled = true;
    config.sources.ecrh.power_mw = 5.0;
    config.sources.bremsstrahlung.enabled = true;

    config.time = TimeConfig {
        start: 0.0,
        end: 2.0,
        initial_dt: 1e-2,
        ..TimeConfig::default()
    };

    let mut simulation = build_simulation(config)?;
    let pbar = SimulationPbar::new();
    let mut callback = |report: trident_simulate::ProgressReport| pbar.update(&report);

    let result = simulation.run(Some(&mut callback))?;
    pbar.finish();

    println!("{:#?}", result.statistics);
    println!("{:#?}", result.derived);
    Ok(())
}
