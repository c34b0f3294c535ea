//! PLR-vs-load curves for the three access schemes
//!
//! Run with `RUST_LOG=debug` to see per-worker progress.

use slotsim::prelude::*;
use tracing::info;

fn run(name: &str, params: SimulationParameters, loads: &[f64]) -> Result<(), SimError> {
    let mut sweep = LoadSweep::new(params, loads.iter().copied());
    sweep.run(&MonteCarloConfig::default().with_seed(2024))?;

    println!("== {name}");
    println!("{:>6} {:>12} {:>10} {:>22}", "load", "PLR", "T", "95% CI");
    for point in &sweep.points {
        let ci = plr_confidence_interval(&point.result, 0.95)
            .map(|(lo, hi)| format!("[{lo:.2e}, {hi:.2e}]"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>6.2} {:>12.4e} {:>10.4} {:>22}",
            point.load(),
            point.plr(),
            point.throughput(),
            ci
        );
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_simulation_logging();

    let loads = [0.2, 0.4, 0.6, 0.8, 1.0];

    let crdsa = SimulationParameters::builder(Scheme::crdsa(2))
        .nslots(100)
        .power_distribution(PowerDistribution::log_uniform_db(0.0, 6.0)?)
        .power_strategy(PowerStrategy::IndependentPower)
        .max_simulated_frames(5_000)
        .max_errored_frames(2_000)
        .build()?;
    run("CRDSA, 2 replicas, 100 slots", crdsa, &loads)?;

    let mf_crdsa = SimulationParameters::builder(Scheme::mf_crdsa(2, 4))
        .nslots(100)
        .power_distribution(PowerDistribution::log_uniform_db(0.0, 6.0)?)
        .max_simulated_frames(5_000)
        .max_errored_frames(2_000)
        .build()?;
    run("MF-CRDSA, 2 replicas over 4 time slots", mf_crdsa, &loads)?;

    let ra4step = SimulationParameters::builder(Scheme::ra4step(64, 4, 6, true))
        .coderate(0.5)
        .plr_model(PlrModel::Collision)
        .max_simulated_frames(5_000)
        .build()?;
    let mut sweep = LoadSweep::new(ra4step, loads);
    sweep.run(&MonteCarloConfig::default())?;
    info!(report = %sweep.to_json()?, "RA4Step sweep finished");
    println!("== RA4Step, 64 msg1 occasions, 4 msg3 occasions, 6 frequency slots");
    for (load, plr) in sweep.loads().iter().zip(sweep.plr_values()) {
        println!("{load:>6.2} {plr:>12.4e}");
    }

    Ok(())
}
