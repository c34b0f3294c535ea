//! Structured logging for PLR simulations
//!
//! # Controlling terminal output
//!
//! ## 1. `init_detailed_simulation_logging()` for debugging
//! ```rust
//! use slotsim_core::logging::init_detailed_simulation_logging;
//! init_detailed_simulation_logging();
//! ```
//! Shows every level, pretty-printed, including per-batch worker progress.
//!
//! ## 2. `init_simulation_logging_with_level()` for a specific level
//! ```rust
//! use slotsim_core::logging::init_simulation_logging_with_level;
//! init_simulation_logging_with_level("debug");
//! ```
//!
//! ## 3. Environment variables
//! ```bash
//! RUST_LOG=debug cargo run --example plr_sweep
//! RUST_LOG=slotsim_explore::montecarlo=trace cargo run --example plr_sweep
//! ```
//! `RUST_LOG` always wins over the level passed in code.
//!
//! ## Levels
//! - **TRACE**: per-batch merges inside a worker
//! - **DEBUG**: worker start and finish, early-stop decisions
//! - **INFO**: one line per load point
//! - **WARN**: PLR requested from a result with no simulated frames
//! - **ERROR**: worker pool failures
//!
//! Initialization is idempotent: when a global subscriber is already
//! installed the call does nothing.

use tracing::{debug, info, warn, Span};
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::result::PlrResult;

/// Initialize logging at INFO for the simulation crates
pub fn init_simulation_logging() {
    init_simulation_logging_with_level("info")
}

/// Initialize logging with a specific level
///
/// # Arguments
/// * `level` - Log level: "trace", "debug", "info", "warn", or "error"
pub fn init_simulation_logging_with_level(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("warn,slotsim_core={level},slotsim_explore={level},slotsim={level}").into()
    });

    let installed = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter)
        .try_init()
        .is_ok();

    if installed {
        info!("Simulation logging initialized at level: {}", level);
    }
}

/// Initialize trace-level, pretty-printed logging
pub fn init_detailed_simulation_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "info,slotsim_core=trace,slotsim_explore=trace,slotsim=trace".into()
    });

    let installed = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_file(true)
                .with_line_number(true)
                .pretty(),
        )
        .with(filter)
        .try_init()
        .is_ok();

    if installed {
        info!("Detailed simulation logging initialized");
    }
}

/// Span covering the Monte-Carlo run of one load point
pub fn sweep_span(load: f64) -> Span {
    tracing::info_span!("load_point", load = load)
}

/// Span covering one worker's share of frames
pub fn worker_span(worker: usize, frames: u64) -> Span {
    tracing::debug_span!("worker", worker = worker, frames = frames)
}

/// Progress events shared by the driver and the sweep
pub mod events {
    use super::*;

    pub fn monte_carlo_started(load: f64, mean_users: f64, workers: usize, max_frames: u64) {
        info!(
            load = load,
            mean_users = mean_users,
            workers = workers,
            max_frames = max_frames,
            "Monte-Carlo run started"
        );
    }

    pub fn monte_carlo_completed(load: f64, result: &PlrResult) {
        info!(
            load = load,
            simulated_frames = result.simulated_frames,
            errored_frames = result.errored_frames,
            total_decoded = result.total_decoded,
            total_sent = result.total_sent,
            "Monte-Carlo run completed"
        );
    }

    pub fn worker_finished(worker: usize, partial: &PlrResult) {
        debug!(
            worker = worker,
            simulated_frames = partial.simulated_frames,
            errored_frames = partial.errored_frames,
            "Worker finished"
        );
    }

    pub fn early_stop(worker: usize, errored_frames: u64, threshold: u64) {
        debug!(
            worker = worker,
            errored_frames = errored_frames,
            threshold = threshold,
            "Errored frame budget reached, stopping worker"
        );
    }

    pub fn point_skipped(load: f64) {
        debug!(load = load, "Load point already simulated, skipping");
    }
}

/// Warnings for results that cannot be interpreted
pub mod diagnostics {
    use super::*;

    pub fn undefined_plr(result: &PlrResult) {
        warn!(
            simulated_frames = result.simulated_frames,
            total_sent = result.total_sent,
            "Extracting PLR from a result with no simulated frames"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_initialization_is_idempotent() {
        init_simulation_logging_with_level("debug");
        init_simulation_logging();
        init_detailed_simulation_logging();
        info!("Test info message");
        debug!("Test debug message");
    }

    #[test]
    fn test_span_creation() {
        let span = sweep_span(0.5);
        let _guard = span.enter();
        let _worker = worker_span(3, 1_000);
    }

    #[test]
    fn test_event_logging() {
        let result = PlrResult::new(10, 2, 35, 40);
        events::monte_carlo_started(0.5, 40.0, 4, 10);
        events::worker_finished(0, &result);
        events::early_stop(0, 2, 2);
        events::monte_carlo_completed(0.5, &result);
        events::point_skipped(0.5);
        diagnostics::undefined_plr(&PlrResult::default());
    }
}
