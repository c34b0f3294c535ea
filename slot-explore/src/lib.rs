//! Parallel Monte-Carlo PLR estimation on top of `slotsim-core`.
//!
//! [`montecarlo::run_monte_carlo`] estimates one load point on a dedicated
//! worker pool; [`sweep::LoadSweep`] drives it over a list of loads.

pub mod montecarlo;
pub mod stats;
pub mod sweep;

/// Prelude for common exploration types.
pub mod prelude {
    pub use crate::montecarlo::{
        draw_user_count, run_monte_carlo, MonteCarloConfig, DEFAULT_BATCH_SIZE,
    };
    pub use crate::stats::{
        frame_error_confidence_interval, plr_confidence_interval, wilson_interval,
        z_for_confidence,
    };
    pub use crate::sweep::{LoadPoint, LoadSweep};
}
