//! # SlotSim - packet loss simulation for slotted random access
//!
//! SlotSim estimates the packet loss ratio (PLR) of CRDSA, MF-CRDSA and
//! 4-step random access under successive interference cancellation, by
//! Monte-Carlo simulation of independent frames.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use slotsim::prelude::*;
//!
//! let params = SimulationParameters::builder(Scheme::crdsa(2))
//!     .nslots(100)
//!     .max_simulated_frames(10_000)
//!     .build()
//!     .unwrap();
//!
//! let mut sweep = LoadSweep::new(params, [0.2, 0.4, 0.6]);
//! sweep.run(&MonteCarloConfig::default()).unwrap();
//! for point in &sweep.points {
//!     println!("load {:.2}: PLR {:.3e}", point.load(), point.plr());
//! }
//! ```
//!
//! ## Crates
//!
//! - [`core`]: schemes, frame builder, SIC decoder, parameters and results
//! - [`explore`]: parallel Monte-Carlo driver, load sweeps and statistics

pub use slotsim_core as core;

pub use slotsim_explore as explore;

// Convenience re-exports of commonly used items
pub mod prelude {
    //! Commonly used types and functions

    pub use slotsim_core::{
        extract_plr, init_simulation_logging, ConfigError, PlrCurve, PlrModel, PlrResult,
        PowerDistribution, PowerStrategy, Scheme, SimError, SimulationParameters,
        TimeSlotGenerator,
    };

    pub use slotsim_explore::prelude::*;
}
