//! Frame generation and SIC decoding for slotted random-access simulation.
//!
//! This crate provides the building blocks of a packet loss ratio (PLR)
//! Monte-Carlo experiment: replica placement schemes, power assignment,
//! per-frame power matrices and the successive interference cancellation
//! decoder. The parallel driver and load sweeps live in `slotsim-explore`.
//!
//! # Architecture Overview
//!
//! - [`Scheme`]: where each user's replicas land (CRDSA, MF-CRDSA, RA4Step).
//! - [`FrameArena`]: per-worker buffers that build a [`Frame`] of `nusers`
//!   realizations and the `nusers x nslots` power matrix.
//! - [`SicDecoder`]: iterative decode-then-cancel over a frame, returning the
//!   number of decoded users.
//! - [`PlrResult`]: additive frame counters; partial results merge with `+`.
//!
//! # Basic Usage
//!
//! ```rust
//! use slotsim_core::{
//!     seeded_rng, FrameArena, PlrResult, Scheme, SicDecoder, SimulationParameters,
//! };
//!
//! let params = SimulationParameters::builder(Scheme::crdsa(2))
//!     .nslots(50)
//!     .build()
//!     .unwrap();
//!
//! let mut rng = seeded_rng(7);
//! let mut arena = FrameArena::for_scheme(params.scheme(), params.ra_slots());
//! let mut decoder = SicDecoder::new(&params);
//! let mut result = PlrResult::default();
//!
//! for _ in 0..10 {
//!     let frame = arena
//!         .build(
//!             params.scheme(),
//!             params.power_strategy(),
//!             params.power_distribution(),
//!             20,
//!             &mut rng,
//!         )
//!         .unwrap();
//!     let decoded = decoder.decode(&frame, &mut rng);
//!     result.record_frame(frame.nusers(), decoded);
//! }
//! assert_eq!(result.simulated_frames, 10);
//! ```
//!
//! # Slot Indexing
//!
//! Slots are 1-based everywhere in the public API. Slot `0` and NaN power mark
//! unused replica positions.

pub mod dists;
pub mod error;
pub mod frame;
pub mod logging;
pub mod params;
pub mod plr;
pub mod power;
pub mod randomness;
pub mod result;
pub mod scheme;
pub mod sic;

pub use dists::{draw_user_count, PowerDistribution};
pub use error::{ConfigError, SimError};
pub use frame::{Frame, FrameArena, Replica, UserRealization};
pub use logging::{
    init_detailed_simulation_logging, init_simulation_logging,
    init_simulation_logging_with_level, sweep_span, worker_span,
};
pub use params::{SimulationParameters, SimulationParametersBuilder};
pub use plr::{PlrCurve, PlrModel};
pub use power::{assign_powers, PowerStrategy};
pub use randomness::{derive_seed, seeded_rng, worker_rng, SimRng};
pub use result::{extract_plr, PlrResult};
pub use scheme::{Scheme, TimeSlotGenerator};
pub use sic::SicDecoder;
