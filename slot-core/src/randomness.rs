//! Seeding facade for reproducible Monte-Carlo runs.
//!
//! Every worker owns its own generator. Streams are derived from a single base
//! seed so that a run is reproducible without any shared RNG state.

use rand::SeedableRng;

/// Generator used by workers, frame builders and the decoder.
pub type SimRng = rand_chacha::ChaCha8Rng;

/// Derive an independent stream seed from a base seed and a stream index.
///
/// SplitMix64 finalizer; adjacent indices map to well separated seeds.
pub fn derive_seed(base: u64, index: u64) -> u64 {
    let mut x = base.wrapping_add(index.wrapping_mul(0x9E37_79B9_7F4A_7C15));
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

/// Build the generator for worker `worker` of a run seeded with `seed`.
pub fn worker_rng(seed: u64, worker: usize) -> SimRng {
    SimRng::seed_from_u64(derive_seed(seed, worker as u64))
}

/// Seeded generator, for tests and single-threaded use.
pub fn seeded_rng(seed: u64) -> SimRng {
    SimRng::seed_from_u64(seed)
}
