//! Parallel Monte-Carlo PLR estimation for one load point
//!
//! The frame budget is cut into contiguous chunks, one per worker. Each worker
//! simulates its chunk in sub-batches and folds every sub-batch into a single
//! shared [`PlrResult`] behind a mutex. Once the merged errored frame count
//! reaches `max_errored_frames`, workers stop picking up new sub-batches;
//! sub-batches already in flight still land, so the threshold can be
//! overshot by at most `batch_size * workers` frames.

use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};

use slotsim_core::logging::events;
use slotsim_core::{
    worker_rng, worker_span, ConfigError, FrameArena, PlrResult, SicDecoder, SimError,
    SimulationParameters,
};
use tracing::trace;

pub use slotsim_core::draw_user_count;

/// Frames simulated between two merges into the shared result.
pub const DEFAULT_BATCH_SIZE: u64 = 50;

#[derive(Debug, Clone)]
pub struct MonteCarloConfig {
    /// Number of worker threads.
    pub workers: usize,

    /// Frames per sub-batch.
    pub batch_size: u64,

    /// Base seed; worker `i` draws from `derive_seed(seed, i)`.
    pub seed: u64,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            workers: std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
            batch_size: DEFAULT_BATCH_SIZE,
            seed: 0,
        }
    }
}

impl MonteCarloConfig {
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_batch_size(mut self, batch_size: u64) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::InvalidValue {
                field: "workers",
                reason: "must be >= 1".to_string(),
            });
        }
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "batch_size",
                reason: "must be >= 1".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Default)]
struct Shared {
    result: PlrResult,
    error: Option<ConfigError>,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// What a worker should do after folding a sub-batch into the shared result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AfterMerge {
    Continue,
    /// Merged errored frames reached the budget.
    Exhausted(u64),
    /// Another worker failed; the run is being aborted.
    Aborted,
}

/// Fold `partial` into the shared result and decide, under the same lock,
/// whether the worker keeps going.
fn merge_batch(
    shared: &Mutex<Shared>,
    partial: PlrResult,
    max_errored_frames: u64,
) -> AfterMerge {
    let mut guard = lock(shared);
    if guard.error.is_some() {
        return AfterMerge::Aborted;
    }
    guard.result += partial;
    let errored = guard.result.errored_frames;
    if errored >= max_errored_frames {
        AfterMerge::Exhausted(errored)
    } else {
        AfterMerge::Continue
    }
}

/// Split `total` frames into `workers` contiguous chunks whose sizes differ by at most one.
fn chunk_frames(total: u64, workers: usize) -> Vec<u64> {
    let n = workers as u64;
    let base = total / n;
    let extra = total % n;
    (0..n).map(|i| base + u64::from(i < extra)).collect()
}

/// Estimate the PLR of `params` at normalized `load`.
///
/// Returns the merged result of all workers. Configuration problems found
/// while building frames abort the run and no partial result is returned.
pub fn run_monte_carlo(
    params: &SimulationParameters,
    load: f64,
    cfg: &MonteCarloConfig,
) -> Result<PlrResult, SimError> {
    cfg.validate()?;
    if !load.is_finite() || load < 0.0 {
        return Err(ConfigError::InvalidValue {
            field: "load",
            reason: format!("must be finite and >= 0, got {load}"),
        }
        .into());
    }

    let mean_users = params.mean_users(load);
    let total_frames = params.max_simulated_frames();
    let workers = cfg
        .workers
        .min(usize::try_from(total_frames).unwrap_or(usize::MAX))
        .max(1);

    events::monte_carlo_started(load, mean_users, workers, total_frames);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("slotsim-worker-{i}"))
        .build()
        .map_err(|e| SimError::WorkerPool(e.to_string()))?;

    let shared = Mutex::new(Shared::default());
    let chunks = chunk_frames(total_frames, workers);

    pool.scope(|scope| {
        for (worker, frames) in chunks.into_iter().enumerate() {
            let shared = &shared;
            scope.spawn(move |_| {
                if let Err(err) = run_worker(params, mean_users, cfg, worker, frames, shared) {
                    lock(shared).error.get_or_insert(err);
                }
            });
        }
    });

    let shared = shared.into_inner().unwrap_or_else(PoisonError::into_inner);
    if let Some(err) = shared.error {
        return Err(err.into());
    }

    events::monte_carlo_completed(load, &shared.result);
    Ok(shared.result)
}

fn run_worker(
    params: &SimulationParameters,
    mean_users: f64,
    cfg: &MonteCarloConfig,
    worker: usize,
    frames: u64,
    shared: &Mutex<Shared>,
) -> Result<(), ConfigError> {
    let span = worker_span(worker, frames);
    let _guard = span.enter();

    let scheme = params.scheme();
    let mut rng = worker_rng(cfg.seed, worker);
    let mut arena = FrameArena::for_scheme(scheme, params.ra_slots());
    let mut decoder = SicDecoder::new(params);
    let mut local = PlrResult::default();

    let mut done = 0u64;
    while done < frames {
        let batch = cfg.batch_size.min(frames - done);
        let mut partial = PlrResult::default();
        for _ in 0..batch {
            arena.reset();
            let nusers = draw_user_count(mean_users, params.poisson(), &mut rng);
            if nusers == 0 {
                continue;
            }
            let frame = arena.build(
                scheme,
                params.power_strategy(),
                params.power_distribution(),
                nusers,
                &mut rng,
            )?;
            let ndecoded = decoder.decode(&frame, &mut rng);
            partial.record_frame(nusers, ndecoded);
        }
        done += batch;

        match merge_batch(shared, partial, params.max_errored_frames()) {
            AfterMerge::Continue => {
                local += partial;
                trace!(worker, batch, done, "Merged sub-batch into shared result");
            }
            AfterMerge::Exhausted(merged_errors) => {
                local += partial;
                events::early_stop(worker, merged_errors, params.max_errored_frames());
                break;
            }
            AfterMerge::Aborted => break,
        }
    }

    events::worker_finished(worker, &local);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotsim_core::{PlrModel, Scheme};

    #[test]
    fn test_chunks_cover_budget() {
        assert_eq!(chunk_frames(10, 3), vec![4, 3, 3]);
        assert_eq!(chunk_frames(2, 2), vec![1, 1]);
        assert_eq!(chunk_frames(7, 1), vec![7]);
        for workers in 1..9 {
            assert_eq!(chunk_frames(1_001, workers).iter().sum::<u64>(), 1_001);
        }
    }

    #[test]
    fn test_merge_batch_stops_at_errored_budget() {
        let shared = Mutex::new(Shared::default());
        assert_eq!(
            merge_batch(&shared, PlrResult::new(5, 1, 9, 10), 2),
            AfterMerge::Continue
        );
        assert_eq!(
            merge_batch(&shared, PlrResult::new(5, 1, 9, 10), 2),
            AfterMerge::Exhausted(2)
        );
        assert_eq!(lock(&shared).result, PlrResult::new(10, 2, 18, 20));
    }

    #[test]
    fn test_merge_batch_after_failure_discards_partial() {
        let shared = Mutex::new(Shared::default());
        lock(&shared).error = Some(ConfigError::InvalidValue {
            field: "freq_slots",
            reason: "must be >= 1".to_string(),
        });
        assert_eq!(
            merge_batch(&shared, PlrResult::new(5, 0, 10, 10), 100),
            AfterMerge::Aborted
        );
        assert_eq!(lock(&shared).result, PlrResult::default());
    }

    #[test]
    fn test_config_validation() {
        assert!(MonteCarloConfig::default().validate().is_ok());
        assert!(MonteCarloConfig::default().workers >= 1);
        assert!(MonteCarloConfig::default().with_workers(0).validate().is_err());
        assert!(MonteCarloConfig::default().with_batch_size(0).validate().is_err());
    }

    #[test]
    fn test_rejects_negative_load() {
        let params = SimulationParameters::builder(Scheme::crdsa(2))
            .nslots(10)
            .plr_model(PlrModel::Collision)
            .build()
            .unwrap();
        let err = run_monte_carlo(&params, -1.0, &MonteCarloConfig::default()).unwrap_err();
        assert!(matches!(err, SimError::Configuration(_)));
    }

    #[test]
    fn test_zero_load_simulates_nothing() {
        let params = SimulationParameters::builder(Scheme::crdsa(2))
            .nslots(10)
            .max_simulated_frames(100)
            .build()
            .unwrap();
        let cfg = MonteCarloConfig::default().with_workers(2);
        let result = run_monte_carlo(&params, 0.0, &cfg).unwrap();
        assert_eq!(result, PlrResult::default());
    }

    #[test]
    fn test_more_workers_than_frames() {
        let params = SimulationParameters::builder(Scheme::crdsa(1))
            .nslots(50)
            .poisson(false)
            .coderate(0.5)
            .max_simulated_frames(3)
            .plr_model(PlrModel::Collision)
            .build()
            .unwrap();
        let cfg = MonteCarloConfig::default().with_workers(16);
        // one user per frame
        let result = run_monte_carlo(&params, 0.02, &cfg).unwrap();
        assert_eq!(result.simulated_frames, 3);
        assert_eq!(result.total_sent, 3);
        assert_eq!(result.total_decoded, 3);
    }
}
