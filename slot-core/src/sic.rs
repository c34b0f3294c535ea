//! Successive interference cancellation decoder
//!
//! Each round tries every still-undecoded user on its replicas in placement
//! order, then cancels the power of newly decoded users from the slots they
//! occupy. A replica is only re-evaluated when its slot changed since the last
//! round: its SNIR is otherwise identical and the outcome has already been
//! drawn.

use rand::Rng;

use crate::frame::Frame;
use crate::params::SimulationParameters;
use crate::plr::PlrModel;

/// Relative tolerance for "no other user in this slot" under the collision model.
const COLLISION_TOLERANCE: f64 = 1e-9;

/// Decoder configuration plus frame-scoped scratch reused across frames
#[derive(Debug, Clone)]
pub struct SicDecoder {
    noise_variance: f64,
    iterations: usize,
    coding_gain: f64,
    plr_model: PlrModel,
    cap: Option<usize>,

    slot_power: Vec<f64>,
    decoded: Vec<bool>,
    cancelled: Vec<bool>,
    interference_changed: Vec<bool>,
}

impl SicDecoder {
    pub fn new(params: &SimulationParameters) -> Self {
        Self {
            noise_variance: params.noise_variance(),
            iterations: params.sic_iterations(),
            coding_gain: params.coding_gain(),
            plr_model: params.plr_model().clone(),
            cap: params.scheme().decoded_cap(),
            slot_power: Vec::new(),
            decoded: Vec::new(),
            cancelled: Vec::new(),
            interference_changed: Vec::new(),
        }
    }

    /// Same decoder with a different iteration cap.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Per-user decoded flags of the last decoded frame.
    pub fn decoded_flags(&self) -> &[bool] {
        &self.decoded
    }

    /// Decode `frame` and return the number of decoded users.
    ///
    /// The count is clamped to the scheme's downstream capacity, if any.
    ///
    /// # Panics
    ///
    /// Panics if the number of user realizations differs from the number of
    /// rows of the power matrix.
    pub fn decode<R: Rng + ?Sized>(&mut self, frame: &Frame<'_>, rng: &mut R) -> usize {
        let nusers = frame.nusers();
        assert_eq!(
            nusers,
            frame.row_count(),
            "user list length does not match power matrix rows"
        );

        self.reset(frame);
        let mut ndecoded = 0usize;

        for _ in 0..self.iterations {
            // Decode pass
            let mut progress = false;
            for user in 0..nusers {
                if self.decoded[user] {
                    continue;
                }
                for replica in frame.user(user).active() {
                    let idx = replica.slot - 1;
                    if !self.interference_changed[idx] {
                        continue;
                    }
                    if self.try_replica(replica.power, self.slot_power[idx], rng) {
                        self.decoded[user] = true;
                        ndecoded += 1;
                        progress = true;
                        break;
                    }
                }
            }

            self.interference_changed.fill(false);

            // Cancellation pass
            for user in 0..nusers {
                if !self.decoded[user] || self.cancelled[user] {
                    continue;
                }
                for replica in frame.user(user).active() {
                    let idx = replica.slot - 1;
                    self.slot_power[idx] -= replica.power;
                    self.interference_changed[idx] = true;
                }
                self.cancelled[user] = true;
            }

            if ndecoded == nusers || !progress {
                break;
            }
        }

        match self.cap {
            Some(cap) => ndecoded.min(cap),
            None => ndecoded,
        }
    }

    fn reset(&mut self, frame: &Frame<'_>) {
        let nslots = frame.nslots();
        let nusers = frame.nusers();

        self.slot_power.clear();
        self.slot_power
            .extend((1..=nslots).map(|s| frame.slot_power(s) + self.noise_variance));

        self.decoded.clear();
        self.decoded.resize(nusers, false);
        self.cancelled.clear();
        self.cancelled.resize(nusers, false);
        self.interference_changed.clear();
        self.interference_changed.resize(nslots, true);
    }

    fn try_replica<R: Rng + ?Sized>(&self, power: f64, slot_power: f64, rng: &mut R) -> bool {
        let interference = slot_power - power;
        match &self.plr_model {
            PlrModel::Collision => {
                let tolerance = COLLISION_TOLERANCE * slot_power.abs().max(1.0);
                power > 0.0 && (interference - self.noise_variance).abs() <= tolerance
            }
            model => {
                let snir = if interference > 0.0 {
                    power / interference
                } else {
                    f64::INFINITY
                };
                let ebno = snir * self.coding_gain;
                let loss = model.loss_probability(ebno).unwrap_or(1.0);
                rng.gen::<f64>() >= loss
            }
        }
    }
}
