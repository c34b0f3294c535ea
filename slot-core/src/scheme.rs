//! Random-access schemes and replica slot placement
//!
//! A [`Scheme`] decides where the replicas of one user land inside a frame.
//! Slot indices are 1-based; `0` marks an unused replica position.
//!
//! - CRDSA: `N` distinct slots drawn uniformly over the whole frame.
//! - MF-CRDSA: the frame is cut into `n_time_slots` equal blocks and each
//!   replica lands at a random offset inside its own block.
//! - RA4Step: one replica over a virtual space of `msg1_occasions * freq_slots`
//!   slots, optionally capped afterwards to the msg3 capacity.

use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Slot index marking an unused replica position.
pub const SLOT_SENTINEL: usize = 0;

/// How MF-CRDSA assigns time blocks to the replicas of a user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeSlotGenerator {
    /// Replica `i` goes to block `i` (blocks `1..=N`).
    #[default]
    Sequential,
    /// `N` distinct blocks drawn uniformly out of `n_time_slots`.
    Random,
    /// Fixed 1-based blocks, one per replica.
    Fixed(Vec<usize>),
}

/// Slotted random-access scheme
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scheme {
    Crdsa {
        max_replicas: usize,
    },
    MfCrdsa {
        max_replicas: usize,
        n_time_slots: usize,
        #[serde(default)]
        time_slot_generator: TimeSlotGenerator,
    },
    Ra4Step {
        msg1_occasions: usize,
        msg3_occasions: usize,
        freq_slots: usize,
        limit_packets: bool,
    },
}

impl Scheme {
    pub fn crdsa(max_replicas: usize) -> Self {
        Scheme::Crdsa { max_replicas }
    }

    pub fn mf_crdsa(max_replicas: usize, n_time_slots: usize) -> Self {
        Scheme::MfCrdsa {
            max_replicas,
            n_time_slots,
            time_slot_generator: TimeSlotGenerator::Sequential,
        }
    }

    pub fn ra4step(
        msg1_occasions: usize,
        msg3_occasions: usize,
        freq_slots: usize,
        limit_packets: bool,
    ) -> Self {
        Scheme::Ra4Step {
            msg1_occasions,
            msg3_occasions,
            freq_slots,
            limit_packets,
        }
    }

    /// Short scheme name for logs and reports.
    pub fn name(&self) -> &'static str {
        match self {
            Scheme::Crdsa { .. } => "CRDSA",
            Scheme::MfCrdsa { .. } => "MF-CRDSA",
            Scheme::Ra4Step { .. } => "RA4Step",
        }
    }

    /// Upper bound on replicas per user; sizes every per-user buffer.
    pub fn max_replicas(&self) -> usize {
        match *self {
            Scheme::Crdsa { max_replicas } | Scheme::MfCrdsa { max_replicas, .. } => max_replicas,
            Scheme::Ra4Step { .. } => 1,
        }
    }

    /// Width of the slot space replicas are drawn from.
    pub fn ra_slots(&self, nslots: usize) -> usize {
        match *self {
            Scheme::Crdsa { .. } | Scheme::MfCrdsa { .. } => nslots,
            Scheme::Ra4Step {
                msg1_occasions,
                freq_slots,
                ..
            } => msg1_occasions * freq_slots,
        }
    }

    /// Slot count used to normalize the offered load.
    pub fn user_slots(&self, nslots: usize) -> usize {
        match *self {
            Scheme::Crdsa { .. } | Scheme::MfCrdsa { .. } => nslots,
            Scheme::Ra4Step {
                msg3_occasions,
                freq_slots,
                ..
            } => msg3_occasions * freq_slots,
        }
    }

    /// Downstream capacity applied to the decoded count, if any.
    pub fn decoded_cap(&self) -> Option<usize> {
        match *self {
            Scheme::Ra4Step {
                msg3_occasions,
                freq_slots,
                limit_packets: true,
                ..
            } => Some(msg3_occasions * freq_slots),
            _ => None,
        }
    }

    /// Check the scheme geometry against the configured slot count.
    ///
    /// Slot-based schemes require `nslots`; RA4Step derives its own slot space
    /// and rejects an explicit one.
    pub fn validate(&self, nslots: Option<usize>) -> Result<(), ConfigError> {
        match self {
            Scheme::Crdsa { max_replicas } => {
                let nslots = nslots.ok_or(ConfigError::MissingSlots)?;
                if *max_replicas == 0 {
                    return Err(ConfigError::invalid("max_replicas", "must be >= 1"));
                }
                if nslots == 0 {
                    return Err(ConfigError::invalid("nslots", "must be >= 1"));
                }
                if *max_replicas > nslots {
                    return Err(ConfigError::TooManyReplicas {
                        max_replicas: *max_replicas,
                        available: nslots,
                        unit: "slots",
                    });
                }
                Ok(())
            }
            Scheme::MfCrdsa {
                max_replicas,
                n_time_slots,
                time_slot_generator,
            } => {
                let nslots = nslots.ok_or(ConfigError::MissingSlots)?;
                if *max_replicas == 0 {
                    return Err(ConfigError::invalid("max_replicas", "must be >= 1"));
                }
                if *n_time_slots == 0 {
                    return Err(ConfigError::invalid("n_time_slots", "must be >= 1"));
                }
                if *max_replicas > *n_time_slots {
                    return Err(ConfigError::TooManyReplicas {
                        max_replicas: *max_replicas,
                        available: *n_time_slots,
                        unit: "time slots",
                    });
                }
                block_size(nslots, *n_time_slots)?;
                if let TimeSlotGenerator::Fixed(blocks) = time_slot_generator {
                    validate_fixed_blocks(blocks, *max_replicas, *n_time_slots)?;
                }
                Ok(())
            }
            Scheme::Ra4Step {
                msg1_occasions,
                msg3_occasions,
                freq_slots,
                ..
            } => {
                if nslots.is_some() {
                    return Err(ConfigError::SlotsForbidden);
                }
                if *msg1_occasions == 0 {
                    return Err(ConfigError::invalid("msg1_occasions", "must be >= 1"));
                }
                if *msg3_occasions == 0 {
                    return Err(ConfigError::invalid("msg3_occasions", "must be >= 1"));
                }
                if *freq_slots == 0 {
                    return Err(ConfigError::invalid("freq_slots", "must be >= 1"));
                }
                Ok(())
            }
        }
    }

    /// Place the replicas of one user.
    ///
    /// `out` must hold exactly [`Scheme::max_replicas`] entries. Active entries
    /// get 1-based slot indices in `[1, ra_slots(nslots)]`; the rest are set to
    /// [`SLOT_SENTINEL`]. Returns the number of active replicas.
    pub fn generate_replica_slots<R: Rng + ?Sized>(
        &self,
        nslots: usize,
        rng: &mut R,
        out: &mut [usize],
    ) -> Result<usize, ConfigError> {
        assert_eq!(
            out.len(),
            self.max_replicas(),
            "replica buffer must hold max_replicas entries"
        );
        out.fill(SLOT_SENTINEL);

        match self {
            Scheme::Crdsa { max_replicas } => {
                if *max_replicas > nslots {
                    return Err(ConfigError::TooManyReplicas {
                        max_replicas: *max_replicas,
                        available: nslots,
                        unit: "slots",
                    });
                }
                for i in 0..*max_replicas {
                    // Resample until the slot is new for this user.
                    let slot = loop {
                        let candidate = rng.gen_range(1..=nslots);
                        if !out[..i].contains(&candidate) {
                            break candidate;
                        }
                    };
                    out[i] = slot;
                }
                Ok(*max_replicas)
            }
            Scheme::MfCrdsa {
                max_replicas,
                n_time_slots,
                time_slot_generator,
            } => {
                if *max_replicas > *n_time_slots {
                    return Err(ConfigError::TooManyReplicas {
                        max_replicas: *max_replicas,
                        available: *n_time_slots,
                        unit: "time slots",
                    });
                }
                if let TimeSlotGenerator::Fixed(blocks) = time_slot_generator {
                    validate_fixed_blocks(blocks, *max_replicas, *n_time_slots)?;
                }
                let block = block_size(nslots, *n_time_slots)?;
                for i in 0..*max_replicas {
                    out[i] = match time_slot_generator {
                        TimeSlotGenerator::Sequential => i + 1,
                        TimeSlotGenerator::Fixed(blocks) => blocks[i],
                        // filled below
                        TimeSlotGenerator::Random => 0,
                    };
                }
                if let TimeSlotGenerator::Random = time_slot_generator {
                    for (i, b) in index::sample(rng, *n_time_slots, *max_replicas)
                        .into_iter()
                        .enumerate()
                    {
                        out[i] = b + 1;
                    }
                }
                for slot in out.iter_mut() {
                    let block_index = *slot;
                    let offset = rng.gen_range(1..=block);
                    *slot = (block_index - 1) * block + offset;
                }
                Ok(*max_replicas)
            }
            Scheme::Ra4Step { .. } => {
                let space = self.ra_slots(nslots);
                if space == 0 {
                    return Err(ConfigError::invalid(
                        "msg1_occasions * freq_slots",
                        "virtual slot space must be >= 1",
                    ));
                }
                out[0] = rng.gen_range(1..=space);
                Ok(1)
            }
        }
    }
}

/// Size of one MF-CRDSA time block.
pub fn block_size(nslots: usize, n_time_slots: usize) -> Result<usize, ConfigError> {
    if n_time_slots == 0 || nslots == 0 || nslots % n_time_slots != 0 {
        return Err(ConfigError::SlotsNotMultiple {
            nslots,
            n_time_slots,
        });
    }
    Ok(nslots / n_time_slots)
}

fn validate_fixed_blocks(
    blocks: &[usize],
    max_replicas: usize,
    n_time_slots: usize,
) -> Result<(), ConfigError> {
    if blocks.len() != max_replicas {
        return Err(ConfigError::invalid(
            "time_slot_generator",
            format!("expected {max_replicas} blocks, got {}", blocks.len()),
        ));
    }
    for (i, &b) in blocks.iter().enumerate() {
        if b == 0 || b > n_time_slots {
            return Err(ConfigError::invalid(
                "time_slot_generator",
                format!("block {b} outside 1..={n_time_slots}"),
            ));
        }
        if blocks[..i].contains(&b) {
            return Err(ConfigError::invalid(
                "time_slot_generator",
                format!("block {b} repeated"),
            ));
        }
    }
    Ok(())
}
