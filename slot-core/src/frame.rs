//! User realizations and the per-frame power matrix
//!
//! A [`FrameArena`] is owned by one worker and reused for every frame it
//! simulates. Building a frame resets the arena, so buffers keep their
//! capacity and the hot loop does not allocate once the largest frame seen so
//! far fits.

use rand::Rng;

use crate::dists::PowerDistribution;
use crate::error::ConfigError;
use crate::power::{assign_powers, PowerStrategy, POWER_SENTINEL};
use crate::scheme::{Scheme, SLOT_SENTINEL};

/// One replica of a user's packet: a 1-based slot and a received power
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Replica {
    pub slot: usize,
    pub power: f64,
}

impl Replica {
    /// Padding for replica positions beyond the user's active count.
    pub const SENTINEL: Replica = Replica {
        slot: SLOT_SENTINEL,
        power: POWER_SENTINEL,
    };

    pub fn new(slot: usize, power: f64) -> Self {
        Self { slot, power }
    }

    /// Sentinel entries are never decodable.
    pub fn is_active(&self) -> bool {
        self.slot != SLOT_SENTINEL && self.power.is_finite()
    }
}

/// Read-only view of the replicas of one user in one frame
#[derive(Debug, Clone, Copy)]
pub struct UserRealization<'a> {
    replicas: &'a [Replica],
}

impl<'a> UserRealization<'a> {
    pub fn new(replicas: &'a [Replica]) -> Self {
        Self { replicas }
    }

    /// All positions, sentinels included.
    pub fn replicas(&self) -> &'a [Replica] {
        self.replicas
    }

    /// Active replicas in placement order.
    pub fn active(&self) -> impl Iterator<Item = &'a Replica> + 'a {
        self.replicas.iter().filter(|r| r.is_active())
    }

    pub fn active_count(&self) -> usize {
        self.active().count()
    }
}

/// A built frame: `nusers x nslots` power matrix plus the realizations that produced it
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    nslots: usize,
    max_replicas: usize,
    power: &'a [f64],
    replicas: &'a [Replica],
}

impl<'a> Frame<'a> {
    /// Assemble a frame from a row-major power matrix and a flat replica table.
    ///
    /// `replicas` holds `max_replicas` entries per user. The matrix row count
    /// and the user count are not required to agree here; the decoder checks.
    pub fn new(nslots: usize, max_replicas: usize, power: &'a [f64], replicas: &'a [Replica]) -> Self {
        assert!(max_replicas > 0, "max_replicas must be >= 1");
        assert_eq!(
            replicas.len() % max_replicas,
            0,
            "replica table is not a whole number of users"
        );
        Self {
            nslots,
            max_replicas,
            power,
            replicas,
        }
    }

    /// Number of user realizations.
    pub fn nusers(&self) -> usize {
        self.replicas.len() / self.max_replicas
    }

    pub fn nslots(&self) -> usize {
        self.nslots
    }

    pub fn max_replicas(&self) -> usize {
        self.max_replicas
    }

    /// Number of rows in the power matrix.
    pub fn row_count(&self) -> usize {
        if self.nslots == 0 {
            0
        } else {
            self.power.len() / self.nslots
        }
    }

    pub fn user(&self, user: usize) -> UserRealization<'a> {
        let start = user * self.max_replicas;
        UserRealization::new(&self.replicas[start..start + self.max_replicas])
    }

    pub fn users(&self) -> impl Iterator<Item = UserRealization<'a>> + 'a {
        self.replicas
            .chunks_exact(self.max_replicas)
            .map(UserRealization::new)
    }

    /// Matrix entry for `user` at 1-based `slot`.
    pub fn power_at(&self, user: usize, slot: usize) -> f64 {
        self.power[user * self.nslots + (slot - 1)]
    }

    /// Aggregate received power in 1-based `slot`, noise excluded.
    pub fn slot_power(&self, slot: usize) -> f64 {
        (0..self.row_count()).map(|u| self.power_at(u, slot)).sum()
    }

    /// Row-major power matrix.
    pub fn matrix(&self) -> &'a [f64] {
        self.power
    }
}

/// Reusable per-worker buffers for frame construction
#[derive(Debug)]
pub struct FrameArena {
    max_replicas: usize,
    nslots: usize,
    nusers: usize,
    power: Vec<f64>,
    replicas: Vec<Replica>,
    slot_buf: Vec<usize>,
    power_buf: Vec<f64>,
}

impl FrameArena {
    /// Arena for frames of `nslots` slots and users with up to `max_replicas` replicas.
    pub fn new(max_replicas: usize, nslots: usize) -> Self {
        assert!(max_replicas > 0, "max_replicas must be >= 1");
        Self {
            max_replicas,
            nslots,
            nusers: 0,
            power: Vec::new(),
            replicas: Vec::new(),
            slot_buf: vec![SLOT_SENTINEL; max_replicas],
            power_buf: vec![POWER_SENTINEL; max_replicas],
        }
    }

    /// Arena sized for `scheme` over `nslots` nominal slots.
    pub fn for_scheme(scheme: &Scheme, nslots: usize) -> Self {
        Self::new(scheme.max_replicas(), scheme.ra_slots(nslots))
    }

    pub fn nslots(&self) -> usize {
        self.nslots
    }

    /// Users in the most recently built frame.
    pub fn nusers(&self) -> usize {
        self.nusers
    }

    /// Forget the previous frame, keeping allocations.
    pub fn reset(&mut self) {
        self.nusers = 0;
        self.power.clear();
        self.replicas.clear();
    }

    /// Realize one user: place replicas with `scheme` and assign their powers.
    ///
    /// Writes `max_replicas` entries into `out`, sentinel-padded.
    pub fn realize_user<R: Rng + ?Sized>(
        &mut self,
        scheme: &Scheme,
        strategy: PowerStrategy,
        distribution: &PowerDistribution,
        rng: &mut R,
        out: &mut [Replica],
    ) -> Result<usize, ConfigError> {
        let effective = scheme.generate_replica_slots(self.nslots, rng, &mut self.slot_buf)?;
        assign_powers(strategy, distribution, effective, rng, &mut self.power_buf);
        for (i, r) in out.iter_mut().enumerate() {
            *r = if i < effective {
                Replica::new(self.slot_buf[i], self.power_buf[i])
            } else {
                Replica::SENTINEL
            };
        }
        Ok(effective)
    }

    fn fill_users<R: Rng + ?Sized>(
        &mut self,
        scheme: &Scheme,
        strategy: PowerStrategy,
        distribution: &PowerDistribution,
        rng: &mut R,
        table: &mut [Replica],
    ) -> Result<(), ConfigError> {
        for (user, chunk) in table.chunks_exact_mut(self.max_replicas).enumerate() {
            self.realize_user(scheme, strategy, distribution, rng, chunk)?;
            for r in chunk.iter().filter(|r| r.is_active()) {
                debug_assert!(r.slot <= self.nslots);
                self.power[user * self.nslots + (r.slot - 1)] = r.power;
            }
        }
        Ok(())
    }

    /// Build a frame of `nusers` users.
    ///
    /// Replicas of different users may share a slot; the column sum of the
    /// matrix is then the aggregate power of that slot.
    pub fn build<R: Rng + ?Sized>(
        &mut self,
        scheme: &Scheme,
        strategy: PowerStrategy,
        distribution: &PowerDistribution,
        nusers: usize,
        rng: &mut R,
    ) -> Result<Frame<'_>, ConfigError> {
        assert_eq!(
            scheme.max_replicas(),
            self.max_replicas,
            "arena sized for a different scheme"
        );
        self.reset();
        self.nusers = nusers;
        self.power.resize(nusers * self.nslots, 0.0);
        self.replicas.resize(nusers * self.max_replicas, Replica::SENTINEL);

        let mut table = std::mem::take(&mut self.replicas);
        let filled = self.fill_users(scheme, strategy, distribution, rng, &mut table);
        self.replicas = table;
        filled?;

        Ok(Frame::new(
            self.nslots,
            self.max_replicas,
            &self.power,
            &self.replicas,
        ))
    }
}
