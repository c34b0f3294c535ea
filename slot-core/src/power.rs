//! Replica power assignment

use rand::Rng;
use rand_distr::Distribution;
use serde::{Deserialize, Serialize};

use crate::dists::PowerDistribution;

/// Power value marking an unused replica position.
pub const POWER_SENTINEL: f64 = f64::NAN;

/// Whether the replicas of one user share a power draw
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerStrategy {
    /// One draw per user, copied to every replica.
    #[default]
    SamePower,
    /// One independent draw per replica.
    IndependentPower,
}

/// Fill `out` with replica powers for one user.
///
/// The first `effective` entries get finite, non-negative powers; the rest are
/// set to [`POWER_SENTINEL`]. Negative or non-finite draws are clamped to zero.
pub fn assign_powers<R: Rng + ?Sized>(
    strategy: PowerStrategy,
    distribution: &PowerDistribution,
    effective: usize,
    rng: &mut R,
    out: &mut [f64],
) {
    assert!(
        effective <= out.len(),
        "effective replica count {effective} exceeds buffer of {}",
        out.len()
    );
    out.fill(POWER_SENTINEL);
    if effective == 0 {
        return;
    }

    match strategy {
        PowerStrategy::SamePower => {
            let power = sanitize(distribution.sample(rng));
            out[..effective].fill(power);
        }
        PowerStrategy::IndependentPower => {
            for p in out[..effective].iter_mut() {
                *p = sanitize(distribution.sample(rng));
            }
        }
    }
}

fn sanitize(power: f64) -> f64 {
    if power.is_finite() && power > 0.0 {
        power
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::randomness::seeded_rng;

    #[test]
    fn test_same_power_replicates_one_draw() {
        let dist = PowerDistribution::log_uniform_db(0.0, 20.0).unwrap();
        let mut rng = seeded_rng(1);
        let mut out = [0.0; 4];
        assign_powers(PowerStrategy::SamePower, &dist, 3, &mut rng, &mut out);
        assert_eq!(out[0], out[1]);
        assert_eq!(out[1], out[2]);
        assert!(out[3].is_nan());
    }

    #[test]
    fn test_independent_power_draws_each_replica() {
        let dist = PowerDistribution::log_uniform_db(0.0, 20.0).unwrap();
        let mut rng = seeded_rng(2);
        let mut out = [0.0; 3];
        assign_powers(PowerStrategy::IndependentPower, &dist, 3, &mut rng, &mut out);
        assert!(out.iter().all(|p| p.is_finite() && *p >= 1.0));
        assert!(out[0] != out[1] || out[1] != out[2]);
    }

    #[test]
    fn test_invalid_draws_are_clamped() {
        let dist = PowerDistribution::custom(|_| -3.0);
        let mut rng = seeded_rng(3);
        let mut out = [1.0; 2];
        assign_powers(PowerStrategy::IndependentPower, &dist, 2, &mut rng, &mut out);
        assert_eq!(out, [0.0, 0.0]);

        let dist = PowerDistribution::custom(|_| f64::INFINITY);
        assign_powers(PowerStrategy::SamePower, &dist, 1, &mut rng, &mut out);
        assert_eq!(out[0], 0.0);
        assert!(out[1].is_nan());
    }

    #[test]
    fn test_zero_effective_is_all_sentinel() {
        let dist = PowerDistribution::default();
        let mut rng = seeded_rng(4);
        let mut out = [1.0; 2];
        assign_powers(PowerStrategy::SamePower, &dist, 0, &mut rng, &mut out);
        assert!(out.iter().all(|p| p.is_nan()));
    }
}
