//! Distributions for received replica power and per-frame user counts
//!
//! Power distributions describe the received power of one replica, in linear
//! units relative to the noise variance. User counts are drawn from a Poisson
//! law or rounded deterministically from the mean offered load.

use std::fmt;
use std::sync::Arc;

use rand::{Rng, RngCore};
use rand_distr::{Distribution, Poisson, Uniform};

use crate::error::ConfigError;

/// User-supplied power sampler.
pub type PowerSampler = Arc<dyn Fn(&mut dyn RngCore) -> f64 + Send + Sync>;

/// Distribution of the received power of a replica
#[derive(Clone)]
pub enum PowerDistribution {
    /// Point mass: every draw returns the same power.
    Dirac(f64),
    /// Power uniform in dB over `[min_db, max_db]`, returned in linear scale.
    LogUniformDb { min_db: f64, max_db: f64 },
    /// Power uniform in linear scale over `[low, high]`.
    Uniform { low: f64, high: f64 },
    /// Arbitrary sampler provided by the caller.
    Custom(PowerSampler),
}

impl PowerDistribution {
    /// Point mass at `power`
    pub fn dirac(power: f64) -> Result<Self, ConfigError> {
        if !power.is_finite() || power < 0.0 {
            return Err(ConfigError::InvalidDistribution(format!(
                "dirac power must be finite and non-negative, got {power}"
            )));
        }
        Ok(PowerDistribution::Dirac(power))
    }

    /// Log-uniform in dB between `min_db` and `max_db` (inclusive)
    pub fn log_uniform_db(min_db: f64, max_db: f64) -> Result<Self, ConfigError> {
        let dist = PowerDistribution::LogUniformDb { min_db, max_db };
        dist.validate()?;
        Ok(dist)
    }

    /// Uniform in linear scale between `low` and `high`
    pub fn uniform(low: f64, high: f64) -> Result<Self, ConfigError> {
        let dist = PowerDistribution::Uniform { low, high };
        dist.validate()?;
        Ok(dist)
    }

    /// Wrap a caller-provided sampler
    pub fn custom<F>(sampler: F) -> Self
    where
        F: Fn(&mut dyn RngCore) -> f64 + Send + Sync + 'static,
    {
        PowerDistribution::Custom(Arc::new(sampler))
    }

    /// Check parameters of the built-in variants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            PowerDistribution::Dirac(power) => {
                if !power.is_finite() || power < 0.0 {
                    return Err(ConfigError::InvalidDistribution(format!(
                        "dirac power must be finite and non-negative, got {power}"
                    )));
                }
            }
            PowerDistribution::LogUniformDb { min_db, max_db } => {
                if !min_db.is_finite() || !max_db.is_finite() || min_db > max_db {
                    return Err(ConfigError::InvalidDistribution(format!(
                        "log-uniform bounds must be finite with min <= max, got [{min_db}, {max_db}] dB"
                    )));
                }
            }
            PowerDistribution::Uniform { low, high } => {
                if !low.is_finite() || !high.is_finite() || low < 0.0 || low > high {
                    return Err(ConfigError::InvalidDistribution(format!(
                        "uniform bounds must satisfy 0 <= low <= high, got [{low}, {high}]"
                    )));
                }
            }
            PowerDistribution::Custom(_) => {}
        }
        Ok(())
    }
}

impl Distribution<f64> for PowerDistribution {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            PowerDistribution::Dirac(power) => *power,
            PowerDistribution::LogUniformDb { min_db, max_db } => {
                let db = if min_db < max_db {
                    rng.sample(Uniform::new_inclusive(*min_db, *max_db))
                } else {
                    *min_db
                };
                10f64.powf(db / 10.0)
            }
            PowerDistribution::Uniform { low, high } => {
                if low < high {
                    rng.sample(Uniform::new_inclusive(*low, *high))
                } else {
                    *low
                }
            }
            PowerDistribution::Custom(sampler) => {
                let mut rng = rng;
                sampler(&mut rng)
            }
        }
    }
}

impl Default for PowerDistribution {
    fn default() -> Self {
        PowerDistribution::Dirac(1.0)
    }
}

impl fmt::Debug for PowerDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PowerDistribution::Dirac(power) => f.debug_tuple("Dirac").field(power).finish(),
            PowerDistribution::LogUniformDb { min_db, max_db } => f
                .debug_struct("LogUniformDb")
                .field("min_db", min_db)
                .field("max_db", max_db)
                .finish(),
            PowerDistribution::Uniform { low, high } => f
                .debug_struct("Uniform")
                .field("low", low)
                .field("high", high)
                .finish(),
            PowerDistribution::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Draw the number of users contending in one frame.
///
/// With `poisson` the count is Poisson(`mean`); otherwise it is `mean`
/// rounded to the nearest integer. A non-positive mean yields zero users.
pub fn draw_user_count<R: Rng + ?Sized>(mean: f64, poisson: bool, rng: &mut R) -> usize {
    if !(mean > 0.0) || !mean.is_finite() {
        return 0;
    }
    if !poisson {
        return mean.round() as usize;
    }
    match Poisson::new(mean) {
        Ok(dist) => {
            let n: f64 = dist.sample(rng);
            n as usize
        }
        Err(_) => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::randomness::seeded_rng;

    #[test]
    fn test_dirac_always_same() {
        let dist = PowerDistribution::dirac(2.5).unwrap();
        let mut rng = seeded_rng(1);
        for _ in 0..10 {
            assert_eq!(dist.sample(&mut rng), 2.5);
        }
    }

    #[test]
    fn test_dirac_rejects_negative() {
        assert!(PowerDistribution::dirac(-1.0).is_err());
        assert!(PowerDistribution::dirac(f64::NAN).is_err());
    }

    #[test]
    fn test_log_uniform_within_bounds() {
        let dist = PowerDistribution::log_uniform_db(0.0, 10.0).unwrap();
        let mut rng = seeded_rng(7);
        for _ in 0..200 {
            let p = dist.sample(&mut rng);
            assert!((1.0..=10.0 + 1e-9).contains(&p), "p={p}");
        }
    }

    #[test]
    fn test_log_uniform_degenerate_range() {
        let dist = PowerDistribution::log_uniform_db(3.0, 3.0).unwrap();
        let mut rng = seeded_rng(7);
        let p = dist.sample(&mut rng);
        assert!((p - 10f64.powf(0.3)).abs() < 1e-12);
    }

    #[test]
    fn test_log_uniform_invalid_range() {
        assert!(PowerDistribution::log_uniform_db(5.0, 1.0).is_err());
    }

    #[test]
    fn test_uniform_within_bounds() {
        let dist = PowerDistribution::uniform(0.5, 1.5).unwrap();
        let mut rng = seeded_rng(3);
        for _ in 0..100 {
            let p = dist.sample(&mut rng);
            assert!((0.5..=1.5).contains(&p));
        }
    }

    #[test]
    fn test_custom_sampler_uses_rng() {
        let dist = PowerDistribution::custom(|rng| (rng.next_u32() % 4) as f64);
        let mut rng = seeded_rng(11);
        for _ in 0..20 {
            let p = dist.sample(&mut rng);
            assert!((0.0..4.0).contains(&p));
        }
        assert_eq!(format!("{dist:?}"), "Custom(..)");
    }

    #[test]
    fn test_deterministic_user_count_rounds() {
        let mut rng = seeded_rng(0);
        assert_eq!(draw_user_count(4.0, false, &mut rng), 4);
        assert_eq!(draw_user_count(2.6, false, &mut rng), 3);
        assert_eq!(draw_user_count(0.0, false, &mut rng), 0);
        assert_eq!(draw_user_count(0.0, true, &mut rng), 0);
    }

    #[test]
    fn test_poisson_user_count_mean() {
        let mut rng = seeded_rng(5);
        let n = 5_000;
        let total: usize = (0..n).map(|_| draw_user_count(8.0, true, &mut rng)).sum();
        let mean = total as f64 / n as f64;
        assert!((mean - 8.0).abs() < 0.3, "mean={mean}");
    }
}
