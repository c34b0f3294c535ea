//! Simulation parameters and their builder
//!
//! Parameters are validated once, in [`SimulationParametersBuilder::build`],
//! and are immutable afterwards.
//!
//! # Example
//!
//! ```
//! use slotsim_core::params::SimulationParameters;
//! use slotsim_core::scheme::Scheme;
//!
//! let params = SimulationParameters::builder(Scheme::crdsa(2))
//!     .nslots(100)
//!     .max_simulated_frames(1_000)
//!     .build()
//!     .expect("valid parameters");
//! assert_eq!(params.ra_slots(), 100);
//! ```

use crate::dists::PowerDistribution;
use crate::error::ConfigError;
use crate::plr::{PlrCurve, PlrModel};
use crate::power::PowerStrategy;
use crate::scheme::Scheme;

pub const DEFAULT_CODERATE: f64 = 1.0 / 3.0;
pub const DEFAULT_MODULATION_ORDER: u32 = 4;
pub const DEFAULT_SIC_ITERATIONS: usize = 15;
pub const DEFAULT_MAX_ERRORED_FRAMES: u64 = 10_000;
pub const DEFAULT_MAX_SIMULATED_FRAMES: u64 = 100_000;
pub const DEFAULT_NOISE_VARIANCE: f64 = 1.0;

/// Immutable configuration of one Monte-Carlo experiment
#[derive(Debug, Clone)]
pub struct SimulationParameters {
    scheme: Scheme,
    nslots: Option<usize>,
    poisson: bool,
    coderate: f64,
    modulation_order: u32,
    overhead: f64,
    noise_variance: f64,
    power_distribution: PowerDistribution,
    power_strategy: PowerStrategy,
    max_simulated_frames: u64,
    sic_iterations: usize,
    max_errored_frames: u64,
    plr_model: PlrModel,
}

impl SimulationParameters {
    pub fn builder(scheme: Scheme) -> SimulationParametersBuilder {
        SimulationParametersBuilder::new(scheme)
    }

    pub fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    /// Nominal slot count; `None` for RA4Step.
    pub fn nslots(&self) -> Option<usize> {
        self.nslots
    }

    pub fn poisson(&self) -> bool {
        self.poisson
    }

    pub fn coderate(&self) -> f64 {
        self.coderate
    }

    pub fn modulation_order(&self) -> u32 {
        self.modulation_order
    }

    pub fn overhead(&self) -> f64 {
        self.overhead
    }

    pub fn noise_variance(&self) -> f64 {
        self.noise_variance
    }

    pub fn power_distribution(&self) -> &PowerDistribution {
        &self.power_distribution
    }

    pub fn power_strategy(&self) -> PowerStrategy {
        self.power_strategy
    }

    pub fn max_simulated_frames(&self) -> u64 {
        self.max_simulated_frames
    }

    pub fn sic_iterations(&self) -> usize {
        self.sic_iterations
    }

    pub fn max_errored_frames(&self) -> u64 {
        self.max_errored_frames
    }

    pub fn plr_model(&self) -> &PlrModel {
        &self.plr_model
    }

    /// SNIR to Eb/N0 factor used inside the decoder: `1 / (coderate * log2 M)`.
    ///
    /// The overhead term is excluded here; it only scales the offered load.
    pub fn coding_gain(&self) -> f64 {
        1.0 / (self.coderate * f64::from(self.modulation_order).log2())
    }

    /// Slot space replicas are drawn from.
    pub fn ra_slots(&self) -> usize {
        self.scheme.ra_slots(self.nslots.unwrap_or(0))
    }

    /// Slot count used to normalize the offered load.
    pub fn user_slots(&self) -> usize {
        self.scheme.user_slots(self.nslots.unwrap_or(0))
    }

    /// Mean users per frame at normalized `load`:
    /// `user_slots * load * coding_gain * (1 + overhead)`.
    pub fn mean_users(&self, load: f64) -> f64 {
        self.user_slots() as f64 * load * self.coding_gain() * (1.0 + self.overhead)
    }
}

/// Builder for [`SimulationParameters`] with documented defaults
#[derive(Debug, Clone)]
pub struct SimulationParametersBuilder {
    scheme: Scheme,
    nslots: Option<usize>,
    poisson: bool,
    coderate: f64,
    modulation_order: u32,
    overhead: f64,
    noise_variance: f64,
    power_distribution: PowerDistribution,
    power_strategy: PowerStrategy,
    max_simulated_frames: u64,
    sic_iterations: usize,
    max_errored_frames: u64,
    plr_model: Option<PlrModel>,
}

impl SimulationParametersBuilder {
    pub fn new(scheme: Scheme) -> Self {
        Self {
            scheme,
            nslots: None,
            poisson: true,
            coderate: DEFAULT_CODERATE,
            modulation_order: DEFAULT_MODULATION_ORDER,
            overhead: 0.0,
            noise_variance: DEFAULT_NOISE_VARIANCE,
            power_distribution: PowerDistribution::default(),
            power_strategy: PowerStrategy::default(),
            max_simulated_frames: DEFAULT_MAX_SIMULATED_FRAMES,
            sic_iterations: DEFAULT_SIC_ITERATIONS,
            max_errored_frames: DEFAULT_MAX_ERRORED_FRAMES,
            plr_model: None,
        }
    }

    /// Slots per frame; mandatory for CRDSA and MF-CRDSA, forbidden for RA4Step.
    pub fn nslots(mut self, nslots: usize) -> Self {
        self.nslots = Some(nslots);
        self
    }

    pub fn poisson(mut self, poisson: bool) -> Self {
        self.poisson = poisson;
        self
    }

    pub fn coderate(mut self, coderate: f64) -> Self {
        self.coderate = coderate;
        self
    }

    pub fn modulation_order(mut self, modulation_order: u32) -> Self {
        self.modulation_order = modulation_order;
        self
    }

    pub fn overhead(mut self, overhead: f64) -> Self {
        self.overhead = overhead;
        self
    }

    pub fn noise_variance(mut self, noise_variance: f64) -> Self {
        self.noise_variance = noise_variance;
        self
    }

    pub fn power_distribution(mut self, distribution: PowerDistribution) -> Self {
        self.power_distribution = distribution;
        self
    }

    pub fn power_strategy(mut self, strategy: PowerStrategy) -> Self {
        self.power_strategy = strategy;
        self
    }

    pub fn max_simulated_frames(mut self, frames: u64) -> Self {
        self.max_simulated_frames = frames;
        self
    }

    pub fn sic_iterations(mut self, iterations: usize) -> Self {
        self.sic_iterations = iterations;
        self
    }

    pub fn max_errored_frames(mut self, frames: u64) -> Self {
        self.max_errored_frames = frames;
        self
    }

    /// Override the PLR model; without it the default curve for
    /// `(coderate, modulation_order)` is used.
    pub fn plr_model(mut self, model: PlrModel) -> Self {
        self.plr_model = Some(model);
        self
    }

    /// Check every field and their combinations.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scheme.validate(self.nslots)?;

        if !(self.coderate > 0.0 && self.coderate <= 1.0) {
            return Err(ConfigError::invalid(
                "coderate",
                format!("must be in (0, 1], got {}", self.coderate),
            ));
        }
        if self.modulation_order < 2 {
            return Err(ConfigError::invalid(
                "modulation_order",
                format!("must be >= 2, got {}", self.modulation_order),
            ));
        }
        if !self.overhead.is_finite() || self.overhead < 0.0 {
            return Err(ConfigError::invalid(
                "overhead",
                format!("must be finite and >= 0, got {}", self.overhead),
            ));
        }
        if !self.noise_variance.is_finite() || self.noise_variance < 0.0 {
            return Err(ConfigError::invalid(
                "noise_variance",
                format!("must be finite and >= 0, got {}", self.noise_variance),
            ));
        }
        if self.max_simulated_frames == 0 {
            return Err(ConfigError::invalid("max_simulated_frames", "must be >= 1"));
        }
        if self.sic_iterations == 0 {
            return Err(ConfigError::invalid("sic_iterations", "must be >= 1"));
        }
        self.power_distribution.validate()?;
        Ok(())
    }

    pub fn build(self) -> Result<SimulationParameters, ConfigError> {
        self.validate()?;

        let plr_model = match self.plr_model {
            Some(model) => model,
            None => PlrCurve::default_for(self.coderate, self.modulation_order)
                .map(PlrModel::Curve)
                .ok_or(ConfigError::UnsupportedCoderate {
                    coderate: self.coderate,
                    modulation_order: self.modulation_order,
                })?,
        };

        Ok(SimulationParameters {
            scheme: self.scheme,
            nslots: self.nslots,
            poisson: self.poisson,
            coderate: self.coderate,
            modulation_order: self.modulation_order,
            overhead: self.overhead,
            noise_variance: self.noise_variance,
            power_distribution: self.power_distribution,
            power_strategy: self.power_strategy,
            max_simulated_frames: self.max_simulated_frames,
            sic_iterations: self.sic_iterations,
            max_errored_frames: self.max_errored_frames,
            plr_model,
        })
    }
}
