//! PLR-vs-load sweeps
//!
//! A [`LoadSweep`] holds one [`LoadPoint`] per offered load. Running the sweep
//! fills in every point that has not been simulated yet; points that already
//! carry a valid result are left untouched, so a sweep can be extended with
//! new loads and run again.

use serde::{Deserialize, Serialize};
use slotsim_core::logging::{events, sweep_span};
use slotsim_core::{extract_plr, PlrResult, SimError, SimulationParameters};

use crate::montecarlo::{run_monte_carlo, MonteCarloConfig};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadPoint {
    /// Normalized offered load (packets per user slot).
    load: f64,
    pub result: PlrResult,
}

impl LoadPoint {
    /// Point that has not been simulated yet.
    pub fn new(load: f64) -> Self {
        Self {
            load,
            result: PlrResult::default(),
        }
    }

    pub fn load(&self) -> f64 {
        self.load
    }

    pub fn is_simulated(&self) -> bool {
        self.result.is_valid()
    }

    pub fn plr(&self) -> f64 {
        extract_plr(&self.result)
    }

    /// Normalized throughput `load * (1 - PLR)`.
    pub fn throughput(&self) -> f64 {
        self.load * (1.0 - self.plr())
    }
}

#[derive(Debug, Clone)]
pub struct LoadSweep {
    pub params: SimulationParameters,
    pub points: Vec<LoadPoint>,
}

#[derive(Serialize)]
struct SweepReport<'a> {
    scheme: &'a slotsim_core::Scheme,
    points: Vec<ReportPoint>,
}

#[derive(Serialize)]
struct ReportPoint {
    load: f64,
    plr: Option<f64>,
    throughput: Option<f64>,
    result: PlrResult,
}

impl LoadSweep {
    pub fn new(params: SimulationParameters, loads: impl IntoIterator<Item = f64>) -> Self {
        Self {
            params,
            points: loads.into_iter().map(LoadPoint::new).collect(),
        }
    }

    /// Append a load that will be simulated on the next [`LoadSweep::run`].
    pub fn push_load(&mut self, load: f64) {
        self.points.push(LoadPoint::new(load));
    }

    /// Simulate every point without a valid result, in order.
    ///
    /// Stops at the first failing point; results of earlier points are kept.
    pub fn run(&mut self, cfg: &MonteCarloConfig) -> Result<(), SimError> {
        for point in self.points.iter_mut() {
            if point.is_simulated() {
                events::point_skipped(point.load);
                continue;
            }
            let span = sweep_span(point.load);
            let _guard = span.enter();
            point.result = run_monte_carlo(&self.params, point.load, cfg)?;
        }
        Ok(())
    }

    pub fn loads(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.load).collect()
    }

    /// PLR per point; NaN for points that were never simulated.
    pub fn plr_values(&self) -> Vec<f64> {
        self.points.iter().map(LoadPoint::plr).collect()
    }

    /// Render the sweep as pretty-printed JSON.
    ///
    /// Unsimulated points report `null` PLR and throughput.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let report = SweepReport {
            scheme: self.params.scheme(),
            points: self
                .points
                .iter()
                .map(|p| ReportPoint {
                    load: p.load,
                    plr: p.is_simulated().then(|| p.plr()),
                    throughput: p.is_simulated().then(|| p.throughput()),
                    result: p.result,
                })
                .collect(),
        };
        serde_json::to_string_pretty(&report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotsim_core::Scheme;

    fn params() -> SimulationParameters {
        SimulationParameters::builder(Scheme::crdsa(2))
            .nslots(20)
            .max_simulated_frames(10)
            .build()
            .unwrap()
    }

    #[test]
    fn test_new_points_are_unsimulated() {
        let sweep = LoadSweep::new(params(), [0.1, 0.2]);
        assert_eq!(sweep.loads(), vec![0.1, 0.2]);
        assert!(sweep.points.iter().all(|p| !p.is_simulated()));
        assert!(sweep.plr_values().iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_throughput() {
        let mut point = LoadPoint::new(0.5);
        point.result = PlrResult::new(10, 2, 90, 100);
        assert!((point.throughput() - 0.45).abs() < 1e-12);
    }

    #[test]
    fn test_run_keeps_requested_loads() {
        let mut sweep = LoadSweep::new(params(), [0.2]);
        sweep.push_load(0.4);
        sweep
            .run(&MonteCarloConfig::default().with_workers(2).with_seed(3))
            .unwrap();
        assert_eq!(sweep.loads(), vec![0.2, 0.4]);
        assert_eq!(sweep.points[1].load(), 0.4);
        assert!(sweep.points.iter().all(LoadPoint::is_simulated));
    }

    #[test]
    fn test_json_report() {
        let mut sweep = LoadSweep::new(params(), [0.3]);
        sweep.points[0].result = PlrResult::new(4, 1, 30, 40);
        sweep.push_load(0.6);

        let json = sweep.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let points = value["points"].as_array().unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0]["plr"].as_f64().unwrap(), 0.25);
        assert_eq!(points[0]["result"]["total_sent"].as_u64().unwrap(), 40);
        assert!(points[1]["plr"].is_null());
        assert!(value["scheme"]["Crdsa"].is_object());
    }
}
