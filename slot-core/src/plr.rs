//! Packet loss models used by the SIC decoder
//!
//! A replica is evaluated either against a PLR curve (a map from linear Eb/N0
//! to a loss probability) or against the collision model, where a replica is
//! decodable exactly when its slot carries no other user's power.

use std::fmt;

/// Loss model consulted for every evaluated replica
#[derive(Clone)]
pub enum PlrModel {
    /// Built-in curve fit.
    Curve(PlrCurve),
    /// Arbitrary function of linear Eb/N0 returning a probability.
    Function(fn(f64) -> f64),
    /// Interference-free threshold: decoded iff no other user shares the slot.
    Collision,
}

impl PlrModel {
    /// Loss probability for a replica received at `ebno` (linear).
    ///
    /// Returns `None` for the collision model, which is not probabilistic.
    pub fn loss_probability(&self, ebno: f64) -> Option<f64> {
        let p = match self {
            PlrModel::Curve(curve) => curve.evaluate(ebno),
            PlrModel::Function(f) => f(ebno),
            PlrModel::Collision => return None,
        };
        Some(clamp_probability(p))
    }

    pub fn is_collision(&self) -> bool {
        matches!(self, PlrModel::Collision)
    }
}

impl fmt::Debug for PlrModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlrModel::Curve(curve) => f.debug_tuple("Curve").field(curve).finish(),
            PlrModel::Function(_) => f.write_str("Function(..)"),
            PlrModel::Collision => f.write_str("Collision"),
        }
    }
}

/// Curve fits of packet loss versus Eb/N0, evaluated in dB
#[derive(Debug, Clone, PartialEq)]
pub enum PlrCurve {
    /// `plr = (1 + q * exp(slope * (x_db - midpoint_db)))^(-1 / nu)`
    GeneralizedLogistic {
        midpoint_db: f64,
        slope: f64,
        q: f64,
        nu: f64,
    },
    /// `log10(plr) = sum(coefficients[i] * x_db^i)`, saturated at 1.
    Polynomial { coefficients: Vec<f64> },
}

impl PlrCurve {
    /// Default curve for a code rate and modulation order, if one is tabulated.
    ///
    /// Only QPSK (`M = 4`) at rates 1/3 and 1/2 are available.
    pub fn default_for(coderate: f64, modulation_order: u32) -> Option<PlrCurve> {
        const TOL: f64 = 1e-6;
        if modulation_order != 4 {
            return None;
        }
        if (coderate - 1.0 / 3.0).abs() < TOL {
            Some(PlrCurve::GeneralizedLogistic {
                midpoint_db: 1.0,
                slope: 6.0,
                q: 1.0,
                nu: 0.8,
            })
        } else if (coderate - 0.5).abs() < TOL {
            Some(PlrCurve::GeneralizedLogistic {
                midpoint_db: 2.0,
                slope: 5.0,
                q: 1.0,
                nu: 0.8,
            })
        } else {
            None
        }
    }

    /// Loss probability at linear `ebno`, clamped to `[0, 1]`.
    pub fn evaluate(&self, ebno: f64) -> f64 {
        if ebno <= 0.0 {
            return 1.0;
        }
        if ebno.is_infinite() {
            return 0.0;
        }
        let x_db = 10.0 * ebno.log10();
        let p = match self {
            PlrCurve::GeneralizedLogistic {
                midpoint_db,
                slope,
                q,
                nu,
            } => (1.0 + q * (slope * (x_db - midpoint_db)).exp()).powf(-1.0 / nu),
            PlrCurve::Polynomial { coefficients } => {
                // Horner
                let log_p = coefficients
                    .iter()
                    .rev()
                    .fold(0.0, |acc, c| acc * x_db + c);
                10f64.powf(log_p)
            }
        };
        clamp_probability(p)
    }
}

fn clamp_probability(p: f64) -> f64 {
    if p.is_nan() {
        1.0
    } else {
        p.clamp(0.0, 1.0)
    }
}
