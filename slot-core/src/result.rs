//! Accumulated packet loss statistics
//!
//! [`PlrResult`] values form a commutative monoid under component-wise
//! addition with `PlrResult::default()` as identity. Partial results from
//! workers and batches are merged only through `+`.

use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use crate::logging::diagnostics;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlrResult {
    pub simulated_frames: u64,
    pub errored_frames: u64,
    pub total_decoded: u64,
    pub total_sent: u64,
}

impl PlrResult {
    pub fn new(
        simulated_frames: u64,
        errored_frames: u64,
        total_decoded: u64,
        total_sent: u64,
    ) -> Self {
        Self {
            simulated_frames,
            errored_frames,
            total_decoded,
            total_sent,
        }
    }

    /// Result of a single frame.
    pub fn from_frame(nusers: usize, ndecoded: usize) -> Self {
        Self {
            simulated_frames: 1,
            errored_frames: u64::from(ndecoded < nusers),
            total_decoded: ndecoded as u64,
            total_sent: nusers as u64,
        }
    }

    /// Fold one frame into this accumulator.
    pub fn record_frame(&mut self, nusers: usize, ndecoded: usize) {
        *self += PlrResult::from_frame(nusers, ndecoded);
    }

    /// A result is valid once at least one frame was simulated.
    pub fn is_valid(&self) -> bool {
        self.simulated_frames > 0
    }

    /// Packet loss ratio `1 - total_decoded / total_sent`.
    ///
    /// On a result that was never simulated this logs a warning and returns
    /// the undefined ratio (NaN); the caller decides what to do with it.
    pub fn plr(&self) -> f64 {
        if !self.is_valid() {
            diagnostics::undefined_plr(self);
        }
        1.0 - self.total_decoded as f64 / self.total_sent as f64
    }

    /// Fraction of simulated frames with at least one lost packet.
    pub fn frame_error_rate(&self) -> f64 {
        self.errored_frames as f64 / self.simulated_frames as f64
    }

    /// Average number of contending users per simulated frame.
    pub fn mean_users_per_frame(&self) -> f64 {
        self.total_sent as f64 / self.simulated_frames as f64
    }

    /// Packets sent but never decoded.
    pub fn lost_packets(&self) -> u64 {
        self.total_sent.saturating_sub(self.total_decoded)
    }
}

/// Packet loss ratio of `result`; see [`PlrResult::plr`].
pub fn extract_plr(result: &PlrResult) -> f64 {
    result.plr()
}

impl Add for PlrResult {
    type Output = PlrResult;

    fn add(self, rhs: PlrResult) -> PlrResult {
        PlrResult {
            simulated_frames: self.simulated_frames + rhs.simulated_frames,
            errored_frames: self.errored_frames + rhs.errored_frames,
            total_decoded: self.total_decoded + rhs.total_decoded,
            total_sent: self.total_sent + rhs.total_sent,
        }
    }
}

impl AddAssign for PlrResult {
    fn add_assign(&mut self, rhs: PlrResult) {
        *self = *self + rhs;
    }
}

impl Sum for PlrResult {
    fn sum<I: Iterator<Item = PlrResult>>(iter: I) -> PlrResult {
        iter.fold(PlrResult::default(), Add::add)
    }
}

impl<'a> Sum<&'a PlrResult> for PlrResult {
    fn sum<I: Iterator<Item = &'a PlrResult>>(iter: I) -> PlrResult {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples() -> Vec<PlrResult> {
        vec![
            PlrResult::default(),
            PlrResult::new(1, 0, 3, 3),
            PlrResult::new(10, 4, 70, 80),
            PlrResult::new(7, 7, 0, 21),
        ]
    }

    #[test]
    fn test_merge_is_commutative_and_associative() {
        let xs = samples();
        for &a in &xs {
            for &b in &xs {
                assert_eq!(a + b, b + a);
                for &c in &xs {
                    assert_eq!((a + b) + c, a + (b + c));
                }
            }
        }
    }

    #[test]
    fn test_identity_is_noop() {
        for a in samples() {
            assert_eq!(a + PlrResult::default(), a);
            assert_eq!(PlrResult::default() + a, a);
        }
    }

    #[test]
    fn test_sum_matches_fold() {
        let xs = samples();
        let total: PlrResult = xs.iter().sum();
        assert_eq!(total, PlrResult::new(18, 11, 73, 104));
    }

    #[test]
    fn test_record_frame() {
        let mut acc = PlrResult::default();
        acc.record_frame(4, 4);
        acc.record_frame(5, 3);
        assert_eq!(acc, PlrResult::new(2, 1, 7, 9));
        assert_eq!(acc.lost_packets(), 2);
    }

    #[test]
    fn test_plr_boundaries() {
        assert_eq!(PlrResult::new(1, 0, 10, 10).plr(), 0.0);
        assert_eq!(PlrResult::new(1, 1, 0, 10).plr(), 1.0);
        assert_eq!(extract_plr(&PlrResult::new(1, 1, 5, 10)), 0.5);
    }

    #[test]
    fn test_unsimulated_result_is_undefined() {
        let empty = PlrResult::default();
        assert!(!empty.is_valid());
        assert!(empty.plr().is_nan());
    }

    #[test]
    fn test_derived_rates() {
        let r = PlrResult::new(4, 1, 10, 12);
        assert_eq!(r.frame_error_rate(), 0.25);
        assert_eq!(r.mean_users_per_frame(), 3.0);
    }
}
