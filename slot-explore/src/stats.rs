//! Confidence intervals for packet and frame loss estimates

use slotsim_core::PlrResult;

// Acklam's rational approximation of the normal quantile, relative error < 1.2e-9.
const CENTRAL_NUM: [f64; 6] = [
    -3.969_683_028_665_376e+01,
    2.209_460_984_245_205e+02,
    -2.759_285_104_469_687e+02,
    1.383_577_518_672_690e+02,
    -3.066_479_806_614_716e+01,
    2.506_628_277_459_239e+00,
];
const CENTRAL_DEN: [f64; 6] = [
    -5.447_609_879_822_406e+01,
    1.615_858_368_580_409e+02,
    -1.556_989_798_598_866e+02,
    6.680_131_188_771_972e+01,
    -1.328_068_155_288_572e+01,
    1.0,
];
const TAIL_NUM: [f64; 6] = [
    -7.784_894_002_430_293e-03,
    -3.223_964_580_411_365e-01,
    -2.400_758_277_161_838e+00,
    -2.549_732_539_343_734e+00,
    4.374_664_141_464_968e+00,
    2.938_163_982_698_783e+00,
];
const TAIL_DEN: [f64; 5] = [
    7.784_695_709_041_462e-03,
    3.224_671_290_700_398e-01,
    2.445_134_137_142_996e+00,
    3.754_408_661_907_416e+00,
    1.0,
];

/// Probability below which the tail approximation applies.
const TAIL_SPLIT: f64 = 0.02425;

/// Evaluate a polynomial with coefficients ordered from the highest degree.
fn horner(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().fold(0.0, |acc, c| acc * x + c)
}

/// Quantile of the standard normal distribution.
///
/// # Panics
/// Panics unless `0 < p < 1`.
pub fn inv_norm_cdf(p: f64) -> f64 {
    assert!(p > 0.0 && p < 1.0, "p must be in (0, 1), got {p}");

    let lower_tail = |tail: f64| {
        let q = (-2.0 * tail.ln()).sqrt();
        horner(&TAIL_NUM, q) / horner(&TAIL_DEN, q)
    };

    if p < TAIL_SPLIT {
        lower_tail(p)
    } else if p > 1.0 - TAIL_SPLIT {
        -lower_tail(1.0 - p)
    } else {
        let q = p - 0.5;
        let r = q * q;
        q * horner(&CENTRAL_NUM, r) / horner(&CENTRAL_DEN, r)
    }
}

/// Two-sided normal critical value, e.g. ~1.96 for `confidence = 0.95`.
///
/// # Panics
/// Panics unless `0 <= confidence < 1`.
pub fn z_for_confidence(confidence: f64) -> f64 {
    assert!(
        (0.0..1.0).contains(&confidence),
        "confidence must be in [0, 1), got {confidence}"
    );
    inv_norm_cdf(0.5 * (1.0 + confidence))
}

/// Wilson score interval `(low, high)` for `successes` out of `trials`.
///
/// Returns `None` without trials.
pub fn wilson_interval(successes: u64, trials: u64, confidence: f64) -> Option<(f64, f64)> {
    if trials == 0 {
        return None;
    }

    let n = trials as f64;
    let rate = successes as f64 / n;
    let z = z_for_confidence(confidence);
    let z2_over_n = z * z / n;

    let scale = 1.0 / (1.0 + z2_over_n);
    let center = scale * (rate + 0.5 * z2_over_n);
    let half_width = scale * z * (rate * (1.0 - rate) / n + 0.25 * z2_over_n / n).sqrt();

    Some((
        (center - half_width).clamp(0.0, 1.0),
        (center + half_width).clamp(0.0, 1.0),
    ))
}

/// Wilson interval for the PLR of `result`, treating each sent packet as a trial.
///
/// Packets of one frame interfere with each other, so the interval is
/// optimistic at high load. Returns `None` when nothing was sent.
pub fn plr_confidence_interval(result: &PlrResult, confidence: f64) -> Option<(f64, f64)> {
    wilson_interval(result.lost_packets(), result.total_sent, confidence)
}

/// Wilson interval for the frame error rate of `result`.
pub fn frame_error_confidence_interval(result: &PlrResult, confidence: f64) -> Option<(f64, f64)> {
    wilson_interval(result.errored_frames, result.simulated_frames, confidence)
}
