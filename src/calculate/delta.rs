//! Baseline deltas with confidence adjustment, gating, and capping.

use crate::models::{ConfidenceLevel, CountRecord, DeltaResult, TierPolicy};

use super::interval::ConfidenceIntervalCalculator;

/// Round to two decimal places, halves to even.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// The candidate with the smallest absolute value. Ties keep the earliest.
pub fn closest_to_zero(candidates: [f64; 3]) -> f64 {
    candidates
        .into_iter()
        .reduce(|best, c| if c.abs() < best.abs() { c } else { best })
        .unwrap_or(0.0)
}

/// Clamp into `[-cap, cap]`. Negative or NaN caps are ignored.
fn clamp_to(value: f64, cap: Option<f64>) -> f64 {
    match cap {
        Some(cap) if cap >= 0.0 => value.clamp(-cap, cap),
        _ => value,
    }
}

/// Turns win/loss counts into deltas against a baseline win rate.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DeltaEngine {
    calculator: ConfidenceIntervalCalculator,
}

impl DeltaEngine {
    pub fn new(level: ConfidenceLevel) -> Self {
        Self::with_calculator(ConfidenceIntervalCalculator::new(level))
    }

    pub fn with_calculator(calculator: ConfidenceIntervalCalculator) -> Self {
        Self { calculator }
    }

    /// Compute the delta result for `counts` against `baseline` (percent).
    ///
    /// Samples with no games, or fewer than `policy.min_games`, produce the
    /// neutral result. The confidence-adjusted delta is whichever of the
    /// point, lower and upper deltas is closest to zero, so wide intervals
    /// that straddle the baseline regress toward it.
    pub fn calculate(&self, counts: CountRecord, baseline: f64, policy: &TierPolicy) -> DeltaResult {
        let total = counts.games();
        if total == 0 || total < policy.min_games {
            return DeltaResult::neutral(counts, baseline);
        }

        let interval = self.calculator.interval(counts.wins, total);

        let delta = interval.win_rate - baseline;
        let lower_delta = interval.lower - baseline;
        let upper_delta = interval.upper - baseline;
        let adjusted = closest_to_zero([delta, lower_delta, upper_delta]);

        let cap = policy.max_delta_cap;
        DeltaResult {
            games: total,
            wins: counts.wins,
            losses: counts.losses,
            win_rate: round2(interval.win_rate),
            delta: round2(clamp_to(delta, cap)),
            lower_confidence_delta: round2(clamp_to(lower_delta, cap)),
            upper_confidence_delta: round2(clamp_to(upper_delta, cap)),
            confidence_adjusted_delta: round2(clamp_to(adjusted, cap)),
        }
    }

    /// Same as [`calculate`](Self::calculate) for a raw `wins` / `total` pair.
    pub fn calculate_delta(
        &self,
        wins: u64,
        total: u64,
        baseline: f64,
        policy: &TierPolicy,
    ) -> DeltaResult {
        self.calculate(CountRecord::from_total(wins, total), baseline, policy)
    }
}
