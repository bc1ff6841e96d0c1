//! Wilson score confidence intervals for win rates.

use crate::models::ConfidenceLevel;

/// Point estimate and bounds, all as percentages (0 to 100).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub win_rate: f64,
    pub lower: f64,
    pub upper: f64,
}

impl Interval {
    /// Estimate used when there are no games at all.
    pub const NEUTRAL: Interval = Interval {
        win_rate: 50.0,
        lower: 50.0,
        upper: 50.0,
    };
}

/// Computes Wilson score intervals at a fixed confidence level.
///
/// The z-score is resolved once at construction; the calculator is an
/// immutable value that can be shared freely.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceIntervalCalculator {
    level: ConfidenceLevel,
    z: f64,
}

impl ConfidenceIntervalCalculator {
    pub fn new(level: ConfidenceLevel) -> Self {
        Self {
            level,
            z: level.z_score(),
        }
    }

    pub fn level(&self) -> ConfidenceLevel {
        self.level
    }

    pub fn z_score(&self) -> f64 {
        self.z
    }

    /// Wilson interval for `wins` out of `total`.
    ///
    /// Unlike the normal approximation the bounds stay inside `[0, 100]` and
    /// do not collapse for tiny samples. Wins above `total` are clamped.
    pub fn interval(&self, wins: u64, total: u64) -> Interval {
        if total == 0 {
            return Interval::NEUTRAL;
        }

        let n = total as f64;
        let p = wins.min(total) as f64 / n;
        let z = self.z;
        let z2 = z * z;

        let denominator = 1.0 + z2 / n;
        let center = (p + z2 / (2.0 * n)) / denominator;
        let margin = z * ((p * (1.0 - p) / n) + (z2 / (4.0 * n * n))).sqrt() / denominator;

        let lower = (center - margin).max(0.0);
        let upper = (center + margin).min(1.0);

        Interval {
            win_rate: p * 100.0,
            lower: lower * 100.0,
            upper: upper * 100.0,
        }
    }
}

impl Default for ConfidenceIntervalCalculator {
    fn default() -> Self {
        Self::new(ConfidenceLevel::default())
    }
}
