//! Delta results produced for each tier.

use serde::{Deserialize, Serialize};

use super::CountRecord;

/// Win rate of a sample measured against a baseline rate.
///
/// All rates and deltas are percentage points. Deltas are rounded to two
/// decimals; when a cap is configured every delta lies within `[-cap, cap]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeltaResult {
    pub games: u64,
    pub wins: u64,
    pub losses: u64,

    /// Observed win rate (0 to 100), or the baseline for a neutral result
    pub win_rate: f64,

    /// Point estimate minus baseline
    pub delta: f64,

    /// Lower Wilson bound minus baseline
    pub lower_confidence_delta: f64,

    /// Upper Wilson bound minus baseline
    pub upper_confidence_delta: f64,

    /// Whichever of the three deltas is closest to zero
    pub confidence_adjusted_delta: f64,
}

impl DeltaResult {
    /// Result for a sample with too little evidence: no deviation from baseline.
    pub fn neutral(counts: CountRecord, baseline: f64) -> Self {
        Self {
            games: counts.games(),
            wins: counts.wins,
            losses: counts.losses,
            win_rate: baseline,
            delta: 0.0,
            lower_confidence_delta: 0.0,
            upper_confidence_delta: 0.0,
            confidence_adjusted_delta: 0.0,
        }
    }

    /// True when every delta field is zero.
    pub fn is_neutral(&self) -> bool {
        self.deltas().iter().all(|d| *d == 0.0)
    }

    /// The four delta fields in declaration order.
    pub fn deltas(&self) -> [f64; 4] {
        [
            self.delta,
            self.lower_confidence_delta,
            self.upper_confidence_delta,
            self.confidence_adjusted_delta,
        ]
    }
}

/// Popularity fields copied through from the source without recomputation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TierExtras {
    pub bans: u64,
    pub ban_rate: f64,
    pub popularity: f64,
    pub pick_rate: f64,
}

/// Counts plus passthrough extras, as read from a stats source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TierCounts {
    #[serde(flatten)]
    pub counts: CountRecord,
    #[serde(flatten)]
    pub extras: TierExtras,
}

/// A global or per-map result: the delta with its extras merged in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierStat {
    #[serde(flatten)]
    pub result: DeltaResult,
    #[serde(flatten)]
    pub extras: TierExtras,
}

impl TierStat {
    pub fn new(result: DeltaResult, extras: TierExtras) -> Self {
        Self { result, extras }
    }

    pub fn win_rate(&self) -> f64 {
        self.result.win_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_result() {
        let result = DeltaResult::neutral(CountRecord::new(5, 3), 52.5);

        assert_eq!(result.games, 8);
        assert_eq!(result.wins, 5);
        assert_eq!(result.losses, 3);
        assert_eq!(result.win_rate, 52.5);
        assert!(result.is_neutral());
    }

    #[test]
    fn test_tier_stat_serializes_flat() {
        let stat = TierStat::new(
            DeltaResult::neutral(CountRecord::new(10, 10), 50.0),
            TierExtras {
                bans: 3,
                ban_rate: 1.5,
                popularity: 12.0,
                pick_rate: 10.5,
            },
        );

        let value = serde_json::to_value(stat).unwrap();
        assert_eq!(value["games"], 20);
        assert_eq!(value["bans"], 3);
        assert_eq!(value["pick_rate"], 10.5);
        assert_eq!(value["confidence_adjusted_delta"], 0.0);
        assert!(value.get("result").is_none());

        let back: TierStat = serde_json::from_value(value).unwrap();
        assert_eq!(back, stat);
    }
}
