//! Raw win/loss counters and the gating policy applied to them.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Win/loss counter for one entity at one tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRecord {
    pub wins: u64,
    pub losses: u64,
}

impl CountRecord {
    pub fn new(wins: u64, losses: u64) -> Self {
        Self { wins, losses }
    }

    /// Build from a win count and a total; wins above the total are clamped.
    pub fn from_total(wins: u64, total: u64) -> Self {
        let wins = wins.min(total);
        Self {
            wins,
            losses: total - wins,
        }
    }

    /// Total games, saturating at `u64::MAX`.
    pub fn games(&self) -> u64 {
        self.wins.saturating_add(self.losses)
    }
}

/// Upper bound on the magnitude of reported deltas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MaxDeltaRepr", into = "MaxDeltaRepr")]
pub enum MaxDelta {
    Capped(f64),
    Uncapped,
}

impl MaxDelta {
    pub const UNCAPPED_LABEL: &'static str = "uncapped";

    /// The cap, if any.
    pub fn cap(&self) -> Option<f64> {
        match self {
            MaxDelta::Capped(c) => Some(*c),
            MaxDelta::Uncapped => None,
        }
    }

    /// Build a capped value, rejecting negative or non-finite caps.
    pub fn capped(cap: f64) -> Result<Self, String> {
        if !cap.is_finite() || cap < 0.0 {
            return Err(format!("max delta must be a finite value >= 0, got {}", cap));
        }
        Ok(MaxDelta::Capped(cap))
    }
}

impl Default for MaxDelta {
    fn default() -> Self {
        MaxDelta::Capped(5.0)
    }
}

impl FromStr for MaxDelta {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case(Self::UNCAPPED_LABEL) || s.eq_ignore_ascii_case("none") {
            return Ok(MaxDelta::Uncapped);
        }
        let cap: f64 = s
            .parse()
            .map_err(|_| format!("invalid max delta: {} (expected a number or \"uncapped\")", s))?;
        MaxDelta::capped(cap)
    }
}

impl std::fmt::Display for MaxDelta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MaxDelta::Capped(c) => write!(f, "±{}%", c),
            MaxDelta::Uncapped => write!(f, "{}", Self::UNCAPPED_LABEL),
        }
    }
}

/// Wire form: a number, or the string "uncapped".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum MaxDeltaRepr {
    Number(f64),
    Text(String),
}

impl TryFrom<MaxDeltaRepr> for MaxDelta {
    type Error = String;

    fn try_from(repr: MaxDeltaRepr) -> Result<Self, Self::Error> {
        match repr {
            MaxDeltaRepr::Number(n) => MaxDelta::capped(n),
            MaxDeltaRepr::Text(s) => s.parse(),
        }
    }
}

impl From<MaxDelta> for MaxDeltaRepr {
    fn from(max: MaxDelta) -> Self {
        match max {
            MaxDelta::Capped(c) => MaxDeltaRepr::Number(c),
            MaxDelta::Uncapped => MaxDeltaRepr::Text(MaxDelta::UNCAPPED_LABEL.to_string()),
        }
    }
}

/// Evidence gate and magnitude cap applied at one tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierPolicy {
    /// Samples below this many games yield a neutral result.
    pub min_games: u64,
    pub max_delta_cap: Option<f64>,
}

impl TierPolicy {
    /// No gate, no cap. Used for the global and map tiers.
    pub const UNGATED: TierPolicy = TierPolicy {
        min_games: 0,
        max_delta_cap: None,
    };

    /// Caps that are negative or not finite are dropped.
    pub fn new(min_games: u64, max_delta: MaxDelta) -> Self {
        Self {
            min_games,
            max_delta_cap: max_delta.cap().filter(|cap| cap.is_finite() && *cap >= 0.0),
        }
    }
}

impl Default for TierPolicy {
    fn default() -> Self {
        Self::UNGATED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_games() {
        assert_eq!(CountRecord::new(60, 40).games(), 100);
        assert_eq!(CountRecord::default().games(), 0);
    }

    #[test]
    fn test_games_saturates() {
        assert_eq!(CountRecord::new(u64::MAX, 1).games(), u64::MAX);
        assert_eq!(CountRecord::new(u64::MAX, u64::MAX).games(), u64::MAX);
    }

    #[test]
    fn test_from_total_clamps_wins() {
        assert_eq!(CountRecord::from_total(5, 8), CountRecord::new(5, 3));
        assert_eq!(CountRecord::from_total(12, 8), CountRecord::new(8, 0));
    }

    #[test]
    fn test_max_delta_parse() {
        assert_eq!("5.0".parse::<MaxDelta>(), Ok(MaxDelta::Capped(5.0)));
        assert_eq!("uncapped".parse::<MaxDelta>(), Ok(MaxDelta::Uncapped));
        assert_eq!("None".parse::<MaxDelta>(), Ok(MaxDelta::Uncapped));
        assert!("-1".parse::<MaxDelta>().is_err());
        assert!("inf".parse::<MaxDelta>().is_err());
        assert!("lots".parse::<MaxDelta>().is_err());
    }

    #[test]
    fn test_max_delta_serialization() {
        assert_eq!(serde_json::to_string(&MaxDelta::Capped(5.0)).unwrap(), "5.0");
        assert_eq!(
            serde_json::to_string(&MaxDelta::Uncapped).unwrap(),
            "\"uncapped\""
        );

        let capped: MaxDelta = serde_json::from_str("2.5").unwrap();
        assert_eq!(capped, MaxDelta::Capped(2.5));
        let uncapped: MaxDelta = serde_json::from_str("\"uncapped\"").unwrap();
        assert_eq!(uncapped, MaxDelta::Uncapped);
        assert!(serde_json::from_str::<MaxDelta>("-3").is_err());
    }

    #[test]
    fn test_tier_policy_from_max_delta() {
        let policy = TierPolicy::new(100, MaxDelta::default());
        assert_eq!(policy.min_games, 100);
        assert_eq!(policy.max_delta_cap, Some(5.0));

        let uncapped = TierPolicy::new(0, MaxDelta::Uncapped);
        assert_eq!(uncapped.max_delta_cap, None);
        assert_eq!(TierPolicy::default(), TierPolicy::UNGATED);
    }

    #[test]
    fn test_tier_policy_drops_invalid_cap() {
        assert_eq!(TierPolicy::new(0, MaxDelta::Capped(-1.0)).max_delta_cap, None);
        assert_eq!(TierPolicy::new(0, MaxDelta::Capped(f64::NAN)).max_delta_cap, None);
        assert_eq!(TierPolicy::new(0, MaxDelta::Capped(0.0)).max_delta_cap, Some(0.0));
    }
}
