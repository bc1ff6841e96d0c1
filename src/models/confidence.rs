//! Confidence levels and their z-scores.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A confidence level outside the supported set.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("unsupported confidence level {0} (expected one of 0.80, 0.85, 0.90, 0.95, 0.99)")]
pub struct UnsupportedConfidenceLevel(pub f64);

/// Two-sided confidence level used for Wilson intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum ConfidenceLevel {
    #[default]
    P80,
    P85,
    P90,
    P95,
    P99,
}

impl ConfidenceLevel {
    /// Every supported level, lowest first.
    pub const ALL: [ConfidenceLevel; 5] = [
        ConfidenceLevel::P80,
        ConfidenceLevel::P85,
        ConfidenceLevel::P90,
        ConfidenceLevel::P95,
        ConfidenceLevel::P99,
    ];

    /// The level as a fraction (e.g. 0.80).
    pub fn as_f64(&self) -> f64 {
        match self {
            ConfidenceLevel::P80 => 0.80,
            ConfidenceLevel::P85 => 0.85,
            ConfidenceLevel::P90 => 0.90,
            ConfidenceLevel::P95 => 0.95,
            ConfidenceLevel::P99 => 0.99,
        }
    }

    /// Fixed z-score for this level.
    pub fn z_score(&self) -> f64 {
        match self {
            ConfidenceLevel::P80 => 1.282,
            ConfidenceLevel::P85 => 1.440,
            ConfidenceLevel::P90 => 1.645,
            ConfidenceLevel::P95 => 1.960,
            ConfidenceLevel::P99 => 2.576,
        }
    }
}

impl TryFrom<f64> for ConfidenceLevel {
    type Error = UnsupportedConfidenceLevel;

    fn try_from(level: f64) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|candidate| (candidate.as_f64() - level).abs() < 1e-9)
            .ok_or(UnsupportedConfidenceLevel(level))
    }
}

impl From<ConfidenceLevel> for f64 {
    fn from(level: ConfidenceLevel) -> Self {
        level.as_f64()
    }
}

impl FromStr for ConfidenceLevel {
    type Err = String;

    /// Accepts a fraction ("0.95") or a percentage ("95", "95%").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (number, is_percent) = match trimmed.strip_suffix('%') {
            Some(n) => (n.trim(), true),
            None => (trimmed, false),
        };
        let value: f64 = number
            .parse()
            .map_err(|_| format!("invalid confidence level: {}", s))?;
        let fraction = if is_percent || value > 1.0 {
            value / 100.0
        } else {
            value
        };
        ConfidenceLevel::try_from(fraction).map_err(|e| e.to_string())
    }
}

impl std::fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.0}%", self.as_f64() * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_z_scores() {
        assert_eq!(ConfidenceLevel::P80.z_score(), 1.282);
        assert_eq!(ConfidenceLevel::P85.z_score(), 1.440);
        assert_eq!(ConfidenceLevel::P90.z_score(), 1.645);
        assert_eq!(ConfidenceLevel::P95.z_score(), 1.960);
        assert_eq!(ConfidenceLevel::P99.z_score(), 2.576);
    }

    #[test]
    fn test_default_is_80() {
        assert_eq!(ConfidenceLevel::default(), ConfidenceLevel::P80);
    }

    #[test]
    fn test_try_from_supported() {
        assert_eq!(ConfidenceLevel::try_from(0.95), Ok(ConfidenceLevel::P95));
        assert_eq!(ConfidenceLevel::try_from(0.8), Ok(ConfidenceLevel::P80));
    }

    #[test]
    fn test_try_from_unsupported_is_rejected() {
        let err = ConfidenceLevel::try_from(0.75).unwrap_err();
        assert_eq!(err, UnsupportedConfidenceLevel(0.75));
        assert!(err.to_string().contains("0.75"));
    }

    #[test]
    fn test_from_str_forms() {
        assert_eq!("0.90".parse::<ConfidenceLevel>(), Ok(ConfidenceLevel::P90));
        assert_eq!("99".parse::<ConfidenceLevel>(), Ok(ConfidenceLevel::P99));
        assert_eq!("85%".parse::<ConfidenceLevel>(), Ok(ConfidenceLevel::P85));
        assert!("0.81".parse::<ConfidenceLevel>().is_err());
        assert!("high".parse::<ConfidenceLevel>().is_err());
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&ConfidenceLevel::P95).unwrap();
        assert_eq!(json, "0.95");

        let level: ConfidenceLevel = serde_json::from_str("0.85").unwrap();
        assert_eq!(level, ConfidenceLevel::P85);

        assert!(serde_json::from_str::<ConfidenceLevel>("0.5").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ConfidenceLevel::P80), "80%");
        assert_eq!(format!("{}", ConfidenceLevel::P99), "99%");
    }
}
