//! Pairwise matchup counters.

use serde::{Deserialize, Serialize};

use super::{CountRecord, DeltaResult};

fn default_rate() -> f64 {
    50.0
}

/// Record of games played on the same team as an opponent hero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AllySide {
    #[serde(default)]
    pub wins_with: u64,
    #[serde(default)]
    pub losses_with: u64,
    #[serde(default = "default_rate")]
    pub win_rate_as_ally: f64,
}

impl AllySide {
    pub fn counts(&self) -> CountRecord {
        CountRecord::new(self.wins_with, self.losses_with)
    }
}

impl Default for AllySide {
    fn default() -> Self {
        Self {
            wins_with: 0,
            losses_with: 0,
            win_rate_as_ally: default_rate(),
        }
    }
}

/// Record of games played against an opponent hero.
///
/// Whose wins these are depends on the perspective of the source that
/// produced the record; see [`Perspective`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemySide {
    #[serde(default)]
    pub wins_against: u64,
    #[serde(default)]
    pub losses_against: u64,
    #[serde(default = "default_rate")]
    pub win_rate_against: f64,
}

impl EnemySide {
    pub fn counts(&self) -> CountRecord {
        CountRecord::new(self.wins_against, self.losses_against)
    }
}

impl Default for EnemySide {
    fn default() -> Self {
        Self {
            wins_against: 0,
            losses_against: 0,
            win_rate_against: default_rate(),
        }
    }
}

/// Ally and enemy counters for one (hero, opponent) pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchupRecord {
    #[serde(default)]
    pub ally: AllySide,
    #[serde(default)]
    pub enemy: EnemySide,
}

/// Whose point of view the enemy side of a matchup source is reported from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Perspective {
    /// Enemy counters are the queried hero's own results.
    #[default]
    Entity,
    /// Enemy counters are the opponent's results against the queried hero.
    Opponent,
}

impl std::fmt::Display for Perspective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Perspective::Entity => write!(f, "entity"),
            Perspective::Opponent => write!(f, "opponent"),
        }
    }
}

/// Combined matchup deltas for one opponent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchupStat {
    pub ally: DeltaResult,
    pub enemy: DeltaResult,
}
