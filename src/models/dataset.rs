//! Source datasets and the combined output dataset.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    ConfidenceLevel, MatchupRecord, MatchupStat, MaxDelta, Perspective, SourceDigest, TierCounts,
    TierStat,
};

/// Placeholder used wherever source metadata is missing.
pub const UNKNOWN: &str = "unknown";

/// Game type assumed when a stats source does not name one.
pub const DEFAULT_GAME_TYPE: &str = "Storm League";

/// Descriptive fields carried by each source file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_patch: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minor_patch: Option<String>,

    /// When the upstream data was captured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<String>,

    /// Point of view of enemy-side matchup counters
    #[serde(default)]
    pub perspective: Perspective,

    /// Set when this crate flipped the enemy sides of the source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transposed_at: Option<DateTime<Utc>>,
}

impl SourceMetadata {
    /// Most specific patch label available.
    pub fn patch(&self) -> &str {
        self.minor_patch
            .as_deref()
            .or(self.major_patch.as_deref())
            .unwrap_or(UNKNOWN)
    }

    /// Parse `fetched_at` as RFC 3339 or the "YYYY-MM-DD HH:MM:SS UTC" form.
    pub fn fetched_at_utc(&self) -> Option<DateTime<Utc>> {
        let raw = self.fetched_at.as_deref()?.trim();
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.with_timezone(&Utc));
        }
        let naive = raw.strip_suffix("UTC").unwrap_or(raw).trim();
        NaiveDateTime::parse_from_str(naive, "%Y-%m-%d %H:%M:%S")
            .ok()
            .map(|ts| ts.and_utc())
    }

    /// Timestamp label for combined output, stable for identical inputs.
    pub fn capture_label(&self) -> String {
        match (self.fetched_at_utc(), self.fetched_at.as_deref()) {
            (Some(ts), _) => ts.to_rfc3339(),
            (None, Some(raw)) => raw.to_string(),
            (None, None) => UNKNOWN.to_string(),
        }
    }
}

/// Global and per-map counters, keyed by hero name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSource {
    #[serde(default)]
    pub metadata: SourceMetadata,

    pub global_stats: BTreeMap<String, TierCounts>,

    /// map name -> hero name -> counters
    #[serde(default)]
    pub map_stats: BTreeMap<String, BTreeMap<String, TierCounts>>,
}

/// Pairwise counters: hero name -> opponent name -> record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchupSource {
    #[serde(default)]
    pub metadata: SourceMetadata,

    #[serde(default)]
    pub matchups: BTreeMap<String, BTreeMap<String, MatchupRecord>>,
}

impl MatchupSource {
    /// Number of (hero, opponent) pairs.
    pub fn pair_count(&self) -> usize {
        self.matchups.values().map(BTreeMap::len).sum()
    }
}

/// Run parameters and provenance of a combined dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedMetadata {
    /// Patch of the stats source
    pub source_a_patch: String,

    /// Patch of the matchup source
    pub source_b_patch: String,

    pub game_type: String,
    pub confidence_level: ConfidenceLevel,
    pub z_score: f64,
    pub min_games_threshold: u64,
    pub max_delta_cap: MaxDelta,
    pub combined_at: String,

    /// Heroes written to `entities`
    pub entity_count: usize,

    /// Heroes seen only in map or matchup data, left out of `entities`
    pub skipped_entities: usize,

    /// Numeric fields coerced to zero during ingestion
    pub coerced_fields: usize,

    pub input_digest: SourceDigest,
}

/// All combined tiers for one hero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedEntityRecord {
    pub global: TierStat,
    pub maps: BTreeMap<String, TierStat>,
    pub matchups: BTreeMap<String, MatchupStat>,
}

/// The combined output document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedDataset {
    pub metadata: CombinedMetadata,
    pub entities: BTreeMap<String, CombinedEntityRecord>,
}

impl CombinedDataset {
    /// Total (hero, map) results.
    pub fn map_result_count(&self) -> usize {
        self.entities.values().map(|e| e.maps.len()).sum()
    }

    /// Total (hero, opponent) results.
    pub fn matchup_result_count(&self) -> usize {
        self.entities.values().map(|e| e.matchups.len()).sum()
    }
}
