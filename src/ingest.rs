//! Schema normalization for raw source documents.
//!
//! Upstream payloads disagree on key spellings and on whether numbers are
//! JSON numbers or strings. Everything is resolved here so the statistics
//! engine only ever sees canonical records. Count fields that are missing or
//! unreadable are coerced to zero and recorded in a [`CoercionReport`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{
    AllySide, CountRecord, EnemySide, MatchupRecord, MatchupSource, Perspective, SourceMetadata,
    StatsSource, TierCounts, TierExtras,
};

const WINS_KEYS: &[&str] = &["wins", "Wins", "win"];
const LOSSES_KEYS: &[&str] = &["losses", "Losses", "loss"];
const GAMES_KEYS: &[&str] = &["games", "games_played", "Games Played"];

const ALLY_WINS_KEYS: &[&str] = &["wins_with", "wins"];
const ALLY_LOSSES_KEYS: &[&str] = &["losses_with", "losses"];
const ALLY_RATE_KEYS: &[&str] = &["win_rate_as_ally", "win_rate"];

const ENEMY_WINS_KEYS: &[&str] = &["wins_against", "wins"];
const ENEMY_LOSSES_KEYS: &[&str] = &["losses_against", "losses"];
const ENEMY_RATE_KEYS: &[&str] = &["win_rate_against", "win_rate"];

/// Neutral rate assumed for matchup sides without a reported rate.
const DEFAULT_SIDE_RATE: f64 = 50.0;

/// How many coerced field paths to keep for diagnostics.
const MAX_SAMPLES: usize = 10;

/// Errors that make a source document unusable.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Missing required section: {0}")]
    MissingSection(&'static str),

    #[error("Section {section} must be a JSON object")]
    NotAnObject { section: String },
}

/// Count of numeric fields coerced to zero, with a few example paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoercionReport {
    count: usize,
    samples: Vec<String>,
}

impl CoercionReport {
    pub fn record(&mut self, path: String) {
        debug!("Coerced {} to 0", path);
        self.count += 1;
        if self.samples.len() < MAX_SAMPLES {
            self.samples.push(path);
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Parse a non-negative integer count from a number or numeric string.
pub fn parse_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as u64)
        }),
        Value::String(s) => {
            let cleaned: String = s.trim().chars().filter(|c| *c != ',' && *c != '_').collect();
            cleaned.parse::<u64>().ok().or_else(|| {
                cleaned
                    .parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
                    .map(|f| f as u64)
            })
        }
        _ => None,
    }
}

/// Parse a rate from a number or a string like "52.3" or "52.3%".
pub fn parse_rate(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            s.strip_suffix('%')
                .unwrap_or(s)
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
        }
        _ => None,
    }
}

/// First non-null value among the candidate keys.
fn lookup<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| !v.is_null())
}

fn text(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn as_object<'a>(value: &'a Value, section: &str) -> Result<&'a Map<String, Value>, IngestError> {
    value.as_object().ok_or_else(|| IngestError::NotAnObject {
        section: section.to_string(),
    })
}

/// Optional object section: absent or null is empty, anything else must be an object.
fn optional_section<'a>(
    root: &'a Map<String, Value>,
    key: &str,
) -> Result<Option<&'a Map<String, Value>>, IngestError> {
    match root.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => as_object(value, key).map(Some),
    }
}

/// Normalizes raw source documents, accumulating a coercion report.
#[derive(Debug, Default)]
pub struct Normalizer {
    report: CoercionReport,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&self) -> &CoercionReport {
        &self.report
    }

    pub fn into_report(self) -> CoercionReport {
        self.report
    }

    /// Normalize a hero stats document (`global_stats` plus optional `map_stats`).
    pub fn stats_source(&mut self, raw: &Value) -> Result<StatsSource, IngestError> {
        let root = as_object(raw, "<root>")?;

        let global = root
            .get("global_stats")
            .filter(|v| !v.is_null())
            .ok_or(IngestError::MissingSection("global_stats"))?;
        let global = as_object(global, "global_stats")?;

        let global_stats = global
            .iter()
            .map(|(hero, stats)| {
                let path = format!("global_stats.{}", hero);
                (hero.clone(), self.tier_counts(stats, &path))
            })
            .collect();

        let mut map_stats = BTreeMap::new();
        if let Some(maps) = optional_section(root, "map_stats")? {
            for (map_name, heroes) in maps {
                let Some(heroes) = heroes.as_object() else {
                    warn!("Skipping map {}: hero table is not an object", map_name);
                    continue;
                };
                let per_hero: BTreeMap<String, TierCounts> = heroes
                    .iter()
                    .map(|(hero, stats)| {
                        let path = format!("map_stats.{}.{}", map_name, hero);
                        (hero.clone(), self.tier_counts(stats, &path))
                    })
                    .collect();
                map_stats.insert(map_name.clone(), per_hero);
            }
        }

        Ok(StatsSource {
            metadata: metadata(root),
            global_stats,
            map_stats,
        })
    }

    /// Normalize a matchup document (`matchups`: hero -> opponent -> record).
    pub fn matchup_source(&mut self, raw: &Value) -> Result<MatchupSource, IngestError> {
        let root = as_object(raw, "<root>")?;

        let mut matchups = BTreeMap::new();
        match optional_section(root, "matchups")? {
            Some(heroes) => {
                for (hero, opponents) in heroes {
                    let Some(opponents) = opponents.as_object() else {
                        warn!("Skipping matchups for {}: not an object", hero);
                        continue;
                    };
                    let records: BTreeMap<String, MatchupRecord> = opponents
                        .iter()
                        .map(|(opponent, record)| {
                            let path = format!("matchups.{}.{}", hero, opponent);
                            (opponent.clone(), self.matchup_record(record, &path))
                        })
                        .collect();
                    matchups.insert(hero.clone(), records);
                }
            }
            None => warn!("Matchup source has no matchups section"),
        }

        Ok(MatchupSource {
            metadata: metadata(root),
            matchups,
        })
    }

    fn count(&mut self, obj: &Map<String, Value>, keys: &[&str], path: &str) -> u64 {
        match lookup(obj, keys).and_then(parse_count) {
            Some(n) => n,
            None => {
                self.report.record(path.to_string());
                0
            }
        }
    }

    /// Like [`count`](Self::count) but an absent field is silently zero.
    fn extra_count(&mut self, obj: &Map<String, Value>, key: &str, path: &str) -> u64 {
        match obj.get(key) {
            None | Some(Value::Null) => 0,
            Some(value) => parse_count(value).unwrap_or_else(|| {
                self.report.record(format!("{}.{}", path, key));
                0
            }),
        }
    }

    fn rate(&mut self, obj: &Map<String, Value>, keys: &[&str], path: &str, default: f64) -> f64 {
        match lookup(obj, keys) {
            None => default,
            Some(value) => parse_rate(value).unwrap_or_else(|| {
                self.report.record(format!("{}.{}", path, keys[0]));
                default
            }),
        }
    }

    fn counts(&mut self, obj: &Map<String, Value>, path: &str) -> CountRecord {
        let wins = self.count(obj, WINS_KEYS, &format!("{}.wins", path));
        let losses = match lookup(obj, LOSSES_KEYS) {
            Some(_) => self.count(obj, LOSSES_KEYS, &format!("{}.losses", path)),
            None => match lookup(obj, GAMES_KEYS).and_then(parse_count) {
                Some(games) => games.saturating_sub(wins),
                None => self.count(obj, LOSSES_KEYS, &format!("{}.losses", path)),
            },
        };
        CountRecord::new(wins, losses)
    }

    fn tier_counts(&mut self, raw: &Value, path: &str) -> TierCounts {
        let empty = Map::new();
        let obj = raw.as_object().unwrap_or(&empty);

        TierCounts {
            counts: self.counts(obj, path),
            extras: TierExtras {
                bans: self.extra_count(obj, "bans", path),
                ban_rate: self.rate(obj, &["ban_rate"], path, 0.0),
                popularity: self.rate(obj, &["popularity"], path, 0.0),
                pick_rate: self.rate(obj, &["pick_rate"], path, 0.0),
            },
        }
    }

    fn matchup_record(&mut self, raw: &Value, path: &str) -> MatchupRecord {
        let empty = Map::new();
        let obj = raw.as_object().unwrap_or(&empty);
        let ally = obj.get("ally").and_then(Value::as_object).unwrap_or(&empty);
        let enemy = obj.get("enemy").and_then(Value::as_object).unwrap_or(&empty);

        let ally_path = format!("{}.ally", path);
        let enemy_path = format!("{}.enemy", path);

        MatchupRecord {
            ally: AllySide {
                wins_with: self.count(ally, ALLY_WINS_KEYS, &format!("{}.wins_with", ally_path)),
                losses_with: self.count(
                    ally,
                    ALLY_LOSSES_KEYS,
                    &format!("{}.losses_with", ally_path),
                ),
                win_rate_as_ally: self.rate(ally, ALLY_RATE_KEYS, &ally_path, DEFAULT_SIDE_RATE),
            },
            enemy: EnemySide {
                wins_against: self.count(
                    enemy,
                    ENEMY_WINS_KEYS,
                    &format!("{}.wins_against", enemy_path),
                ),
                losses_against: self.count(
                    enemy,
                    ENEMY_LOSSES_KEYS,
                    &format!("{}.losses_against", enemy_path),
                ),
                win_rate_against: self.rate(
                    enemy,
                    ENEMY_RATE_KEYS,
                    &enemy_path,
                    DEFAULT_SIDE_RATE,
                ),
            },
        }
    }
}

/// Read source metadata leniently; unknown or malformed fields are dropped.
fn metadata(root: &Map<String, Value>) -> SourceMetadata {
    let empty = Map::new();
    let meta = root
        .get("metadata")
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    let perspective = match text(meta, "perspective").as_deref() {
        Some(p) if p.eq_ignore_ascii_case("opponent") => Perspective::Opponent,
        _ => Perspective::Entity,
    };

    let transposed_at = text(meta, "transposed_at")
        .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|ts| ts.with_timezone(&Utc));

    SourceMetadata {
        game_type: text(meta, "game_type"),
        major_patch: text(meta, "major_patch"),
        minor_patch: text(meta, "minor_patch"),
        fetched_at: text(meta, "fetched_at"),
        perspective,
        transposed_at,
    }
}
