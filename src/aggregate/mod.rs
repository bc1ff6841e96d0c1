//! Three-tier combination of hero statistics.
//!
//! Combining runs in two phases. Phase one computes every hero's global
//! result against the even 50% baseline. Phase two computes the map and
//! matchup tiers as pure functions of each hero's own counters and its
//! global win rate, so heroes can be processed in any order or in parallel.
//!
//! The global stats source defines which heroes are processed. Heroes that
//! only appear in map or matchup data are reported as skipped.

pub mod pipeline;

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::calculate::DeltaEngine;
use crate::config::CombineConfig;
use crate::models::{
    CombinedEntityRecord, MatchupRecord, MatchupSource, MatchupStat, StatsSource, TierCounts,
    TierPolicy, TierStat,
};

/// Baseline win rate for the global tier.
pub const EVEN_BASELINE: f64 = 50.0;

/// Errors from the concurrent combination path.
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("Entity task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Per-hero combined records plus the heroes left out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Combination {
    pub entities: BTreeMap<String, CombinedEntityRecord>,
    /// Heroes present only in map or matchup data, sorted
    pub skipped: Vec<String>,
}

/// Everything phase two needs for one hero.
#[derive(Debug, Clone)]
struct EntityInputs {
    name: String,
    global: TierStat,
    maps: BTreeMap<String, TierCounts>,
    matchups: BTreeMap<String, MatchupRecord>,
}

/// Regroup `map -> hero -> counters` as `hero -> map -> counters`.
pub fn index_maps_by_entity(
    map_stats: &BTreeMap<String, BTreeMap<String, TierCounts>>,
) -> BTreeMap<String, BTreeMap<String, TierCounts>> {
    let mut index: BTreeMap<String, BTreeMap<String, TierCounts>> = BTreeMap::new();
    for (map_name, heroes) in map_stats {
        for (hero, counts) in heroes {
            index
                .entry(hero.clone())
                .or_default()
                .insert(map_name.clone(), *counts);
        }
    }
    index
}

/// Heroes named in map or matchup data but absent from the global stats.
pub fn skipped_entities(stats: &StatsSource, matchups: &MatchupSource) -> Vec<String> {
    let map_heroes = stats.map_stats.values().flat_map(|heroes| heroes.keys());
    let matchup_heroes = matchups.matchups.keys();

    map_heroes
        .chain(matchup_heroes)
        .filter(|hero| !stats.global_stats.contains_key(*hero))
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Combines global, per-map and matchup counters into delta results.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsAggregator {
    engine: DeltaEngine,
    config: CombineConfig,
}

impl StatsAggregator {
    pub fn new(config: CombineConfig) -> Self {
        Self {
            engine: DeltaEngine::new(config.confidence_level),
            config,
        }
    }

    /// Global result: against 50%, no gate, no cap.
    pub fn global_stat(&self, counts: &TierCounts) -> TierStat {
        let result = self
            .engine
            .calculate(counts.counts, EVEN_BASELINE, &TierPolicy::UNGATED);
        TierStat::new(result, counts.extras)
    }

    /// Phase one: global results for every hero in the stats source.
    pub fn global_tier(&self, stats: &StatsSource) -> BTreeMap<String, TierStat> {
        stats
            .global_stats
            .iter()
            .map(|(hero, counts)| (hero.clone(), self.global_stat(counts)))
            .collect()
    }

    /// Per-map results against the hero's global win rate.
    pub fn map_tier(
        &self,
        maps: &BTreeMap<String, TierCounts>,
        baseline: f64,
    ) -> BTreeMap<String, TierStat> {
        maps.iter()
            .map(|(map_name, counts)| {
                let result = self
                    .engine
                    .calculate(counts.counts, baseline, &TierPolicy::UNGATED);
                (map_name.clone(), TierStat::new(result, counts.extras))
            })
            .collect()
    }

    /// Matchup results against the hero's global win rate, gated and capped.
    pub fn matchup_tier(
        &self,
        matchups: &BTreeMap<String, MatchupRecord>,
        baseline: f64,
    ) -> BTreeMap<String, MatchupStat> {
        let policy = self.config.matchup_policy();
        matchups
            .iter()
            .map(|(opponent, record)| {
                let stat = MatchupStat {
                    ally: self.engine.calculate(record.ally.counts(), baseline, &policy),
                    enemy: self.engine.calculate(record.enemy.counts(), baseline, &policy),
                };
                (opponent.clone(), stat)
            })
            .collect()
    }

    /// Phase two for one hero.
    pub fn combine_entity(
        &self,
        global: TierStat,
        maps: &BTreeMap<String, TierCounts>,
        matchups: &BTreeMap<String, MatchupRecord>,
    ) -> CombinedEntityRecord {
        let baseline = global.win_rate();
        CombinedEntityRecord {
            global,
            maps: self.map_tier(maps, baseline),
            matchups: self.matchup_tier(matchups, baseline),
        }
    }

    fn entity_inputs(&self, stats: &StatsSource, matchups: &MatchupSource) -> Vec<EntityInputs> {
        let globals = self.global_tier(stats);
        let mut maps_by_entity = index_maps_by_entity(&stats.map_stats);

        globals
            .into_iter()
            .map(|(name, global)| EntityInputs {
                maps: maps_by_entity.remove(&name).unwrap_or_default(),
                matchups: matchups.matchups.get(&name).cloned().unwrap_or_default(),
                name,
                global,
            })
            .collect()
    }

    fn report_skipped(stats: &StatsSource, matchups: &MatchupSource) -> Vec<String> {
        let skipped = skipped_entities(stats, matchups);
        if !skipped.is_empty() {
            warn!(
                "Skipping {} heroes missing from global stats: {}",
                skipped.len(),
                skipped.join(", ")
            );
        }
        skipped
    }

    /// Combine all heroes sequentially.
    ///
    /// `matchups` must already be in entity perspective.
    pub fn combine(&self, stats: &StatsSource, matchups: &MatchupSource) -> Combination {
        let entities = self
            .entity_inputs(stats, matchups)
            .into_iter()
            .map(|inputs| {
                debug!("Combining {}", inputs.name);
                let record = self.combine_entity(inputs.global, &inputs.maps, &inputs.matchups);
                (inputs.name, record)
            })
            .collect();

        Combination {
            entities,
            skipped: Self::report_skipped(stats, matchups),
        }
    }

    /// Combine all heroes with one blocking task per hero.
    ///
    /// Produces exactly the same result as [`combine`](Self::combine).
    pub async fn combine_concurrent(
        &self,
        stats: &StatsSource,
        matchups: &MatchupSource,
    ) -> Result<Combination, AggregateError> {
        let mut tasks = JoinSet::new();
        for inputs in self.entity_inputs(stats, matchups) {
            let aggregator = *self;
            tasks.spawn_blocking(move || {
                let record =
                    aggregator.combine_entity(inputs.global, &inputs.maps, &inputs.matchups);
                (inputs.name, record)
            });
        }

        let mut entities = BTreeMap::new();
        while let Some(joined) = tasks.join_next().await {
            let (name, record) = joined?;
            entities.insert(name, record);
        }

        Ok(Combination {
            entities,
            skipped: Self::report_skipped(stats, matchups),
        })
    }
}
