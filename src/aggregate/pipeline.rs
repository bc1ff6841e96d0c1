//! End-to-end combine run: raw source documents to a combined dataset.

use std::path::Path;

use thiserror::Error;
use tracing::{info, warn};

use super::{AggregateError, Combination, StatsAggregator};
use crate::calculate::transpose_source;
use crate::config::CombineConfig;
use crate::ingest::{CoercionReport, IngestError, Normalizer};
use crate::models::{
    CombinedDataset, CombinedMetadata, MatchupSource, Perspective, SourceDigest, StatsSource,
    DEFAULT_GAME_TYPE,
};
use crate::storage::{read_source, RawSource, StorageError};

/// Source label for the hero stats file.
pub const STATS_SOURCE: &str = "hero stats";

/// Source label for the hero matchups file.
pub const MATCHUPS_SOURCE: &str = "hero matchups";

/// Errors that abort a combine run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Invalid {source_name} source: {error}")]
    Ingest {
        source_name: &'static str,
        #[source]
        error: IngestError,
    },

    #[error(transparent)]
    Aggregate(#[from] AggregateError),
}

/// Both raw source documents.
#[derive(Debug, Clone)]
pub struct CombineInputs {
    pub stats: RawSource,
    pub matchups: RawSource,
}

impl CombineInputs {
    /// Read both sources; either one missing aborts the run.
    pub fn load(stats_path: &Path, matchups_path: &Path) -> Result<Self, StorageError> {
        Ok(Self {
            stats: read_source(STATS_SOURCE, stats_path)?,
            matchups: read_source(MATCHUPS_SOURCE, matchups_path)?,
        })
    }

    pub fn digest(&self) -> SourceDigest {
        SourceDigest::of(&[self.stats.bytes.as_slice(), self.matchups.bytes.as_slice()])
    }
}

/// Normalized sources ready for aggregation.
#[derive(Debug, Clone)]
pub struct PreparedSources {
    pub stats: StatsSource,
    /// Always in entity perspective
    pub matchups: MatchupSource,
    pub coercions: CoercionReport,
    pub digest: SourceDigest,
}

/// Result of a combine run.
#[derive(Debug, Clone)]
pub struct CombineOutcome {
    pub dataset: CombinedDataset,
    pub skipped: Vec<String>,
    pub coercions: CoercionReport,
}

/// Normalize both sources and put the matchups in entity perspective.
pub fn prepare(inputs: &CombineInputs) -> Result<PreparedSources, PipelineError> {
    let mut normalizer = Normalizer::new();

    let stats = normalizer
        .stats_source(&inputs.stats.value)
        .map_err(|error| PipelineError::Ingest {
            source_name: STATS_SOURCE,
            error,
        })?;
    let mut matchups = normalizer
        .matchup_source(&inputs.matchups.value)
        .map_err(|error| PipelineError::Ingest {
            source_name: MATCHUPS_SOURCE,
            error,
        })?;

    if matchups.metadata.perspective == Perspective::Opponent {
        info!(
            "Transposing {} matchup pairs from opponent perspective",
            matchups.pair_count()
        );
        matchups = transpose_source(matchups);
    }

    let coercions = normalizer.into_report();
    if !coercions.is_empty() {
        warn!(
            "Coerced {} malformed numeric fields to defaults (e.g. {})",
            coercions.count(),
            coercions.samples().join(", ")
        );
    }

    info!(
        "Loaded stats for {} heroes across {} maps, matchups for {} heroes",
        stats.global_stats.len(),
        stats.map_stats.len(),
        matchups.matchups.len()
    );

    Ok(PreparedSources {
        stats,
        matchups,
        coercions,
        digest: inputs.digest(),
    })
}

/// Run parameters and provenance for the output document.
pub fn build_metadata(
    config: &CombineConfig,
    sources: &PreparedSources,
    combination: &Combination,
) -> CombinedMetadata {
    let stats_meta = &sources.stats.metadata;
    let matchups_meta = &sources.matchups.metadata;

    let game_type = stats_meta
        .game_type
        .clone()
        .or_else(|| matchups_meta.game_type.clone())
        .unwrap_or_else(|| DEFAULT_GAME_TYPE.to_string());

    CombinedMetadata {
        source_a_patch: stats_meta.patch().to_string(),
        source_b_patch: matchups_meta.patch().to_string(),
        game_type,
        confidence_level: config.confidence_level,
        z_score: config.confidence_level.z_score(),
        min_games_threshold: config.min_games,
        max_delta_cap: config.max_delta,
        combined_at: stats_meta.capture_label(),
        entity_count: combination.entities.len(),
        skipped_entities: combination.skipped.len(),
        coerced_fields: sources.coercions.count(),
        input_digest: sources.digest.clone(),
    }
}

fn log_parameters(config: &CombineConfig) {
    info!(
        "Combining with confidence {} (z = {}), min games {}, max delta {}",
        config.confidence_level,
        config.confidence_level.z_score(),
        config.min_games,
        config.max_delta
    );
}

fn outcome(
    config: &CombineConfig,
    sources: PreparedSources,
    combination: Combination,
) -> CombineOutcome {
    let metadata = build_metadata(config, &sources, &combination);
    info!("Combined {} heroes", combination.entities.len());

    CombineOutcome {
        dataset: CombinedDataset {
            metadata,
            entities: combination.entities,
        },
        skipped: combination.skipped,
        coercions: sources.coercions,
    }
}

/// Combine sequentially.
pub fn run(config: &CombineConfig, inputs: &CombineInputs) -> Result<CombineOutcome, PipelineError> {
    log_parameters(config);
    let sources = prepare(inputs)?;
    let combination = StatsAggregator::new(*config).combine(&sources.stats, &sources.matchups);
    Ok(outcome(config, sources, combination))
}

/// Combine with one task per hero.
pub async fn run_concurrent(
    config: &CombineConfig,
    inputs: &CombineInputs,
) -> Result<CombineOutcome, PipelineError> {
    log_parameters(config);
    let sources = prepare(inputs)?;
    let combination = StatsAggregator::new(*config)
        .combine_concurrent(&sources.stats, &sources.matchups)
        .await?;
    Ok(outcome(config, sources, combination))
}
