use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hero_meta::aggregate::pipeline::{self, CombineInputs, MATCHUPS_SOURCE};
use hero_meta::calculate::transpose_source;
use hero_meta::config::{AppConfig, Overrides};
use hero_meta::ingest::Normalizer;
use hero_meta::models::{MaxDelta, Perspective};
use hero_meta::storage::{read_source, write_json};

#[derive(Parser)]
#[command(name = "hero-meta")]
#[command(about = "Combine hero win/loss counters into confidence-bounded deltas")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: String,

    /// Data directory path (overrides config)
    #[arg(long)]
    data_dir: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Combine hero stats and matchups into one dataset
    Combine {
        /// Hero stats source (default: <data-dir>/hero_stats.json)
        #[arg(long)]
        stats: Option<PathBuf>,

        /// Hero matchups source (default: <data-dir>/hero_matchups.json)
        #[arg(long)]
        matchups: Option<PathBuf>,

        /// Output file (default: <data-dir>/hero_data_combined.json)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Confidence level: 0.80, 0.85, 0.90, 0.95 or 0.99
        #[arg(long)]
        confidence: Option<f64>,

        /// Minimum games for a matchup result
        #[arg(long)]
        min_games: Option<u64>,

        /// Cap on matchup deltas (e.g. "5.0" or "uncapped")
        #[arg(long)]
        max_delta: Option<MaxDelta>,

        /// Process heroes concurrently
        #[arg(long)]
        parallel: bool,

        /// Combine but don't write the output file
        #[arg(long)]
        dry_run: bool,
    },

    /// Rewrite an opponent-perspective matchup file in hero perspective
    Transpose {
        /// Raw matchup file
        #[arg(long)]
        input: PathBuf,

        /// Output file
        #[arg(long)]
        output: PathBuf,

        /// Transpose even if the file is not marked as opponent perspective
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(Path::new(&cli.config))
        .with_context(|| format!("Failed to load config from {}", cli.config))?;
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Starting hero-meta v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Combine {
            stats,
            matchups,
            output,
            confidence,
            min_games,
            max_delta,
            parallel,
            dry_run,
        } => {
            config
                .apply(Overrides {
                    data_dir: cli.data_dir.map(PathBuf::from),
                    confidence_level: confidence,
                    min_games,
                    max_delta,
                    stats,
                    matchups,
                    output,
                })
                .context("Invalid combine options")?;

            let inputs = CombineInputs::load(&config.stats_path(), &config.matchups_path())
                .context("Failed to load sources")?;

            let outcome = if parallel {
                pipeline::run_concurrent(&config.combine, &inputs).await
            } else {
                pipeline::run(&config.combine, &inputs)
            }
            .context("Failed to combine sources")?;

            let output_path = config.output_path();
            let written = if dry_run {
                None
            } else {
                Some(
                    write_json(&output_path, &outcome.dataset)
                        .with_context(|| format!("Failed to write {:?}", output_path))?,
                )
            };

            let dataset = &outcome.dataset;
            println!("\n=== Combine Results ===");
            println!("Heroes:           {}", dataset.entities.len());
            println!("Map results:      {}", dataset.map_result_count());
            println!("Matchup results:  {}", dataset.matchup_result_count());
            println!("Skipped heroes:   {}", outcome.skipped.len());
            println!("Coerced fields:   {}", outcome.coercions.count());
            println!("Confidence:       {}", dataset.metadata.confidence_level);
            println!("Input digest:     {}", dataset.metadata.input_digest);
            match written {
                Some(size) => println!("Output:           {:?} ({} bytes)", output_path, size),
                None => println!("\n(dry run - no data written to disk)"),
            }
        }

        Commands::Transpose {
            input,
            output,
            force,
        } => {
            let raw = read_source(MATCHUPS_SOURCE, &input).context("Failed to load matchups")?;

            let mut normalizer = Normalizer::new();
            let mut source = normalizer
                .matchup_source(&raw.value)
                .context("Invalid matchup source")?;

            if force {
                source.metadata.perspective = Perspective::Opponent;
            }
            if source.metadata.perspective == Perspective::Entity {
                tracing::warn!(
                    "{:?} is already in hero perspective, writing it unchanged (use --force to flip)",
                    input
                );
            }

            let pairs = source.pair_count();
            let source = transpose_source(source);
            let size = write_json(&output, &source)
                .with_context(|| format!("Failed to write {:?}", output))?;

            println!("\n=== Transpose Results ===");
            println!("Heroes:           {}", source.matchups.len());
            println!("Matchup pairs:    {}", pairs);
            println!("Coerced fields:   {}", normalizer.report().count());
            println!("Output:           {:?} ({} bytes)", output, size);
        }
    }

    Ok(())
}
