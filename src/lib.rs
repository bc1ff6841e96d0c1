//! # Hero Meta
//!
//! Combines hero win/loss counters from two community sources into one
//! dataset of confidence-bounded win-rate deltas.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (counters, delta results, datasets)
//! - **ingest**: Lenient normalization of raw source documents
//! - **calculate**: Wilson intervals, delta engine, matchup transposition
//! - **aggregate**: Two-phase combine across global, map and matchup tiers
//! - **storage**: JSON source and output files
//! - **config**: Configuration loading and validation

pub mod aggregate;
pub mod calculate;
pub mod config;
pub mod ingest;
pub mod models;
pub mod storage;

pub use models::*;
