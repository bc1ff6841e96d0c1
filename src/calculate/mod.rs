//! Statistics calculation engine.
//!
//! Pure functions of their inputs:
//! - Wilson score intervals for win rates
//! - Baseline deltas with confidence adjustment, gating and capping
//! - Perspective correction for matchup counters

pub mod delta;
pub mod interval;
pub mod transpose;

pub use delta::{closest_to_zero, round2, DeltaEngine};
pub use interval::{ConfidenceIntervalCalculator, Interval};
pub use transpose::{transpose_enemy, transpose_matchups, transpose_record, transpose_source};
