//! Core data models for hero stat combination.

mod confidence;
mod counts;
mod dataset;
mod delta;
mod digest;
mod matchup;

pub use confidence::*;
pub use counts::*;
pub use dataset::*;
pub use delta::*;
pub use digest::*;
pub use matchup::*;
