//! Filesystem operations for source and combined datasets.
//!
//! Handles reading and writing to the local data directory:
//! - Hero stats source (global and per-map counters)
//! - Hero matchup source (ally and enemy counters)
//! - Combined output dataset

mod json;

pub use json::*;

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cannot read {source_name} source at {path}: {reason}")]
    MissingSource {
        source_name: String,
        path: PathBuf,
        reason: String,
    },

    #[error("Cannot parse {source_name} source at {path}: {reason}")]
    MalformedSource {
        source_name: String,
        path: PathBuf,
        reason: String,
    },
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn stats_path(&self) -> PathBuf {
        self.data_dir.join("hero_stats.json")
    }

    pub fn matchups_path(&self) -> PathBuf {
        self.data_dir.join("hero_matchups.json")
    }

    pub fn combined_path(&self) -> PathBuf {
        self.data_dir.join("hero_data_combined.json")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_config_paths() {
        let config = StorageConfig::new(PathBuf::from("/data"));

        assert_eq!(config.stats_path(), PathBuf::from("/data/hero_stats.json"));
        assert_eq!(
            config.matchups_path(),
            PathBuf::from("/data/hero_matchups.json")
        );
        assert_eq!(
            config.combined_path(),
            PathBuf::from("/data/hero_data_combined.json")
        );
    }

    #[test]
    fn test_storage_config_default() {
        let config = StorageConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("./data"));
    }

    #[test]
    fn test_missing_source_names_source() {
        let err = StorageError::MissingSource {
            source_name: "matchups".to_string(),
            path: PathBuf::from("/data/hero_matchups.json"),
            reason: "No such file or directory".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("matchups"));
        assert!(message.contains("/data/hero_matchups.json"));
    }
}
