//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::{ConfidenceLevel, MaxDelta, TierPolicy, UnsupportedConfidenceLevel};
use crate::storage::StorageConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error(transparent)]
    UnsupportedConfidenceLevel(#[from] UnsupportedConfidenceLevel),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Statistical parameters for combining.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombineConfig {
    /// Wilson interval confidence level
    #[serde(default)]
    pub confidence_level: ConfidenceLevel,

    /// Matchups with fewer games are reported as neutral
    #[serde(default = "default_min_games")]
    pub min_games: u64,

    /// Cap on matchup deltas, or "uncapped"
    #[serde(default)]
    pub max_delta: MaxDelta,
}

fn default_min_games() -> u64 {
    100
}

impl Default for CombineConfig {
    fn default() -> Self {
        Self {
            confidence_level: ConfidenceLevel::default(),
            min_games: default_min_games(),
            max_delta: MaxDelta::default(),
        }
    }
}

impl CombineConfig {
    /// Gate and cap applied to the matchup tier.
    pub fn matchup_policy(&self) -> TierPolicy {
        TierPolicy::new(self.min_games, self.max_delta)
    }
}

/// Optional overrides for input and output files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilesConfig {
    #[serde(default)]
    pub stats: Option<PathBuf>,

    #[serde(default)]
    pub matchups: Option<PathBuf>,

    #[serde(default)]
    pub output: Option<PathBuf>,
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub data_dir: Option<PathBuf>,
    pub confidence_level: Option<f64>,
    pub min_games: Option<u64>,
    pub max_delta: Option<MaxDelta>,
    pub stats: Option<PathBuf>,
    pub matchups: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub combine: CombineConfig,

    #[serde(default)]
    pub files: FilesConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            combine: CombineConfig::default(),
            files: FilesConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise use defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!("No config file at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.log_level.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Log level must not be empty".to_string(),
            ));
        }

        if let Some(cap) = self.combine.max_delta.cap() {
            if !cap.is_finite() || cap < 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "Max delta must be a finite value >= 0, got {}",
                    cap
                )));
            }
        }

        Ok(())
    }

    /// Apply command-line overrides, then re-validate.
    pub fn apply(&mut self, overrides: Overrides) -> Result<(), ConfigError> {
        if let Some(dir) = overrides.data_dir {
            self.data_dir = dir;
        }
        if let Some(level) = overrides.confidence_level {
            self.combine.confidence_level = ConfidenceLevel::try_from(level)?;
        }
        if let Some(min_games) = overrides.min_games {
            self.combine.min_games = min_games;
        }
        if let Some(max_delta) = overrides.max_delta {
            self.combine.max_delta = max_delta;
        }
        if overrides.stats.is_some() {
            self.files.stats = overrides.stats;
        }
        if overrides.matchups.is_some() {
            self.files.matchups = overrides.matchups;
        }
        if overrides.output.is_some() {
            self.files.output = overrides.output;
        }
        self.validate()
    }

    pub fn storage(&self) -> StorageConfig {
        StorageConfig::new(self.data_dir.clone())
    }

    pub fn stats_path(&self) -> PathBuf {
        self.files
            .stats
            .clone()
            .unwrap_or_else(|| self.storage().stats_path())
    }

    pub fn matchups_path(&self) -> PathBuf {
        self.files
            .matchups
            .clone()
            .unwrap_or_else(|| self.storage().matchups_path())
    }

    pub fn output_path(&self) -> PathBuf {
        self.files
            .output
            .clone()
            .unwrap_or_else(|| self.storage().combined_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.combine.confidence_level, ConfidenceLevel::P80);
        assert_eq!(config.combine.min_games, 100);
        assert_eq!(config.combine.max_delta, MaxDelta::Capped(5.0));
    }

    #[test]
    fn test_matchup_policy() {
        let policy = CombineConfig::default().matchup_policy();
        assert_eq!(policy.min_games, 100);
        assert_eq!(policy.max_delta_cap, Some(5.0));
    }

    #[test]
    fn test_config_validation_ok() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_empty_log_level() {
        let mut config = AppConfig::default();
        config.log_level = " ".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_config_validation_negative_cap() {
        let mut config = AppConfig::default();
        config.combine.max_delta = MaxDelta::Capped(-1.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_toml() {
        let config = AppConfig::from_toml(
            r#"
            data_dir = "/srv/heroes"

            [combine]
            confidence_level = 0.95
            min_games = 250
            max_delta = "uncapped"

            [files]
            output = "/tmp/combined.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.combine.confidence_level, ConfidenceLevel::P95);
        assert_eq!(config.combine.min_games, 250);
        assert_eq!(config.combine.max_delta, MaxDelta::Uncapped);
        assert_eq!(config.stats_path(), PathBuf::from("/srv/heroes/hero_stats.json"));
        assert_eq!(config.output_path(), PathBuf::from("/tmp/combined.json"));
    }

    #[test]
    fn test_parse_toml_numeric_cap() {
        let config = AppConfig::from_toml("[combine]\nmax_delta = 3.5\n").unwrap();
        assert_eq!(config.combine.max_delta, MaxDelta::Capped(3.5));
        assert_eq!(config.combine.min_games, 100);
    }

    #[test]
    fn test_unsupported_confidence_rejected() {
        let result = AppConfig::from_toml("[combine]\nconfidence_level = 0.75\n");
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
        assert!(err.to_string().contains("unsupported confidence level"));
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = AppConfig::default();
        config
            .apply(Overrides {
                data_dir: Some(PathBuf::from("/var/heroes")),
                confidence_level: Some(0.9),
                min_games: Some(20),
                max_delta: Some(MaxDelta::Uncapped),
                matchups: Some(PathBuf::from("/tmp/m.json")),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(config.combine.confidence_level, ConfidenceLevel::P90);
        assert_eq!(config.combine.min_games, 20);
        assert_eq!(config.combine.max_delta, MaxDelta::Uncapped);
        assert_eq!(config.stats_path(), PathBuf::from("/var/heroes/hero_stats.json"));
        assert_eq!(config.matchups_path(), PathBuf::from("/tmp/m.json"));
    }

    #[test]
    fn test_apply_rejects_unsupported_confidence() {
        let mut config = AppConfig::default();
        let err = config
            .apply(Overrides {
                confidence_level: Some(0.97),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedConfidenceLevel(_)));
        assert_eq!(config.combine.confidence_level, ConfidenceLevel::P80);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let config = AppConfig::load_or_default(&temp_dir.path().join("config.toml")).unwrap();
        assert_eq!(config.combine, CombineConfig::default());
    }

    #[test]
    fn test_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "log_level = \"debug\"\n[combine]\nmin_games = 0\n").unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.combine.min_games, 0);
    }
}
