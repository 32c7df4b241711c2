//! Configuration file loading for the acpl tool.
//!
//! Settings come from `acpl.toml` in the working directory (or an explicit
//! path). Every field has a default, so an absent file is not an error.

use chess_analysis::AnalysisConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable overriding the configured engine path.
pub const STOCKFISH_PATH_ENV: &str = "STOCKFISH_PATH";

/// Errors that can occur when loading or parsing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Settings for a batch review run.
#[derive(Debug, Deserialize, Clone)]
pub struct ReviewConfig {
    /// Path to the UCI engine executable.
    #[serde(default = "default_stockfish_path")]
    pub stockfish_path: String,
    /// Directory receiving the seven log files.
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    /// Manifest file name, relative to the games folder.
    #[serde(default = "default_manifest")]
    pub manifest: String,
    /// Search depths and ply scope.
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

fn default_stockfish_path() -> String {
    "/usr/local/bin/stockfish".to_string()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_manifest() -> String {
    "games-collection.csv".to_string()
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            stockfish_path: default_stockfish_path(),
            log_dir: default_log_dir(),
            manifest: default_manifest(),
            analysis: AnalysisConfig::default(),
        }
    }
}

impl ReviewConfig {
    /// Loads the configuration and applies the `STOCKFISH_PATH` override.
    ///
    /// With `path` set the file must exist. Without it, [`Self::config_path()`]
    /// is read if present and the defaults are used otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if the file cannot be read,
    /// or [`ConfigError::ParseError`] if the file contains invalid TOML.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Self::config_path();
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_engine_override(std::env::var(STOCKFISH_PATH_ENV).ok());
        Ok(config)
    }

    /// Reads and parses one configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Returns the default path of the configuration file.
    pub fn config_path() -> PathBuf {
        PathBuf::from("acpl.toml")
    }

    /// Replaces the engine path when an override is given and non-empty.
    pub fn apply_engine_override(&mut self, engine: Option<String>) {
        if let Some(engine) = engine.filter(|e| !e.trim().is_empty()) {
            self.stockfish_path = engine;
        }
    }
}
