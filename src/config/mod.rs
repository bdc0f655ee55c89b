//! Configuration loading with precedence handling.
//!
//! Settings resolve Defaults -> Config File -> CLI args. The file is TOML
//! with all fields optional; unknown keys are rejected so typos surface
//! early.

use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Default scaling from the listed price to the displayed local price.
pub const DEFAULT_PRICE_MULTIPLIER: u64 = 3000;

/// Scan depths at or below this select incremental reconciliation.
pub const DEFAULT_INCREMENTAL_THRESHOLD: usize = 100;

/// Default result cap for search queries.
pub const DEFAULT_SEARCH_LIMIT: usize = 500;

/// Built-in best-seller keywords used for highlight markup.
const DEFAULT_BEST_SELLERS: &[&str] = &[
    "mario kart",
    "mario odyssey",
    "mario bros",
    "mario party",
    "mario maker",
    "zelda",
    "breath of the wild",
    "tears of the kingdom",
    "link's awakening",
    "pokemon",
    "pok\u{e9}mon",
    "animal crossing",
    "smash bros",
    "super smash",
    "splatoon",
    "kirby",
    "metroid",
    "fire emblem",
    "luigi's mansion",
    "pikmin",
    "xenoblade",
    "bayonetta",
];

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read an explicitly requested config file.
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - unset fields fall back to hardcoded defaults.
/// Corresponds to `~/.config/packdex/config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Price multiplier applied to parsed base prices.
    #[serde(default)]
    pub price_multiplier: Option<u64>,

    /// Scan depth at or below which incremental sync is used.
    #[serde(default)]
    pub incremental_threshold: Option<usize>,

    /// Default search result limit.
    #[serde(default)]
    pub search_limit: Option<usize>,

    /// Best-seller keywords, replacing the built-in set.
    #[serde(default)]
    pub best_sellers: Option<Vec<String>>,

    /// Path to the automatic cover table JSON file.
    #[serde(default)]
    pub covers_path: Option<PathBuf>,

    /// Path to the manual cover overrides JSON file.
    #[serde(default)]
    pub manual_covers_path: Option<PathBuf>,

    /// Path to the log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Price multiplier applied to parsed base prices.
    pub price_multiplier: u64,
    /// Scan depth at or below which incremental sync is used.
    pub incremental_threshold: usize,
    /// Default search result limit.
    pub search_limit: usize,
    /// Best-seller keywords (lowercased).
    pub best_sellers: Vec<String>,
    /// Automatic cover table path, if any.
    pub covers_path: Option<PathBuf>,
    /// Manual cover overrides path, if any.
    pub manual_covers_path: Option<PathBuf>,
    /// Log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            price_multiplier: DEFAULT_PRICE_MULTIPLIER,
            incremental_threshold: DEFAULT_INCREMENTAL_THRESHOLD,
            search_limit: DEFAULT_SEARCH_LIMIT,
            best_sellers: DEFAULT_BEST_SELLERS.iter().map(|s| s.to_string()).collect(),
            covers_path: None,
            manual_covers_path: None,
            log_file_path: default_log_path(),
        }
    }
}

impl ConfigFile {
    /// Merge file values over a base config. Set fields win; unset fields
    /// keep the base value. Best-seller keywords are lowercased on merge.
    pub fn merge_over(self, base: ResolvedConfig) -> ResolvedConfig {
        ResolvedConfig {
            price_multiplier: self.price_multiplier.unwrap_or(base.price_multiplier),
            incremental_threshold: self
                .incremental_threshold
                .unwrap_or(base.incremental_threshold),
            search_limit: self.search_limit.unwrap_or(base.search_limit),
            best_sellers: self
                .best_sellers
                .map(|kws| kws.into_iter().map(|kw| kw.to_lowercase()).collect())
                .unwrap_or(base.best_sellers),
            covers_path: self.covers_path.or(base.covers_path),
            manual_covers_path: self.manual_covers_path.or(base.manual_covers_path),
            log_file_path: self.log_file_path.unwrap_or(base.log_file_path),
        }
    }
}

/// Load the config file, explicit path first, default location second.
///
/// An explicitly requested file that is missing or malformed is an error.
/// A missing file at the default location is not: `Ok(None)`.
pub fn load_config(explicit: Option<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let (path, required) = match explicit {
        Some(path) => (path, true),
        None => match default_config_path() {
            Some(path) => (path, false),
            None => return Ok(None),
        },
    };

    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(err) if !required && err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(ConfigError::ReadError {
                path,
                reason: err.to_string(),
            });
        }
    };

    toml::from_str(&raw)
        .map(Some)
        .map_err(|err| ConfigError::ParseError {
            path,
            reason: err.to_string(),
        })
}

/// Resolve the full precedence chain from an optional config file.
pub fn resolve(file: Option<ConfigFile>) -> ResolvedConfig {
    match file {
        Some(file) => file.merge_over(ResolvedConfig::default()),
        None => ResolvedConfig::default(),
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("packdex").join("config.toml"))
}

fn default_log_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("packdex").join("packdex.log"))
        .unwrap_or_else(|| PathBuf::from("packdex.log"))
}
