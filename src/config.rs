//! Configuration for the card arbitrage tracker

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::constants;
use crate::engine::FilterParams;

// =============================================================================
// File-based Configuration (config.toml)
// =============================================================================

/// Configuration loaded from config.toml
///
/// Every section and field is optional; anything not set falls back to the
/// built-in defaults, and CLI flags override both.
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub data: DataSection,
    #[serde(default)]
    pub filters: FilterSection,
}

/// Input/output paths and naming conventions
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DataSection {
    /// Current snapshot CSV
    pub snapshot: PathBuf,
    /// Directory holding dated history files
    pub history_dir: PathBuf,
    /// History filename prefix (`<prefix>_<YYYY-MM-DD>.csv`)
    pub history_prefix: String,
    /// Prefix stripped from set names, case-insensitive
    pub set_prefix: String,
}

impl Default for DataSection {
    fn default() -> Self {
        Self {
            snapshot: PathBuf::from(constants::SNAPSHOT_FILENAME),
            history_dir: PathBuf::from(constants::HISTORY_DIR),
            history_prefix: constants::HISTORY_PREFIX.to_string(),
            set_prefix: constants::DEFAULT_SET_PREFIX.to_string(),
        }
    }
}

/// Default filter values, overridable per run from the CLI
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FilterSection {
    pub grading_fee: f64,
    pub max_raw_price: f64,
    pub max_graded_price: f64,
    pub min_profit_margin: f64,
}

impl Default for FilterSection {
    fn default() -> Self {
        Self {
            grading_fee: constants::DEFAULT_GRADING_FEE,
            max_raw_price: constants::DEFAULT_MAX_RAW_PRICE,
            max_graded_price: constants::DEFAULT_MAX_GRADED_PRICE,
            min_profit_margin: constants::DEFAULT_MIN_PROFIT_MARGIN,
        }
    }
}

impl FileConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content).with_context(|| "Failed to parse config.toml")
    }

    /// Load the config file if it exists, otherwise use built-in defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

// =============================================================================
// Runtime Configuration
// =============================================================================

/// CLI overrides applied on top of the file config
#[derive(Debug, Default)]
pub struct Overrides {
    pub snapshot: Option<PathBuf>,
    pub history_dir: Option<PathBuf>,
    pub grading_fee: Option<f64>,
    pub max_raw_price: Option<f64>,
    pub max_graded_price: Option<f64>,
    pub min_profit_margin: Option<f64>,
    pub allowed_sets: Vec<String>,
    pub name_substrings: Vec<String>,
    pub name_query: Option<String>,
}

/// Resolved configuration for one pipeline run
#[derive(Debug)]
pub struct Config {
    /// Current snapshot CSV path
    pub snapshot: PathBuf,
    /// Directory of dated history files
    pub history_dir: PathBuf,
    /// History filename prefix
    pub history_prefix: String,
    /// Filter parameters for the engine
    pub params: FilterParams,
}

impl Config {
    /// Merge file config and CLI overrides (CLI wins)
    pub fn resolve(file: &FileConfig, cli: Overrides) -> Self {
        let params = FilterParams {
            grading_fee: cli.grading_fee.unwrap_or(file.filters.grading_fee),
            max_raw_price: cli.max_raw_price.unwrap_or(file.filters.max_raw_price),
            max_graded_price: cli.max_graded_price.unwrap_or(file.filters.max_graded_price),
            min_profit_margin: cli.min_profit_margin.unwrap_or(file.filters.min_profit_margin),
            allowed_sets: cli.allowed_sets.into_iter().collect::<BTreeSet<_>>(),
            name_substrings: cli.name_substrings,
            name_query: cli.name_query.unwrap_or_default(),
            set_prefix: file.data.set_prefix.clone(),
        };

        Self {
            snapshot: cli.snapshot.unwrap_or_else(|| file.data.snapshot.clone()),
            history_dir: cli.history_dir.unwrap_or_else(|| file.data.history_dir.clone()),
            history_prefix: file.data.history_prefix.clone(),
            params,
        }
    }
}
