//! Centralized constants for the card arbitrage tracker
//!
//! This module contains universal defaults that apply to any deployment.
//! Deployment-specific overrides are loaded from config.toml.

// =============================================================================
// Snapshot Columns
// =============================================================================

/// Card name column (required, used as the baseline lookup key)
pub const COL_CARD_NAME: &str = "Card Name";

/// Raw (ungraded) price column (required)
pub const COL_RAW_PRICE: &str = "Raw Price";

/// PSA 10 graded price column (required)
pub const COL_GRADED_PRICE: &str = "PSA 10 Price";

/// Set name column (optional)
#[allow(dead_code)]
pub const COL_SET_NAME: &str = "Set Name";

/// Snapshot date column (optional; history files take their date from the filename)
#[allow(dead_code)]
pub const COL_DATE: &str = "Date";

// =============================================================================
// Filter Defaults
// =============================================================================

/// Default grading service fee in USD
pub const DEFAULT_GRADING_FEE: f64 = 20.0;

/// Default maximum raw acquisition price in USD
pub const DEFAULT_MAX_RAW_PRICE: f64 = 25.0;

/// Default maximum graded resale price in USD
pub const DEFAULT_MAX_GRADED_PRICE: f64 = 10_000.0;

/// Default minimum profit margin in USD
pub const DEFAULT_MIN_PROFIT_MARGIN: f64 = 50.0;

/// Set-name prefix stripped during normalization (case-insensitive)
pub const DEFAULT_SET_PREFIX: &str = "Pokemon ";

// =============================================================================
// File Names
// =============================================================================

/// Current snapshot filename
pub const SNAPSHOT_FILENAME: &str = "latest_data.csv";

/// Directory holding dated historical snapshots
pub const HISTORY_DIR: &str = "daily_tracker";

/// Filename prefix for historical snapshots (`<prefix>_<YYYY-MM-DD>.csv`)
pub const HISTORY_PREFIX: &str = "pokemon_tracking";

/// Extension required on historical snapshot files
pub const HISTORY_EXTENSION: &str = "csv";

/// Filtered results export filename
pub const EXPORT_FILENAME: &str = "filtered_cards.csv";

// =============================================================================
// Date Handling
// =============================================================================

/// Date format used in history filenames and `Date` columns
pub const DATE_FORMAT: &str = "%Y-%m-%d";
