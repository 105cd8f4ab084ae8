//! Snapshot loading from CSV price tables
//!
//! A snapshot is one table of card prices. The required columns are validated
//! once against the header, so the rest of the pipeline works with typed
//! fields instead of string-keyed column lookups. Numeric fields parse
//! leniently: an empty or unparseable price becomes `None` and the row is
//! dropped before derivation rather than failing the whole load.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use std::path::Path;

use crate::constants;
use crate::error::{PipelineError, Result};

/// One row of a pricing table
#[derive(Debug, Clone, Deserialize)]
pub struct CardRecord {
    /// Card name, used as the baseline lookup key
    #[serde(rename = "Card Name")]
    pub name: String,

    /// Set the card belongs to (column optional, empty values become None)
    #[serde(rename = "Set Name", default, deserialize_with = "lenient_string")]
    pub set_name: Option<String>,

    /// Raw (ungraded) price in USD; None when missing or unparseable
    #[serde(rename = "Raw Price", deserialize_with = "lenient_price")]
    pub raw_price: Option<f64>,

    /// PSA 10 graded price in USD; None when missing or unparseable
    #[serde(rename = "PSA 10 Price", deserialize_with = "lenient_price")]
    pub graded_price: Option<f64>,

    /// Date the prices were observed. History files override this with the
    /// date embedded in their filename.
    #[serde(rename = "Date", default, deserialize_with = "lenient_date")]
    pub as_of: Option<NaiveDate>,
}

/// Parse a price cell, treating empty or malformed values as missing
fn lenient_price<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.trim().parse::<f64>().ok()))
}

/// Parse a date cell in `YYYY-MM-DD`, treating anything else as missing
fn lenient_date<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| NaiveDate::parse_from_str(s.trim(), constants::DATE_FORMAT).ok()))
}

/// Treat empty cells as absent
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.trim().is_empty()))
}

/// Columns that must be present in every snapshot
const REQUIRED_COLUMNS: [&str; 3] = [
    constants::COL_CARD_NAME,
    constants::COL_RAW_PRICE,
    constants::COL_GRADED_PRICE,
];

/// Load a snapshot from a CSV file
///
/// The header is validated up front so a missing required column reports the
/// column name instead of surfacing as a per-row deserialization error.
pub fn load_snapshot(path: &Path) -> Result<Vec<CardRecord>> {
    let mut rdr = csv::Reader::from_path(path)?;

    let headers = rdr.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(PipelineError::DataIntegrity {
                column: column.to_string(),
                path: path.to_path_buf(),
            });
        }
    }

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let record: CardRecord = result?;
        rows.push(record);
    }
    Ok(rows)
}
