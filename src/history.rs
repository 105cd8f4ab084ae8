//! Historical snapshot scanning and baseline construction
//!
//! Daily snapshots are written as `<prefix>_<YYYY-MM-DD>.csv` into one
//! directory. The scan collects every matching file, orders the tables by the
//! date embedded in the filename, and hands back the earliest and latest. The
//! earliest becomes the baseline that trend computation compares against.
//!
//! Filenames that don't match the pattern are ignored; a matching file that
//! fails to parse aborts the whole scan so corrupt data is never silently
//! skipped.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::path::Path;

use crate::constants;
use crate::error::{PipelineError, Result};
use crate::snapshot::{self, CardRecord};

/// A dated table of card prices
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub as_of: NaiveDate,
    pub rows: Vec<CardRecord>,
}

/// Earliest and latest historical snapshots by embedded date
///
/// When exactly one history file exists, both fields hold the same table.
#[derive(Debug, Clone)]
pub struct HistoryScan {
    pub earliest: Snapshot,
    pub latest: Snapshot,
}

/// Baseline prices for one card name
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaselinePrice {
    pub raw: Option<f64>,
    pub graded: Option<f64>,
}

/// Lookup from card name to its baseline prices
pub type BaselineLookup = HashMap<String, BaselinePrice>;

/// Extract the date embedded in a history filename
///
/// Returns `None` for anything that isn't exactly
/// `<prefix>_<YYYY-MM-DD>.csv`, signalling "not a history file" rather than
/// an error.
pub fn history_file_date(file_name: &str, prefix: &str) -> Option<NaiveDate> {
    let rest = file_name.strip_prefix(prefix)?.strip_prefix('_')?;
    let date_str = rest.strip_suffix(constants::HISTORY_EXTENSION)?.strip_suffix('.')?;
    NaiveDate::parse_from_str(date_str, constants::DATE_FORMAT).ok()
}

/// Load every dated history file in a directory, sorted by embedded date
///
/// Filenames that don't match the pattern are skipped silently. A matching
/// file that cannot be read or parsed fails the whole collection with the
/// file named in the error.
pub fn collect_snapshots(dir: &Path, prefix: &str) -> Result<Vec<Snapshot>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut snapshots: Vec<Snapshot> = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        let Some(as_of) = history_file_date(name, prefix) else {
            continue;
        };

        let path = entry.path();
        let mut rows =
            snapshot::load_snapshot(&path).map_err(|e| PipelineError::MalformedHistoryFile {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        // A single file-level date applies to every row, overriding any
        // per-row Date column.
        for row in &mut rows {
            row.as_of = Some(as_of);
        }

        snapshots.push(Snapshot { as_of, rows });
    }

    snapshots.sort_by_key(|s| s.as_of);
    Ok(snapshots)
}

/// Scan a directory for dated history files
///
/// Returns `Ok(None)` when no file matches, which callers treat as "no
/// history available" and disable trend computation.
pub fn scan_history(dir: &Path, prefix: &str) -> Result<Option<HistoryScan>> {
    let snapshots = collect_snapshots(dir, prefix)?;
    if snapshots.is_empty() {
        return Ok(None);
    }

    let earliest = snapshots[0].clone();
    let latest = snapshots[snapshots.len() - 1].clone();
    Ok(Some(HistoryScan { earliest, latest }))
}

/// Build the name -> baseline-price lookup from a snapshot
///
/// Later duplicates of a name overwrite earlier ones, matching the original
/// tracker's last-wins map construction.
pub fn baseline_lookup(snapshot: &Snapshot) -> BaselineLookup {
    let mut lookup = BaselineLookup::new();
    for row in &snapshot.rows {
        lookup.insert(
            row.name.clone(),
            BaselinePrice {
                raw: row.raw_price,
                graded: row.graded_price,
            },
        );
    }
    lookup
}
