//! Pipeline error taxonomy
//!
//! Load-time failures name the offending file and column so the operator can
//! locate bad data. A missing history baseline is not an error anywhere in
//! this crate; callers simply skip trend computation.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A required column is absent from an input table. Fatal for that load.
    #[error("missing required column '{column}' in {}", .path.display())]
    DataIntegrity { column: String, path: PathBuf },

    /// A file matching the history pattern could not be parsed. Fatal for the
    /// history scan only; the caller may proceed without trends.
    #[error("malformed history file {}: {reason}", .path.display())]
    MalformedHistoryFile { path: PathBuf, reason: String },

    /// A filter parameter is outside its declared domain. Fatal for that
    /// evaluation call only.
    #[error("invalid filter parameter: {0}")]
    InvalidParameter(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
