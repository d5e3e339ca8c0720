//! Error types for the alignment pipeline

use crate::types::DatasetRole;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal, run-terminating errors.
///
/// Per-record problems are not errors; they are tallied as
/// [`crate::types::DropCause`] and the record is dropped.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Cannot read {role} dataset at {}: {source}", .path.display())]
    Io {
        role: DatasetRole,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {role} dataset: {source}")]
    Csv {
        role: DatasetRole,
        #[source]
        source: csv::Error,
    },

    #[error("{role} dataset is missing required column '{column}'")]
    MissingColumn { role: DatasetRole, column: String },

    #[error(
        "Alignment produced no records (subject rows in window: {subject_rows}, benchmark rows in window: {benchmark_rows})"
    )]
    EmptyResult {
        subject_rows: usize,
        benchmark_rows: usize,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cannot write export to {}: {source}", .path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

pub type Result<T> = std::result::Result<T, PipelineError>;
