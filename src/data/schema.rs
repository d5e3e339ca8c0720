//! Schema validation
//!
//! Runs before any cell is parsed so that an absent column fails once, with
//! the dataset role and column name, instead of as a flood of per-row drops.

use crate::config::SeriesConfig;
use crate::error::{PipelineError, Result};
use crate::types::RawDataset;

/// Actual header names found for the logical columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumns {
    pub date: String,
    pub value: String,
}

/// Find a header by name: exact match first, then case-insensitive
pub fn resolve_column<'a>(headers: &'a [String], name: &str) -> Option<&'a str> {
    let name = name.trim();
    headers
        .iter()
        .find(|h| h.as_str() == name)
        .or_else(|| headers.iter().find(|h| h.eq_ignore_ascii_case(name)))
        .map(String::as_str)
}

/// Check that every required column exists, returning the resolved names in
/// the same order.
pub fn validate_columns(dataset: &RawDataset, required: &[&str]) -> Result<Vec<String>> {
    required
        .iter()
        .map(|column| {
            resolve_column(&dataset.headers, column)
                .map(str::to_string)
                .ok_or_else(|| PipelineError::MissingColumn {
                    role: dataset.role,
                    column: column.trim().to_string(),
                })
        })
        .collect()
}

/// Validate a dataset against its series' column mapping
pub fn validate_schema(dataset: &RawDataset, series: &SeriesConfig) -> Result<ResolvedColumns> {
    let required = [series.date_column.as_str(), series.value_column.as_str()];
    let mut resolved = validate_columns(dataset, &required)?.into_iter();

    match (resolved.next(), resolved.next()) {
        (Some(date), Some(value)) => Ok(ResolvedColumns { date, value }),
        // validate_columns returns one name per requirement
        _ => Err(PipelineError::MissingColumn {
            role: dataset.role,
            column: series.value_column.clone(),
        }),
    }
}
