//! Series cleaning: raw records to dated, de-duplicated observations
//!
//! Drops are never silent. Every removed row lands in the returned tally and
//! is logged at debug level with its source line.

use super::dates::DateNormalizer;
use super::schema::ResolvedColumns;
use super::values::{coerce_value, CoercedValue};
use super::StageOutput;
use crate::types::{DropCause, DropTally, RawDataset};
use chrono::NaiveDate;
use tracing::{debug, info};

/// A record with a valid date whose value may still be a gap
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatedValue {
    pub line: usize,
    pub date: NaiveDate,
    /// `None` for a blank/NA cell
    pub value: Option<f64>,
}

/// Normalize dates, coerce values, sort by date and collapse duplicate dates.
///
/// The result is strictly ascending by date.
pub fn clean_series(
    dataset: &RawDataset,
    columns: &ResolvedColumns,
    normalizer: &DateNormalizer,
) -> StageOutput<DatedValue> {
    let role = dataset.role;
    let mut dropped = DropTally::new();
    dropped.add_n(DropCause::MalformedRow, dataset.malformed_rows);

    let mut parsed = Vec::with_capacity(dataset.len());
    for record in &dataset.records {
        let date_text = record.get(&columns.date).unwrap_or("");
        let Some(date) = normalizer.normalize(date_text) else {
            debug!("{} line {}: unparseable date {:?}", role, record.line, date_text);
            dropped.add(DropCause::UnparseableDate);
            continue;
        };

        let value_text = record.get(&columns.value).unwrap_or("");
        let value = match coerce_value(value_text) {
            CoercedValue::Value(v) => Some(v),
            CoercedValue::Missing => None,
            CoercedValue::Unparseable => {
                debug!("{} line {}: unparseable value {:?}", role, record.line, value_text);
                dropped.add(DropCause::UnparseableValue);
                continue;
            }
        };

        parsed.push(DatedValue {
            line: record.line,
            date,
            value,
        });
    }

    let deduped = dedupe_by_date(parsed);
    dropped.merge(&deduped.dropped);

    info!(
        "{} cleaning: {} of {} rows kept, {} dropped",
        role,
        deduped.records.len(),
        dataset.len() + dataset.malformed_rows,
        dropped.total()
    );

    StageOutput {
        records: deduped.records,
        dropped,
    }
}

/// Sort by date and keep one record per date: the first in file order that
/// has a value, or the first overall when none do.
pub fn dedupe_by_date(mut records: Vec<DatedValue>) -> StageOutput<DatedValue> {
    // stable: file order survives within a date
    records.sort_by_key(|r| r.date);

    let mut dropped = DropTally::new();
    let mut kept: Vec<DatedValue> = Vec::with_capacity(records.len());

    for record in records {
        if let Some(last) = kept.last_mut() {
            if last.date == record.date {
                debug!(
                    "line {} duplicates date {} (already seen on line {})",
                    record.line, record.date, last.line
                );
                if last.value.is_none() && record.value.is_some() {
                    *last = record;
                }
                dropped.add(DropCause::DuplicateDate);
                continue;
            }
        }
        kept.push(record);
    }

    StageOutput {
        records: kept,
        dropped,
    }
}
