//! Date join and relative-performance derivation
//!
//! Inner join: a date missing from either series produces nothing. Trading
//! calendars differ between sources and the intersection resolves that.

use crate::types::{AlignedRecord, DropCause, DropTally, NormalizedRecord};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Alignment {
    /// Ascending by date, one record per date
    pub records: Vec<AlignedRecord>,
    /// Subject dates with no benchmark counterpart
    pub subject_unmatched: usize,
    /// Benchmark dates with no subject counterpart
    pub benchmark_unmatched: usize,
    /// Join-level drops (`DivisionByZero`)
    pub dropped: DropTally,
}

/// Inner-join two series on date and derive `diff_pct`.
///
/// A joined date whose benchmark is within `zero_tolerance` of zero is
/// excluded and counted as `DivisionByZero`.
pub fn align(
    subject: &[NormalizedRecord],
    benchmark: &[NormalizedRecord],
    zero_tolerance: f64,
) -> Alignment {
    let subject = by_date(subject);
    let benchmark = by_date(benchmark);

    let mut records = Vec::with_capacity(subject.len().min(benchmark.len()));
    let mut dropped = DropTally::new();
    let mut subject_unmatched = 0;

    for (&date, &subject_value) in &subject {
        let Some(&benchmark_value) = benchmark.get(&date) else {
            subject_unmatched += 1;
            continue;
        };

        match AlignedRecord::derive(date, subject_value, benchmark_value, zero_tolerance) {
            Some(record) => records.push(record),
            None => {
                debug!("{}: benchmark value {} treated as zero", date, benchmark_value);
                dropped.add(DropCause::DivisionByZero);
            }
        }
    }

    let benchmark_unmatched = benchmark
        .keys()
        .filter(|date| !subject.contains_key(date))
        .count();

    Alignment {
        records,
        subject_unmatched,
        benchmark_unmatched,
        dropped,
    }
}

/// First value per date wins
fn by_date(records: &[NormalizedRecord]) -> BTreeMap<NaiveDate, f64> {
    let mut map = BTreeMap::new();
    for r in records {
        map.entry(r.date).or_insert(r.value);
    }
    map
}
