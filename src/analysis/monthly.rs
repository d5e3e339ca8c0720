//! Monthly aggregate of the aligned table

use super::{mean, sample_std};
use crate::types::AlignedRecord;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One calendar month of aligned records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRow {
    /// `YYYY-MM`
    pub month: String,
    pub count: usize,
    pub subject_mean: f64,
    pub benchmark_mean: f64,
    pub diff_pct_mean: f64,
    /// Empty for single-record months
    pub diff_pct_std: Option<f64>,
}

/// Group by calendar month, ascending
pub fn monthly_aggregate(records: &[AlignedRecord]) -> Vec<MonthlyRow> {
    let mut groups: BTreeMap<(i32, u32), Vec<&AlignedRecord>> = BTreeMap::new();
    for r in records {
        groups.entry(month_key(r.date)).or_default().push(r);
    }

    groups
        .into_iter()
        .filter_map(|((year, month), rows)| {
            let subject: Vec<f64> = rows.iter().map(|r| r.subject_value).collect();
            let benchmark: Vec<f64> = rows.iter().map(|r| r.benchmark_value).collect();
            let diff: Vec<f64> = rows.iter().map(|r| r.diff_pct).collect();

            Some(MonthlyRow {
                month: format!("{:04}-{:02}", year, month),
                count: rows.len(),
                subject_mean: mean(&subject)?,
                benchmark_mean: mean(&benchmark)?,
                diff_pct_mean: mean(&diff)?,
                diff_pct_std: sample_std(&diff),
            })
        })
        .collect()
}

fn month_key(date: NaiveDate) -> (i32, u32) {
    (date.year(), date.month())
}
