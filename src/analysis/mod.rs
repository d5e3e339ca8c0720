//! Read-only analysis over the aligned table
//!
//! Consumers of the pipeline output:
//! - Monthly aggregate (mean/std by calendar month)
//! - Descriptive summary per column
//! - Correlation matrix

pub mod monthly;
pub mod summary;


pub use monthly::{monthly_aggregate, MonthlyRow};
pub use summary::{correlation_matrix, describe, ColumnSummary, CorrelationMatrix, SummaryTable};

use crate::types::AlignedRecord;

/// The numeric columns of the aligned table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    SubjectValue,
    BenchmarkValue,
    DiffPct,
}

impl Column {
    pub const ALL: [Column; 3] = [Column::SubjectValue, Column::BenchmarkValue, Column::DiffPct];

    pub fn name(&self) -> &'static str {
        match self {
            Column::SubjectValue => "subject_value",
            Column::BenchmarkValue => "benchmark_value",
            Column::DiffPct => "diff_pct",
        }
    }

    pub fn get(&self, record: &AlignedRecord) -> f64 {
        match self {
            Column::SubjectValue => record.subject_value,
            Column::BenchmarkValue => record.benchmark_value,
            Column::DiffPct => record.diff_pct,
        }
    }

    pub fn values(&self, records: &[AlignedRecord]) -> Vec<f64> {
        records.iter().map(|r| self.get(r)).collect()
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1); `None` below two values
pub(crate) fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / (values.len() - 1) as f64;
    Some(var.sqrt())
}
