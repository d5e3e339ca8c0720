//! Core record types shared by every pipeline stage

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Which input a dataset plays in the comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetRole {
    /// The tracked group of stocks
    Subject,
    /// The broad market index
    Benchmark,
}

impl std::fmt::Display for DatasetRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetRole::Subject => write!(f, "subject"),
            DatasetRole::Benchmark => write!(f, "benchmark"),
        }
    }
}

/// One row of an input file, untouched
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// 1-based line in the source file (header is line 1)
    pub line: usize,
    /// Column name -> raw cell text
    pub fields: HashMap<String, String>,
}

impl RawRecord {
    /// Pair cells with headers by position. Short rows simply lack the
    /// trailing columns; when a header repeats, its first column wins.
    pub fn from_cells<I, S>(line: usize, headers: &[String], cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut fields = HashMap::with_capacity(headers.len());
        for (header, cell) in headers.iter().zip(cells) {
            fields.entry(header.clone()).or_insert_with(|| cell.into());
        }
        Self { line, fields }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }
}

/// A loaded input file
#[derive(Debug, Clone)]
pub struct RawDataset {
    pub role: DatasetRole,
    /// Header names in file order, trimmed and BOM-stripped
    pub headers: Vec<String>,
    pub records: Vec<RawRecord>,
    /// Rows the CSV reader could not decode at all
    pub malformed_rows: usize,
}

impl RawDataset {
    pub fn new(role: DatasetRole, headers: Vec<String>) -> Self {
        Self {
            role,
            headers,
            records: Vec::new(),
            malformed_rows: 0,
        }
    }

    /// Build a dataset from in-memory rows. Used by callers that already hold
    /// the table, and by tests.
    pub fn from_rows(role: DatasetRole, headers: &[&str], rows: &[&[&str]]) -> Self {
        let headers: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        let records = rows
            .iter()
            .enumerate()
            .map(|(idx, row)| RawRecord::from_cells(idx + 2, &headers, row.iter().copied()))
            .collect();

        Self {
            role,
            headers,
            records,
            malformed_rows: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A cleaned observation: valid calendar date, finite value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub date: NaiveDate,
    pub value: f64,
}

impl NormalizedRecord {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// One row of the merged output
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignedRecord {
    pub date: NaiveDate,
    pub subject_value: f64,
    pub benchmark_value: f64,
    /// (subject - benchmark) / benchmark * 100
    pub diff_pct: f64,
}

impl AlignedRecord {
    /// Returns `None` when the benchmark is within `zero_tolerance` of zero.
    pub fn derive(
        date: NaiveDate,
        subject_value: f64,
        benchmark_value: f64,
        zero_tolerance: f64,
    ) -> Option<Self> {
        if benchmark_value.abs() <= zero_tolerance {
            return None;
        }

        let diff_pct = (subject_value - benchmark_value) / benchmark_value * 100.0;
        if !diff_pct.is_finite() {
            return None;
        }

        Some(Self {
            date,
            subject_value,
            benchmark_value,
            diff_pct,
        })
    }
}

/// Why a record did not reach the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropCause {
    /// The CSV reader could not decode the row
    MalformedRow,
    UnparseableDate,
    UnparseableValue,
    /// Another record already claimed the same normalized date
    DuplicateDate,
    /// Gap dropped because the series' fill policy is `drop`
    MissingValue,
    /// Gap with no earlier value to carry forward
    LeadingGap,
    OutsideWindow,
    /// Date present in only one of the two series
    Unmatched,
    DivisionByZero,
}

impl std::fmt::Display for DropCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DropCause::MalformedRow => "malformed_row",
            DropCause::UnparseableDate => "unparseable_date",
            DropCause::UnparseableValue => "unparseable_value",
            DropCause::DuplicateDate => "duplicate_date",
            DropCause::MissingValue => "missing_value",
            DropCause::LeadingGap => "leading_gap",
            DropCause::OutsideWindow => "outside_window",
            DropCause::Unmatched => "unmatched",
            DropCause::DivisionByZero => "division_by_zero",
        };
        write!(f, "{}", name)
    }
}

/// Dropped-record counts keyed by cause
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DropTally {
    counts: BTreeMap<DropCause, usize>,
}

impl DropTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, cause: DropCause) {
        self.add_n(cause, 1);
    }

    pub fn add_n(&mut self, cause: DropCause, n: usize) {
        if n > 0 {
            *self.counts.entry(cause).or_insert(0) += n;
        }
    }

    pub fn get(&self, cause: DropCause) -> usize {
        self.counts.get(&cause).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn merge(&mut self, other: &DropTally) {
        for (cause, n) in &other.counts {
            self.add_n(*cause, *n);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (DropCause, usize)> + '_ {
        self.counts.iter().map(|(cause, n)| (*cause, *n))
    }
}
