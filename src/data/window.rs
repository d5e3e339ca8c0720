//! Inclusive date window

use super::StageOutput;
use crate::config::WindowConfig;
use crate::error::{PipelineError, Result};
use crate::types::{DropCause, DropTally, NormalizedRecord};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(PipelineError::Config(format!(
                "window start {} is after window end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Both bounds included
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn filter(&self, records: &[NormalizedRecord]) -> StageOutput<NormalizedRecord> {
        let kept: Vec<NormalizedRecord> = records
            .iter()
            .filter(|r| self.contains(r.date))
            .copied()
            .collect();

        let mut dropped = DropTally::new();
        dropped.add_n(DropCause::OutsideWindow, records.len() - kept.len());

        StageOutput {
            records: kept,
            dropped,
        }
    }
}

impl TryFrom<WindowConfig> for DateWindow {
    type Error = PipelineError;

    fn try_from(config: WindowConfig) -> Result<Self> {
        Self::new(config.start, config.end)
    }
}

impl std::fmt::Display for DateWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn window() -> DateWindow {
        DateWindow::try_from(WindowConfig::default()).unwrap()
    }

    #[test]
    fn test_bounds_inclusive() {
        let w = window();
        assert!(w.contains(ymd(2020, 1, 1)));
        assert!(w.contains(ymd(2022, 12, 31)));
        assert!(!w.contains(ymd(2019, 12, 31)));
        assert!(!w.contains(ymd(2023, 1, 1)));
    }

    #[test]
    fn test_filter_counts_outside() {
        let records = vec![
            NormalizedRecord::new(ymd(2019, 12, 31), 1.0),
            NormalizedRecord::new(ymd(2020, 1, 1), 2.0),
            NormalizedRecord::new(ymd(2022, 12, 31), 3.0),
            NormalizedRecord::new(ymd(2023, 1, 3), 4.0),
        ];

        let out = window().filter(&records);
        assert_eq!(out.records.len(), 2);
        assert_eq!(out.records[0].value, 2.0);
        assert_eq!(out.records[1].value, 3.0);
        assert_eq!(out.dropped.get(DropCause::OutsideWindow), 2);
    }

    #[test]
    fn test_inverted_window() {
        assert!(DateWindow::new(ymd(2022, 1, 1), ymd(2021, 1, 1)).is_err());
        assert!(DateWindow::new(ymd(2021, 1, 1), ymd(2021, 1, 1)).is_ok());
    }

    #[test]
    fn test_display() {
        assert_eq!(window().to_string(), "[2020-01-01, 2022-12-31]");
    }
}
