//! Descriptive statistics and correlation

use super::{mean, sample_std, Column};
use crate::types::AlignedRecord;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std: Option<f64>,
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
}

impl ColumnSummary {
    fn from_values(column: Column, values: &[f64]) -> Option<Self> {
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        Some(Self {
            column: column.name().to_string(),
            count: sorted.len(),
            mean: mean(&sorted)?,
            std: sample_std(&sorted),
            min: *sorted.first()?,
            p25: quantile(&sorted, 0.25)?,
            p50: quantile(&sorted, 0.50)?,
            p75: quantile(&sorted, 0.75)?,
            max: *sorted.last()?,
        })
    }
}

/// Per-column summaries in `Column::ALL` order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryTable {
    pub columns: Vec<ColumnSummary>,
}

/// Count, mean, std, min, quartiles, max for each numeric column.
/// Empty input gives an empty table.
pub fn describe(records: &[AlignedRecord]) -> SummaryTable {
    let columns = Column::ALL
        .iter()
        .filter_map(|c| ColumnSummary::from_values(*c, &c.values(records)))
        .collect();
    SummaryTable { columns }
}

/// Quantile with linear interpolation over sorted values
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }

    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Pearson correlation; `None` when either side has no variance
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }

    let mx = mean(x)?;
    let my = mean(y)?;
    let mut cov = 0.0;
    let mut vx = 0.0;
    let mut vy = 0.0;
    for (a, b) in x.iter().zip(y) {
        cov += (a - mx) * (b - my);
        vx += (a - mx) * (a - mx);
        vy += (b - my) * (b - my);
    }

    if vx == 0.0 || vy == 0.0 {
        return None;
    }
    Some(cov / (vx.sqrt() * vy.sqrt()))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Row-major, `columns.len()` squared
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, row: Column, col: Column) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == row.name())?;
        let j = self.columns.iter().position(|c| c == col.name())?;
        self.values[i][j]
    }
}

pub fn correlation_matrix(records: &[AlignedRecord]) -> CorrelationMatrix {
    let series: Vec<Vec<f64>> = Column::ALL.iter().map(|c| c.values(records)).collect();

    let values = series
        .iter()
        .map(|x| series.iter().map(|y| pearson(x, y)).collect())
        .collect();

    CorrelationMatrix {
        columns: Column::ALL.iter().map(|c| c.name().to_string()).collect(),
        values,
    }
}

impl std::fmt::Display for SummaryTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{:<16} {:>6} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12}",
            "column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
        )?;
        writeln!(f, "{}", "-".repeat(120))?;
        for s in &self.columns {
            let std = s.std.map(|v| format!("{:.4}", v)).unwrap_or_else(|| "-".to_string());
            writeln!(
                f,
                "{:<16} {:>6} {:>12.4} {:>12} {:>12.4} {:>12.4} {:>12.4} {:>12.4} {:>12.4}",
                s.column, s.count, s.mean, std, s.min, s.p25, s.p50, s.p75, s.max
            )?;
        }
        Ok(())
    }
}

impl std::fmt::Display for CorrelationMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:<16}", "")?;
        for c in &self.columns {
            write!(f, " {:>16}", c)?;
        }
        writeln!(f)?;
        for (name, row) in self.columns.iter().zip(&self.values) {
            write!(f, "{:<16}", name)?;
            for v in row {
                match v {
                    Some(v) => write!(f, " {:>16.4}", v)?,
                    None => write!(f, " {:>16}", "-")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
