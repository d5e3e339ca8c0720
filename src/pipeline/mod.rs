//! Alignment pipeline
//!
//! Stage order: schema check (both inputs) → clean → fill → window → join.
//! Every stage returns a new collection; nothing is mutated in place.

#[cfg(test)]
mod tests;

use crate::config::{Config, SeriesConfig};
use crate::data::{
    align, clean_series, forward_fill, load_csv, validate_schema, DateNormalizer, DateWindow,
    ResolvedColumns,
};
use crate::error::{PipelineError, Result};
use crate::types::{AlignedRecord, DatasetRole, DropCause, DropTally, NormalizedRecord, RawDataset};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Share of dropped rows above which a series is flagged in the logs
const HIGH_DROP_RATIO: f64 = 0.25;

/// What happened to one input series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesDiagnostics {
    pub role: DatasetRole,
    /// Rows in the input file, including undecodable ones
    pub rows_read: usize,
    pub dropped: DropTally,
    /// Gaps repaired by forward fill
    pub forward_filled: usize,
    /// Rows that entered the join
    pub retained: usize,
}

impl SeriesDiagnostics {
    fn new(role: DatasetRole, rows_read: usize) -> Self {
        Self {
            role,
            rows_read,
            dropped: DropTally::new(),
            forward_filled: 0,
            retained: 0,
        }
    }
}

/// Structured run report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub subject: SeriesDiagnostics,
    pub benchmark: SeriesDiagnostics,
    /// Drops that belong to the join rather than to one series
    pub join_dropped: DropTally,
    /// Records in the final output
    pub aligned: usize,
}

impl Diagnostics {
    /// Count for a cause across both series and the join
    pub fn dropped(&self, cause: DropCause) -> usize {
        self.subject.dropped.get(cause)
            + self.benchmark.dropped.get(cause)
            + self.join_dropped.get(cause)
    }

    /// All drops, merged by cause
    pub fn drop_totals(&self) -> DropTally {
        let mut totals = self.subject.dropped.clone();
        totals.merge(&self.benchmark.dropped);
        totals.merge(&self.join_dropped);
        totals
    }

    /// Emit the report through `tracing`
    pub fn log(&self) {
        for series in [&self.subject, &self.benchmark] {
            info!(
                "{}: {} rows read, {} retained, {} forward-filled, {} dropped",
                series.role,
                series.rows_read,
                series.retained,
                series.forward_filled,
                series.dropped.total()
            );
            for (cause, n) in series.dropped.iter() {
                info!("  {} dropped ({}): {}", series.role, cause, n);
            }

            if series.rows_read > 0 {
                let ratio = series.dropped.get(DropCause::UnparseableDate)
                    + series.dropped.get(DropCause::UnparseableValue)
                    + series.dropped.get(DropCause::MalformedRow);
                let ratio = ratio as f64 / series.rows_read as f64;
                if ratio > HIGH_DROP_RATIO {
                    warn!(
                        "{}: {:.1}% of rows were unparseable",
                        series.role,
                        ratio * 100.0
                    );
                }
            }
        }

        for (cause, n) in self.join_dropped.iter() {
            info!("  join dropped ({}): {}", cause, n);
        }
        info!("Aligned records: {}", self.aligned);
    }
}

/// Terminal artifact: aligned records plus the run report
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub records: Vec<AlignedRecord>,
    pub diagnostics: Diagnostics,
}

impl PipelineOutput {
    pub fn records(&self) -> &[AlignedRecord] {
        &self.records
    }
}

/// Configured pipeline
pub struct AlignmentPipeline {
    config: Config,
    normalizer: DateNormalizer,
    window: DateWindow,
}

impl AlignmentPipeline {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let window = DateWindow::try_from(config.window)?;
        let normalizer = DateNormalizer::new(config.cleaning.date_formats.clone());

        Ok(Self {
            config,
            normalizer,
            window,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn window(&self) -> DateWindow {
        self.window
    }

    /// Read both configured input files
    pub fn load_inputs(&self) -> Result<(RawDataset, RawDataset)> {
        let subject = load_csv(&self.config.subject.path, DatasetRole::Subject)?;
        let benchmark = load_csv(&self.config.benchmark.path, DatasetRole::Benchmark)?;
        Ok((subject, benchmark))
    }

    /// Schema-check both inputs before any cell is parsed
    pub fn validate_inputs(
        &self,
        subject: &RawDataset,
        benchmark: &RawDataset,
    ) -> Result<(ResolvedColumns, ResolvedColumns)> {
        let subject_cols = validate_schema(subject, self.series_config(subject.role))?;
        let benchmark_cols = validate_schema(benchmark, self.series_config(benchmark.role))?;
        Ok((subject_cols, benchmark_cols))
    }

    /// Load the configured files and run
    pub fn run_files(&self) -> Result<PipelineOutput> {
        let (subject, benchmark) = self.load_inputs()?;
        self.run(&subject, &benchmark)
    }

    /// Run all stages over already-loaded datasets
    pub fn run(&self, subject: &RawDataset, benchmark: &RawDataset) -> Result<PipelineOutput> {
        if subject.role != DatasetRole::Subject || benchmark.role != DatasetRole::Benchmark {
            return Err(PipelineError::Config(format!(
                "datasets passed as ({}, {}), expected (subject, benchmark)",
                subject.role, benchmark.role
            )));
        }

        let (subject_cols, benchmark_cols) = self.validate_inputs(subject, benchmark)?;

        let (subject_records, mut subject_diag) = self.prepare_series(subject, &subject_cols);
        let (benchmark_records, mut benchmark_diag) =
            self.prepare_series(benchmark, &benchmark_cols);

        info!(
            "Joining {} subject and {} benchmark records in window {}",
            subject_records.len(),
            benchmark_records.len(),
            self.window
        );

        let alignment = align(
            &subject_records,
            &benchmark_records,
            self.config.cleaning.zero_tolerance,
        );
        subject_diag
            .dropped
            .add_n(DropCause::Unmatched, alignment.subject_unmatched);
        benchmark_diag
            .dropped
            .add_n(DropCause::Unmatched, alignment.benchmark_unmatched);

        let diagnostics = Diagnostics {
            subject: subject_diag,
            benchmark: benchmark_diag,
            join_dropped: alignment.dropped,
            aligned: alignment.records.len(),
        };

        if alignment.records.is_empty() {
            warn!("Join produced no records");
            diagnostics.log();
            return Err(PipelineError::EmptyResult {
                subject_rows: subject_records.len(),
                benchmark_rows: benchmark_records.len(),
            });
        }

        Ok(PipelineOutput {
            records: alignment.records,
            diagnostics,
        })
    }

    fn series_config(&self, role: DatasetRole) -> &SeriesConfig {
        self.config.series(role)
    }

    /// clean → fill → window, for one series
    fn prepare_series(
        &self,
        dataset: &RawDataset,
        columns: &ResolvedColumns,
    ) -> (Vec<NormalizedRecord>, SeriesDiagnostics) {
        let mut diag = SeriesDiagnostics::new(dataset.role, dataset.len() + dataset.malformed_rows);

        let cleaned = clean_series(dataset, columns, &self.normalizer);
        diag.dropped.merge(&cleaned.dropped);

        let filled = forward_fill(&cleaned.records, self.series_config(dataset.role).fill);
        diag.dropped.merge(&filled.dropped);
        diag.forward_filled = filled.filled;

        let windowed = self.window.filter(&filled.records);
        diag.dropped.merge(&windowed.dropped);
        diag.retained = windowed.records.len();

        (windowed.records, diag)
    }
}
