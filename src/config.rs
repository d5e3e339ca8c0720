//! Configuration management

use crate::error::PipelineError;
use crate::types::DatasetRole;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub subject: SeriesConfig,
    pub benchmark: SeriesConfig,
    pub window: WindowConfig,
    pub cleaning: CleaningConfig,
    pub output: OutputConfig,
}

/// How gaps (blank or NA cells) in a series are treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillPolicy {
    /// Carry the most recent earlier value forward
    #[default]
    ForwardFill,
    /// Drop the gap
    Drop,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeriesConfig {
    /// CSV input path
    pub path: String,
    /// Header of the date column
    pub date_column: String,
    /// Header of the price column
    pub value_column: String,
    pub fill: FillPolicy,
}

impl SeriesConfig {
    pub fn new(path: &str, date_column: &str, value_column: &str) -> Self {
        Self {
            path: path.to_string(),
            date_column: date_column.to_string(),
            value_column: value_column.to_string(),
            fill: FillPolicy::ForwardFill,
        }
    }
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self::new("", "Date", "Close")
    }
}

/// Inclusive analysis window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or(NaiveDate::MIN),
            end: NaiveDate::from_ymd_opt(2022, 12, 31).unwrap_or(NaiveDate::MAX),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// chrono format strings, tried in order; first valid parse wins
    pub date_formats: Vec<String>,
    /// Benchmark values with |v| <= this are treated as zero
    pub zero_tolerance: f64,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            date_formats: crate::data::dates::DEFAULT_DATE_FORMATS
                .iter()
                .map(|f| f.to_string())
                .collect(),
            zero_tolerance: 1e-9,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Aligned table CSV destination
    pub aligned_csv: Option<String>,
    /// Monthly aggregate CSV destination
    pub monthly_csv: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            subject: SeriesConfig::new("data/subject.csv", "Date", "Close"),
            benchmark: SeriesConfig::new("data/benchmark.csv", "Date", "Close"),
            window: WindowConfig::default(),
            cleaning: CleaningConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, with `RELPERF__*` environment overrides
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref().to_string_lossy();
        let settings = config::Config::builder()
            .add_source(config::File::with_name(&path))
            .add_source(config::Environment::with_prefix("RELPERF").separator("__"))
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from default locations, falling back to built-in defaults
    pub fn load_default() -> anyhow::Result<Self> {
        let paths = ["relperf.toml", "config.toml", "~/.config/relperf/config.toml"];

        for path in paths {
            let expanded = shellexpand::tilde(path);
            if Path::new(expanded.as_ref()).exists() {
                tracing::debug!("Loading configuration from {}", expanded);
                return Self::load(expanded.as_ref());
            }
        }

        tracing::debug!("No configuration file found, using defaults");
        let settings = config::Config::builder()
            .add_source(config::Environment::with_prefix("RELPERF").separator("__"))
            .build()?;
        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn series(&self, role: DatasetRole) -> &SeriesConfig {
        match role {
            DatasetRole::Subject => &self.subject,
            DatasetRole::Benchmark => &self.benchmark,
        }
    }

    /// Reject configurations the pipeline cannot run with
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.window.start > self.window.end {
            return Err(PipelineError::Config(format!(
                "window start {} is after window end {}",
                self.window.start, self.window.end
            )));
        }

        for role in [DatasetRole::Subject, DatasetRole::Benchmark] {
            let series = self.series(role);
            if series.date_column.trim().is_empty() || series.value_column.trim().is_empty() {
                return Err(PipelineError::Config(format!(
                    "{} column mapping must name both a date and a value column",
                    role
                )));
            }
        }

        if self.cleaning.date_formats.is_empty() {
            return Err(PipelineError::Config(
                "at least one date format is required".to_string(),
            ));
        }

        if !self.cleaning.zero_tolerance.is_finite() || self.cleaning.zero_tolerance < 0.0 {
            return Err(PipelineError::Config(format!(
                "zero_tolerance must be a non-negative number, got {}",
                self.cleaning.zero_tolerance
            )));
        }

        Ok(())
    }
}
