//! Relative Performance Alignment
//!
//! Cleans a stock-group price series and a market benchmark series, aligns
//! them by date over a fixed window, and derives the percentage difference.

pub mod analysis;
pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod types;


pub use config::Config;
pub use error::{PipelineError, Result};
pub use pipeline::{AlignmentPipeline, Diagnostics, PipelineOutput};
pub use types::{AlignedRecord, DatasetRole, DropCause, NormalizedRecord};
