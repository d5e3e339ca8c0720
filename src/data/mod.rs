//! Data engineering module
//!
//! Pipeline stages, each a pure function over an immutable slice:
//! - CSV loading into raw, untyped records
//! - Schema validation against the configured column mapping
//! - Date normalization and value coercion
//! - Forward fill, window filter, and the date join

pub mod align;
pub mod cleaning;
pub mod dates;
pub mod fill;
pub mod loader;
pub mod schema;
pub mod values;
pub mod window;

pub use align::{align, Alignment};
pub use cleaning::{clean_series, DatedValue};
pub use dates::DateNormalizer;
pub use fill::{forward_fill, FillOutcome};
pub use loader::{load_csv, read_csv};
pub use schema::{validate_schema, ResolvedColumns};
pub use values::{coerce_value, CoercedValue};
pub use window::DateWindow;

use crate::types::DropTally;

/// Records kept by a stage plus what it dropped
#[derive(Debug, Clone)]
pub struct StageOutput<T> {
    pub records: Vec<T>,
    pub dropped: DropTally,
}
