//! CSV export of pipeline results

use crate::analysis::MonthlyRow;
use crate::error::{PipelineError, Result};
use crate::types::AlignedRecord;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Write serializable rows as CSV with a header row
pub fn write_rows<W: Write, T: Serialize>(writer: W, rows: &[T]) -> std::result::Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_file<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let export_err = |source| PipelineError::Export {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| export_err(csv::Error::from(e)))?;
    }

    let file = std::fs::File::create(path).map_err(|e| export_err(csv::Error::from(e)))?;
    write_rows(file, rows).map_err(export_err)?;

    info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

/// `date,subject_value,benchmark_value,diff_pct`
pub fn write_aligned_csv<P: AsRef<Path>>(path: P, records: &[AlignedRecord]) -> Result<()> {
    write_file(path.as_ref(), records)
}

/// `month,count,subject_mean,benchmark_mean,diff_pct_mean,diff_pct_std`
pub fn write_monthly_csv<P: AsRef<Path>>(path: P, rows: &[MonthlyRow]) -> Result<()> {
    write_file(path.as_ref(), rows)
}
