//! CSV loading into raw records
//!
//! Nothing is interpreted here: every cell stays text. Rows the CSV reader
//! cannot decode are counted, not fatal.

use crate::error::{PipelineError, Result};
use crate::types::{DatasetRole, RawDataset, RawRecord};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Load a CSV file for the given role
pub fn load_csv<P: AsRef<Path>>(path: P, role: DatasetRole) -> Result<RawDataset> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| PipelineError::Io {
        role,
        path: path.to_path_buf(),
        source,
    })?;

    let dataset = read_csv(file, role)?;
    info!(
        "Loaded {} dataset from {}: {} rows, {} columns",
        role,
        path.display(),
        dataset.len(),
        dataset.headers.len()
    );
    Ok(dataset)
}

/// Read CSV content from any reader
pub fn read_csv<R: Read>(reader: R, role: DatasetRole) -> Result<RawDataset> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|source| PipelineError::Csv { role, source })?
        .iter()
        .map(normalize_header)
        .collect();

    let mut dataset = RawDataset::new(role, headers);

    for (idx, result) in rdr.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                debug!("{} row {} unreadable: {}", role, idx + 2, e);
                dataset.malformed_rows += 1;
                continue;
            }
        };

        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(idx + 2);

        let raw = RawRecord::from_cells(line, &dataset.headers, record.iter());
        dataset.records.push(raw);
    }

    Ok(dataset)
}

fn normalize_header(name: &str) -> String {
    name.trim().trim_start_matches('\u{feff}').trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_csv_basic() {
        let data = "Date,Close,Volume\n2020-01-02,100.5,10\n01/03/2020,\"1,234.00\",20\n";
        let ds = read_csv(data.as_bytes(), DatasetRole::Subject).unwrap();

        assert_eq!(ds.headers, vec!["Date", "Close", "Volume"]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].line, 2);
        assert_eq!(ds.records[1].line, 3);
        assert_eq!(ds.records[1].get("Close"), Some("1,234.00"));
        assert_eq!(ds.malformed_rows, 0);
    }

    #[test]
    fn test_read_csv_strips_bom_and_whitespace() {
        let data = "\u{feff} Date , Market_Close \n 2020-01-02 , 3,000 \n";
        let ds = read_csv(data.as_bytes(), DatasetRole::Benchmark).unwrap();

        assert_eq!(ds.headers, vec!["Date", "Market_Close"]);
        assert_eq!(ds.records[0].get("Date"), Some("2020-01-02"));
    }

    #[test]
    fn test_read_csv_short_rows_kept() {
        let data = "Date,Close\n2020-01-02\n2020-01-03,5\n";
        let ds = read_csv(data.as_bytes(), DatasetRole::Subject).unwrap();

        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].get("Close"), None);
        assert_eq!(ds.records[1].get("Close"), Some("5"));
    }

    #[test]
    fn test_read_csv_duplicate_header_first_wins() {
        let data = "Date,Close,Close\n2020-01-02,100,200\n";
        let ds = read_csv(data.as_bytes(), DatasetRole::Subject).unwrap();

        let resolved = crate::data::schema::resolve_column(&ds.headers, "Close");
        assert_eq!(resolved, Some("Close"));
        assert_eq!(ds.records[0].get("Close"), Some("100"));
    }

    #[test]
    fn test_read_csv_invalid_utf8_row_counted() {
        let mut data = b"Date,Close\n2020-01-02,1\n".to_vec();
        data.extend_from_slice(b"2020-01-03,\xff\xfe\n");
        data.extend_from_slice(b"2020-01-06,3\n");

        let ds = read_csv(data.as_slice(), DatasetRole::Subject).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.malformed_rows, 1);
    }

    #[test]
    fn test_load_csv_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Date,Close").unwrap();
        writeln!(file, "2020-01-02,10").unwrap();

        let ds = load_csv(file.path(), DatasetRole::Subject).unwrap();
        assert_eq!(ds.role, DatasetRole::Subject);
        assert_eq!(ds.len(), 1);
    }

    #[test]
    fn test_load_csv_missing_file() {
        let err = load_csv("/no/such/dir/market.csv", DatasetRole::Benchmark).unwrap_err();
        match err {
            PipelineError::Io { role, path, .. } => {
                assert_eq!(role, DatasetRole::Benchmark);
                assert!(path.ends_with("market.csv"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
