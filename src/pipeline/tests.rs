//! Tests for the alignment pipeline

use super::*;
use crate::config::FillPolicy;
use chrono::NaiveDate;
use std::io::Write;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn subject(rows: &[&[&str]]) -> RawDataset {
    RawDataset::from_rows(DatasetRole::Subject, &["Date", "Close"], rows)
}

fn benchmark(rows: &[&[&str]]) -> RawDataset {
    RawDataset::from_rows(DatasetRole::Benchmark, &["Date", "Market_Close"], rows)
}

fn pipeline() -> AlignmentPipeline {
    let mut config = Config::default();
    config.benchmark.value_column = "Market_Close".to_string();
    AlignmentPipeline::new(config).unwrap()
}

#[test]
fn test_division_by_zero_example() {
    let out = pipeline()
        .run(
            &subject(&[&["2020-01-02", "100"], &["2020-01-03", "105"]]),
            &benchmark(&[&["2020-01-02", "50"], &["2020-01-03", "0"]]),
        )
        .unwrap();

    assert_eq!(out.records.len(), 1);
    let r = out.records[0];
    assert_eq!(r.date, ymd(2020, 1, 2));
    assert_eq!((r.subject_value, r.benchmark_value, r.diff_pct), (100.0, 50.0, 100.0));
    assert_eq!(out.diagnostics.dropped(DropCause::DivisionByZero), 1);
    assert_eq!(out.diagnostics.aligned, 1);
}

#[test]
fn test_unmatched_date_removed() {
    let out = pipeline()
        .run(
            &subject(&[&["2020-01-02", "10"], &["2020-01-03", "11"], &["2020-01-06", "12"]]),
            &benchmark(&[&["2020-01-02", "5"], &["2020-01-06", "6"]]),
        )
        .unwrap();

    let dates: Vec<NaiveDate> = out.records.iter().map(|r| r.date).collect();
    assert_eq!(dates, vec![ymd(2020, 1, 2), ymd(2020, 1, 6)]);
    assert_eq!(out.diagnostics.subject.dropped.get(DropCause::Unmatched), 1);
    assert_eq!(out.diagnostics.benchmark.dropped.get(DropCause::Unmatched), 0);
}

#[test]
fn test_window_and_ordering_invariants() {
    let out = pipeline()
        .run(
            &subject(&[
                &["2023-01-03", "9"],
                &["12/31/2022", "8"],
                &["2020-01-01", "1"],
                &["2019-12-31", "0.5"],
                &["06/15/2021", "5"],
            ]),
            &benchmark(&[
                &["2019-12-31", "1"],
                &["2020-01-01", "2"],
                &["2021-06-15", "3"],
                &["2022-12-31", "4"],
                &["2023-01-03", "5"],
            ]),
        )
        .unwrap();

    let window = pipeline().window();
    assert_eq!(out.records.len(), 3);
    assert!(out.records.iter().all(|r| window.contains(r.date)));
    assert!(out.records.windows(2).all(|w| w[0].date < w[1].date));
    assert_eq!(out.records[0].date, ymd(2020, 1, 1));
    assert_eq!(out.records[2].date, ymd(2022, 12, 31));
    assert_eq!(out.diagnostics.dropped(DropCause::OutsideWindow), 4);

    for r in &out.records {
        let expected = (r.subject_value - r.benchmark_value) / r.benchmark_value * 100.0;
        assert!((r.diff_pct - expected).abs() < 1e-9);
    }
}

#[test]
fn test_bad_rows_counted_not_fatal() {
    let out = pipeline()
        .run(
            &subject(&[
                &["not-a-date", "100"],
                &["2020-01-02", "100"],
                &["2020-01-03", "n/a?"],
                &["2020-01-06", "1,010.00"],
            ]),
            &benchmark(&[&["2020-01-02", "50"], &["2020-01-03", "51"], &["2020-01-06", "52"]]),
        )
        .unwrap();

    assert_eq!(out.records.len(), 2);
    assert_eq!(out.records[1].subject_value, 1010.0);
    assert_eq!(out.diagnostics.subject.dropped.get(DropCause::UnparseableDate), 1);
    assert_eq!(out.diagnostics.subject.dropped.get(DropCause::UnparseableValue), 1);
    assert_eq!(out.diagnostics.subject.rows_read, 4);
}

#[test]
fn test_forward_fill_before_window() {
    // the 2020-01-02 gap borrows the last 2019 value
    let out = pipeline()
        .run(
            &subject(&[&["2019-12-31", "100"], &["2020-01-02", ""], &["2020-01-03", "104"]]),
            &benchmark(&[&["2020-01-02", "50"], &["2020-01-03", "52"]]),
        )
        .unwrap();

    assert_eq!(out.records.len(), 2);
    assert_eq!(out.records[0].subject_value, 100.0);
    assert_eq!(out.diagnostics.subject.forward_filled, 1);
    assert_eq!(out.diagnostics.subject.dropped.get(DropCause::OutsideWindow), 1);
}

#[test]
fn test_invalid_benchmark_value_never_fabricated() {
    let out = pipeline()
        .run(
            &subject(&[&["2020-01-02", "1"], &["2020-01-03", "1"], &["2020-01-06", "1"]]),
            &benchmark(&[&["2020-01-02", "10"], &["2020-01-03", "abc"], &["2020-01-06", "12"]]),
        )
        .unwrap();

    assert!(out.records.iter().all(|r| r.date != ymd(2020, 1, 3)));
    assert_eq!(out.diagnostics.benchmark.forward_filled, 0);
    assert_eq!(out.diagnostics.benchmark.dropped.get(DropCause::UnparseableValue), 1);
}

#[test]
fn test_drop_fill_policy() {
    let mut config = Config::default();
    config.benchmark.value_column = "Market_Close".to_string();
    config.subject.fill = FillPolicy::Drop;
    let pipeline = AlignmentPipeline::new(config).unwrap();

    let out = pipeline
        .run(
            &subject(&[&["2020-01-02", "1"], &["2020-01-03", "NaN"]]),
            &benchmark(&[&["2020-01-02", "2"], &["2020-01-03", "2"]]),
        )
        .unwrap();

    assert_eq!(out.records.len(), 1);
    assert_eq!(out.diagnostics.subject.dropped.get(DropCause::MissingValue), 1);
}

#[test]
fn test_missing_column_fatal() {
    let ds = RawDataset::from_rows(DatasetRole::Benchmark, &["Date", "Close"], &[]);
    let err = pipeline().run(&subject(&[]), &ds).unwrap_err();

    match err {
        PipelineError::MissingColumn { role, column } => {
            assert_eq!(role, DatasetRole::Benchmark);
            assert_eq!(column, "Market_Close");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_disjoint_ranges_empty_result() {
    let err = pipeline()
        .run(
            &subject(&[&["2020-01-02", "1"]]),
            &benchmark(&[&["2021-01-04", "1"]]),
        )
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::EmptyResult {
            subject_rows: 1,
            benchmark_rows: 1
        }
    ));
}

#[test]
fn test_swapped_roles_rejected() {
    let s = subject(&[]);
    let err = pipeline().run(&s, &s).unwrap_err();
    assert!(matches!(err, PipelineError::Config(_)));
}

#[test]
fn test_diagnostics_totals_and_json() {
    let out = pipeline()
        .run(
            &subject(&[&["2020-01-02", "100"], &["2020-01-03", "105"], &["bad", "1"]]),
            &benchmark(&[&["2020-01-02", "50"], &["2020-01-03", "0"]]),
        )
        .unwrap();

    let totals = out.diagnostics.drop_totals();
    assert_eq!(totals.get(DropCause::DivisionByZero), 1);
    assert_eq!(totals.get(DropCause::UnparseableDate), 1);
    assert_eq!(totals.total(), 2);

    let json = serde_json::to_value(&out.diagnostics).unwrap();
    assert_eq!(json["subject"]["role"], "subject");
    assert_eq!(json["join_dropped"]["division_by_zero"], 1);
    assert_eq!(json["aligned"], 1);
}

#[test]
fn test_run_files() {
    let mut subject_file = tempfile::NamedTempFile::new().unwrap();
    writeln!(subject_file, "Date,MAANG_Close").unwrap();
    writeln!(subject_file, "01/02/2020,\"1,000\"").unwrap();
    writeln!(subject_file, "01/03/2020,1100").unwrap();

    let mut benchmark_file = tempfile::NamedTempFile::new().unwrap();
    writeln!(benchmark_file, "date,S&P_500_Price").unwrap();
    writeln!(benchmark_file, "2020-01-02,3257.85").unwrap();
    writeln!(benchmark_file, "2020-01-03,").unwrap();

    let mut config = Config::default();
    config.subject.path = subject_file.path().to_string_lossy().into_owned();
    config.subject.value_column = "MAANG_Close".to_string();
    config.benchmark.path = benchmark_file.path().to_string_lossy().into_owned();
    config.benchmark.value_column = "S&P_500_Price".to_string();

    let out = AlignmentPipeline::new(config).unwrap().run_files().unwrap();

    assert_eq!(out.records.len(), 2);
    assert_eq!(out.records[1].benchmark_value, 3257.85);
    assert_eq!(out.diagnostics.benchmark.forward_filled, 1);
}

#[test]
fn test_run_files_missing_input() {
    let mut config = Config::default();
    config.subject.path = "/no/such/subject.csv".to_string();
    let err = AlignmentPipeline::new(config).unwrap().run_files().unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Io {
            role: DatasetRole::Subject,
            ..
        }
    ));
}
