//! Relative Performance Alignment
//!
//! Compares a stock-group price series with a market benchmark over the
//! configured window.

use clap::{Parser, Subcommand};
use relperf::{
    analysis::{correlation_matrix, describe, monthly_aggregate},
    config::Config,
    export::{write_aligned_csv, write_monthly_csv},
    AlignmentPipeline, DatasetRole,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "relperf")]
#[command(about = "Align a stock-group series with a market benchmark and compare performance")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path (default: relperf.toml, config.toml, ~/.config/relperf/config.toml)
    #[arg(short, long)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline and write the configured exports
    Run {
        /// Print diagnostics as JSON
        #[arg(long)]
        json: bool,
    },
    /// Load both inputs and check their schemas only
    Validate,
    /// Print descriptive statistics, correlations and monthly rows
    Summary {
        /// Number of monthly rows to show
        #[arg(short, long, default_value = "5")]
        months: usize,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };
    let pipeline = AlignmentPipeline::new(config)?;

    match cli.command {
        Commands::Run { json } => run(&pipeline, json),
        Commands::Validate => validate(&pipeline),
        Commands::Summary { months } => summary(&pipeline, months),
    }
}

fn run(pipeline: &AlignmentPipeline, json: bool) -> anyhow::Result<()> {
    tracing::info!("Aligning series over window {}", pipeline.window());

    let output = pipeline.run_files()?;
    output.diagnostics.log();

    let outputs = &pipeline.config().output;
    if let Some(path) = &outputs.aligned_csv {
        write_aligned_csv(path, output.records())?;
    }
    if let Some(path) = &outputs.monthly_csv {
        write_monthly_csv(path, &monthly_aggregate(output.records()))?;
    }
    if outputs.aligned_csv.is_none() && outputs.monthly_csv.is_none() {
        tracing::warn!("No output paths configured; results were not exported");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&output.diagnostics)?);
    } else {
        println!("Aligned {} records", output.records().len());
        for (cause, n) in output.diagnostics.drop_totals().iter() {
            println!("  dropped {:<18} {}", cause, n);
        }
    }

    Ok(())
}

fn validate(pipeline: &AlignmentPipeline) -> anyhow::Result<()> {
    let (subject, benchmark) = pipeline.load_inputs()?;
    let (subject_cols, benchmark_cols) = pipeline.validate_inputs(&subject, &benchmark)?;

    for (role, rows, cols) in [
        (DatasetRole::Subject, subject.len(), subject_cols),
        (DatasetRole::Benchmark, benchmark.len(), benchmark_cols),
    ] {
        println!(
            "{:<10} {} rows, date column '{}', value column '{}'",
            role, rows, cols.date, cols.value
        );
    }
    println!("Schemas OK");

    Ok(())
}

fn summary(pipeline: &AlignmentPipeline, months: usize) -> anyhow::Result<()> {
    let output = pipeline.run_files()?;
    let records = output.records();

    println!("\nSummary ({} aligned records, window {}):\n", records.len(), pipeline.window());
    print!("{}", describe(records));

    println!("\nCorrelation matrix:\n");
    print!("{}", correlation_matrix(records));

    println!("\nMonthly aggregate:\n");
    println!(
        "{:<8} {:>6} {:>14} {:>14} {:>14} {:>14}",
        "month", "count", "subject_mean", "bench_mean", "diff_pct_mean", "diff_pct_std"
    );
    println!("{}", "-".repeat(76));
    for row in monthly_aggregate(records).iter().take(months) {
        let std = row
            .diff_pct_std
            .map(|v| format!("{:.4}", v))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<8} {:>6} {:>14.4} {:>14.4} {:>14.4} {:>14}",
            row.month, row.count, row.subject_mean, row.benchmark_mean, row.diff_pct_mean, std
        );
    }

    Ok(())
}
