//! `profile-data <input> <output>`
//!
//! Loads a CSV or Parquet file, profiles every column and writes the report. The output is JSON
//! when `<output>` ends in `.json`, HTML otherwise.

use std::error::Error;
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use tracing::info;

use rust_data_profiling::ingestion::{LoadOptions, ingest_from_path};
use rust_data_profiling::logging::{LogConfig, init_logging};
use rust_data_profiling::render::{Render, Templates};
use rust_data_profiling::report::{ProfileAggregator, ProfileOptions};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input file (.csv, .parquet or .pq)
    input: PathBuf,
    /// Report destination (.json for JSON, anything else for HTML)
    output: PathBuf,
    /// JSON file with profiling options
    #[arg(long)]
    options: Option<PathBuf>,
    /// Log as JSON lines
    #[arg(long)]
    json_logs: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(LogConfig::default().with_json_format(args.json_logs))?;

    let options = match &args.options {
        Some(path) => ProfileOptions::from_json_str(&std::fs::read_to_string(path)?)?,
        None => ProfileOptions::default(),
    };
    let aggregator = ProfileAggregator::new(options)?;

    let dataset = ingest_from_path(&args.input, &LoadOptions::default())?;

    let start = Instant::now();
    let report = aggregator.run(&dataset);
    let elapsed = start.elapsed();

    let is_json = args
        .output
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let document = if is_json {
        report.to_json_pretty()?
    } else {
        report.render(&Templates::html())?
    };
    std::fs::write(&args.output, document)?;

    info!(output = %args.output.display(), failures = report.failures.len(), "report written");
    println!("Profiled {} columns in {:.3}s", report.variables.len(), elapsed.as_secs_f64());
    Ok(())
}
