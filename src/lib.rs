//! `rust-data-profiling` computes per-column statistical profiles of a tabular dataset and
//! assembles them into a report that can be rendered to HTML or serialized to JSON.
//!
//! Profiling is organised in families ([`profile::Profiler`]): numeric, quantile, dispersion,
//! temporal and text. Each family picks the columns whose semantic type it understands, asks the
//! [`source::TabularSource`] to evaluate its whole list of aggregates over all of them in a single
//! batch, and decodes the flattened, aggregate-major result row into one typed profile per column.
//! The [`report::ProfileAggregator`] runs every family, isolates failures, and regroups the
//! results by column into a [`report::ReportModel`].
//!
//! ## Quick example
//!
//! ```rust
//! use rust_data_profiling::report::{ProfileAggregator, ProfileOptions};
//! use rust_data_profiling::types::{DataSet, DataType, Field, Schema, Value};
//!
//! # fn main() -> Result<(), rust_data_profiling::ProfileError> {
//! let schema = Schema::new(vec![
//!     Field::new("n", DataType::Int64),
//!     Field::new("s", DataType::Utf8),
//! ]);
//! let ds = DataSet::new(
//!     schema,
//!     vec![
//!         vec![Value::Int64(1), Value::Utf8("a".to_string())],
//!         vec![Value::Int64(2), Value::Utf8("a".to_string())],
//!         vec![Value::Int64(2), Value::Utf8("b".to_string())],
//!         vec![Value::Null, Value::Null],
//!     ],
//! );
//!
//! let report = ProfileAggregator::new(ProfileOptions::default())?.run(&ds);
//! let n = report.column("n").and_then(|c| c.numeric()).unwrap();
//! assert_eq!(n.null_count(), 1);
//! assert_eq!(n.distinct_count(), 2);
//! assert_eq!(n.range(), Some(1.0));
//! assert_eq!(report.column("s").and_then(|c| c.text()).unwrap().max_length(), Some(1));
//! # Ok(())
//! # }
//! ```
//!
//! ## Loading files
//!
//! ```no_run
//! use rust_data_profiling::ingestion::{ingest_from_path, LoadOptions};
//! use rust_data_profiling::render::{Render, Templates};
//! use rust_data_profiling::report::{ProfileAggregator, ProfileOptions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let ds = ingest_from_path("data.parquet", &LoadOptions::default())?;
//! let report = ProfileAggregator::new(ProfileOptions::default())?.run(&ds);
//! std::fs::write("report.html", report.render(&Templates::html())?)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`source`]: the tabular source boundary, semantic types, aggregates and scalars
//! - [`profile`]: profiler families and the row decoder
//! - [`report`]: report model, aggregator, options and observers
//! - [`render`]: template-based rendering of report nodes
//! - [`ingestion`]: CSV/Parquet loading into [`types::DataSet`]
//! - [`types`]: schema + in-memory dataset types
//! - [`logging`]: tracing subscriber setup
//! - [`error`]: error types
//!
//! The Cargo feature `polars` adds a [`source::TabularSource`] implementation for Polars
//! `DataFrame`s.

pub mod error;
pub mod ingestion;
pub mod logging;
pub mod profile;
pub mod render;
pub mod report;
pub mod source;
pub mod types;

pub use error::{IngestionError, IngestionResult, ProfileError, ProfileResult, RenderError};
