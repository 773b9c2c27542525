//! Path-based loading of a profiling source.
//!
//! [`ingest_from_path`] picks the reader by extension unless [`LoadOptions::format`] forces one,
//! and reads the schema from the file when [`LoadOptions::schema`] is absent.

use std::path::Path;

use tracing::{error, info};

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, Schema};

use super::{csv, parquet};

/// File formats the CLI can profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestionFormat {
    Csv,
    Parquet,
}

impl IngestionFormat {
    /// `csv`, `parquet` or `pq`, ignoring case.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "parquet" | "pq" => Some(Self::Parquet),
            _ => None,
        }
    }
}

/// How to read a source file. The default infers both format and schema.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Forced format; `None` goes by extension.
    pub format: Option<IngestionFormat>,
    /// Declared schema; columns are matched by name. `None` infers it.
    pub schema: Option<Schema>,
}

/// Load `path` into a [`DataSet`].
///
/// An error here means the source is unavailable and nothing should be profiled.
///
/// ```no_run
/// use rust_data_profiling::ingestion::{ingest_from_path, IngestionFormat, LoadOptions};
///
/// # fn main() -> Result<(), rust_data_profiling::IngestionError> {
/// let forced = LoadOptions { format: Some(IngestionFormat::Csv), schema: None };
/// let ds = ingest_from_path("export.txt", &forced)?;
/// assert!(ds.column_count() > 0);
/// # Ok(())
/// # }
/// ```
pub fn ingest_from_path(path: impl AsRef<Path>, options: &LoadOptions) -> IngestionResult<DataSet> {
    let path = path.as_ref();
    let fmt = options.format.map_or_else(|| infer_format_from_path(path), Ok)?;

    let schema = options.schema.as_ref();
    let result = match fmt {
        IngestionFormat::Csv => csv::ingest_csv_from_path(path, schema),
        IngestionFormat::Parquet => parquet::ingest_parquet_from_path(path, schema),
    };

    match &result {
        Ok(ds) => info!(
            format = ?fmt,
            path = %path.display(),
            rows = ds.row_count(),
            columns = ds.column_count(),
            "loaded source"
        ),
        Err(e) => error!(format = ?fmt, path = %path.display(), error = %e, "failed to load source"),
    }

    result
}

fn infer_format_from_path(path: &Path) -> IngestionResult<IngestionFormat> {
    let unsupported = |what: String| IngestionError::SchemaMismatch {
        message: format!("{what} for {}; expected .csv, .parquet or .pq", path.display()),
    };
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| unsupported("no file extension".to_string()))?;
    IngestionFormat::from_extension(ext).ok_or_else(|| unsupported(format!("unsupported extension '{ext}'")))
}
