use thiserror::Error;

/// Convenience result type for ingestion operations.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Convenience result type for profiler operations.
pub type ProfileResult<T> = Result<T, ProfileError>;

/// Error type returned when a tabular source cannot be loaded.
///
/// Every variant is fatal for a profiling run: it is surfaced to the caller before any profiler
/// is evaluated and is never retried.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV ingestion error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Parquet ingestion error.
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// The input does not conform to the provided (or inferred) schema.
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// A value could not be parsed into the required [`crate::types::DataType`].
    #[error("failed to parse value at row {row} column '{column}': {message} (raw='{raw}')")]
    ParseError {
        row: usize,
        column: String,
        raw: String,
        message: String,
    },
}

/// Structural failures raised while selecting, evaluating or decoding a profiler batch.
///
/// Per-value anomalies (mean of an all-null column, a range whose operand is missing) are never
/// errors; they resolve to `None` inside the typed results.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// The flattened row does not hold `aggregates * columns` scalars.
    #[error(
        "flattened row has {actual} values, expected {expected} ({aggregates} aggregates x {columns} columns)"
    )]
    RowShape {
        aggregates: usize,
        columns: usize,
        expected: usize,
        actual: usize,
    },

    /// A per-column slice handed to a decoder has the wrong length.
    #[error("{profiler} profiler expected {expected} values per column, got {actual}")]
    DecodeArity {
        profiler: &'static str,
        expected: usize,
        actual: usize,
    },

    /// An aggregate came back with a scalar of the wrong kind.
    #[error("aggregate '{aggregate}' produced {found}, expected {expected}")]
    UnexpectedScalar {
        aggregate: String,
        expected: &'static str,
        found: String,
    },

    /// A selection referenced a column the source does not hold.
    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    /// A cell does not match its column's declared type.
    #[error("column '{column}' holds {found} where {expected} was declared")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        found: String,
    },

    /// A profiler option is out of range.
    #[error("invalid option: {message}")]
    InvalidOption { message: String },

    /// Polars failed to evaluate a batch (feature-gated behind `polars`).
    #[cfg(feature = "polars")]
    #[error("polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

/// Error type returned while rendering a report node through a template set.
#[derive(Debug, Error)]
pub enum RenderError {
    /// No template is registered under the requested name.
    #[error("no template named '{0}'")]
    MissingTemplate(String),

    /// A placeholder names a field the node does not expose.
    #[error("template '{template}' references unknown field '{field}'")]
    UnknownField { template: String, field: String },

    /// The node could not be serialized into a render context.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
