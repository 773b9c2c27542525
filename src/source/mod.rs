//! The tabular source boundary.
//!
//! Profilers never touch storage directly. They ask a [`TabularSource`] for the columns whose
//! [`SemanticType`] they accept, then hand it one batch of [`Aggregate`]s to evaluate over that
//! [`Selection`]. The source answers with a single flattened row of [`Scalar`]s laid out
//! aggregate-major: every selected column's value for the first aggregate, then every column's
//! value for the second, and so on.
//!
//! Two sources ship with the crate:
//!
//! - [`crate::types::DataSet`] (see [`memory`]): the in-memory reference engine.
//! - `polars::prelude::DataFrame` (feature `polars`): one lazy `select` per batch.

pub mod memory;
#[cfg(feature = "polars")]
pub mod polars;

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{ProfileError, ProfileResult};

/// Semantic column type used to route columns to profilers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    Integer,
    Float,
    Boolean,
    Text,
    Temporal,
    Other,
}

impl SemanticType {
    const ALL: [SemanticType; 6] = [
        SemanticType::Integer,
        SemanticType::Float,
        SemanticType::Boolean,
        SemanticType::Text,
        SemanticType::Temporal,
        SemanticType::Other,
    ];

    fn bit(self) -> u8 {
        1 << (self as u8)
    }

    /// Lowercase name, as used in reports.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Text => "text",
            Self::Temporal => "temporal",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A small copyable set of [`SemanticType`]s.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct SemanticTypeSet(u8);

impl SemanticTypeSet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);
    /// Integer and floating-point columns.
    pub const NUMERIC: Self = Self(1 << SemanticType::Integer as u8 | 1 << SemanticType::Float as u8);
    /// Temporal columns.
    pub const TEMPORAL: Self = Self(1 << SemanticType::Temporal as u8);
    /// String columns.
    pub const TEXT: Self = Self(1 << SemanticType::Text as u8);

    /// Build a set from a list of types.
    pub fn of(types: &[SemanticType]) -> Self {
        types.iter().fold(Self::EMPTY, |set, t| set.with(*t))
    }

    /// Returns a copy of this set that also contains `t`.
    pub fn with(self, t: SemanticType) -> Self {
        Self(self.0 | t.bit())
    }

    pub fn contains(self, t: SemanticType) -> bool {
        self.0 & t.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate members in declaration order.
    pub fn iter(self) -> impl Iterator<Item = SemanticType> {
        SemanticType::ALL.into_iter().filter(move |t| self.contains(*t))
    }
}

impl fmt::Debug for SemanticTypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Name and type of one column of a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    /// Column name, unique within the source.
    pub name: String,
    /// Semantic type used for profiler routing.
    pub semantic_type: SemanticType,
    /// Physical type as reported by the source (e.g. `i64`, `datetime[μs]`).
    pub dtype: String,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, semantic_type: SemanticType, dtype: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            semantic_type,
            dtype: dtype.into(),
        }
    }
}

/// An ordered subset of a source's columns.
///
/// Order follows the source's column order; it fixes the `N` axis of a flattened result row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    columns: Vec<ColumnInfo>,
}

impl Selection {
    pub fn new(columns: Vec<ColumnInfo>) -> Self {
        Self { columns }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    /// Iterate selected column names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}

/// Whether nulls take part in `distinct_count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullDistinct {
    /// Count distinct non-null values only.
    #[default]
    Ignored,
    /// Count null as one more distinct value when present.
    Counted,
}

/// How a quantile is picked between two ranks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantileInterpolation {
    /// The value at rank `round((n - 1) * p)`.
    #[default]
    Nearest,
    /// Linear interpolation between the two surrounding ranks.
    Linear,
}

/// A named, order-independent reduction over one column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Aggregate {
    NullCount,
    DistinctCount(NullDistinct),
    InfiniteCount,
    Mean,
    Min,
    Max,
    ZeroCount,
    NegativeCount,
    Quantile(f64, QuantileInterpolation),
    StdDev,
    CoefficientOfVariation,
    Kurtosis,
    Skewness,
    MinLength,
    MedianLength,
    MeanLength,
    MaxLength,
}

impl Aggregate {
    /// Stable label, used in error messages and batch column aliases.
    pub fn label(&self) -> String {
        match self {
            Self::NullCount => "null_count".to_string(),
            Self::DistinctCount(_) => "distinct_count".to_string(),
            Self::InfiniteCount => "infinite_count".to_string(),
            Self::Mean => "mean".to_string(),
            Self::Min => "min".to_string(),
            Self::Max => "max".to_string(),
            Self::ZeroCount => "zero_count".to_string(),
            Self::NegativeCount => "negative_count".to_string(),
            Self::Quantile(p, _) => format!("quantile({p})"),
            Self::StdDev => "std_dev".to_string(),
            Self::CoefficientOfVariation => "coefficient_of_variation".to_string(),
            Self::Kurtosis => "kurtosis".to_string(),
            Self::Skewness => "skewness".to_string(),
            Self::MinLength => "min_length".to_string(),
            Self::MedianLength => "median_length".to_string(),
            Self::MeanLength => "mean_length".to_string(),
            Self::MaxLength => "max_length".to_string(),
        }
    }
}

/// One aggregate value in a flattened result row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    /// The aggregate is undefined for the column (e.g. mean of no values).
    Null,
    Int64(i64),
    Float64(f64),
    Timestamp(NaiveDateTime),
}

impl Scalar {
    /// Numeric view of the scalar; `None` for null and timestamps.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int64(v) => Some(*v as f64),
            Scalar::Float64(v) => Some(*v),
            Scalar::Null | Scalar::Timestamp(_) => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Scalar::Timestamp(v) => Some(*v),
            _ => None,
        }
    }

    /// Reads a count. Counts are always defined, so a null or fractional scalar is a
    /// structural error rather than a sentinel.
    pub fn as_count(&self, aggregate: &Aggregate) -> ProfileResult<u64> {
        match self {
            Scalar::Int64(v) if *v >= 0 => Ok(*v as u64),
            Scalar::Float64(v) if v.fract() == 0.0 && *v >= 0.0 => Ok(*v as u64),
            other => Err(ProfileError::UnexpectedScalar {
                aggregate: aggregate.label(),
                expected: "non-negative count",
                found: format!("{other:?}"),
            }),
        }
    }
}

/// A read-only, column-typed data source that evaluates batches of aggregates.
///
/// Implementations must keep [`TabularSource::columns`] stable for the duration of a run and
/// must lay out [`TabularSource::evaluate_batch`] results aggregate-major.
pub trait TabularSource {
    /// All columns, in source order.
    fn columns(&self) -> Vec<ColumnInfo>;

    /// Columns whose semantic type is in `types`, preserving source order.
    fn select(&self, types: SemanticTypeSet) -> Selection {
        Selection::new(
            self.columns()
                .into_iter()
                .filter(|c| types.contains(c.semantic_type))
                .collect(),
        )
    }

    /// Evaluate every aggregate over every selected column in one pass.
    ///
    /// Returns `aggregates.len() * selection.len()` scalars where the value of aggregate `i`
    /// for column `j` sits at index `i * selection.len() + j`.
    fn evaluate_batch(&self, selection: &Selection, aggregates: &[Aggregate]) -> ProfileResult<Vec<Scalar>>;

    fn row_count(&self) -> usize;

    fn column_count(&self) -> usize {
        self.columns().len()
    }

    /// Number of rows equal to at least one other row.
    fn duplicate_row_count(&self) -> ProfileResult<usize>;
}
