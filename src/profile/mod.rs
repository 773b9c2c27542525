//! Metric profilers.
//!
//! A profiler is one family of statistics. It declares which [`SemanticType`](crate::source::SemanticType)s
//! it applies to, the ordered list of [`Aggregate`]s it needs, and how to turn one column's
//! slice of the flattened result row back into a typed value. [`MetricProfiler::evaluate`] ties
//! those together and issues exactly one batch per profiler, whatever the column count.
//!
//! The set of families is closed: [`Profiler`] enumerates them and [`MetricResult`] carries
//! their outputs.
//!
//! ## Example
//!
//! ```rust
//! use rust_data_profiling::profile::{MetricProfiler, NumericProfiler};
//! use rust_data_profiling::source::NullDistinct;
//! use rust_data_profiling::types::{DataSet, DataType, Field, Schema, Value};
//!
//! let schema = Schema::new(vec![Field::new("x", DataType::Int64)]);
//! let ds = DataSet::new(schema, vec![vec![Value::Int64(3)], vec![Value::Int64(-1)]]);
//!
//! let out = NumericProfiler::new(NullDistinct::Ignored).evaluate(&ds).unwrap();
//! assert_eq!(out["x"].range(), Some(4.0));
//! ```

pub mod decode;
pub mod dispersion;
pub mod numeric;
pub mod quantile;
pub mod temporal;
pub mod text;

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ProfileError, ProfileResult};
use crate::source::{Aggregate, Scalar, SemanticTypeSet, TabularSource};

pub use decode::RowDecoder;
pub use dispersion::{DispersionProfile, DispersionProfiler};
pub use numeric::{Extreme, NumericProfile, NumericProfiler};
pub use quantile::{QuantileProfile, QuantileProfiler, QuantileValue};
pub use temporal::{TemporalProfile, TemporalProfiler};
pub use text::{TextProfile, TextProfiler};

/// Identifies a profiler family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfilerKind {
    Numeric,
    Quantile,
    Dispersion,
    Temporal,
    Text,
}

impl ProfilerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Quantile => "quantile",
            Self::Dispersion => "dispersion",
            Self::Temporal => "temporal",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for ProfilerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The contract every profiler family implements.
pub trait MetricProfiler {
    /// Typed per-column result.
    type Output;

    fn kind(&self) -> ProfilerKind;

    /// Semantic types this profiler evaluates over.
    fn applies_to(&self) -> SemanticTypeSet;

    /// Ordered aggregates requested per column. Fixed for the lifetime of the profiler.
    fn aggregate_list(&self) -> Vec<Aggregate>;

    /// Build the typed result from one column's values, in [`Self::aggregate_list`] order.
    fn decode(&self, values: &[Scalar]) -> ProfileResult<Self::Output>;

    /// Select eligible columns, evaluate the whole aggregate list over them in a single batch,
    /// and decode one result per column.
    ///
    /// Returns an empty map without touching the batch machinery when no column is eligible.
    fn evaluate<S>(&self, source: &S) -> ProfileResult<IndexMap<String, Self::Output>>
    where
        S: TabularSource + ?Sized,
    {
        let selection = source.select(self.applies_to());
        if selection.is_empty() {
            return Ok(IndexMap::new());
        }

        let aggregates = self.aggregate_list();
        let row = source.evaluate_batch(&selection, &aggregates)?;
        let decoder = RowDecoder::new(aggregates.len(), selection.len(), &row)?;

        selection
            .names()
            .zip(decoder.slices())
            .map(|(name, values)| Ok((name.to_string(), self.decode(&values)?)))
            .collect()
    }
}

/// Output of any profiler family.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "profiler", rename_all = "snake_case")]
pub enum MetricResult {
    Numeric(NumericProfile),
    Quantile(QuantileProfile),
    Dispersion(DispersionProfile),
    Temporal(TemporalProfile),
    Text(TextProfile),
}

impl MetricResult {
    pub fn kind(&self) -> ProfilerKind {
        match self {
            Self::Numeric(_) => ProfilerKind::Numeric,
            Self::Quantile(_) => ProfilerKind::Quantile,
            Self::Dispersion(_) => ProfilerKind::Dispersion,
            Self::Temporal(_) => ProfilerKind::Temporal,
            Self::Text(_) => ProfilerKind::Text,
        }
    }
}

/// The closed registry of profiler families.
#[derive(Debug, Clone, PartialEq)]
pub enum Profiler {
    Numeric(NumericProfiler),
    Quantile(QuantileProfiler),
    Dispersion(DispersionProfiler),
    Temporal(TemporalProfiler),
    Text(TextProfiler),
}

impl Profiler {
    pub fn kind(&self) -> ProfilerKind {
        match self {
            Self::Numeric(p) => p.kind(),
            Self::Quantile(p) => p.kind(),
            Self::Dispersion(p) => p.kind(),
            Self::Temporal(p) => p.kind(),
            Self::Text(p) => p.kind(),
        }
    }

    pub fn applies_to(&self) -> SemanticTypeSet {
        match self {
            Self::Numeric(p) => p.applies_to(),
            Self::Quantile(p) => p.applies_to(),
            Self::Dispersion(p) => p.applies_to(),
            Self::Temporal(p) => p.applies_to(),
            Self::Text(p) => p.applies_to(),
        }
    }

    pub fn aggregate_list(&self) -> Vec<Aggregate> {
        match self {
            Self::Numeric(p) => p.aggregate_list(),
            Self::Quantile(p) => p.aggregate_list(),
            Self::Dispersion(p) => p.aggregate_list(),
            Self::Temporal(p) => p.aggregate_list(),
            Self::Text(p) => p.aggregate_list(),
        }
    }

    /// Run the wrapped profiler and lift its outputs into [`MetricResult`].
    pub fn evaluate<S>(&self, source: &S) -> ProfileResult<IndexMap<String, MetricResult>>
    where
        S: TabularSource + ?Sized,
    {
        match self {
            Self::Numeric(p) => lift(p, source, MetricResult::Numeric),
            Self::Quantile(p) => lift(p, source, MetricResult::Quantile),
            Self::Dispersion(p) => lift(p, source, MetricResult::Dispersion),
            Self::Temporal(p) => lift(p, source, MetricResult::Temporal),
            Self::Text(p) => lift(p, source, MetricResult::Text),
        }
    }
}

fn lift<P, S>(
    profiler: &P,
    source: &S,
    wrap: fn(P::Output) -> MetricResult,
) -> ProfileResult<IndexMap<String, MetricResult>>
where
    P: MetricProfiler,
    S: TabularSource + ?Sized,
{
    Ok(profiler
        .evaluate(source)?
        .into_iter()
        .map(|(name, out)| (name, wrap(out)))
        .collect())
}

impl From<NumericProfiler> for Profiler {
    fn from(p: NumericProfiler) -> Self {
        Self::Numeric(p)
    }
}

impl From<QuantileProfiler> for Profiler {
    fn from(p: QuantileProfiler) -> Self {
        Self::Quantile(p)
    }
}

impl From<DispersionProfiler> for Profiler {
    fn from(p: DispersionProfiler) -> Self {
        Self::Dispersion(p)
    }
}

impl From<TemporalProfiler> for Profiler {
    fn from(p: TemporalProfiler) -> Self {
        Self::Temporal(p)
    }
}

impl From<TextProfiler> for Profiler {
    fn from(p: TextProfiler) -> Self {
        Self::Text(p)
    }
}

/// Fails unless `values` holds exactly `expected` scalars.
pub(crate) fn check_arity(kind: ProfilerKind, expected: usize, values: &[Scalar]) -> ProfileResult<()> {
    if values.len() != expected {
        return Err(ProfileError::DecodeArity {
            profiler: kind.as_str(),
            expected,
            actual: values.len(),
        });
    }
    Ok(())
}

/// `upper - lower`, or `None` when either side is undefined.
pub(crate) fn spread(upper: Option<f64>, lower: Option<f64>) -> Option<f64> {
    Some(upper? - lower?)
}
