//! Counts, extremes and central value of numeric columns.

use serde::Serialize;

use crate::error::ProfileResult;
use crate::source::{Aggregate, NullDistinct, Scalar, SemanticTypeSet};

use super::{MetricProfiler, ProfilerKind, check_arity, spread};

/// Null/distinct/infinite/zero/negative counts plus mean, min, max and range.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NumericProfiler {
    null_distinct: NullDistinct,
}

impl NumericProfiler {
    pub fn new(null_distinct: NullDistinct) -> Self {
        Self { null_distinct }
    }
}

/// A column minimum or maximum in the column's own domain, so integer extremes beyond 2^53
/// survive unrounded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Extreme {
    Integer(i64),
    Float(f64),
}

impl Extreme {
    fn from_scalar(value: &Scalar) -> Option<Self> {
        match value {
            Scalar::Int64(v) => Some(Extreme::Integer(*v)),
            Scalar::Float64(v) => Some(Extreme::Float(*v)),
            Scalar::Null | Scalar::Timestamp(_) => None,
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Extreme::Integer(v) => v as f64,
            Extreme::Float(v) => v,
        }
    }
}

/// `max - min`; integer extremes subtract exactly before the result is widened.
fn extreme_range(max: Option<Extreme>, min: Option<Extreme>) -> Option<f64> {
    match (max?, min?) {
        (Extreme::Integer(hi), Extreme::Integer(lo)) => Some((i128::from(hi) - i128::from(lo)) as f64),
        (hi, lo) => spread(Some(hi.as_f64()), Some(lo.as_f64())),
    }
}

/// Numeric summary of one column.
///
/// `mean`, `min`, `max` and `range` are `None` when the column has no non-null values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericProfile {
    null_count: u64,
    distinct_count: u64,
    infinite: u64,
    mean: Option<f64>,
    min: Option<Extreme>,
    max: Option<Extreme>,
    zeros: u64,
    negative: u64,
    range: Option<f64>,
}

impl NumericProfile {
    pub fn null_count(&self) -> u64 {
        self.null_count
    }

    pub fn distinct_count(&self) -> u64 {
        self.distinct_count
    }

    pub fn infinite(&self) -> u64 {
        self.infinite
    }

    pub fn mean(&self) -> Option<f64> {
        self.mean
    }

    pub fn min(&self) -> Option<Extreme> {
        self.min
    }

    pub fn max(&self) -> Option<Extreme> {
        self.max
    }

    pub fn zeros(&self) -> u64 {
        self.zeros
    }

    pub fn negative(&self) -> u64 {
        self.negative
    }

    /// `max - min`.
    pub fn range(&self) -> Option<f64> {
        self.range
    }
}

impl MetricProfiler for NumericProfiler {
    type Output = NumericProfile;

    fn kind(&self) -> ProfilerKind {
        ProfilerKind::Numeric
    }

    fn applies_to(&self) -> SemanticTypeSet {
        SemanticTypeSet::NUMERIC
    }

    fn aggregate_list(&self) -> Vec<Aggregate> {
        vec![
            Aggregate::NullCount,
            Aggregate::DistinctCount(self.null_distinct),
            Aggregate::InfiniteCount,
            Aggregate::Mean,
            Aggregate::Min,
            Aggregate::Max,
            Aggregate::ZeroCount,
            Aggregate::NegativeCount,
        ]
    }

    fn decode(&self, values: &[Scalar]) -> ProfileResult<NumericProfile> {
        let aggregates = self.aggregate_list();
        check_arity(self.kind(), aggregates.len(), values)?;

        let min = Extreme::from_scalar(&values[4]);
        let max = Extreme::from_scalar(&values[5]);
        Ok(NumericProfile {
            null_count: values[0].as_count(&aggregates[0])?,
            distinct_count: values[1].as_count(&aggregates[1])?,
            infinite: values[2].as_count(&aggregates[2])?,
            mean: values[3].as_f64(),
            min,
            max,
            zeros: values[6].as_count(&aggregates[6])?,
            negative: values[7].as_count(&aggregates[7])?,
            range: extreme_range(max, min),
        })
    }
}
