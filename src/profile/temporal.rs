//! Datetime columns.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::error::ProfileResult;
use crate::source::{Aggregate, NullDistinct, Scalar, SemanticTypeSet};

use super::{MetricProfiler, ProfilerKind, check_arity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TemporalProfiler {
    null_distinct: NullDistinct,
}

impl TemporalProfiler {
    pub fn new(null_distinct: NullDistinct) -> Self {
        Self { null_distinct }
    }
}

/// Counts and extremes of one datetime column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemporalProfile {
    null_count: u64,
    distinct_count: u64,
    min: Option<NaiveDateTime>,
    max: Option<NaiveDateTime>,
}

impl TemporalProfile {
    pub fn null_count(&self) -> u64 {
        self.null_count
    }

    pub fn distinct_count(&self) -> u64 {
        self.distinct_count
    }

    /// Earliest value, `None` if the column has no non-null values.
    pub fn min(&self) -> Option<NaiveDateTime> {
        self.min
    }

    pub fn max(&self) -> Option<NaiveDateTime> {
        self.max
    }
}

impl MetricProfiler for TemporalProfiler {
    type Output = TemporalProfile;

    fn kind(&self) -> ProfilerKind {
        ProfilerKind::Temporal
    }

    fn applies_to(&self) -> SemanticTypeSet {
        SemanticTypeSet::TEMPORAL
    }

    fn aggregate_list(&self) -> Vec<Aggregate> {
        vec![
            Aggregate::NullCount,
            Aggregate::DistinctCount(self.null_distinct),
            Aggregate::Min,
            Aggregate::Max,
        ]
    }

    fn decode(&self, values: &[Scalar]) -> ProfileResult<TemporalProfile> {
        let aggregates = self.aggregate_list();
        check_arity(self.kind(), aggregates.len(), values)?;
        Ok(TemporalProfile {
            null_count: values[0].as_count(&aggregates[0])?,
            distinct_count: values[1].as_count(&aggregates[1])?,
            min: values[2].as_timestamp(),
            max: values[3].as_timestamp(),
        })
    }
}
