//! String columns: counts and character lengths.

use serde::Serialize;

use crate::error::ProfileResult;
use crate::source::{Aggregate, NullDistinct, Scalar, SemanticTypeSet};

use super::{MetricProfiler, ProfilerKind, check_arity};

/// Null and distinct counts plus min/median/mean/max length in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextProfiler {
    null_distinct: NullDistinct,
}

impl TextProfiler {
    pub fn new(null_distinct: NullDistinct) -> Self {
        Self { null_distinct }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextProfile {
    null_count: u64,
    distinct_count: u64,
    min_length: Option<u64>,
    median_length: Option<f64>,
    mean_length: Option<f64>,
    max_length: Option<u64>,
}

impl TextProfile {
    pub fn null_count(&self) -> u64 {
        self.null_count
    }

    pub fn distinct_count(&self) -> u64 {
        self.distinct_count
    }

    pub fn min_length(&self) -> Option<u64> {
        self.min_length
    }

    pub fn median_length(&self) -> Option<f64> {
        self.median_length
    }

    pub fn mean_length(&self) -> Option<f64> {
        self.mean_length
    }

    pub fn max_length(&self) -> Option<u64> {
        self.max_length
    }
}

impl MetricProfiler for TextProfiler {
    type Output = TextProfile;

    fn kind(&self) -> ProfilerKind {
        ProfilerKind::Text
    }

    fn applies_to(&self) -> SemanticTypeSet {
        SemanticTypeSet::TEXT
    }

    fn aggregate_list(&self) -> Vec<Aggregate> {
        vec![
            Aggregate::NullCount,
            Aggregate::DistinctCount(self.null_distinct),
            Aggregate::MinLength,
            Aggregate::MedianLength,
            Aggregate::MeanLength,
            Aggregate::MaxLength,
        ]
    }

    fn decode(&self, values: &[Scalar]) -> ProfileResult<TextProfile> {
        let aggregates = self.aggregate_list();
        check_arity(self.kind(), aggregates.len(), values)?;

        // Length extremes are absent for an all-null column, otherwise whole counts.
        let length = |i: usize| match &values[i] {
            Scalar::Null => Ok(None),
            v => v.as_count(&aggregates[i]).map(Some),
        };

        Ok(TextProfile {
            null_count: values[0].as_count(&aggregates[0])?,
            distinct_count: values[1].as_count(&aggregates[1])?,
            min_length: length(2)?,
            median_length: values[3].as_f64(),
            mean_length: values[4].as_f64(),
            max_length: length(5)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::TextProfiler;
    use crate::profile::MetricProfiler;
    use crate::source::Scalar;
    use crate::types::{DataSet, DataType, Field, Schema, Value};

    fn text_column(values: &[Option<&str>]) -> DataSet {
        let schema = Schema::new(vec![Field::new("s", DataType::Utf8)]);
        let rows = values
            .iter()
            .map(|v| vec![v.map_or(Value::Null, |s| Value::Utf8(s.to_string()))])
            .collect();
        DataSet::new(schema, rows)
    }

    #[test]
    fn short_strings_with_a_null() {
        let ds = text_column(&[Some("a"), Some("a"), Some("b"), None]);
        let s = TextProfiler::default().evaluate(&ds).unwrap().swap_remove("s").unwrap();
        assert_eq!(s.null_count(), 1);
        assert_eq!(s.distinct_count(), 2);
        assert_eq!(s.min_length(), Some(1));
        assert_eq!(s.max_length(), Some(1));
        assert_eq!(s.median_length(), Some(1.0));
        assert_eq!(s.mean_length(), Some(1.0));
    }

    #[test]
    fn lengths_are_measured_in_characters() {
        let ds = text_column(&[Some("héllo"), Some("ab"), Some("ü")]);
        let s = TextProfiler::default().evaluate(&ds).unwrap().swap_remove("s").unwrap();
        assert_eq!(s.min_length(), Some(1));
        assert_eq!(s.max_length(), Some(5));
        assert_eq!(s.median_length(), Some(2.0));
    }

    #[test]
    fn all_null_column_has_no_lengths() {
        let ds = text_column(&[None, None]);
        let s = TextProfiler::default().evaluate(&ds).unwrap().swap_remove("s").unwrap();
        assert_eq!(s.null_count(), 2);
        assert_eq!(s.distinct_count(), 0);
        assert_eq!(s.min_length(), None);
        assert_eq!(s.mean_length(), None);
    }

    #[test]
    fn fractional_length_extreme_is_rejected() {
        let values = [
            Scalar::Int64(0),
            Scalar::Int64(1),
            Scalar::Float64(1.5),
            Scalar::Float64(1.5),
            Scalar::Float64(1.5),
            Scalar::Int64(2),
        ];
        assert!(TextProfiler::default().decode(&values).is_err());
    }
}
