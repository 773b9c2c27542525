//! [`TabularSource`] over the in-memory [`DataSet`].
//!
//! This is the reference engine: every aggregate is computed directly in Rust over the values of
//! one column. [`evaluate_aggregate`] exposes the one-aggregate-one-column path so callers can
//! cross-check batched results against it.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDateTime;

use crate::error::{ProfileError, ProfileResult};
use crate::types::{DataSet, DataType, Value};

use super::{
    Aggregate, ColumnInfo, NullDistinct, QuantileInterpolation, Scalar, Selection, SemanticType, TabularSource,
};

/// Semantic routing type for an in-memory column type.
pub fn semantic_type_of(data_type: &DataType) -> SemanticType {
    match data_type {
        DataType::Int64 => SemanticType::Integer,
        DataType::Float64 => SemanticType::Float,
        DataType::Bool => SemanticType::Boolean,
        DataType::Utf8 => SemanticType::Text,
        DataType::Timestamp => SemanticType::Temporal,
        DataType::Other => SemanticType::Other,
    }
}

impl TabularSource for DataSet {
    fn columns(&self) -> Vec<ColumnInfo> {
        self.schema
            .fields
            .iter()
            .map(|f| ColumnInfo::new(f.name.clone(), semantic_type_of(&f.data_type), f.data_type.name()))
            .collect()
    }

    fn evaluate_batch(&self, selection: &Selection, aggregates: &[Aggregate]) -> ProfileResult<Vec<Scalar>> {
        let columns = selection
            .names()
            .map(|name| ColumnData::gather(self, name))
            .collect::<ProfileResult<Vec<_>>>()?;

        let mut row = Vec::with_capacity(aggregates.len() * columns.len());
        for aggregate in aggregates {
            for column in &columns {
                row.push(column.aggregate(aggregate)?);
            }
        }
        Ok(row)
    }

    fn row_count(&self) -> usize {
        DataSet::row_count(self)
    }

    fn column_count(&self) -> usize {
        DataSet::column_count(self)
    }

    fn duplicate_row_count(&self) -> ProfileResult<usize> {
        static NULL: Value = Value::Null;
        let mut seen: HashMap<Vec<ValueKey<'_>>, usize> = HashMap::with_capacity(self.rows.len());
        for row in &self.rows {
            let key = (0..DataSet::column_count(self))
                .map(|idx| ValueKey::from(row.get(idx).unwrap_or(&NULL)))
                .collect();
            *seen.entry(key).or_insert(0) += 1;
        }
        Ok(seen.values().filter(|n| **n > 1).sum())
    }
}

/// Evaluate a single aggregate over a single column, without batching.
pub fn evaluate_aggregate(dataset: &DataSet, column: &str, aggregate: &Aggregate) -> ProfileResult<Scalar> {
    ColumnData::gather(dataset, column)?.aggregate(aggregate)
}

#[derive(Debug, PartialEq, Eq, Hash)]
enum ValueKey<'a> {
    Null,
    Int(i64),
    Float(u64),
    Bool(bool),
    Text(&'a str),
    Time(NaiveDateTime),
}

impl<'a> From<&'a Value> for ValueKey<'a> {
    fn from(v: &'a Value) -> Self {
        match v {
            Value::Null => ValueKey::Null,
            Value::Int64(x) => ValueKey::Int(*x),
            Value::Float64(x) => ValueKey::Float(float_bits(*x)),
            Value::Bool(x) => ValueKey::Bool(*x),
            Value::Utf8(s) => ValueKey::Text(s.as_str()),
            Value::Timestamp(t) => ValueKey::Time(*t),
        }
    }
}

// -0.0 == 0.0 and all NaNs compare as one value.
fn float_bits(v: f64) -> u64 {
    if v.is_nan() {
        f64::NAN.to_bits()
    } else if v == 0.0 {
        0f64.to_bits()
    } else {
        v.to_bits()
    }
}

/// Non-null values of one column, unpacked by type.
enum Values<'a> {
    Integer(Vec<i64>),
    Float(Vec<f64>),
    Boolean(Vec<bool>),
    Text(Vec<&'a str>),
    Temporal(Vec<NaiveDateTime>),
    /// Columns whose cells are not loaded; only nulls are accepted.
    Opaque,
}

struct ColumnData<'a> {
    nulls: usize,
    values: Values<'a>,
}

impl<'a> ColumnData<'a> {
    fn gather(dataset: &'a DataSet, name: &str) -> ProfileResult<Self> {
        let idx = dataset
            .schema
            .index_of(name)
            .ok_or_else(|| ProfileError::UnknownColumn(name.to_string()))?;
        let data_type = &dataset.schema.fields[idx].data_type;

        let mismatch = |v: &Value| ProfileError::TypeMismatch {
            column: name.to_string(),
            expected: data_type.name(),
            found: format!("{v:?}"),
        };

        let mut nulls = 0usize;
        let mut values = match data_type {
            DataType::Int64 => Values::Integer(Vec::new()),
            DataType::Float64 => Values::Float(Vec::new()),
            DataType::Bool => Values::Boolean(Vec::new()),
            DataType::Utf8 => Values::Text(Vec::new()),
            DataType::Timestamp => Values::Temporal(Vec::new()),
            DataType::Other => Values::Opaque,
        };

        for v in dataset.column_values(idx) {
            match (&mut values, v) {
                (_, Value::Null) => nulls += 1,
                (Values::Integer(out), Value::Int64(x)) => out.push(*x),
                (Values::Float(out), Value::Float64(x)) => out.push(*x),
                (Values::Float(out), Value::Int64(x)) => out.push(*x as f64),
                (Values::Boolean(out), Value::Bool(x)) => out.push(*x),
                (Values::Text(out), Value::Utf8(s)) => out.push(s.as_str()),
                (Values::Temporal(out), Value::Timestamp(t)) => out.push(*t),
                (_, other) => return Err(mismatch(other)),
            }
        }

        Ok(Self { nulls, values })
    }

    /// Non-null values widened to `f64`, for numeric columns only.
    fn numeric(&self) -> Option<Vec<f64>> {
        match &self.values {
            Values::Integer(v) => Some(v.iter().map(|x| *x as f64).collect()),
            Values::Float(v) => Some(v.clone()),
            _ => None,
        }
    }

    fn lengths(&self) -> Option<Vec<u64>> {
        match &self.values {
            Values::Text(v) => Some(v.iter().map(|s| s.chars().count() as u64).collect()),
            _ => None,
        }
    }

    fn distinct(&self) -> usize {
        match &self.values {
            Values::Integer(v) => v.iter().collect::<HashSet<_>>().len(),
            Values::Float(v) => v.iter().map(|x| float_bits(*x)).collect::<HashSet<_>>().len(),
            Values::Boolean(v) => v.iter().collect::<HashSet<_>>().len(),
            Values::Text(v) => v.iter().collect::<HashSet<_>>().len(),
            Values::Temporal(v) => v.iter().collect::<HashSet<_>>().len(),
            Values::Opaque => 0,
        }
    }

    fn count_numeric(&self, pred: impl Fn(f64) -> bool) -> Scalar {
        match self.numeric() {
            Some(v) => Scalar::Int64(v.into_iter().filter(|x| pred(*x)).count() as i64),
            None => Scalar::Null,
        }
    }

    fn aggregate(&self, aggregate: &Aggregate) -> ProfileResult<Scalar> {
        let scalar = match aggregate {
            Aggregate::NullCount => Scalar::Int64(self.nulls as i64),
            Aggregate::DistinctCount(policy) => {
                let extra = usize::from(*policy == NullDistinct::Counted && self.nulls > 0);
                Scalar::Int64((self.distinct() + extra) as i64)
            }
            Aggregate::InfiniteCount => self.count_numeric(f64::is_infinite),
            Aggregate::ZeroCount => self.count_numeric(|x| x == 0.0),
            Aggregate::NegativeCount => self.count_numeric(|x| x < 0.0),
            Aggregate::Mean => float_or_null(self.numeric().as_deref().and_then(mean)),
            Aggregate::Min => self.extreme(true),
            Aggregate::Max => self.extreme(false),
            Aggregate::Quantile(p, interpolation) => {
                if !(0.0..=1.0).contains(p) {
                    return Err(ProfileError::InvalidOption {
                        message: format!("quantile level {p} is outside [0, 1]"),
                    });
                }
                let sorted = self.numeric().map(sorted);
                float_or_null(sorted.as_deref().and_then(|v| quantile(v, *p, *interpolation)))
            }
            Aggregate::StdDev => float_or_null(self.numeric().as_deref().and_then(sample_std)),
            Aggregate::CoefficientOfVariation => {
                let values = self.numeric();
                let values = values.as_deref();
                let cv = values
                    .and_then(sample_std)
                    .zip(values.and_then(mean))
                    .and_then(|(std, mean)| (mean != 0.0).then(|| std / mean));
                float_or_null(cv)
            }
            Aggregate::Skewness => float_or_null(self.numeric().as_deref().and_then(skewness)),
            Aggregate::Kurtosis => float_or_null(self.numeric().as_deref().and_then(kurtosis)),
            Aggregate::MinLength => int_or_null(self.lengths().and_then(|l| l.into_iter().min())),
            Aggregate::MaxLength => int_or_null(self.lengths().and_then(|l| l.into_iter().max())),
            Aggregate::MeanLength => {
                let lengths = self.lengths().map(|l| l.into_iter().map(|x| x as f64).collect::<Vec<_>>());
                float_or_null(lengths.as_deref().and_then(mean))
            }
            Aggregate::MedianLength => {
                let lengths = self.lengths().map(|l| sorted(l.into_iter().map(|x| x as f64).collect()));
                float_or_null(
                    lengths
                        .as_deref()
                        .and_then(|v| quantile(v, 0.5, QuantileInterpolation::Linear)),
                )
            }
        };
        Ok(scalar)
    }

    fn extreme(&self, min: bool) -> Scalar {
        fn pick<T: PartialOrd + Copy>(values: &[T], min: bool) -> Option<T> {
            values.iter().copied().fold(None, |acc, x| match acc {
                None => Some(x),
                Some(a) if (min && x < a) || (!min && x > a) => Some(x),
                keep => keep,
            })
        }

        match &self.values {
            Values::Integer(v) => pick(v, min).map_or(Scalar::Null, Scalar::Int64),
            Values::Float(v) => {
                let finite_order: Vec<f64> = v.iter().copied().filter(|x| !x.is_nan()).collect();
                pick(&finite_order, min).map_or(Scalar::Null, Scalar::Float64)
            }
            Values::Temporal(v) => pick(v, min).map_or(Scalar::Null, Scalar::Timestamp),
            Values::Boolean(_) | Values::Text(_) | Values::Opaque => Scalar::Null,
        }
    }
}

fn float_or_null(v: Option<f64>) -> Scalar {
    v.map_or(Scalar::Null, Scalar::Float64)
}

fn int_or_null(v: Option<u64>) -> Scalar {
    v.map_or(Scalar::Null, |x| Scalar::Int64(x as i64))
}

fn sorted(mut v: Vec<f64>) -> Vec<f64> {
    v.sort_by(f64::total_cmp);
    v
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// `values` must be sorted ascending.
fn quantile(values: &[f64], p: f64, interpolation: QuantileInterpolation) -> Option<f64> {
    let last = values.len().checked_sub(1)?;
    let rank = last as f64 * p;
    match interpolation {
        QuantileInterpolation::Nearest => values.get(rank.round() as usize).copied(),
        QuantileInterpolation::Linear => {
            let lo = rank.floor() as usize;
            let hi = rank.ceil() as usize;
            let (a, b) = (values[lo], values[hi.min(last)]);
            Some(a + (b - a) * (rank - lo as f64))
        }
    }
}

fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|x| (x - m).powi(2)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

/// Population central moments `(m2, m3, m4)`.
fn central_moments(values: &[f64]) -> Option<(f64, f64, f64)> {
    let m = mean(values)?;
    let n = values.len() as f64;
    let (m2, m3, m4) = values.iter().fold((0.0, 0.0, 0.0), |(a, b, c), x| {
        let d = x - m;
        (a + d * d, b + d * d * d, c + d * d * d * d)
    });
    Some((m2 / n, m3 / n, m4 / n))
}

fn skewness(values: &[f64]) -> Option<f64> {
    let (m2, m3, _) = central_moments(values)?;
    (m2 != 0.0).then(|| m3 / m2.powf(1.5))
}

fn kurtosis(values: &[f64]) -> Option<f64> {
    let (m2, _, m4) = central_moments(values)?;
    (m2 != 0.0).then(|| m4 / (m2 * m2) - 3.0)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::evaluate_aggregate;
    use crate::source::{
        Aggregate, NullDistinct, QuantileInterpolation, Scalar, SemanticType, SemanticTypeSet, TabularSource,
    };
    use crate::types::{DataSet, DataType, Field, Schema, Value};

    fn mixed_dataset() -> DataSet {
        let schema = Schema::new(vec![
            Field::new("id", DataType::Int64),
            Field::new("score", DataType::Float64),
            Field::new("name", DataType::Utf8),
            Field::new("seen", DataType::Timestamp),
        ]);
        let day = |d| {
            NaiveDate::from_ymd_opt(2024, 1, d)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .unwrap()
        };
        let rows = vec![
            vec![
                Value::Int64(1),
                Value::Float64(-1.5),
                Value::Utf8("ab".to_string()),
                Value::Timestamp(day(3)),
            ],
            vec![
                Value::Int64(2),
                Value::Float64(0.0),
                Value::Utf8("abcd".to_string()),
                Value::Timestamp(day(1)),
            ],
            vec![Value::Int64(2), Value::Float64(f64::INFINITY), Value::Null, Value::Null],
            vec![Value::Null, Value::Null, Value::Utf8("ab".to_string()), Value::Timestamp(day(2))],
        ];
        DataSet::new(schema, rows)
    }

    fn eval(ds: &DataSet, column: &str, agg: Aggregate) -> Scalar {
        evaluate_aggregate(ds, column, &agg).unwrap()
    }

    #[test]
    fn batch_layout_is_aggregate_major() {
        let ds = mixed_dataset();
        let selection = ds.select(SemanticTypeSet::NUMERIC);
        assert_eq!(selection.names().collect::<Vec<_>>(), vec!["id", "score"]);

        let row = ds
            .evaluate_batch(&selection, &[Aggregate::NullCount, Aggregate::Min])
            .unwrap();
        assert_eq!(
            row,
            vec![
                Scalar::Int64(1),
                Scalar::Int64(1),
                Scalar::Int64(1),
                Scalar::Float64(-1.5),
            ]
        );
    }

    #[test]
    fn counts_over_numeric_columns() {
        let ds = mixed_dataset();
        assert_eq!(eval(&ds, "score", Aggregate::InfiniteCount), Scalar::Int64(1));
        assert_eq!(eval(&ds, "score", Aggregate::ZeroCount), Scalar::Int64(1));
        assert_eq!(eval(&ds, "score", Aggregate::NegativeCount), Scalar::Int64(1));
        assert_eq!(eval(&ds, "id", Aggregate::InfiniteCount), Scalar::Int64(0));
    }

    #[test]
    fn distinct_count_honours_null_policy() {
        let ds = mixed_dataset();
        assert_eq!(
            eval(&ds, "id", Aggregate::DistinctCount(NullDistinct::Ignored)),
            Scalar::Int64(2)
        );
        assert_eq!(
            eval(&ds, "id", Aggregate::DistinctCount(NullDistinct::Counted)),
            Scalar::Int64(3)
        );
    }

    #[test]
    fn text_lengths_count_characters() {
        let ds = mixed_dataset();
        assert_eq!(eval(&ds, "name", Aggregate::MinLength), Scalar::Int64(2));
        assert_eq!(eval(&ds, "name", Aggregate::MaxLength), Scalar::Int64(4));
        assert_eq!(eval(&ds, "name", Aggregate::MedianLength), Scalar::Float64(2.0));
        assert_eq!(
            eval(&ds, "name", Aggregate::MeanLength),
            Scalar::Float64(8.0 / 3.0)
        );
    }

    #[test]
    fn temporal_extremes_are_timestamps() {
        let ds = mixed_dataset();
        let min = eval(&ds, "seen", Aggregate::Min).as_timestamp().unwrap();
        let max = eval(&ds, "seen", Aggregate::Max).as_timestamp().unwrap();
        assert_eq!(min.to_string(), "2024-01-01 00:00:00");
        assert_eq!(max.to_string(), "2024-01-03 00:00:00");
    }

    #[test]
    fn undefined_aggregates_resolve_to_null() {
        let schema = Schema::new(vec![Field::new("x", DataType::Float64)]);
        let ds = DataSet::new(schema, vec![vec![Value::Null], vec![Value::Null]]);
        for agg in [
            Aggregate::Mean,
            Aggregate::Min,
            Aggregate::Max,
            Aggregate::StdDev,
            Aggregate::Skewness,
            Aggregate::Kurtosis,
            Aggregate::CoefficientOfVariation,
            Aggregate::Quantile(0.5, QuantileInterpolation::Nearest),
        ] {
            assert_eq!(eval(&ds, "x", agg), Scalar::Null, "{agg:?}");
        }
        assert_eq!(eval(&ds, "x", Aggregate::NullCount), Scalar::Int64(2));
    }

    #[test]
    fn quantiles_follow_interpolation() {
        let schema = Schema::new(vec![Field::new("x", DataType::Int64)]);
        let rows = [4, 1, 3, 2].into_iter().map(|v| vec![Value::Int64(v)]).collect();
        let ds = DataSet::new(schema, rows);

        // ranks 0..=3; p = 0.5 -> rank 1.5
        assert_eq!(
            eval(&ds, "x", Aggregate::Quantile(0.5, QuantileInterpolation::Linear)),
            Scalar::Float64(2.5)
        );
        assert_eq!(
            eval(&ds, "x", Aggregate::Quantile(0.5, QuantileInterpolation::Nearest)),
            Scalar::Float64(3.0)
        );
        assert_eq!(
            eval(&ds, "x", Aggregate::Quantile(1.0, QuantileInterpolation::Nearest)),
            Scalar::Float64(4.0)
        );
        assert!(evaluate_aggregate(&ds, "x", &Aggregate::Quantile(1.5, QuantileInterpolation::Linear)).is_err());
    }

    #[test]
    fn shape_statistics_match_hand_computation() {
        let schema = Schema::new(vec![Field::new("x", DataType::Float64)]);
        let rows = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]
            .into_iter()
            .map(|v| vec![Value::Float64(v)])
            .collect();
        let ds = DataSet::new(schema, rows);

        // mean 5, population variance 4, sample variance 32/7
        let std = eval(&ds, "x", Aggregate::StdDev).as_f64().unwrap();
        assert!((std - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
        let cv = eval(&ds, "x", Aggregate::CoefficientOfVariation).as_f64().unwrap();
        assert!((cv - std / 5.0).abs() < 1e-12);
        // deviations -3,-1,-1,-1,0,0,2,4: m3 = 42/8, m4 = 356/8
        let skew = eval(&ds, "x", Aggregate::Skewness).as_f64().unwrap();
        assert!((skew - (42.0 / 8.0) / 8.0).abs() < 1e-12);
        let kurt = eval(&ds, "x", Aggregate::Kurtosis).as_f64().unwrap();
        assert!((kurt - ((356.0 / 8.0) / 16.0 - 3.0)).abs() < 1e-12);
    }

    #[test]
    fn duplicate_rows_count_every_member_of_a_group() {
        let schema = Schema::new(vec![Field::new("a", DataType::Int64), Field::new("b", DataType::Int64)]);
        let rows = vec![
            vec![Value::Int64(1), Value::Int64(2)],
            vec![Value::Int64(1), Value::Int64(2)],
            vec![Value::Int64(3), Value::Int64(4)],
        ];
        let ds = DataSet::new(schema, rows);
        assert_eq!(ds.duplicate_row_count().unwrap(), 2);
        assert_eq!(DataSet::default().duplicate_row_count().unwrap(), 0);
    }

    #[test]
    fn zero_column_rows_are_all_duplicates() {
        let one = DataSet::new(Schema::default(), vec![Vec::new()]);
        assert_eq!(one.duplicate_row_count().unwrap(), 0);
        let three = DataSet::new(Schema::default(), vec![Vec::new(); 3]);
        assert_eq!(three.duplicate_row_count().unwrap(), 3);
    }

    #[test]
    fn other_columns_are_counted_but_hold_only_nulls() {
        let schema = Schema::new(vec![Field::new("raw", DataType::Other)]);
        let ds = DataSet::new(schema, vec![vec![Value::Null], vec![Value::Null]]);
        assert_eq!(ds.columns()[0].semantic_type, SemanticType::Other);
        assert!(ds.select(SemanticTypeSet::NUMERIC.with(SemanticType::Text)).is_empty());
        assert_eq!(eval(&ds, "raw", Aggregate::NullCount), Scalar::Int64(2));
        assert_eq!(eval(&ds, "raw", Aggregate::DistinctCount(NullDistinct::Ignored)), Scalar::Int64(0));
        assert_eq!(eval(&ds, "raw", Aggregate::Min), Scalar::Null);

        let loaded = DataSet::new(
            Schema::new(vec![Field::new("raw", DataType::Other)]),
            vec![vec![Value::Int64(1)]],
        );
        assert!(evaluate_aggregate(&loaded, "raw", &Aggregate::NullCount).is_err());
    }

    #[test]
    fn mismatched_cell_is_a_structural_error() {
        let schema = Schema::new(vec![Field::new("x", DataType::Int64)]);
        let ds = DataSet::new(schema, vec![vec![Value::Utf8("oops".to_string())]]);
        assert!(evaluate_aggregate(&ds, "x", &Aggregate::Mean).is_err());
        assert!(evaluate_aggregate(&ds, "missing", &Aggregate::Mean).is_err());
    }
}
