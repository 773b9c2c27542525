//! [`TabularSource`] over a Polars [`DataFrame`] (feature `polars`).
//!
//! A batch becomes a single lazy `select`: one expression per (aggregate, column) pair, aliased
//! `"{aggregate_index}:{column_index}"`, so the output frame is one row whose columns already sit in
//! aggregate-major order.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::{
    AnyValue, DataFrame, DataType as PolarsType, Expr, IntoLazy, QuantileMethod, TimeUnit, as_struct, col, lit,
};

use crate::error::{ProfileError, ProfileResult};

use super::{Aggregate, ColumnInfo, NullDistinct, QuantileInterpolation, Scalar, Selection, SemanticType, TabularSource};

/// Semantic routing type for a Polars column type.
pub fn semantic_type_of(dtype: &PolarsType) -> SemanticType {
    match dtype {
        d if d.is_integer() => SemanticType::Integer,
        d if d.is_float() => SemanticType::Float,
        PolarsType::Boolean => SemanticType::Boolean,
        PolarsType::String => SemanticType::Text,
        PolarsType::Datetime(_, _) | PolarsType::Date => SemanticType::Temporal,
        _ => SemanticType::Other,
    }
}

impl TabularSource for DataFrame {
    fn columns(&self) -> Vec<ColumnInfo> {
        self.schema()
            .iter()
            .map(|(name, dtype)| ColumnInfo::new(name.as_str(), semantic_type_of(dtype), dtype.to_string()))
            .collect()
    }

    fn evaluate_batch(&self, selection: &Selection, aggregates: &[Aggregate]) -> ProfileResult<Vec<Scalar>> {
        let mut aliases = Vec::with_capacity(aggregates.len() * selection.len());
        let mut exprs = Vec::with_capacity(aggregates.len() * selection.len());
        for (i, aggregate) in aggregates.iter().enumerate() {
            for (j, name) in selection.names().enumerate() {
                let alias = format!("{i}:{j}");
                exprs.push(aggregate_expr(aggregate, name).alias(alias.as_str()));
                aliases.push((alias, aggregate));
            }
        }

        let out = self.clone().lazy().select(exprs).collect()?;

        let mut row = Vec::with_capacity(aliases.len());
        for (alias, aggregate) in &aliases {
            let value = out.column(alias.as_str())?.get(0)?;
            row.push(normalise(aggregate, to_scalar(value)));
        }
        Ok(row)
    }

    fn row_count(&self) -> usize {
        self.height()
    }

    fn column_count(&self) -> usize {
        self.width()
    }

    fn duplicate_row_count(&self) -> ProfileResult<usize> {
        let rows = self.height();
        if self.width() == 0 {
            // Zero-width rows are all equal.
            return Ok(if rows > 1 { rows } else { 0 });
        }
        if rows == 0 {
            return Ok(0);
        }
        let fields: Vec<Expr> = self.schema().iter().map(|(name, _)| col(name.as_str())).collect();
        let out = self
            .clone()
            .lazy()
            .select([as_struct(fields).is_duplicated().sum().alias("duplicates")])
            .collect()?;
        duplicate_total(out.column("duplicates")?.get(0)?)
    }
}

fn duplicate_total(value: AnyValue<'_>) -> ProfileResult<usize> {
    value.extract::<usize>().ok_or_else(|| ProfileError::UnexpectedScalar {
        aggregate: "duplicate rows".to_string(),
        expected: "non-negative count",
        found: format!("{value:?}"),
    })
}

fn aggregate_expr(aggregate: &Aggregate, name: &str) -> Expr {
    let c = col(name);
    let as_float = || col(name).cast(PolarsType::Float64);
    match aggregate {
        Aggregate::NullCount => c.null_count().cast(PolarsType::Int64),
        Aggregate::DistinctCount(NullDistinct::Ignored) => c.drop_nulls().n_unique().cast(PolarsType::Int64),
        Aggregate::DistinctCount(NullDistinct::Counted) => c.n_unique().cast(PolarsType::Int64),
        Aggregate::InfiniteCount => c.is_infinite().sum().cast(PolarsType::Int64),
        Aggregate::Mean => as_float().mean(),
        Aggregate::Min => c.min(),
        Aggregate::Max => c.max(),
        Aggregate::ZeroCount => c.eq(lit(0)).sum().cast(PolarsType::Int64),
        Aggregate::NegativeCount => c.lt(lit(0)).sum().cast(PolarsType::Int64),
        Aggregate::Quantile(p, interpolation) => {
            let method = match interpolation {
                QuantileInterpolation::Nearest => QuantileMethod::Nearest,
                QuantileInterpolation::Linear => QuantileMethod::Linear,
            };
            as_float().quantile(lit(*p), method)
        }
        Aggregate::StdDev => as_float().std(1),
        Aggregate::CoefficientOfVariation => as_float().std(1) / as_float().mean(),
        Aggregate::Kurtosis => as_float().kurtosis(true, true),
        Aggregate::Skewness => as_float().skew(true),
        Aggregate::MinLength => c.str().len_chars().min().cast(PolarsType::Int64),
        Aggregate::MedianLength => c.str().len_chars().cast(PolarsType::Float64).median(),
        Aggregate::MeanLength => c.str().len_chars().cast(PolarsType::Float64).mean(),
        Aggregate::MaxLength => c.str().len_chars().max().cast(PolarsType::Int64),
    }
}

fn to_scalar(value: AnyValue<'_>) -> Scalar {
    match value {
        AnyValue::Null => Scalar::Null,
        AnyValue::Boolean(b) => Scalar::Int64(i64::from(b)),
        AnyValue::Datetime(v, unit, _) => timestamp(v, unit).map_or(Scalar::Null, Scalar::Timestamp),
        AnyValue::Date(days) => date(days).map_or(Scalar::Null, Scalar::Timestamp),
        other if other.dtype().is_integer() => other.extract::<i64>().map_or(Scalar::Null, Scalar::Int64),
        other => other.extract::<f64>().map_or(Scalar::Null, Scalar::Float64),
    }
}

// Moments over constant columns and CV over a zero mean come back as NaN/inf; treat them as
// undefined like the in-memory engine does.
fn normalise(aggregate: &Aggregate, scalar: Scalar) -> Scalar {
    match (aggregate, &scalar) {
        (Aggregate::CoefficientOfVariation | Aggregate::Kurtosis | Aggregate::Skewness, Scalar::Float64(v))
            if !v.is_finite() =>
        {
            Scalar::Null
        }
        _ => scalar,
    }
}

fn timestamp(v: i64, unit: TimeUnit) -> Option<NaiveDateTime> {
    let dt = match unit {
        TimeUnit::Nanoseconds => Some(DateTime::from_timestamp_nanos(v)),
        TimeUnit::Microseconds => DateTime::from_timestamp_micros(v),
        TimeUnit::Milliseconds => DateTime::from_timestamp_millis(v),
    };
    dt.map(|d| d.naive_utc())
}

fn date(days_since_epoch: i32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(1970, 1, 1)?
        .checked_add_signed(chrono::Duration::days(i64::from(days_since_epoch)))?
        .and_hms_opt(0, 0, 0)
}

#[cfg(test)]
mod tests {
    use polars::df;
    use polars::prelude::{AnyValue, DataFrame};

    use super::duplicate_total;
    use crate::error::ProfileError;
    use crate::source::{Aggregate, NullDistinct, Scalar, SemanticType, SemanticTypeSet, TabularSource};

    fn frame() -> DataFrame {
        df!(
            "id" => [Some(1i64), Some(2), Some(2), None],
            "name" => [Some("a"), Some("a"), Some("b"), None],
        )
        .unwrap()
    }

    #[test]
    fn columns_carry_semantic_types() {
        let df = frame();
        // `DataFrame` has inherent `columns`/`select` methods; go through the trait.
        let cols = TabularSource::columns(&df);
        assert_eq!(cols[0].semantic_type, SemanticType::Integer);
        assert_eq!(cols[1].semantic_type, SemanticType::Text);
    }

    #[test]
    fn batch_matches_aggregate_major_layout() {
        let df = frame();
        let selection = TabularSource::select(&df, SemanticTypeSet::NUMERIC.with(SemanticType::Text));
        let row = df
            .evaluate_batch(
                &selection,
                &[Aggregate::NullCount, Aggregate::DistinctCount(NullDistinct::Ignored)],
            )
            .unwrap();
        assert_eq!(
            row,
            vec![Scalar::Int64(1), Scalar::Int64(1), Scalar::Int64(2), Scalar::Int64(2)]
        );
    }

    #[test]
    fn duplicates_are_counted_per_row() {
        let df = df!("a" => [1i64, 1, 3], "b" => [2i64, 2, 4]).unwrap();
        assert_eq!(df.duplicate_row_count().unwrap(), 2);
    }

    #[test]
    fn zero_width_frame_agrees_with_the_in_memory_table() {
        use crate::types::{DataSet, Schema};

        for height in [0usize, 1, 3] {
            let frame = DataFrame::empty_with_height(height);
            let table = DataSet::new(Schema::default(), vec![Vec::new(); height]);
            assert_eq!(
                frame.duplicate_row_count().unwrap(),
                table.duplicate_row_count().unwrap(),
                "height {height}"
            );
        }
    }

    #[test]
    fn non_count_duplicate_total_is_an_error() {
        assert_eq!(duplicate_total(AnyValue::UInt32(4)).unwrap(), 4);
        assert!(matches!(
            duplicate_total(AnyValue::Null),
            Err(ProfileError::UnexpectedScalar { .. })
        ));
    }
}
