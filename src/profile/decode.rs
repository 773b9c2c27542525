//! Unpacking of a flattened, aggregate-major result row.
//!
//! A batch of `K` aggregates over `N` columns comes back as `K * N` scalars. Column `j` owns
//! positions `j, N + j, 2N + j, ...`. [`RowDecoder`] is the only place that does this index
//! arithmetic; it refuses rows whose length does not match the `(K, N)` used to build them.

use crate::error::{ProfileError, ProfileResult};
use crate::source::Scalar;

/// Strided view over one flattened result row.
#[derive(Debug, Clone, Copy)]
pub struct RowDecoder<'a> {
    aggregates: usize,
    columns: usize,
    row: &'a [Scalar],
}

impl<'a> RowDecoder<'a> {
    /// Wrap `row`, checking `row.len() == aggregates * columns`.
    pub fn new(aggregates: usize, columns: usize, row: &'a [Scalar]) -> ProfileResult<Self> {
        let expected = aggregates * columns;
        if row.len() != expected {
            return Err(ProfileError::RowShape {
                aggregates,
                columns,
                expected,
                actual: row.len(),
            });
        }
        Ok(Self {
            aggregates,
            columns,
            row,
        })
    }

    pub fn aggregates(&self) -> usize {
        self.aggregates
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// The `K` values of column `j`, in aggregate order.
    ///
    /// # Panics
    ///
    /// Panics if `j >= self.columns()`.
    pub fn column(&self, j: usize) -> Vec<Scalar> {
        assert!(j < self.columns, "column {j} out of range for {} columns", self.columns);
        self.row.iter().skip(j).step_by(self.columns).cloned().collect()
    }

    /// All `N` per-column slices, in selection order.
    pub fn slices(&self) -> impl Iterator<Item = Vec<Scalar>> + '_ {
        (0..self.columns).map(move |j| self.column(j))
    }
}

#[cfg(test)]
mod tests {
    use super::RowDecoder;
    use crate::error::ProfileError;
    use crate::source::Scalar;

    fn ints(values: &[i64]) -> Vec<Scalar> {
        values.iter().map(|v| Scalar::Int64(*v)).collect()
    }

    #[test]
    fn splits_aggregate_major_row_by_stride() {
        // 3 aggregates (a, b, c) over 2 columns (x, y): ax ay bx by cx cy
        let row = ints(&[10, 20, 11, 21, 12, 22]);
        let decoder = RowDecoder::new(3, 2, &row).unwrap();

        let slices: Vec<Vec<Scalar>> = decoder.slices().collect();
        assert_eq!(slices, vec![ints(&[10, 11, 12]), ints(&[20, 21, 22])]);
    }

    #[test]
    fn single_column_is_the_row_itself() {
        let row = ints(&[1, 2, 3, 4]);
        let decoder = RowDecoder::new(4, 1, &row).unwrap();
        assert_eq!(decoder.column(0), row);
    }

    #[test]
    fn single_aggregate_gives_one_value_per_column() {
        let row = ints(&[5, 6, 7]);
        let decoder = RowDecoder::new(1, 3, &row).unwrap();
        assert_eq!(decoder.slices().collect::<Vec<_>>(), vec![ints(&[5]), ints(&[6]), ints(&[7])]);
    }

    #[test]
    fn zero_columns_yield_no_slices() {
        let decoder = RowDecoder::new(8, 0, &[]).unwrap();
        assert_eq!(decoder.slices().count(), 0);
    }

    #[test]
    fn rejects_row_of_wrong_length() {
        let row = ints(&[1, 2, 3, 4, 5]);
        let err = RowDecoder::new(3, 2, &row).unwrap_err();
        assert!(matches!(
            err,
            ProfileError::RowShape {
                expected: 6,
                actual: 5,
                ..
            }
        ));
        assert!(err.to_string().contains("3 aggregates x 2 columns"));
    }

    #[test]
    fn transposed_shape_is_rejected_only_by_content_not_length() {
        // (K, N) = (2, 3) and (3, 2) share a length; decoding with the wrong pair misaligns,
        // which is why profilers always pass the pair they built the batch with.
        let row = ints(&[10, 20, 30, 11, 21, 31]);
        let right = RowDecoder::new(2, 3, &row).unwrap();
        let wrong = RowDecoder::new(3, 2, &row).unwrap();
        assert_eq!(right.column(0), ints(&[10, 11]));
        assert_ne!(wrong.column(0), right.column(0));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn column_index_is_bounds_checked() {
        let row = ints(&[1, 2]);
        let decoder = RowDecoder::new(1, 2, &row).unwrap();
        let _ = decoder.column(2);
    }
}
