//! Row-major in-memory tables, the form CSV and Parquet files are loaded into before profiling.
//!
//! A [`DataSet`] is never mutated while a report is being built.

use chrono::NaiveDateTime;

/// Physical column type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    Int64,
    Float64,
    Bool,
    Utf8,
    /// Timezone-naive; dates load as midnight.
    Timestamp,
    /// A column kept for counting whose cells are not loaded (decimals stored as raw bytes,
    /// times of day, nested groups, ...). Every cell is [`Value::Null`].
    Other,
}

impl DataType {
    /// Short physical type name, used as the `dtype` of a column profile.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Int64 => "i64",
            Self::Float64 => "f64",
            Self::Bool => "bool",
            Self::Utf8 => "str",
            Self::Timestamp => "datetime",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub data_type: DataType,
}

impl Field {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Column names and types, in column order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    pub fields: Vec<Field>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Position of the column called `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// One cell. Empty CSV cells and Parquet nulls both load as [`Value::Null`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int64(i64),
    Float64(f64),
    Bool(bool),
    Utf8(String),
    Timestamp(NaiveDateTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// A table held in memory; each row lists its cells in schema order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataSet {
    pub schema: Schema,
    pub rows: Vec<Vec<Value>>,
}

impl DataSet {
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        Self { schema, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.schema.fields.len()
    }

    /// Iterate the values of the column at `idx`, top to bottom.
    ///
    /// Rows shorter than the schema yield [`Value::Null`] for the missing cell.
    pub fn column_values(&self, idx: usize) -> impl Iterator<Item = &Value> + '_ {
        static NULL: Value = Value::Null;
        self.rows.iter().map(move |row| row.get(idx).unwrap_or(&NULL))
    }
}

#[cfg(test)]
mod tests {
    use super::{DataSet, DataType, Field, Schema, Value};

    fn sample_dataset() -> DataSet {
        let schema = Schema::new(vec![
            Field::new("id", DataType::Int64),
            Field::new("active", DataType::Bool),
            Field::new("name", DataType::Utf8),
        ]);

        let rows = vec![
            vec![Value::Int64(1), Value::Bool(true), Value::Utf8("a".to_string())],
            vec![Value::Int64(2), Value::Bool(false), Value::Utf8("b".to_string())],
            vec![Value::Int64(3), Value::Bool(true)],
        ];

        DataSet::new(schema, rows)
    }

    #[test]
    fn columns_are_found_by_name() {
        let ds = sample_dataset();
        assert_eq!(ds.schema.index_of("id"), Some(0));
        assert_eq!(ds.schema.index_of("active"), Some(1));
        assert_eq!(ds.schema.index_of("name"), Some(2));
        assert_eq!(ds.schema.index_of("missing"), None);
    }

    #[test]
    fn shape_reports_rows_and_columns() {
        let ds = sample_dataset();
        assert_eq!(ds.row_count(), 3);
        assert_eq!(ds.column_count(), 3);
        assert_eq!(DataSet::default().column_count(), 0);
    }

    #[test]
    fn column_values_pads_short_rows_with_null() {
        let ds = sample_dataset();
        let names: Vec<&Value> = ds.column_values(2).collect();
        assert_eq!(
            names,
            vec![
                &Value::Utf8("a".to_string()),
                &Value::Utf8("b".to_string()),
                &Value::Null
            ]
        );
    }
}
