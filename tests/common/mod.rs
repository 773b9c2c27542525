// Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use parquet::column::writer::ColumnWriter;
use parquet::data_type::{ByteArray, FixedLenByteArray};
use parquet::file::writer::SerializedFileWriter;
use parquet::schema::parser::parse_message_type;

use rust_data_profiling::types::{DataType, Field, Schema};

pub const PEOPLE_CSV: &str = "tests/fixtures/people.csv";

/// The schema of `tests/fixtures/people.csv` and of [`write_people_parquet`].
pub fn people_schema() -> Schema {
    Schema::new(vec![
        Field::new("id", DataType::Int64),
        Field::new("name", DataType::Utf8),
        Field::new("score", DataType::Float64),
        Field::new("active", DataType::Bool),
    ])
}

/// A unique path under the temp dir.
pub fn tmp_path(tag: &str, ext: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("rust-data-profiling-{tag}-{nanos}.{ext}"))
}

/// Values for one leaf column, with optional definition levels for nullable columns.
#[derive(Debug)]
pub enum ColumnData {
    Int64(Vec<i64>, Option<Vec<i16>>),
    Int32(Vec<i32>, Option<Vec<i16>>),
    Double(Vec<f64>),
    Bool(Vec<bool>),
    Text(Vec<&'static str>),
    Fixed(Vec<&'static [u8]>),
}

/// Write a single row group; `columns` must follow the leaf order of `message_type`.
pub fn write_parquet(path: &Path, message_type: &str, columns: Vec<ColumnData>) {
    let schema = Arc::new(parse_message_type(message_type).unwrap());
    let file = File::create(path).unwrap();
    let mut writer = SerializedFileWriter::new(file, schema, Arc::default()).unwrap();

    let mut row_group = writer.next_row_group().unwrap();
    let mut columns = columns.into_iter();
    while let Some(mut column) = row_group.next_column().unwrap() {
        let data = columns.next().expect("fixture has fewer columns than the message type");
        match (column.untyped(), data) {
            (ColumnWriter::Int64ColumnWriter(w), ColumnData::Int64(values, def)) => {
                w.write_batch(&values, def.as_deref(), None).unwrap();
            }
            (ColumnWriter::Int32ColumnWriter(w), ColumnData::Int32(values, def)) => {
                w.write_batch(&values, def.as_deref(), None).unwrap();
            }
            (ColumnWriter::DoubleColumnWriter(w), ColumnData::Double(values)) => {
                w.write_batch(&values, None, None).unwrap();
            }
            (ColumnWriter::BoolColumnWriter(w), ColumnData::Bool(values)) => {
                w.write_batch(&values, None, None).unwrap();
            }
            (ColumnWriter::ByteArrayColumnWriter(w), ColumnData::Text(values)) => {
                let values: Vec<ByteArray> = values.into_iter().map(ByteArray::from).collect();
                w.write_batch(&values, None, None).unwrap();
            }
            (ColumnWriter::FixedLenByteArrayColumnWriter(w), ColumnData::Fixed(values)) => {
                let values: Vec<FixedLenByteArray> = values
                    .into_iter()
                    .map(|v| FixedLenByteArray::from(ByteArray::from(v.to_vec())))
                    .collect();
                w.write_batch(&values, None, None).unwrap();
            }
            (_, data) => panic!("column writer does not accept {data:?}"),
        }
        column.close().unwrap();
    }
    row_group.close().unwrap();
    writer.close().unwrap();
}

/// Parquet twin of `people.csv`.
pub fn write_people_parquet(path: &Path) {
    write_parquet(
        path,
        "message people {
            REQUIRED INT64 id;
            REQUIRED BINARY name (UTF8);
            REQUIRED DOUBLE score;
            REQUIRED BOOLEAN active;
        }",
        vec![
            ColumnData::Int64(vec![1, 2], None),
            ColumnData::Text(vec!["Ada", "Grace"]),
            ColumnData::Double(vec![98.5, 87.25]),
            ColumnData::Bool(vec![true, false]),
        ],
    );
}
