//! Parquet files through the record API, one [`Value`] per leaf cell.

use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use parquet::basic::{ConvertedType, Type as PhysicalType};
use parquet::data_type::Decimal;
use parquet::file::reader::{ChunkReader, FileReader};
use parquet::file::serialized_reader::SerializedFileReader;
use parquet::record::Field;
use parquet::schema::types::ColumnDescriptor;
use tracing::{debug, warn};

use crate::error::{IngestionError, IngestionResult};
use crate::types::{self, DataSet, DataType, Schema, Value};

use super::ensure_unique_names;

/// Load a Parquet file.
///
/// A declared `schema` must name existing top-level columns; without one the schema comes from
/// [`schema_from_metadata`]. Rows are numbered from 1 in parse errors. A file or declared schema
/// that names a top-level column twice is a schema mismatch.
pub fn ingest_parquet_from_path(path: impl AsRef<Path>, schema: Option<&Schema>) -> IngestionResult<DataSet> {
    let reader = SerializedFileReader::try_from(path.as_ref())?;

    let roots = root_columns(&reader);
    ensure_unique_names("parquet schema", roots.iter().map(String::as_str))?;

    let schema = match schema {
        Some(s) => {
            ensure_unique_names("declared schema", s.field_names())?;
            s.clone()
        }
        None => {
            let derived = schema_from_metadata(&reader);
            debug!(fields = ?derived.fields, "derived parquet schema");
            derived
        }
    };

    if let Some(absent) = schema.fields.iter().find(|f| !roots.contains(&f.name)) {
        return Err(IngestionError::SchemaMismatch {
            message: format!("missing required column '{}'", absent.name),
        });
    }

    let rows = reader
        .into_iter()
        .enumerate()
        .map(|(idx, record)| {
            let record = record?;
            let line = idx + 1;
            schema
                .fields
                .iter()
                .map(|field| {
                    let cell = record
                        .get_column_iter()
                        .find_map(|(name, cell)| (*name == field.name).then_some(cell))
                        .ok_or_else(|| IngestionError::SchemaMismatch {
                            message: format!("row {line} has no value for column '{}'", field.name),
                        })?;
                    convert_parquet_field(line, &field.name, &field.data_type, cell)
                })
                .collect::<IngestionResult<Vec<_>>>()
        })
        .collect::<IngestionResult<Vec<_>>>()?;

    Ok(DataSet::new(schema, rows))
}

/// Derive a [`Schema`] with one field per top-level column.
///
/// `INT32`/`INT64` load as `Int64`, or as `Timestamp` when annotated as a date or
/// millisecond/microsecond timestamp; legacy `INT96` timestamps load as `Timestamp` too.
/// Decimals load as `Float64`, as do `FLOAT`/`DOUBLE`. `BOOLEAN` loads as `Bool` and
/// string-annotated `BYTE_ARRAY` as `Utf8`. Everything else (nested groups, repeated columns,
/// times of day, raw bytes) is kept as [`DataType::Other`]: counted in the summary, never
/// profiled.
pub fn schema_from_metadata<R: ChunkReader + 'static>(reader: &SerializedFileReader<R>) -> Schema {
    let descr = reader.metadata().file_metadata().schema_descr();
    let mut fields = Vec::new();
    let mut previous_root = None;
    for (idx, c) in descr.columns().iter().enumerate() {
        // Leaves of one root are contiguous.
        let root = descr.get_column_root_idx(idx);
        if previous_root == Some(root) {
            continue;
        }
        previous_root = Some(root);

        let name = descr.get_column_root(idx).name().to_string();
        let data_type = if c.path().parts().len() != 1 || c.max_rep_level() > 0 {
            DataType::Other
        } else {
            data_type_of(c)
        };
        if data_type == DataType::Other {
            warn!(
                column = %name,
                physical = ?c.physical_type(),
                converted = ?c.converted_type(),
                "parquet column is counted but not loaded"
            );
        }
        fields.push(types::Field::new(name, data_type));
    }
    Schema::new(fields)
}

fn data_type_of(c: &ColumnDescriptor) -> DataType {
    use ConvertedType as C;
    use PhysicalType as P;

    match (c.physical_type(), c.converted_type()) {
        (_, C::DECIMAL) => DataType::Float64,
        (P::INT32 | P::INT64, C::DATE | C::TIMESTAMP_MILLIS | C::TIMESTAMP_MICROS) => DataType::Timestamp,
        (P::INT32 | P::INT64, C::TIME_MILLIS | C::TIME_MICROS) => DataType::Other,
        (P::INT96, _) => DataType::Timestamp,
        (P::INT32 | P::INT64, _) => DataType::Int64,
        (P::FLOAT | P::DOUBLE, _) => DataType::Float64,
        (P::BOOLEAN, _) => DataType::Bool,
        (P::BYTE_ARRAY, C::UTF8 | C::ENUM | C::JSON) => DataType::Utf8,
        _ => DataType::Other,
    }
}

fn root_columns<R: ChunkReader + 'static>(reader: &SerializedFileReader<R>) -> Vec<String> {
    reader
        .metadata()
        .file_metadata()
        .schema_descr()
        .root_schema()
        .get_fields()
        .iter()
        .map(|f| f.name().to_string())
        .collect()
}

fn convert_parquet_field(row: usize, column: &str, data_type: &DataType, f: &Field) -> IngestionResult<Value> {
    if let Field::Null = f {
        return Ok(Value::Null);
    }

    let parse_error = |message: &str| IngestionError::ParseError {
        row,
        column: column.to_string(),
        raw: f.to_string(),
        message: message.to_string(),
    };

    match data_type {
        DataType::Utf8 => match f {
            Field::Str(s) => Ok(Value::Utf8(s.clone())),
            Field::Bytes(b) => b
                .as_utf8()
                .map(|s| Value::Utf8(s.to_string()))
                .map_err(|_| parse_error("expected utf-8 bytes")),
            _ => Err(parse_error("expected string")),
        },
        DataType::Bool => match f {
            Field::Bool(b) => Ok(Value::Bool(*b)),
            _ => Err(parse_error("expected bool")),
        },
        DataType::Int64 => {
            let v = match f {
                Field::Byte(v) => i64::from(*v),
                Field::Short(v) => i64::from(*v),
                Field::Int(v) => i64::from(*v),
                Field::Long(v) => *v,
                Field::UByte(v) => i64::from(*v),
                Field::UShort(v) => i64::from(*v),
                Field::UInt(v) => i64::from(*v),
                Field::ULong(v) => i64::try_from(*v).map_err(|_| parse_error("u64 out of range for i64"))?,
                _ => return Err(parse_error("expected integer")),
            };
            Ok(Value::Int64(v))
        }
        DataType::Float64 => match f {
            Field::Float(v) => Ok(Value::Float64((*v).into())),
            Field::Double(v) => Ok(Value::Float64(*v)),
            Field::Decimal(d) => decimal_to_f64(d)
                .map(Value::Float64)
                .ok_or_else(|| parse_error("decimal wider than 128 bits")),
            _ => Err(parse_error("expected number")),
        },
        DataType::Timestamp => {
            let ts = match f {
                Field::Date(days) => date_from_days(*days),
                Field::TimestampMillis(ms) => DateTime::from_timestamp_millis(*ms).map(|d| d.naive_utc()),
                Field::TimestampMicros(us) => DateTime::from_timestamp_micros(*us).map(|d| d.naive_utc()),
                _ => return Err(parse_error("expected date or timestamp")),
            };
            ts.map(Value::Timestamp)
                .ok_or_else(|| parse_error("timestamp out of range"))
        }
        DataType::Other => Ok(Value::Null),
    }
}

/// Unscaled big-endian two's complement bytes over `10^scale`.
fn decimal_to_f64(d: &Decimal) -> Option<f64> {
    let bytes = d.data();
    if bytes.is_empty() || bytes.len() > 16 {
        return None;
    }
    let fill = if bytes[0] & 0x80 != 0 { 0xff } else { 0 };
    let mut wide = [fill; 16];
    wide[16 - bytes.len()..].copy_from_slice(bytes);
    Some(i128::from_be_bytes(wide) as f64 / 10f64.powi(d.scale()))
}

fn date_from_days(days_since_epoch: i32) -> Option<NaiveDateTime> {
    const UNIX_EPOCH_FROM_CE: i32 = 719_163;
    NaiveDate::from_num_days_from_ce_opt(days_since_epoch.checked_add(UNIX_EPOCH_FROM_CE)?)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
