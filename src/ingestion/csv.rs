//! CSV ingestion, with or without a declared schema.

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, DataType, Field, Schema, Value};

use super::ensure_unique_names;

/// Datetime layouts recognised in CSV cells, tried in order. A bare date is midnight.
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Load a headed CSV file.
///
/// A declared `schema` picks columns by header name and parses each cell as its field type;
/// without one every column is kept with an inferred type (see [`infer_schema`]). Empty cells
/// are nulls. A header or declared schema that names a column twice is a schema mismatch.
pub fn ingest_csv_from_path(path: impl AsRef<Path>, schema: Option<&Schema>) -> IngestionResult<DataSet> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
    ingest_csv_from_reader(&mut rdr, schema)
}

/// [`ingest_csv_from_path`] over an already configured reader.
pub fn ingest_csv_from_reader<R: std::io::Read>(
    rdr: &mut csv::Reader<R>,
    schema: Option<&Schema>,
) -> IngestionResult<DataSet> {
    let headers = rdr.headers()?.clone();
    ensure_unique_names("csv header", headers.iter())?;
    let records = rdr.records().collect::<Result<Vec<_>, _>>()?;

    let schema = match schema {
        Some(s) => {
            ensure_unique_names("declared schema", s.field_names())?;
            s.clone()
        }
        None => {
            let inferred = infer_schema(&headers, &records);
            debug!(fields = ?inferred.fields, "inferred csv schema");
            inferred
        }
    };

    // Declared columns may appear in any order in the file.
    let positions = schema
        .fields
        .iter()
        .map(|field| {
            headers
                .iter()
                .position(|h| h == field.name)
                .ok_or_else(|| IngestionError::SchemaMismatch {
                    message: format!(
                        "missing required column '{}'; header has {:?}",
                        field.name,
                        headers.iter().collect::<Vec<_>>()
                    ),
                })
        })
        .collect::<IngestionResult<Vec<_>>>()?;

    let rows = records
        .iter()
        .enumerate()
        .map(|(idx, record)| {
            // Header is line 1.
            let line = idx + 2;
            schema
                .fields
                .iter()
                .zip(&positions)
                .map(|(field, &pos)| {
                    let raw = record.get(pos).unwrap_or("");
                    parse_typed_value(line, &field.name, &field.data_type, raw)
                })
                .collect::<IngestionResult<Vec<_>>>()
        })
        .collect::<IngestionResult<Vec<_>>>()?;

    Ok(DataSet::new(schema, rows))
}

/// Infer one field per header from the cell contents.
///
/// Each column takes the narrowest type every non-empty cell parses as, trying in order
/// `Int64`, `Float64` (integers widen), `Bool`, `Timestamp`, and falling back to `Utf8`.
/// A column with no non-empty cells is `Utf8`.
pub fn infer_schema(headers: &csv::StringRecord, records: &[csv::StringRecord]) -> Schema {
    let fields = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let cells = records
                .iter()
                .map(|r| r.get(idx).unwrap_or("").trim())
                .filter(|c| !c.is_empty());
            Field::new(name, infer_type(cells))
        })
        .collect();
    Schema::new(fields)
}

fn infer_type<'a>(cells: impl Iterator<Item = &'a str> + Clone) -> DataType {
    let mut cells = cells.peekable();
    if cells.peek().is_none() {
        return DataType::Utf8;
    }

    let all = |pred: fn(&str) -> bool| cells.clone().all(pred);
    if all(|c| c.parse::<i64>().is_ok()) {
        DataType::Int64
    } else if all(|c| c.parse::<f64>().is_ok()) {
        DataType::Float64
    } else if all(|c| parse_bool(c).is_ok()) {
        DataType::Bool
    } else if all(|c| parse_timestamp(c).is_some()) {
        DataType::Timestamp
    } else {
        DataType::Utf8
    }
}

fn parse_typed_value(line: usize, column: &str, data_type: &DataType, raw: &str) -> IngestionResult<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Value::Null);
    }

    let parse_error = |message: String| IngestionError::ParseError {
        row: line,
        column: column.to_owned(),
        raw: raw.to_owned(),
        message,
    };

    match data_type {
        DataType::Utf8 => Ok(Value::Utf8(trimmed.to_owned())),
        DataType::Int64 => trimmed
            .parse::<i64>()
            .map(Value::Int64)
            .map_err(|e| parse_error(e.to_string())),
        DataType::Float64 => trimmed
            .parse::<f64>()
            .map(Value::Float64)
            .map_err(|e| parse_error(e.to_string())),
        DataType::Bool => parse_bool(trimmed).map(Value::Bool).map_err(parse_error),
        DataType::Timestamp => parse_timestamp(trimmed)
            .map(Value::Timestamp)
            .ok_or_else(|| parse_error("expected datetime (YYYY-MM-DD[ HH:MM:SS])".to_string())),
        DataType::Other => Ok(Value::Null),
    }
}

fn parse_bool(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" => Ok(true),
        "false" | "f" | "0" | "no" | "n" => Ok(false),
        _ => Err("expected bool (true/false/1/0/yes/no)".to_string()),
    }
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, DATE_FORMAT)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::{ingest_csv_from_reader, parse_timestamp};
    use crate::error::IngestionError;
    use crate::types::{DataType, Field, Schema, Value};

    fn reader(data: &str) -> csv::Reader<&[u8]> {
        csv::ReaderBuilder::new().has_headers(true).from_reader(data.as_bytes())
    }

    #[test]
    fn infers_column_types_from_cells() {
        let data = "id,score,ok,seen,name,empty\n\
                    1,1,true,2024-01-02,ann,\n\
                    2,2.5,false,2024-01-03 10:00:00,bob,\n\
                    ,,,,,\n";
        let ds = ingest_csv_from_reader(&mut reader(data), None).unwrap();

        let types: Vec<DataType> = ds.schema.fields.iter().map(|f| f.data_type.clone()).collect();
        assert_eq!(
            types,
            vec![
                DataType::Int64,
                DataType::Float64,
                DataType::Bool,
                DataType::Timestamp,
                DataType::Utf8,
                DataType::Utf8,
            ]
        );
        assert_eq!(ds.row_count(), 3);
        assert_eq!(ds.rows[0][1], Value::Float64(1.0));
        assert!(ds.rows[2].iter().all(Value::is_null));
    }

    #[test]
    fn mixed_cells_fall_back_to_text() {
        let ds = ingest_csv_from_reader(&mut reader("v\n1\nx\n"), None).unwrap();
        assert_eq!(ds.schema.fields[0].data_type, DataType::Utf8);
        assert_eq!(ds.rows[0][0], Value::Utf8("1".to_string()));
    }

    #[test]
    fn timestamps_accept_three_layouts() {
        assert!(parse_timestamp("2024-05-06").is_some());
        assert!(parse_timestamp("2024-05-06 07:08:09").is_some());
        assert!(parse_timestamp("2024-05-06T07:08:09").is_some());
        assert!(parse_timestamp("06/05/2024").is_none());
    }

    #[test]
    fn repeated_header_is_a_schema_mismatch() {
        let err = ingest_csv_from_reader(&mut reader("a,a\n1,x\n"), None).unwrap_err();
        assert!(matches!(err, IngestionError::SchemaMismatch { .. }));
        assert!(err.to_string().contains("duplicate column 'a' in csv header"));

        let declared = Schema::new(vec![Field::new("a", DataType::Int64)]);
        let err = ingest_csv_from_reader(&mut reader("a,b,a\n1,2,3\n"), Some(&declared)).unwrap_err();
        assert!(err.to_string().contains("duplicate column 'a'"));
    }

    #[test]
    fn declared_schema_naming_a_column_twice_is_rejected() {
        let declared = Schema::new(vec![Field::new("a", DataType::Int64), Field::new("a", DataType::Utf8)]);
        let err = ingest_csv_from_reader(&mut reader("a,b\n1,2\n"), Some(&declared)).unwrap_err();
        assert!(err.to_string().contains("duplicate column 'a' in declared schema"));
    }

    #[test]
    fn declared_other_column_loads_as_nulls() {
        let declared = Schema::new(vec![Field::new("a", DataType::Int64), Field::new("blob", DataType::Other)]);
        let ds = ingest_csv_from_reader(&mut reader("a,blob\n1,\\x00ff\n"), Some(&declared)).unwrap();
        assert_eq!(ds.rows, vec![vec![Value::Int64(1), Value::Null]]);
    }
}
