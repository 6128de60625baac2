//! CSV ingestion implementation.

use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use tracing::{debug, info};

use crate::config::IngestConfig;
use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, DataType, Field, Schema, Value};

use super::infer::{classify_text, is_null_token, normalize_headers, observe_row, parse_bool, ColumnKind};

/// Read a CSV file into an in-memory [`DataSet`], inferring column types.
///
/// Files larger than `config.chunk_threshold_bytes` go through [`read_csv_chunked`]; smaller
/// files are parsed in one pass. Both strategies produce the same dataset.
pub fn read_csv_from_path(path: impl AsRef<Path>, config: &IngestConfig) -> IngestionResult<DataSet> {
    let path = path.as_ref();
    let size = fs::metadata(path)?.len();
    if size > config.chunk_threshold_bytes {
        info!(
            file = %path.display(),
            size_mb = %format!("{:.1}", size as f64 / 1024.0 / 1024.0),
            chunk_rows = config.chunk_rows,
            "large file detected, reading in chunks"
        );
        read_csv_chunked(path, config.chunk_rows)
    } else {
        let mut rdr = open_reader(path)?;
        read_csv_from_reader(&mut rdr)
    }
}

/// Read CSV data from an existing reader in a single pass.
///
/// Rules:
///
/// - The first record is the header row; blank or repeated names are made unique.
/// - A record shorter than the header is padded with nulls; a longer one is a parse error.
///   Pass a reader built with `flexible(true)` so short records reach this check.
/// - Column types are inferred over all rows (see [`super::infer`]).
pub fn read_csv_from_reader<R: Read>(rdr: &mut csv::Reader<R>) -> IngestionResult<DataSet> {
    let names = header_names(rdr)?;
    let records = rdr.records().collect::<Result<Vec<_>, _>>()?;

    let mut kinds = vec![ColumnKind::Unknown; names.len()];
    for record in &records {
        observe_row(&mut kinds, record.iter().map(classify_text));
    }

    let schema = build_schema(names, &kinds);
    let mut rows = Vec::with_capacity(records.len());
    append_records(&schema, &records, &mut rows)?;
    Ok(DataSet::new(schema, rows))
}

/// Read a CSV file in bounded row chunks.
///
/// The first pass streams the file once to settle column types without keeping rows; the
/// second pass converts `chunk_rows` records at a time and appends them. Peak memory is the
/// typed dataset plus one chunk of raw records.
pub fn read_csv_chunked(path: impl AsRef<Path>, chunk_rows: usize) -> IngestionResult<DataSet> {
    let path = path.as_ref();
    let chunk_rows = chunk_rows.max(1);

    let mut rdr = open_reader(path)?;
    let names = header_names(&mut rdr)?;
    let mut kinds = vec![ColumnKind::Unknown; names.len()];
    let mut record = csv::StringRecord::new();
    while rdr.read_record(&mut record)? {
        observe_row(&mut kinds, record.iter().map(classify_text));
    }
    let schema = build_schema(names, &kinds);

    let mut rdr = open_reader(path)?;
    let mut rows: Vec<Vec<Value>> = Vec::new();
    let mut chunk: Vec<csv::StringRecord> = Vec::with_capacity(chunk_rows);
    let mut chunks = 0usize;
    for result in rdr.records() {
        chunk.push(result?);
        if chunk.len() == chunk_rows {
            append_records(&schema, &chunk, &mut rows)?;
            chunk.clear();
            chunks += 1;
            debug!(chunk = chunks, rows = rows.len(), "appended csv chunk");
        }
    }
    if !chunk.is_empty() {
        append_records(&schema, &chunk, &mut rows)?;
        chunks += 1;
    }
    debug!(chunks, rows = rows.len(), "chunked csv read finished");

    Ok(DataSet::new(schema, rows))
}

fn open_reader(path: &Path) -> IngestionResult<csv::Reader<File>> {
    Ok(csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?)
}

fn header_names<R: Read>(rdr: &mut csv::Reader<R>) -> IngestionResult<Vec<String>> {
    let headers = rdr.headers()?;
    if headers.is_empty() {
        return Err(IngestionError::EmptyData {
            message: "no columns to parse from file".to_string(),
        });
    }
    Ok(normalize_headers(headers.iter()))
}

fn build_schema(names: Vec<String>, kinds: &[ColumnKind]) -> Schema {
    Schema::new(
        names
            .into_iter()
            .zip(kinds)
            .map(|(name, kind)| Field::new(name, kind.data_type()))
            .collect(),
    )
}

fn append_records(
    schema: &Schema,
    records: &[csv::StringRecord],
    rows: &mut Vec<Vec<Value>>,
) -> IngestionResult<()> {
    rows.reserve(records.len());
    for record in records {
        // 1-based for users; +1 again because the header is line 1.
        let user_row = rows.len() + 2;
        if record.len() > schema.fields.len() {
            return Err(IngestionError::ParseError {
                row: user_row,
                column: format!("<field {}>", schema.fields.len() + 1),
                raw: record.iter().skip(schema.fields.len()).collect::<Vec<_>>().join(","),
                message: format!(
                    "expected {} fields, saw {}",
                    schema.fields.len(),
                    record.len()
                ),
            });
        }
        let mut row: Vec<Value> = Vec::with_capacity(schema.fields.len());
        for (idx, field) in schema.fields.iter().enumerate() {
            let raw = record.get(idx).unwrap_or("");
            row.push(parse_typed_value(user_row, &field.name, field.data_type, raw)?);
        }
        rows.push(row);
    }
    Ok(())
}

fn parse_typed_value(
    row: usize,
    column: &str,
    data_type: DataType,
    raw: &str,
) -> IngestionResult<Value> {
    if is_null_token(raw) {
        return Ok(Value::Null);
    }

    let trimmed = raw.trim();
    let parse_err = |message: String| IngestionError::ParseError {
        row,
        column: column.to_owned(),
        raw: raw.to_owned(),
        message,
    };

    match data_type {
        DataType::Utf8 => Ok(Value::Utf8(raw.to_owned())),
        DataType::Int64 => trimmed
            .parse::<i64>()
            .map(Value::Int64)
            .map_err(|e| parse_err(e.to_string())),
        DataType::Float64 => trimmed
            .parse::<f64>()
            .map(Value::Float64)
            .map_err(|e| parse_err(e.to_string())),
        DataType::Bool => parse_bool(trimmed)
            .map(Value::Bool)
            .ok_or_else(|| parse_err("expected bool (true/false)".to_string())),
    }
}
