//! Parquet artifact writer.
//!
//! A [`DataSet`] becomes a single Arrow record batch and is written with snappy compression.
//! Only schema columns are written; there is no row-index column.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType as ArrowDataType, Field as ArrowField, Schema as ArrowSchema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use parquet::file::reader::FileReader;
use parquet::file::serialized_reader::SerializedFileReader;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, DataType, Field, Value};

/// Write `dataset` to `path` as snappy-compressed Parquet, replacing any existing file.
///
/// Returns the written path. I/O, Arrow and Parquet failures are returned to the caller.
pub fn write_parquet(dataset: &DataSet, path: impl AsRef<Path>) -> IngestionResult<PathBuf> {
    let path = path.as_ref();
    let batch = to_record_batch(dataset)?;

    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
    writer.write(&batch)?;
    writer.close()?;

    Ok(path.to_path_buf())
}

/// Convert a row-major [`DataSet`] into a columnar Arrow batch. Every column is nullable.
pub fn to_record_batch(dataset: &DataSet) -> IngestionResult<RecordBatch> {
    let fields: Vec<ArrowField> = dataset
        .schema
        .fields
        .iter()
        .map(|f| ArrowField::new(f.name.clone(), arrow_type(f.data_type), true))
        .collect();

    let columns = dataset
        .schema
        .fields
        .iter()
        .enumerate()
        .map(|(idx, field)| column_array(dataset, idx, field))
        .collect::<IngestionResult<Vec<ArrayRef>>>()?;

    Ok(RecordBatch::try_new(Arc::new(ArrowSchema::new(fields)), columns)?)
}

/// Row count recorded in a Parquet file's footer.
pub fn parquet_row_count(path: impl AsRef<Path>) -> IngestionResult<i64> {
    let reader = SerializedFileReader::try_from(path.as_ref())?;
    Ok(reader.metadata().file_metadata().num_rows())
}

fn arrow_type(data_type: DataType) -> ArrowDataType {
    match data_type {
        DataType::Int64 => ArrowDataType::Int64,
        DataType::Float64 => ArrowDataType::Float64,
        DataType::Bool => ArrowDataType::Boolean,
        DataType::Utf8 => ArrowDataType::Utf8,
    }
}

fn column_array(dataset: &DataSet, idx: usize, field: &Field) -> IngestionResult<ArrayRef> {
    let mismatch = |row: usize, value: &Value| IngestionError::SchemaMismatch {
        message: format!(
            "row {} column '{}' holds {value:?}, expected {:?}",
            row + 1,
            field.name,
            field.data_type
        ),
    };
    let cells = || dataset.rows.iter().map(move |row| row.get(idx).unwrap_or(&Value::Null)).enumerate();

    let array: ArrayRef = match field.data_type {
        DataType::Int64 => Arc::new(
            cells()
                .map(|(r, v)| match v {
                    Value::Int64(i) => Ok(Some(*i)),
                    Value::Null => Ok(None),
                    other => Err(mismatch(r, other)),
                })
                .collect::<IngestionResult<Int64Array>>()?,
        ),
        DataType::Float64 => Arc::new(
            cells()
                .map(|(r, v)| match v {
                    Value::Float64(f) => Ok(Some(*f)),
                    Value::Null => Ok(None),
                    other => Err(mismatch(r, other)),
                })
                .collect::<IngestionResult<Float64Array>>()?,
        ),
        DataType::Bool => Arc::new(
            cells()
                .map(|(r, v)| match v {
                    Value::Bool(b) => Ok(Some(*b)),
                    Value::Null => Ok(None),
                    other => Err(mismatch(r, other)),
                })
                .collect::<IngestionResult<BooleanArray>>()?,
        ),
        DataType::Utf8 => Arc::new(
            cells()
                .map(|(r, v)| match v {
                    Value::Utf8(s) => Ok(Some(s.as_str())),
                    Value::Null => Ok(None),
                    other => Err(mismatch(r, other)),
                })
                .collect::<IngestionResult<StringArray>>()?,
        ),
    };
    Ok(array)
}
