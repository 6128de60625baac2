//! Core data model types for ingestion.
//!
//! Raw files are read into an in-memory [`DataSet`] whose [`Schema`] is inferred from the data
//! (a list of typed [`Field`]s). Each dataset travels with a [`DatasetOrigin`] that decides the
//! name of the Parquet artifact it becomes.

use std::collections::HashSet;

/// Logical data type for a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point number.
    Float64,
    /// Boolean.
    Bool,
    /// UTF-8 string.
    Utf8,
}

/// A single named, typed field in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field/column name.
    pub name: String,
    /// Field data type.
    pub data_type: DataType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// An ordered list of fields describing the shape of a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}

/// A single typed value in a [`DataSet`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
}

/// In-memory tabular dataset.
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as the [`Schema`] fields. There is no
/// row-index column: row position is implicit, so nothing synthetic reaches the artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    /// Schema describing row shape.
    pub schema: Schema,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
}

impl DataSet {
    /// Create a dataset from schema and rows.
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        Self { schema, rows }
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns in the dataset.
    pub fn column_count(&self) -> usize {
        self.schema.fields.len()
    }

    /// Returns `true` when the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Total number of null cells across every column.
    pub fn null_count(&self) -> usize {
        self.rows
            .iter()
            .flatten()
            .filter(|v| matches!(v, Value::Null))
            .count()
    }

    /// Number of rows that exactly repeat an earlier row.
    ///
    /// The first occurrence is not counted, so three identical rows report `2`.
    pub fn duplicate_row_count(&self) -> usize {
        let mut seen: HashSet<Vec<CellKey<'_>>> = HashSet::with_capacity(self.rows.len());
        self.rows
            .iter()
            .filter(|row| !seen.insert(row.iter().map(CellKey::from).collect()))
            .count()
    }
}

/// Hashable view of a [`Value`]; floats compare by bit pattern with `-0.0 == 0.0`.
#[derive(Debug, PartialEq, Eq, Hash)]
enum CellKey<'a> {
    Null,
    Int64(i64),
    Float64(u64),
    Bool(bool),
    Utf8(&'a str),
}

impl<'a> From<&'a Value> for CellKey<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::Null => CellKey::Null,
            Value::Int64(v) => CellKey::Int64(*v),
            Value::Float64(v) if *v == 0.0 => CellKey::Float64(0),
            Value::Float64(v) => CellKey::Float64(v.to_bits()),
            Value::Bool(v) => CellKey::Bool(*v),
            Value::Utf8(v) => CellKey::Utf8(v),
        }
    }
}

/// Where a dataset came from: the source file stem and, for workbook sheets, the sheet name.
///
/// Used only to name the output artifact (see [`crate::naming`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetOrigin {
    /// File name of the raw input without its extension.
    pub stem: String,
    /// Sheet name for workbook datasets; `None` for delimited files.
    pub sheet: Option<String>,
}

impl DatasetOrigin {
    /// Origin of a delimited file's single dataset.
    pub fn delimited(stem: impl Into<String>) -> Self {
        Self {
            stem: stem.into(),
            sheet: None,
        }
    }

    /// Origin of one workbook sheet.
    pub fn sheet(stem: impl Into<String>, sheet: impl Into<String>) -> Self {
        Self {
            stem: stem.into(),
            sheet: Some(sheet.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DataSet, DataType, Field, Schema, Value};

    fn ds(rows: Vec<Vec<Value>>) -> DataSet {
        let schema = Schema::new(vec![
            Field::new("id", DataType::Int64),
            Field::new("score", DataType::Float64),
            Field::new("name", DataType::Utf8),
        ]);
        DataSet::new(schema, rows)
    }

    #[test]
    fn null_count_spans_all_cells() {
        let data = ds(vec![
            vec![Value::Int64(1), Value::Null, Value::Utf8("a".into())],
            vec![Value::Null, Value::Null, Value::Utf8("b".into())],
        ]);
        assert_eq!(data.null_count(), 3);
    }

    #[test]
    fn duplicate_rows_count_repeats_only() {
        let row = vec![Value::Int64(1), Value::Float64(2.5), Value::Utf8("a".into())];
        let data = ds(vec![
            row.clone(),
            vec![Value::Int64(2), Value::Float64(2.5), Value::Utf8("a".into())],
            row.clone(),
            row,
        ]);
        assert_eq!(data.duplicate_row_count(), 2);
    }

    #[test]
    fn null_rows_and_signed_zero_are_duplicates() {
        let data = ds(vec![
            vec![Value::Null, Value::Float64(0.0), Value::Null],
            vec![Value::Null, Value::Float64(-0.0), Value::Null],
        ]);
        assert_eq!(data.duplicate_row_count(), 1);
        assert_eq!(data.column_count(), 3);
    }
}
