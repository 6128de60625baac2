#![cfg(feature = "excel")]

use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, DataType, Field, Schema, Value};

use super::infer::{is_null_token, normalize_headers, observe_row, ColumnKind};

/// One parsed sheet of a workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetData {
    /// Sheet name as stored in the workbook.
    pub name: String,
    /// Sheet contents; may have zero rows.
    pub dataset: DataSet,
}

/// Read every sheet of an Excel document (`.xlsx`, `.xls`, `.xlsm`) in workbook order.
///
/// All sheets are parsed before anything is returned. Empty sheets are returned as empty
/// datasets; dropping them is the caller's decision.
///
/// Errors with [`IngestionError::EmptyData`] if the workbook has no sheets.
pub fn read_workbook_from_path(path: impl AsRef<Path>) -> IngestionResult<Vec<SheetData>> {
    let mut workbook = open_workbook_auto(path)?;

    let sheets: Vec<String> = workbook.sheet_names().to_vec();
    if sheets.is_empty() {
        return Err(IngestionError::EmptyData {
            message: "workbook has no sheets".to_string(),
        });
    }

    let mut out = Vec::with_capacity(sheets.len());
    for sheet in sheets {
        let range = workbook.worksheet_range(&sheet)?;
        let dataset = read_sheet_range(&sheet, &range)?;
        out.push(SheetData {
            name: sheet,
            dataset,
        });
    }
    Ok(out)
}

/// Convert one sheet range into a [`DataSet`].
///
/// Behavior:
/// - The first non-empty row is the header row
/// - Fully blank rows below it are skipped
/// - Column types are inferred from cell values; integral floats count as integers
fn read_sheet_range(sheet: &str, range: &Range<Data>) -> IngestionResult<DataSet> {
    let Some(header_row_idx) = range.rows().position(|row| row.iter().any(|c| !is_empty_cell(c))) else {
        return Ok(DataSet::new(Schema::new(Vec::new()), Vec::new()));
    };

    let names = range
        .rows()
        .nth(header_row_idx)
        .map(|row| normalize_headers(row.iter().map(cell_to_string)))
        .unwrap_or_default();

    let data_rows: Vec<(usize, &[Data])> = range
        .rows()
        .enumerate()
        .skip(header_row_idx + 1)
        .filter(|(_, row)| row.iter().any(|c| !is_empty_cell(c)))
        .collect();

    let mut kinds = vec![ColumnKind::Unknown; names.len()];
    for (_, row) in &data_rows {
        observe_row(&mut kinds, row.iter().map(classify_cell));
    }

    let schema = Schema::new(
        names
            .into_iter()
            .zip(&kinds)
            .map(|(name, kind)| Field::new(name, kind.data_type()))
            .collect(),
    );

    let mut rows: Vec<Vec<Value>> = Vec::with_capacity(data_rows.len());
    for (idx0, row) in data_rows {
        let user_row = sheet_row_number(range, idx0);

        let mut out_row: Vec<Value> = Vec::with_capacity(schema.fields.len());
        for (col_idx, field) in schema.fields.iter().enumerate() {
            let cell = row.get(col_idx).unwrap_or(&Data::Empty);
            let col_label = format!("{sheet}:{name}", name = field.name);
            out_row.push(convert_cell(user_row, &col_label, field.data_type, cell)?);
        }
        rows.push(out_row);
    }

    Ok(DataSet::new(schema, rows))
}

/// 1-based sheet row (as Excel shows it) of the `idx0`-th row of `range`.
fn sheet_row_number(range: &Range<Data>, idx0: usize) -> usize {
    let first = range.start().map_or(0, |(row, _)| row as usize);
    first + idx0 + 1
}

/// Empty cells, error cells and null spellings all read as null.
fn is_empty_cell(c: &Data) -> bool {
    match c {
        Data::Empty | Data::Error(_) => true,
        Data::String(s) => is_null_token(s),
        _ => false,
    }
}

fn as_integral(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn classify_cell(c: &Data) -> ColumnKind {
    if is_empty_cell(c) {
        return ColumnKind::Unknown;
    }
    match c {
        Data::Int(_) => ColumnKind::Int64,
        Data::Float(f) if as_integral(*f).is_some() => ColumnKind::Int64,
        Data::Float(_) => ColumnKind::Float64,
        Data::Bool(_) => ColumnKind::Bool,
        _ => ColumnKind::Utf8,
    }
}

fn cell_to_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => match as_integral(*f) {
            Some(i) => i.to_string(),
            None => f.to_string(),
        },
        Data::Bool(b) => b.to_string(),
        Data::DateTime(f) => f.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("{e:?}"),
        Data::Empty => "".to_string(),
    }
}

fn convert_cell(row: usize, column: &str, data_type: DataType, c: &Data) -> IngestionResult<Value> {
    if is_empty_cell(c) {
        return Ok(Value::Null);
    }

    let unexpected = |expected: &str| IngestionError::ParseError {
        row,
        column: column.to_string(),
        raw: c.to_string(),
        message: format!("expected {expected}"),
    };

    match data_type {
        DataType::Utf8 => Ok(Value::Utf8(cell_to_string(c))),
        DataType::Bool => match c {
            Data::Bool(b) => Ok(Value::Bool(*b)),
            _ => Err(unexpected("bool")),
        },
        DataType::Int64 => match c {
            Data::Int(i) => Ok(Value::Int64(*i)),
            Data::Float(f) => as_integral(*f)
                .map(Value::Int64)
                .ok_or_else(|| unexpected("integer (got non-integer float)")),
            _ => Err(unexpected("integer")),
        },
        DataType::Float64 => match c {
            Data::Float(f) => Ok(Value::Float64(*f)),
            Data::Int(i) => Ok(Value::Float64(*i as f64)),
            _ => Err(unexpected("number")),
        },
    }
}

#[cfg(test)]
mod tests {
    use calamine::{Data, Range};

    use super::sheet_row_number;

    #[test]
    fn row_numbers_follow_where_the_range_starts() {
        let at_origin: Range<Data> = Range::new((0, 0), (3, 1));
        assert_eq!(sheet_row_number(&at_origin, 0), 1);
        assert_eq!(sheet_row_number(&at_origin, 2), 3);

        let offset: Range<Data> = Range::new((4, 1), (9, 2));
        assert_eq!(sheet_row_number(&offset, 0), 5);
        assert_eq!(sheet_row_number(&offset, 3), 8);

        assert_eq!(sheet_row_number(&Range::<Data>::empty(), 0), 1);
    }
}
