//! Column type inference and header naming shared by the CSV and Excel readers.

use std::collections::HashSet;

use crate::types::DataType;

/// Cell spellings read as null.
const NULL_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Returns `true` if a raw text cell should be read as null.
pub(crate) fn is_null_token(raw: &str) -> bool {
    NULL_TOKENS.contains(&raw.trim())
}

/// Running type of a column while rows are observed.
///
/// Forms a small lattice: `Unknown` (nothing but nulls so far) joins to anything, `Int64`
/// widens to `Float64`, and every other disagreement collapses to `Utf8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ColumnKind {
    Unknown,
    Bool,
    Int64,
    Float64,
    Utf8,
}

impl ColumnKind {
    pub(crate) fn join(self, other: ColumnKind) -> ColumnKind {
        use ColumnKind::*;
        match (self, other) {
            (Unknown, k) | (k, Unknown) => k,
            (a, b) if a == b => a,
            (Int64, Float64) | (Float64, Int64) => Float64,
            _ => Utf8,
        }
    }

    /// Final column type; all-null columns become text.
    pub(crate) fn data_type(self) -> DataType {
        match self {
            ColumnKind::Bool => DataType::Bool,
            ColumnKind::Int64 => DataType::Int64,
            ColumnKind::Float64 => DataType::Float64,
            ColumnKind::Unknown | ColumnKind::Utf8 => DataType::Utf8,
        }
    }
}

/// Classify one raw text cell.
pub(crate) fn classify_text(raw: &str) -> ColumnKind {
    if is_null_token(raw) {
        return ColumnKind::Unknown;
    }
    let trimmed = raw.trim();
    if trimmed.parse::<i64>().is_ok() {
        ColumnKind::Int64
    } else if trimmed.parse::<f64>().is_ok() {
        ColumnKind::Float64
    } else if parse_bool(trimmed).is_some() {
        ColumnKind::Bool
    } else {
        ColumnKind::Utf8
    }
}

/// `true`/`false` in any letter case.
pub(crate) fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Fold one row of classifications into the running column kinds.
pub(crate) fn observe_row<I>(kinds: &mut [ColumnKind], row: I)
where
    I: IntoIterator<Item = ColumnKind>,
{
    for (kind, cell) in kinds.iter_mut().zip(row) {
        *kind = kind.join(cell);
    }
}

/// Turn raw header cells into unique, non-empty column names.
///
/// Blank headers become `Unnamed: {index}`; a repeated name gets `.1`, `.2`, ... appended.
pub(crate) fn normalize_headers<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut used: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    for (idx, header) in raw.into_iter().enumerate() {
        let header = header.as_ref();
        let base = if header.trim().is_empty() {
            format!("Unnamed: {idx}")
        } else {
            header.to_string()
        };

        let mut name = base.clone();
        let mut suffix = 1;
        while used.contains(&name) {
            name = format!("{base}.{suffix}");
            suffix += 1;
        }
        used.insert(name.clone());
        out.push(name);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{classify_text, normalize_headers, ColumnKind};
    use crate::types::DataType;

    #[test]
    fn classify_text_cells() {
        assert_eq!(classify_text("42"), ColumnKind::Int64);
        assert_eq!(classify_text(" -7 "), ColumnKind::Int64);
        assert_eq!(classify_text("2.5"), ColumnKind::Float64);
        assert_eq!(classify_text("TRUE"), ColumnKind::Bool);
        assert_eq!(classify_text("Oilers"), ColumnKind::Utf8);
        assert_eq!(classify_text(""), ColumnKind::Unknown);
        assert_eq!(classify_text("NaN"), ColumnKind::Unknown);
        assert_eq!(classify_text("N/A"), ColumnKind::Unknown);
    }

    #[test]
    fn join_widens_numbers_and_collapses_mixes_to_text() {
        assert_eq!(ColumnKind::Int64.join(ColumnKind::Float64), ColumnKind::Float64);
        assert_eq!(ColumnKind::Unknown.join(ColumnKind::Bool), ColumnKind::Bool);
        assert_eq!(ColumnKind::Bool.join(ColumnKind::Int64), ColumnKind::Utf8);
        assert_eq!(ColumnKind::Float64.join(ColumnKind::Utf8), ColumnKind::Utf8);
        assert_eq!(ColumnKind::Unknown.data_type(), DataType::Utf8);
    }

    #[test]
    fn headers_are_named_and_deduplicated() {
        let names = normalize_headers(["team", "", "team", "team", " "]);
        assert_eq!(
            names,
            vec!["team", "Unnamed: 1", "team.1", "team.2", "Unnamed: 4"]
        );
    }
}
