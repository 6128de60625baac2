use std::error::Error as StdError;

use thiserror::Error;

/// Convenience result type for ingestion operations.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Error type returned by ingestion functions.
///
/// A single error enum shared by the reader, the Parquet writer and the DuckDB store.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "excel")]
    /// Excel ingestion error (feature-gated behind `excel`).
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// CSV ingestion error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Arrow error while assembling a record batch.
    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet write/read error.
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// DuckDB error (schema creation, table replacement, verification).
    #[error("store error: {0}")]
    Store(#[from] duckdb::Error),

    /// The input has no columns or no parseable content at all.
    #[error("empty data: {message}")]
    EmptyData { message: String },

    /// The file extension does not map to a supported format.
    #[error("unsupported format: {message}")]
    UnsupportedFormat { message: String },

    /// A dataset's values do not line up with its schema.
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// A value could not be parsed into its column's inferred [`crate::types::DataType`].
    #[error("failed to parse value at row {row} column '{column}': {message} (raw='{raw}')")]
    ParseError {
        row: usize,
        column: String,
        raw: String,
        message: String,
    },
}

/// The three failure kinds a conversion distinguishes when it logs why a file produced nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    /// No columns or rows to work with.
    EmptyData,
    /// The parser rejected the content (ragged rows, bad encoding, corrupt workbook).
    ParseError,
    /// Anything else: I/O, Parquet, Arrow, store.
    Unexpected,
}

impl IngestionError {
    /// Classify this error for logging.
    pub fn category(&self) -> FailureCategory {
        match self {
            IngestionError::EmptyData { .. } => FailureCategory::EmptyData,
            IngestionError::ParseError { .. } => FailureCategory::ParseError,
            IngestionError::Csv(err) => match err.kind() {
                ::csv::ErrorKind::Io(_) => FailureCategory::Unexpected,
                _ => FailureCategory::ParseError,
            },
            #[cfg(feature = "excel")]
            IngestionError::Excel(err) => {
                if error_chain_contains_io(err) {
                    FailureCategory::Unexpected
                } else {
                    FailureCategory::ParseError
                }
            }
            IngestionError::Io(_)
            | IngestionError::Arrow(_)
            | IngestionError::Parquet(_)
            | IngestionError::Store(_)
            | IngestionError::UnsupportedFormat { .. }
            | IngestionError::SchemaMismatch { .. } => FailureCategory::Unexpected,
        }
    }
}

#[cfg_attr(not(feature = "excel"), allow(dead_code))]
fn error_chain_contains_io(e: &(dyn StdError + 'static)) -> bool {
    let mut cur: Option<&(dyn StdError + 'static)> = Some(e);
    while let Some(err) = cur {
        if err.is::<std::io::Error>() {
            return true;
        }
        cur = err.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::{FailureCategory, IngestionError};

    #[test]
    fn ragged_csv_is_a_parse_error() {
        let input = "a,b\n1,2\n3,4,5\n";
        let mut rdr = csv::ReaderBuilder::new().from_reader(input.as_bytes());
        let err = rdr
            .records()
            .find_map(Result::err)
            .map(IngestionError::from)
            .unwrap();
        assert_eq!(err.category(), FailureCategory::ParseError);
    }

    #[test]
    fn io_and_empty_data_categories() {
        let io = IngestionError::from(std::io::Error::other("disk gone"));
        assert_eq!(io.category(), FailureCategory::Unexpected);

        let empty = IngestionError::EmptyData {
            message: "no columns".to_string(),
        };
        assert_eq!(empty.category(), FailureCategory::EmptyData);
    }
}
