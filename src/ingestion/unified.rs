//! Unified reader entrypoint.
//!
//! [`read_tabular`] turns one raw file into zero or more `(DataSet, DatasetOrigin)` pairs:
//!
//! - the format is inferred from the file extension ([`SourceFormat::from_path`])
//! - a delimited file yields one dataset; a workbook yields one dataset per sheet
//! - missing files, zero-byte files and datasets without rows produce nothing (logged, not
//!   returned as errors)

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::{error, warn};

use crate::config::IngestConfig;
use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, DatasetOrigin};

use super::csv;

/// Raw file formats accepted by the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Comma-separated values (`.csv`).
    Delimited,
    /// Spreadsheet workbook (`.xlsx`, `.xls`, `.xlsm`; feature-gated behind `excel`).
    Workbook,
}

impl SourceFormat {
    /// Parse a source format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Delimited),
            "xlsx" | "xls" | "xlsm" => Some(Self::Workbook),
            _ => None,
        }
    }

    /// Format of `path` by extension, if it is one the reader accepts.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|s| s.to_str())
            .and_then(Self::from_extension)
    }
}

/// Read a raw file into its non-empty datasets.
///
/// Returns `Ok(vec![])` for a missing or zero-byte file and drops any dataset with zero rows.
/// Parse failures are returned as errors so the caller can tell empty data, malformed content
/// and unexpected failures apart (see [`IngestionError::category`]).
pub fn read_tabular(
    path: impl AsRef<Path>,
    config: &IngestConfig,
) -> IngestionResult<Vec<(DataSet, DatasetOrigin)>> {
    let path = path.as_ref();

    let metadata = match fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            error!(file = %path.display(), "file not found");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };
    if metadata.len() == 0 {
        warn!(file = %path.display(), "file is empty");
        return Ok(Vec::new());
    }

    let format = infer_format_from_path(path)?;
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| IngestionError::UnsupportedFormat {
            message: format!("path has no file stem ({})", path.display()),
        })?;

    let datasets = match format {
        SourceFormat::Delimited => {
            vec![(csv::read_csv_from_path(path, config)?, DatasetOrigin::delimited(stem))]
        }
        SourceFormat::Workbook => read_workbook_dispatch(path, &stem)?,
    };

    Ok(datasets
        .into_iter()
        .filter(|(ds, origin)| {
            if ds.is_empty() {
                match &origin.sheet {
                    Some(sheet) => warn!(file = %path.display(), sheet = %sheet, "sheet is empty, skipping"),
                    None => warn!(file = %path.display(), "no rows after reading file"),
                }
                false
            } else {
                true
            }
        })
        .collect())
}

fn infer_format_from_path(path: &Path) -> IngestionResult<SourceFormat> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| IngestionError::UnsupportedFormat {
            message: format!("path has no extension ({})", path.display()),
        })?;

    SourceFormat::from_extension(ext).ok_or_else(|| IngestionError::UnsupportedFormat {
        message: format!("extension '{ext}' is not supported ({})", path.display()),
    })
}

#[cfg_attr(not(feature = "excel"), allow(unused_variables))]
fn read_workbook_dispatch(path: &Path, stem: &str) -> IngestionResult<Vec<(DataSet, DatasetOrigin)>> {
    #[cfg(feature = "excel")]
    {
        use super::excel;

        Ok(excel::read_workbook_from_path(path)?
            .into_iter()
            .map(|sheet| (sheet.dataset, DatasetOrigin::sheet(stem, sheet.name)))
            .collect())
    }

    #[cfg(not(feature = "excel"))]
    {
        Err(IngestionError::UnsupportedFormat {
            message: "excel ingestion not enabled (enable cargo feature 'excel')".to_string(),
        })
    }
}
