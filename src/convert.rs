//! Raw file → Parquet artifacts.
//!
//! [`raw_to_parquet`] never fails: every problem with a file is logged and turned into an
//! empty artifact list, which the run coordinator counts as one failed conversion.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::columnar::write_parquet;
use crate::config::IngestConfig;
use crate::error::{FailureCategory, IngestionError, IngestionResult};
use crate::ingestion::read_tabular;
use crate::naming::artifact_path;

/// A Parquet file written for one dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Location in the bronze directory.
    pub path: PathBuf,
    /// Rows written.
    pub rows: usize,
    /// Columns written.
    pub columns: usize,
}

/// Convert one raw file into zero or more Parquet artifacts under `config.bronze_dir`.
///
/// Sheets or files without rows are skipped. Any read or write error discards the whole
/// file's result (already-written artifacts stay on disk but are not returned).
pub fn raw_to_parquet(path: impl AsRef<Path>, config: &IngestConfig) -> Vec<Artifact> {
    let path = path.as_ref();
    info!(file = %display_name(path), "processing raw file");

    match convert_file(path, config) {
        Ok(artifacts) => {
            if artifacts.is_empty() {
                warn!(file = %display_name(path), "no non-empty datasets produced");
            }
            artifacts
        }
        Err(err) => {
            log_failure(path, &err);
            Vec::new()
        }
    }
}

fn convert_file(path: &Path, config: &IngestConfig) -> IngestionResult<Vec<Artifact>> {
    let datasets = read_tabular(path, config)?;

    let mut artifacts = Vec::with_capacity(datasets.len());
    for (dataset, origin) in datasets {
        info!(
            file = %display_name(path),
            sheet = origin.sheet.as_deref().unwrap_or("-"),
            rows = dataset.row_count(),
            columns = dataset.column_count(),
            "loaded dataset"
        );

        let target = artifact_path(&config.bronze_dir, &origin);
        let written = write_parquet(&dataset, &target)?;
        let size_kb = fs::metadata(&written)?.len() as f64 / 1024.0;

        info!(
            artifact = %display_name(&written),
            size_kb = %format!("{size_kb:.1}"),
            nulls = dataset.null_count(),
            duplicates = dataset.duplicate_row_count(),
            "converted {} -> {}",
            display_name(path),
            display_name(&written)
        );

        artifacts.push(Artifact {
            path: written,
            rows: dataset.row_count(),
            columns: dataset.column_count(),
        });
    }
    Ok(artifacts)
}

fn log_failure(path: &Path, err: &IngestionError) {
    let file = display_name(path);
    match err.category() {
        FailureCategory::EmptyData => error!(file = %file, error = %err, "empty data error reading file"),
        FailureCategory::ParseError => error!(file = %file, error = %err, "parser error reading file"),
        FailureCategory::Unexpected => error!(file = %file, error = %err, "unexpected error processing file"),
    }
}

pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
