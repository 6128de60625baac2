//! Run configuration.
//!
//! Every component takes an [`IngestConfig`] by reference instead of reading process-wide
//! constants, so tests can point a run at a temporary project root.

use std::path::{Path, PathBuf};

/// Files strictly larger than this are read in row chunks.
pub const DEFAULT_CHUNK_THRESHOLD_BYTES: u64 = 100 * 1024 * 1024;

/// Rows per chunk for the chunked delimited reader.
pub const DEFAULT_CHUNK_ROWS: usize = 10_000;

/// Schema that every artifact is loaded into.
pub const DEFAULT_NAMESPACE: &str = "bronze";

/// DuckDB database file name, relative to the project root.
pub const DEFAULT_STORE_FILE: &str = "nhl.duckdb";

/// Options controlling a run.
///
/// Use [`IngestConfig::from_project_root`] (or [`Default`], rooted at `.`) for the standard
/// `data/raw` → `data/bronze` → `nhl.duckdb` layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestConfig {
    /// Directory scanned for `.csv`, `.xlsx`, `.xls` and `.xlsm` inputs.
    pub raw_dir: PathBuf,
    /// Directory Parquet artifacts are written to (created if missing).
    pub bronze_dir: PathBuf,
    /// DuckDB database file.
    pub store_path: PathBuf,
    /// Schema name inside the store.
    pub namespace: String,
    /// Delimited files above this size are read in chunks.
    pub chunk_threshold_bytes: u64,
    /// Rows per chunk when chunking.
    pub chunk_rows: usize,
}

impl IngestConfig {
    /// Standard layout under `root`.
    pub fn from_project_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            raw_dir: root.join("data").join("raw"),
            bronze_dir: root.join("data").join("bronze"),
            store_path: root.join(DEFAULT_STORE_FILE),
            namespace: DEFAULT_NAMESPACE.to_string(),
            chunk_threshold_bytes: DEFAULT_CHUNK_THRESHOLD_BYTES,
            chunk_rows: DEFAULT_CHUNK_ROWS,
        }
    }

    /// Override the large-file strategy. A zero `chunk_rows` is treated as `1`.
    pub fn with_chunking(mut self, threshold_bytes: u64, chunk_rows: usize) -> Self {
        self.chunk_threshold_bytes = threshold_bytes;
        self.chunk_rows = chunk_rows.max(1);
        self
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self::from_project_root(".")
    }
}
