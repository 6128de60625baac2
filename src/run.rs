//! Run coordinator: discover → convert → load → summarize.
//!
//! Files are processed one at a time in file-name order over a single store connection.
//! A file that converts to nothing counts as one failure; each artifact that fails to load
//! counts as one failure. Neither stops the run. Only failing to set up the run (bronze
//! directory, directory listing, opening the store) is returned as an error.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};
use walkdir::WalkDir;

use crate::config::IngestConfig;
use crate::convert::{display_name, raw_to_parquet, Artifact};
use crate::error::IngestionResult;
use crate::ingestion::SourceFormat;
use crate::store::Store;

/// Counts for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutcome {
    /// Raw files considered, in processing order.
    pub files: Vec<PathBuf>,
    /// Artifacts loaded into the store.
    pub loaded: usize,
    /// Artifacts whose load raised an error.
    pub failed_loads: usize,
    /// Files that produced no artifacts.
    pub failed_conversions: usize,
    /// Tables in the namespace after the run (empty if listing failed or nothing ran).
    pub tables: Vec<String>,
}

impl RunOutcome {
    /// All failures: conversions plus loads.
    pub fn failed(&self) -> usize {
        self.failed_loads + self.failed_conversions
    }

    /// Load attempts, equal to the number of artifacts produced.
    pub fn attempted_loads(&self) -> usize {
        self.loaded + self.failed_loads
    }
}

/// Raw files in `raw_dir` (not recursive) with a supported extension, sorted by file name.
pub fn discover_raw_files(raw_dir: impl AsRef<Path>) -> IngestionResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(raw_dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_file() && SourceFormat::from_path(entry.path()).is_some() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Run a full ingestion over `config`.
///
/// Returns an empty outcome without touching the store when the raw directory is missing or
/// holds no supported files.
pub fn run(config: &IngestConfig) -> IngestionResult<RunOutcome> {
    run_inner(config).inspect_err(|e| error!(error = %e, "fatal error during ingestion run"))
}

fn run_inner(config: &IngestConfig) -> IngestionResult<RunOutcome> {
    info!("starting data ingestion");
    info!(raw_dir = %config.raw_dir.display(), "raw data directory");
    info!(bronze_dir = %config.bronze_dir.display(), "bronze data directory");
    info!(store = %config.store_path.display(), "store path");

    fs::create_dir_all(&config.bronze_dir)?;

    if !config.raw_dir.is_dir() {
        error!(raw_dir = %config.raw_dir.display(), "raw data directory does not exist");
        return Ok(RunOutcome::default());
    }

    let files = discover_raw_files(&config.raw_dir)?;
    if files.is_empty() {
        warn!(raw_dir = %config.raw_dir.display(), "no raw files found");
        return Ok(RunOutcome::default());
    }
    info!(count = files.len(), "found raw files to process");

    let store = Store::open(&config.store_path, config.namespace.as_str())?;

    let mut outcome = RunOutcome::default();
    let total = files.len();
    for (idx, file) in files.iter().enumerate() {
        info!("processing file {}/{}: {}", idx + 1, total, display_name(file));

        let artifacts = raw_to_parquet(file, config);
        if artifacts.is_empty() {
            error!(file = %display_name(file), "failed to convert file to parquet");
            outcome.failed_conversions += 1;
            continue;
        }

        load_artifacts(&artifacts, |path| store.load_artifact(path), &mut outcome);
    }
    outcome.files = files;

    log_summary(&outcome);

    match store.list_tables() {
        Ok(tables) => {
            info!(namespace = store.namespace(), "tables in namespace: {:?}", tables);
            outcome.tables = tables;
        }
        Err(e) => warn!(error = %e, "could not list tables"),
    }

    if let Err(e) = store.close() {
        warn!(error = %e, "error closing store connection");
    }
    info!("ingestion complete");

    Ok(outcome)
}

/// Load each artifact with `load`, tallying successes and failures into `outcome`.
fn load_artifacts<F>(artifacts: &[Artifact], mut load: F, outcome: &mut RunOutcome)
where
    F: FnMut(&Path) -> IngestionResult<u64>,
{
    for artifact in artifacts {
        match load(&artifact.path) {
            Ok(_) => outcome.loaded += 1,
            Err(e) => {
                error!(artifact = %artifact.path.display(), error = %e, "failed to load artifact");
                outcome.failed_loads += 1;
            }
        }
    }
}

fn log_summary(outcome: &RunOutcome) {
    info!("ingestion summary");
    info!(loaded = outcome.loaded, "successfully processed datasets");
    if outcome.failed() > 0 {
        warn!(
            failed = outcome.failed(),
            failed_conversions = outcome.failed_conversions,
            failed_loads = outcome.failed_loads,
            "failed to process"
        );
    }
    info!(total = outcome.files.len(), "total files");
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{load_artifacts, RunOutcome};
    use crate::convert::Artifact;
    use crate::error::IngestionError;

    fn artifact(name: &str) -> Artifact {
        Artifact {
            path: PathBuf::from(format!("data/bronze/{name}.parquet")),
            rows: 1,
            columns: 1,
        }
    }

    #[test]
    fn failed_loads_are_counted_and_do_not_stop_the_rest() {
        let artifacts = [artifact("stats_a"), artifact("stats_b"), artifact("stats_c")];
        let mut outcome = RunOutcome::default();
        let mut seen = Vec::new();

        load_artifacts(
            &artifacts,
            |path| {
                seen.push(path.to_path_buf());
                if path.ends_with("stats_b.parquet") {
                    Err(IngestionError::SchemaMismatch {
                        message: "table rejected".to_string(),
                    })
                } else {
                    Ok(1)
                }
            },
            &mut outcome,
        );

        assert_eq!(seen.len(), 3);
        assert_eq!(outcome.loaded, 2);
        assert_eq!(outcome.failed_loads, 1);
        assert_eq!(outcome.attempted_loads(), 3);
        assert_eq!(outcome.failed(), 1);
    }
}
