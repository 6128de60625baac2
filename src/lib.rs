//! `nhl-ingest` loads raw tabular files into the bronze tier of a DuckDB warehouse.
//!
//! A run reads every `.csv`, `.xlsx`, `.xls` and `.xlsm` file under `data/raw`, writes each
//! non-empty dataset as a snappy Parquet artifact under `data/bronze`, and replaces one table
//! per artifact in the `bronze` schema of `nhl.duckdb`.
//!
//! ## Fan-out
//!
//! - A CSV file yields one dataset → `data/bronze/<stem>.parquet` → `bronze.<stem>`.
//! - A workbook yields one dataset per non-empty sheet →
//!   `data/bronze/<stem>_<sanitized sheet>.parquet` → `bronze.<stem>_<sanitized sheet>`.
//! - Empty files and empty sheets produce nothing.
//!
//! ## Failure accounting
//!
//! [`convert::raw_to_parquet`] swallows every per-file error and returns an empty list;
//! [`store::Store::load_artifact`] returns its errors. [`run::run`] counts a file that
//! converted to nothing as one failure and each failed load as one failure, and keeps going.
//!
//! ## Example
//!
//! ```no_run
//! use nhl_ingest::{run, IngestConfig};
//!
//! # fn main() -> Result<(), nhl_ingest::IngestionError> {
//! let outcome = run(&IngestConfig::from_project_root("/srv/nhl"))?;
//! println!("loaded={} failed={}", outcome.loaded, outcome.failed());
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: CSV and workbook readers with type inference
//! - [`naming`]: artifact and table names
//! - [`columnar`]: Parquet writer
//! - [`convert`]: raw file → artifacts
//! - [`store`]: DuckDB loader
//! - [`run`]: run coordinator
//! - [`types`], [`config`], [`error`]: data model, configuration and errors

pub mod columnar;
pub mod config;
pub mod convert;
pub mod error;
pub mod ingestion;
pub mod naming;
pub mod run;
pub mod store;
pub mod types;

pub use config::IngestConfig;
pub use error::{FailureCategory, IngestionError, IngestionResult};
pub use run::{run, RunOutcome};
