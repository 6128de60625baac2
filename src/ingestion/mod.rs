//! Tabular readers.
//!
//! Most callers should use [`read_tabular`] (from [`unified`]) which:
//!
//! - validates the file (exists, non-empty)
//! - detects the format by file extension
//! - returns every non-empty dataset with its [`crate::types::DatasetOrigin`]
//!
//! Format-specific functions are also available under:
//! - [`csv`]
//! - `excel` (feature `excel`)

pub mod csv;
#[cfg(feature = "excel")]
pub mod excel;
mod infer;
pub mod unified;

pub use unified::{read_tabular, SourceFormat};
