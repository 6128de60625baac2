//! Artifact naming.
//!
//! A delimited file `games.csv` becomes `games.parquet`; sheet `"2023 Season"` of `stats.xlsx`
//! becomes `stats_2023season.parquet`. The artifact stem doubles as the store table name.
//!
//! Two sheets whose names sanitize to the same string map to the same artifact; the later
//! sheet overwrites the earlier one.

use std::path::{Path, PathBuf};

use crate::types::DatasetOrigin;

/// File extension of written artifacts.
pub const ARTIFACT_EXTENSION: &str = "parquet";

/// Lowercase `name` and drop every character outside `[a-z0-9_-]`.
pub fn sanitize_sheet_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}

/// Base name (no extension) for a dataset's artifact.
pub fn artifact_base_name(origin: &DatasetOrigin) -> String {
    match &origin.sheet {
        Some(sheet) => format!("{}_{}", origin.stem, sanitize_sheet_name(sheet)),
        None => origin.stem.clone(),
    }
}

/// Full artifact path under `bronze_dir`.
pub fn artifact_path(bronze_dir: impl AsRef<Path>, origin: &DatasetOrigin) -> PathBuf {
    bronze_dir
        .as_ref()
        .join(format!("{}.{ARTIFACT_EXTENSION}", artifact_base_name(origin)))
}

/// Store table name for an artifact: its file stem.
pub fn table_name(artifact: impl AsRef<Path>) -> Option<String> {
    artifact
        .as_ref()
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::{artifact_base_name, artifact_path, sanitize_sheet_name, table_name};
    use crate::types::DatasetOrigin;

    #[test]
    fn sanitize_drops_rather_than_replaces() {
        assert_eq!(sanitize_sheet_name("2023 Season"), "2023season");
        assert_eq!(sanitize_sheet_name("Regular-Season_Totals"), "regular-season_totals");
        assert_eq!(sanitize_sheet_name("Goals (All) / 82gp!"), "goalsall82gp");
        assert_eq!(sanitize_sheet_name("Équipe"), "quipe");
        assert_eq!(sanitize_sheet_name("!!!"), "");
    }

    #[test]
    fn sanitize_is_deterministic() {
        let a = sanitize_sheet_name("Playoffs 2024");
        let b = sanitize_sheet_name("Playoffs 2024");
        assert_eq!(a, b);
    }

    #[test]
    fn base_names() {
        assert_eq!(artifact_base_name(&DatasetOrigin::delimited("games")), "games");
        assert_eq!(
            artifact_base_name(&DatasetOrigin::sheet("stats", "2023 Season")),
            "stats_2023season"
        );
    }

    #[test]
    fn collisions_are_not_resolved() {
        let a = artifact_base_name(&DatasetOrigin::sheet("stats", "Season 1"));
        let b = artifact_base_name(&DatasetOrigin::sheet("stats", "season-1"));
        assert_ne!(a, b);
        let c = artifact_base_name(&DatasetOrigin::sheet("stats", "SEASON1"));
        assert_eq!(a, c);
    }

    #[test]
    fn paths_and_table_names() {
        let path = artifact_path("data/bronze", &DatasetOrigin::sheet("stats", "2023 Season"));
        assert_eq!(path, PathBuf::from("data/bronze/stats_2023season.parquet"));
        assert_eq!(table_name(&path).as_deref(), Some("stats_2023season"));
        assert_eq!(table_name(Path::new("games.parquet")).as_deref(), Some("games"));
    }
}
