//! DuckDB store loader.
//!
//! One [`Store`] wraps one connection for a whole run. Each artifact becomes one table in the
//! store's namespace, fully replaced on every load.

use std::fs;
use std::path::Path;

use duckdb::{params, Connection};
use tracing::{error, info};

use crate::error::{IngestionError, IngestionResult};
use crate::naming::table_name;

/// A DuckDB connection plus the schema artifacts are loaded into.
///
/// Dropping the store closes the connection; [`Store::close`] does the same but reports errors.
pub struct Store {
    conn: Connection,
    namespace: String,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl Store {
    /// Open (or create) the database file at `path`.
    pub fn open(path: impl AsRef<Path>, namespace: impl Into<String>) -> IngestionResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        Ok(Self {
            conn,
            namespace: namespace.into(),
        })
    }

    /// Open an in-memory database.
    pub fn open_in_memory(namespace: impl Into<String>) -> IngestionResult<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
            namespace: namespace.into(),
        })
    }

    /// Schema tables are created in.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Replace the table named after `artifact`'s stem with the artifact's contents.
    ///
    /// Creates the namespace if needed, then verifies the load by counting rows. Errors are
    /// logged and returned; the caller decides how to tally them.
    pub fn load_artifact(&self, artifact: impl AsRef<Path>) -> IngestionResult<u64> {
        let artifact = artifact.as_ref();
        self.replace_table(artifact).inspect_err(|e| {
            error!(artifact = %artifact.display(), error = %e, "error loading artifact into store");
        })
    }

    fn replace_table(&self, artifact: &Path) -> IngestionResult<u64> {
        let table = table_name(artifact).ok_or_else(|| IngestionError::UnsupportedFormat {
            message: format!("artifact has no file stem ({})", artifact.display()),
        })?;

        self.conn.execute_batch(&format!(
            "CREATE SCHEMA IF NOT EXISTS {};",
            quote_ident(&self.namespace)
        ))?;

        let absolute = fs::canonicalize(artifact)?;
        self.conn.execute_batch(&format!(
            "CREATE OR REPLACE TABLE {} AS SELECT * FROM read_parquet({});",
            self.qualified(&table),
            quote_literal(&absolute.to_string_lossy())
        ))?;

        let rows = self.row_count(&table)?;
        info!(
            table = %format!("{}.{}", self.namespace, table),
            rows,
            "loaded artifact into store"
        );
        Ok(rows)
    }

    /// Number of rows in `table` within the namespace.
    pub fn row_count(&self, table: &str) -> IngestionResult<u64> {
        let sql = format!("SELECT COUNT(*) FROM {};", self.qualified(table));
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    /// Table names in the namespace, sorted.
    pub fn list_tables(&self) -> IngestionResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT table_name FROM information_schema.tables \
             WHERE table_schema = ? ORDER BY table_name;",
        )?;
        let tables = stmt
            .query_map(params![self.namespace], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tables)
    }

    /// Close the connection, surfacing any error DuckDB reports.
    pub fn close(self) -> IngestionResult<()> {
        self.conn.close().map_err(|(_, e)| IngestionError::from(e))
    }

    fn qualified(&self, table: &str) -> String {
        format!("{}.{}", quote_ident(&self.namespace), quote_ident(table))
    }
}

/// Double-quote an SQL identifier.
fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Single-quote an SQL string literal.
fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
