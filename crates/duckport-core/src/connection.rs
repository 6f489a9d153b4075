//! Connection trait and engine-native export hooks

use crate::{QueryResult, Result, SchemaIntrospection, StatementResult, Value};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A database connection
#[async_trait]
pub trait Connection: Send + Sync {
    /// Get the driver name (e.g., "duckdb")
    fn driver_name(&self) -> &str;

    /// Execute a statement that does not return rows
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<StatementResult>;

    /// Execute a query that returns rows
    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult>;

    /// Execute a script of one or more statements separated by `;`
    async fn execute_batch(&self, sql: &str) -> Result<()>;

    /// Close the connection and release the engine handle
    async fn close(&self) -> Result<()>;

    /// Check if the connection is closed
    fn is_closed(&self) -> bool;

    /// Get schema introspection interface if supported
    fn as_schema_introspection(&self) -> Option<&dyn SchemaIntrospection> {
        None
    }

    /// Get the engine's own bulk export interface if supported
    fn as_native_export(&self) -> Option<&dyn NativeExport> {
        None
    }
}

/// Engine-native serializers
///
/// Formats listed here are produced by the engine itself, so their exact
/// byte layout (null rendering, quoting, number formatting) follows the
/// engine version in use.
#[async_trait]
pub trait NativeExport: Send + Sync {
    /// Write every row of `table` to `path` in `format`
    async fn copy_table(&self, table: &str, path: &Path, format: NativeFormat) -> Result<()>;

    /// Snapshot every table of the database into the directory `dir`
    async fn export_database(&self, dir: &Path, format: SnapshotFormat) -> Result<()>;
}

/// Per-table formats the engine writes itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NativeFormat {
    /// Comma-delimited with a header row
    Csv,
    /// One JSON array of row objects
    Json,
    /// Parquet columnar container
    Parquet,
}

/// Whole-database snapshot layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapshotFormat {
    /// `schema.sql` + `load.sql` with CSV data files
    Sql,
    /// `schema.sql` + `load.sql` with Parquet data files
    Parquet,
}

/// Quote an identifier with double quotes, doubling embedded quotes
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a string literal with single quotes, doubling embedded quotes
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("users"), "\"users\"");
        assert_eq!(quote_identifier("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_quote_literal() {
        assert_eq!(quote_literal("/tmp/out.csv"), "'/tmp/out.csv'");
        assert_eq!(quote_literal("it's"), "'it''s'");
    }
}
