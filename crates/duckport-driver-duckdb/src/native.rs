//! Engine-native export via `COPY ... TO` and `EXPORT DATABASE`

use async_trait::async_trait;
use duckport_core::{
    Connection, DuckportError, NativeExport, NativeFormat, Result, SnapshotFormat,
    quote_identifier, quote_literal,
};
use std::path::Path;

use super::DuckDbConnection;

#[async_trait]
impl NativeExport for DuckDbConnection {
    async fn copy_table(&self, table: &str, path: &Path, format: NativeFormat) -> Result<()> {
        let sql = format!(
            "COPY {} TO {} ({})",
            quote_identifier(table),
            quote_literal(path_str(path)?),
            copy_options(format)
        );
        tracing::debug!(table = %table, path = %path.display(), ?format, "copying table");
        self.execute(&sql, &[]).await?;
        Ok(())
    }

    async fn export_database(&self, dir: &Path, format: SnapshotFormat) -> Result<()> {
        std::fs::create_dir_all(dir)?;
        let sql = format!(
            "EXPORT DATABASE {} ({})",
            quote_literal(path_str(dir)?),
            snapshot_options(format)
        );
        tracing::info!(path = %dir.display(), ?format, "exporting database");
        self.execute_batch(&sql).await
    }
}

pub(crate) fn copy_options(format: NativeFormat) -> &'static str {
    match format {
        NativeFormat::Csv => "FORMAT CSV, HEADER",
        NativeFormat::Json => "FORMAT JSON, ARRAY true",
        NativeFormat::Parquet => "FORMAT PARQUET",
    }
}

pub(crate) fn snapshot_options(format: SnapshotFormat) -> &'static str {
    match format {
        SnapshotFormat::Sql => "FORMAT CSV",
        SnapshotFormat::Parquet => "FORMAT PARQUET",
    }
}

fn path_str(path: &Path) -> Result<&str> {
    path.to_str().ok_or_else(|| {
        DuckportError::InvalidPath(format!("{} is not valid UTF-8", path.display()))
    })
}
