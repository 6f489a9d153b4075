//! Table export
//!
//! `TableExporter` reads schema and rows through a shared connection and
//! hands them to the writer for the requested format. Every format returns
//! the same `Result<ExportSummary, ExportError>`.

use duckport_core::{
    Connection, DuckportError, NativeFormat, Row, SchemaIntrospection, TableDescriptor,
    quote_identifier,
};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

use crate::ddl;
use crate::format::ExportFormat;
use crate::sqlite::SqliteWriter;
use crate::{html, native, sql, xml};

/// Errors during export
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Table '{0}' does not exist in the database")]
    TableNotFound(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Unsupported value: {0}")]
    UnsupportedValue(String),

    #[error("SQLite export to {} failed: {reason}", .path.display())]
    EmbeddedExport { path: PathBuf, reason: String },

    #[error("There are no tables to export")]
    NoTables,
}

impl From<DuckportError> for ExportError {
    fn from(e: DuckportError) -> Self {
        match e {
            DuckportError::TableNotFound(table) => ExportError::TableNotFound(table),
            DuckportError::InvalidPath(msg) => ExportError::InvalidPath(msg),
            DuckportError::UnsupportedValue(msg) => ExportError::UnsupportedValue(msg),
            DuckportError::Io(e) => ExportError::Io(e),
            other => ExportError::Query(other.to_string()),
        }
    }
}

/// Progress callback for export operations
pub type ExportProgressCallback = Box<dyn Fn(ExportProgress) + Send + Sync>;

/// Export progress information
#[derive(Debug, Clone)]
pub struct ExportProgress {
    /// Current phase of export
    pub phase: ExportPhase,
    /// Table being exported
    pub current_table: Option<String>,
    /// Number of tables completed
    pub tables_completed: usize,
    /// Total number of tables in this export
    pub total_tables: usize,
    /// Rows written so far
    pub rows_exported: u64,
    /// Log message
    pub message: Option<String>,
}

/// Phases of the export process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportPhase {
    /// Starting export
    Starting,
    /// Reading column metadata
    FetchingSchema,
    /// Writing table data
    ExportingData,
    /// Export complete
    Complete,
}

/// What an export wrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    /// File or directory written
    pub path: PathBuf,
    /// Number of tables exported
    pub tables: usize,
    /// Number of data rows exported
    pub rows: u64,
}

/// Exports tables from a connection into files
pub struct TableExporter {
    connection: Arc<dyn Connection>,
    progress_callback: Option<ExportProgressCallback>,
}

impl TableExporter {
    /// Create an exporter over a shared connection
    pub fn new(connection: Arc<dyn Connection>) -> Self {
        Self {
            connection,
            progress_callback: None,
        }
    }

    /// Set progress callback
    pub fn with_progress_callback(mut self, callback: ExportProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn connection(&self) -> &Arc<dyn Connection> {
        &self.connection
    }

    fn report_progress(&self, progress: ExportProgress) {
        if let Some(ref callback) = self.progress_callback {
            callback(progress);
        }
    }

    fn report(
        &self,
        phase: ExportPhase,
        table: Option<&str>,
        tables_completed: usize,
        total_tables: usize,
        rows_exported: u64,
    ) {
        let message = match (phase, table) {
            (ExportPhase::Starting, _) => Some(format!("Exporting {} table(s)", total_tables)),
            (ExportPhase::FetchingSchema, Some(t)) => Some(format!("Reading schema of {}", t)),
            (ExportPhase::ExportingData, Some(t)) => Some(format!("Exported {}", t)),
            (ExportPhase::Complete, _) => Some(format!("Exported {} row(s)", rows_exported)),
            _ => None,
        };
        self.report_progress(ExportProgress {
            phase,
            current_table: table.map(str::to_string),
            tables_completed,
            total_tables,
            rows_exported,
            message,
        });
    }

    fn introspection(&self) -> Result<&dyn SchemaIntrospection, ExportError> {
        self.connection.as_schema_introspection().ok_or_else(|| {
            ExportError::Query(format!(
                "{} connections do not support schema introspection",
                self.connection.driver_name()
            ))
        })
    }

    /// Table names in listing order
    pub async fn list_tables(&self) -> Result<Vec<String>, ExportError> {
        Ok(self.introspection()?.list_tables().await?)
    }

    /// Column metadata for `table`; `TableNotFound` when it has no columns
    pub async fn describe_table(&self, table: &str) -> Result<TableDescriptor, ExportError> {
        Ok(self.introspection()?.describe_table(table).await?)
    }

    /// Read every row of `table` in engine scan order
    pub async fn fetch_rows(&self, table: &TableDescriptor) -> Result<Vec<Row>, ExportError> {
        let sql = format!("SELECT * FROM {}", quote_identifier(&table.name));
        let result = self.connection.query(&sql, &[]).await?;

        let expected = table.column_count();
        if let Some((index, row)) = result
            .rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != expected)
        {
            return Err(ExportError::Query(format!(
                "row {} of {} has {} values but the table has {} columns",
                index + 1,
                table.name,
                row.len(),
                expected
            )));
        }
        Ok(result.rows)
    }

    /// Reconstructed `CREATE TABLE` statement for `table`
    pub async fn create_table_sql(&self, table: &str) -> Result<String, ExportError> {
        let descriptor = self.describe_table(table).await?;
        Ok(ddl::create_table_sql(&descriptor))
    }

    /// Export one table to `dest`
    #[tracing::instrument(skip(self, dest), fields(path = %dest.display()))]
    pub async fn export(
        &self,
        table: &str,
        dest: &Path,
        format: ExportFormat,
    ) -> Result<ExportSummary, ExportError> {
        let start = Instant::now();
        self.report(ExportPhase::Starting, Some(table), 0, 1, 0);

        self.report(ExportPhase::FetchingSchema, Some(table), 0, 1, 0);
        let descriptor = self.describe_table(table).await?;
        check_destination(dest)?;

        let rows = self.export_table_to(&descriptor, dest, format).await?;

        self.report(ExportPhase::ExportingData, Some(table), 1, 1, rows);
        self.report(ExportPhase::Complete, None, 1, 1, rows);
        tracing::info!(
            rows,
            duration_ms = start.elapsed().as_millis() as u64,
            "table export completed"
        );

        Ok(ExportSummary {
            path: dest.to_path_buf(),
            tables: 1,
            rows,
        })
    }

    /// Export every table of the database.
    ///
    /// SQL, HTML and SQLite targets are a single file; CSV, JSON, Parquet
    /// and XML targets are a directory holding one `<table>.<ext>` per table.
    #[tracing::instrument(skip(self, dest), fields(path = %dest.display()))]
    pub async fn export_all(
        &self,
        dest: &Path,
        format: ExportFormat,
    ) -> Result<ExportSummary, ExportError> {
        let start = Instant::now();
        let tables = self.list_tables().await?;
        if tables.is_empty() {
            return Err(ExportError::NoTables);
        }
        let total = tables.len();
        self.report(ExportPhase::Starting, None, 0, total, 0);

        if format.is_single_file() {
            check_destination(dest)?;
        } else {
            std::fs::create_dir_all(dest)?;
        }

        let rows = match format {
            ExportFormat::Sql | ExportFormat::SqlStructure => {
                self.export_all_sql(&tables, dest, format).await?
            }
            ExportFormat::Html => self.export_all_html(&tables, dest).await?,
            ExportFormat::Sqlite => {
                let mut descriptors = Vec::with_capacity(total);
                for table in &tables {
                    descriptors.push(self.describe_table(table).await?);
                }
                self.export_sqlite(&descriptors, dest).await?
            }
            ExportFormat::Csv | ExportFormat::Json | ExportFormat::Parquet | ExportFormat::Xml => {
                self.export_all_to_dir(&tables, dest, format).await?
            }
        };

        self.report(ExportPhase::Complete, None, total, total, rows);
        tracing::info!(
            tables = total,
            rows,
            duration_ms = start.elapsed().as_millis() as u64,
            "database export completed"
        );

        Ok(ExportSummary {
            path: dest.to_path_buf(),
            tables: total,
            rows,
        })
    }

    /// Write one described table to its own file, returning the row count
    async fn export_table_to(
        &self,
        table: &TableDescriptor,
        dest: &Path,
        format: ExportFormat,
    ) -> Result<u64, ExportError> {
        match format {
            ExportFormat::SqlStructure => {
                write_file(dest, |out| sql::write_structure(out, table))?;
                Ok(0)
            }
            ExportFormat::Sql => {
                let rows = self.fetch_rows(table).await?;
                write_file(dest, |out| sql::write_table(out, table, &rows))?;
                Ok(rows.len() as u64)
            }
            ExportFormat::Html => {
                let rows = self.fetch_rows(table).await?;
                write_file(dest, |out| html::write_document(out, table, &rows))?;
                Ok(rows.len() as u64)
            }
            ExportFormat::Xml => {
                let rows = self.fetch_rows(table).await?;
                write_file(dest, |out| xml::write_document(out, table, &rows))?;
                Ok(rows.len() as u64)
            }
            ExportFormat::Sqlite => self.export_sqlite(std::slice::from_ref(table), dest).await,
            ExportFormat::Csv => self.copy_native(table, dest, NativeFormat::Csv).await,
            ExportFormat::Json => self.copy_native(table, dest, NativeFormat::Json).await,
            ExportFormat::Parquet => self.copy_native(table, dest, NativeFormat::Parquet).await,
        }
    }

    /// Let the engine write the file, then count what it wrote
    async fn copy_native(
        &self,
        table: &TableDescriptor,
        dest: &Path,
        format: NativeFormat,
    ) -> Result<u64, ExportError> {
        native::copy_table(self.connection.as_ref(), &table.name, dest, format).await?;
        Ok(self.introspection()?.row_count(&table.name).await?)
    }

    async fn export_all_sql(
        &self,
        tables: &[String],
        dest: &Path,
        format: ExportFormat,
    ) -> Result<u64, ExportError> {
        let mut out = BufWriter::new(File::create(dest)?);
        let mut exported = 0;

        for (index, name) in tables.iter().enumerate() {
            let table = self.describe_table(name).await?;
            if index > 0 {
                out.write_all(b"\n")?;
            }
            if format == ExportFormat::SqlStructure {
                sql::write_structure(&mut out, &table)?;
            } else {
                let rows = self.fetch_rows(&table).await?;
                sql::write_table(&mut out, &table, &rows)?;
                exported += rows.len() as u64;
            }
            self.report(
                ExportPhase::ExportingData,
                Some(name),
                index + 1,
                tables.len(),
                exported,
            );
        }

        out.flush()?;
        Ok(exported)
    }

    async fn export_all_html(&self, tables: &[String], dest: &Path) -> Result<u64, ExportError> {
        let mut out = BufWriter::new(File::create(dest)?);
        let mut exported = 0;

        html::write_head(&mut out, html::ALL_TABLES_TITLE, html::ALL_TABLES_STYLESHEET)?;
        for (index, name) in tables.iter().enumerate() {
            let table = self.describe_table(name).await?;
            let rows = self.fetch_rows(&table).await?;
            html::write_table(&mut out, &table, &rows)?;
            exported += rows.len() as u64;
            self.report(
                ExportPhase::ExportingData,
                Some(name),
                index + 1,
                tables.len(),
                exported,
            );
        }
        html::write_tail(&mut out)?;

        out.flush()?;
        Ok(exported)
    }

    async fn export_all_to_dir(
        &self,
        tables: &[String],
        dir: &Path,
        format: ExportFormat,
    ) -> Result<u64, ExportError> {
        let mut exported = 0;
        for (index, name) in tables.iter().enumerate() {
            let table = self.describe_table(name).await?;
            let path = dir.join(table_file_name(name, format));
            exported += self.export_table_to(&table, &path, format).await?;
            self.report(
                ExportPhase::ExportingData,
                Some(name),
                index + 1,
                tables.len(),
                exported,
            );
        }
        Ok(exported)
    }

    /// Copy tables into a new SQLite file.
    ///
    /// Any failure after the file is opened is logged and returned as
    /// `EmbeddedExport`; rows inserted before the failure stay committed and
    /// the file is always closed.
    async fn export_sqlite(
        &self,
        tables: &[TableDescriptor],
        dest: &Path,
    ) -> Result<u64, ExportError> {
        let mut writer = SqliteWriter::open(dest).map_err(|e| embedded_failure(dest, e))?;
        let outcome = self.fill_sqlite(&mut writer, tables).await;
        let closed = writer.close();

        match outcome {
            Ok(rows) => {
                closed.map_err(|e| embedded_failure(dest, e))?;
                Ok(rows)
            }
            Err(e) => {
                if let Err(close_err) = closed {
                    tracing::warn!(error = %close_err, "closing SQLite export target failed");
                }
                Err(embedded_failure(dest, e))
            }
        }
    }

    async fn fill_sqlite(
        &self,
        writer: &mut SqliteWriter,
        tables: &[TableDescriptor],
    ) -> Result<u64, ExportError> {
        let mut exported = 0;
        for (index, table) in tables.iter().enumerate() {
            let rows = self.fetch_rows(table).await?;
            exported += writer
                .write_table(table, &rows)
                .map_err(|e| ExportError::Query(format!("table {}: {}", table.name, e)))?;
            if tables.len() > 1 {
                self.report(
                    ExportPhase::ExportingData,
                    Some(&table.name),
                    index + 1,
                    tables.len(),
                    exported,
                );
            }
        }
        Ok(exported)
    }
}

fn embedded_failure(dest: &Path, error: impl std::fmt::Display) -> ExportError {
    tracing::error!(path = %dest.display(), error = %error, "SQLite export failed");
    ExportError::EmbeddedExport {
        path: dest.to_path_buf(),
        reason: error.to_string(),
    }
}

/// Reject an empty destination or one whose parent directory is missing
fn check_destination(dest: &Path) -> Result<(), ExportError> {
    if dest.as_os_str().is_empty() {
        return Err(ExportError::InvalidPath(
            "no destination path given".to_string(),
        ));
    }
    if let Some(parent) = dest.parent()
        && !parent.as_os_str().is_empty()
        && !parent.is_dir()
    {
        return Err(ExportError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("directory {} does not exist", parent.display()),
        )));
    }
    Ok(())
}

fn write_file(
    dest: &Path,
    render: impl FnOnce(&mut BufWriter<File>) -> io::Result<()>,
) -> Result<(), ExportError> {
    let mut out = BufWriter::new(File::create(dest)?);
    render(&mut out)?;
    out.flush()?;
    Ok(())
}

fn table_file_name(table: &str, format: ExportFormat) -> String {
    let stem: String = table
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    format!("{}.{}", stem, format.extension())
}
