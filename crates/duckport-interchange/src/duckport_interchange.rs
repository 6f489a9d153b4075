//! Duckport table exporter
//!
//! Reads a table's schema and rows through a shared `Connection` and writes
//! them out in one of several interchange formats.
//!
//! # Architecture
//!
//! ```text
//! Connection → describe_table / fetch_rows → TableExporter → format writer → file
//!                                                 ↓
//!                                   engine COPY (csv, json, parquet)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! let exporter = TableExporter::new(connection);
//! let summary = exporter.export("users", Path::new("users.sql"), ExportFormat::Sql).await?;
//! println!("wrote {} rows to {}", summary.rows, summary.path.display());
//! ```

mod ddl;
mod exporter;
mod format;
mod html;
mod native;
mod sql;
mod sqlite;
mod value_encoding;
mod xml;

pub use ddl::{create_table_sql, insert_statement};
pub use exporter::{
    ExportError, ExportPhase, ExportProgress, ExportProgressCallback, ExportSummary, TableExporter,
};
pub use format::ExportFormat;
pub use value_encoding::{escape_markup, escape_markup_text, sql_identifier, sql_literal};
