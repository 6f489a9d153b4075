//! Export target formats

use serde::{Deserialize, Serialize};
use std::path::Path;
use strum::{Display, EnumIter, EnumString};

/// A target format for table export
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum ExportFormat {
    /// `CREATE TABLE` statement only
    SqlStructure,
    /// `CREATE TABLE` plus one `INSERT` per row
    Sql,
    /// Comma-delimited with a header row, written by the engine
    Csv,
    /// Array of row objects, written by the engine
    Json,
    /// Parquet columnar file, written by the engine
    Parquet,
    /// Styled HTML table
    Html,
    /// XML document with one element per column
    Xml,
    /// A fresh SQLite database file
    Sqlite,
}

impl ExportFormat {
    /// Default file extension, without the dot
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::SqlStructure | ExportFormat::Sql => "sql",
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Parquet => "parquet",
            ExportFormat::Html => "html",
            ExportFormat::Xml => "xml",
            ExportFormat::Sqlite => "sqlite",
        }
    }

    /// Guess the format from a destination file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "sql" => Some(ExportFormat::Sql),
            "csv" => Some(ExportFormat::Csv),
            "json" => Some(ExportFormat::Json),
            "parquet" => Some(ExportFormat::Parquet),
            "html" | "htm" => Some(ExportFormat::Html),
            "xml" => Some(ExportFormat::Xml),
            "sqlite" | "sqlite3" | "db" => Some(ExportFormat::Sqlite),
            _ => None,
        }
    }

    /// Whether an all-tables export writes a single file (as opposed to a
    /// directory with one file per table)
    pub fn is_single_file(self) -> bool {
        matches!(
            self,
            ExportFormat::SqlStructure
                | ExportFormat::Sql
                | ExportFormat::Html
                | ExportFormat::Sqlite
        )
    }
}
