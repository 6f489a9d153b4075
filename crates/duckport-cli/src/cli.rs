//! duckport - export DuckDB tables to SQL, CSV, JSON, Parquet, HTML, XML and SQLite

mod logging;
mod output;
mod settings;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use duckport_connection::DatabaseManager;
use duckport_core::TableSummary;
use duckport_driver_duckdb::DuckDbDriver;
use duckport_interchange::{ExportFormat, ExportPhase, ExportProgress, ExportSummary};
use logging::LoggingConfig;
use settings::Settings;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    name = "duckport",
    about = "Export DuckDB tables to SQL, CSV, JSON, Parquet, HTML, XML and SQLite",
    version
)]
struct Cli {
    /// DuckDB database file
    #[arg(long, short, env = "DUCKPORT_DATABASE", global = true)]
    database: Option<PathBuf>,

    /// Settings file (defaults to <config dir>/duckport/settings.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter directives, e.g. "debug" or "duckport_interchange=trace"
    #[arg(long, global = true)]
    log_filter: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List tables with their row counts
    Tables {
        /// Only show tables whose name contains this text (case-insensitive)
        #[arg(long)]
        filter: Option<String>,
    },

    /// Show the columns of a table and the engine's CREATE TABLE statement
    Schema { table: String },

    /// Print a CREATE TABLE statement rebuilt from the column metadata
    Ddl { table: String },

    /// Print the number of rows in a table
    Count { table: String },

    /// Show the first rows of a table
    Preview {
        table: String,

        /// Number of rows to show (0 shows every row)
        #[arg(long, short)]
        limit: Option<usize>,
    },

    /// Export one table to a file
    Export {
        table: String,
        dest: PathBuf,

        /// Output format; inferred from the file extension when omitted
        #[arg(long, short)]
        format: Option<ExportFormat>,
    },

    /// Export every table to one file or a directory of files
    ExportAll {
        dest: PathBuf,

        #[arg(long, short)]
        format: ExportFormat,
    },

    /// Snapshot the whole database into a directory
    Dump {
        dir: PathBuf,

        /// Write Parquet data files instead of CSV
        #[arg(long)]
        parquet: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    let log_config = LoggingConfig::from_settings(&settings.logging, cli.log_filter.as_deref());
    let _log_guard = logging::init(&log_config).context("Failed to initialize logging")?;

    let database = cli
        .database
        .or_else(|| settings.default_database.clone())
        .context("No database selected; pass --database or set DUCKPORT_DATABASE")?;

    let manager = DatabaseManager::new(Arc::new(DuckDbDriver::new()));
    manager
        .connect(&database)
        .await
        .with_context(|| format!("Failed to open {}", database.display()))?;

    let outcome = execute(&manager, &settings, cli.command).await;
    if let Err(e) = manager.close().await {
        tracing::warn!(error = %e, "failed to close database");
    }
    outcome
}

async fn execute(manager: &DatabaseManager, settings: &Settings, command: Command) -> Result<()> {
    match command {
        Command::Tables { filter } => {
            let summaries = match filter {
                Some(query) => {
                    let mut summaries = Vec::new();
                    for name in manager.filter_tables(&query).await? {
                        let row_count = manager.row_count(&name).await?;
                        summaries.push(TableSummary { name, row_count });
                    }
                    summaries
                }
                None => manager.table_summaries().await?,
            };
            if summaries.is_empty() {
                println!("No tables found");
            } else {
                println!("{}", output::summaries_table(&summaries));
            }
        }

        Command::Schema { table } => {
            let descriptor = manager.exporter().await?.describe_table(&table).await?;
            println!("{}", output::columns_table(&descriptor));
            println!("{}", manager.table_definition(&table).await?);
        }

        Command::Ddl { table } => {
            println!("{}", manager.exporter().await?.create_table_sql(&table).await?);
        }

        Command::Count { table } => {
            println!("{}", manager.row_count(&table).await?);
        }

        Command::Preview { table, limit } => {
            let limit = match limit.unwrap_or(settings.preview_limit) {
                0 => None,
                n => Some(n),
            };
            let result = manager.preview(&table, limit).await?;
            println!("{}", output::result_table(&result));
        }

        Command::Export {
            table,
            dest,
            format,
        } => {
            let format = format
                .or_else(|| ExportFormat::from_path(&dest))
                .unwrap_or(ExportFormat::Sql);
            let summary = manager
                .exporter()
                .await?
                .export(&table, &dest, format)
                .await
                .with_context(|| format!("Failed to export table '{}' as {}", table, format))?;
            println!("{}", export_message(format, &table, &summary));
        }

        Command::ExportAll { dest, format } => {
            let exporter = manager
                .exporter()
                .await?
                .with_progress_callback(Box::new(print_progress));
            let summary = exporter
                .export_all(&dest, format)
                .await
                .with_context(|| format!("Failed to export all tables as {}", format))?;
            println!("{}", export_all_message(format, &summary));
        }

        Command::Dump { dir, parquet } => {
            if parquet {
                manager.copy_database(&dir).await?;
            } else {
                manager.export_database_sql(&dir).await?;
            }
            println!("Database exported to {}", dir.display());
        }
    }
    Ok(())
}

fn export_message(format: ExportFormat, table: &str, summary: &ExportSummary) -> String {
    if format == ExportFormat::SqlStructure {
        format!(
            "Exported structure of '{}' to {}",
            table,
            summary.path.display()
        )
    } else {
        format!(
            "Exported {} rows from '{}' to {}",
            summary.rows,
            table,
            summary.path.display()
        )
    }
}

fn export_all_message(format: ExportFormat, summary: &ExportSummary) -> String {
    if format == ExportFormat::SqlStructure {
        format!(
            "Exported structure of {} tables to {}",
            summary.tables,
            summary.path.display()
        )
    } else {
        format!(
            "Exported {} tables ({} rows) to {}",
            summary.tables,
            summary.rows,
            summary.path.display()
        )
    }
}

fn print_progress(progress: ExportProgress) {
    if progress.phase != ExportPhase::ExportingData {
        return;
    }
    if let Some(table) = &progress.current_table {
        eprintln!(
            "[{}/{}] {}",
            progress.tables_completed, progress.total_tables, table
        );
    }
}
