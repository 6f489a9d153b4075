//! Database manager for the currently selected database file

use duckport_core::{
    Connection, DatabaseDriver, DuckportError, NativeExport, QueryResult, Result,
    SchemaIntrospection, SnapshotFormat, TableSummary, quote_identifier, validate_database_path,
};
use duckport_interchange::TableExporter;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Default)]
struct ManagerState {
    /// Selected database file
    path: Option<PathBuf>,
    /// Open engine handle for `path`
    connection: Option<Arc<dyn Connection>>,
}

/// Manages the connection to one database file at a time
pub struct DatabaseManager {
    /// Factory that opens database files
    driver: Arc<dyn DatabaseDriver>,

    state: Mutex<ManagerState>,
}

impl DatabaseManager {
    /// Create a manager with no database selected
    pub fn new(driver: Arc<dyn DatabaseDriver>) -> Self {
        Self {
            driver,
            state: Mutex::new(ManagerState::default()),
        }
    }

    /// Create a manager that will open `path` on first use
    pub fn with_path(driver: Arc<dyn DatabaseDriver>, path: impl Into<PathBuf>) -> Self {
        Self {
            driver,
            state: Mutex::new(ManagerState {
                path: Some(path.into()),
                connection: None,
            }),
        }
    }

    /// The selected database file, if any
    pub async fn path(&self) -> Option<PathBuf> {
        self.state.lock().await.path.clone()
    }

    /// Whether an engine handle is currently open
    pub async fn is_connected(&self) -> bool {
        self.state.lock().await.connection.is_some()
    }

    /// Open `path`, replacing any open handle.
    ///
    /// The path is checked before anything is released, so an invalid path
    /// leaves the current connection in place.
    #[tracing::instrument(skip(self, path), fields(path = %path.display(), driver = self.driver.id()))]
    pub async fn connect(&self, path: &Path) -> Result<()> {
        validate_database_path(path)?;
        self.open(path).await
    }

    /// Release the current handle and open `path`. An invalid path is
    /// rejected before the current handle is released.
    #[tracing::instrument(skip(self, path), fields(path = %path.display()))]
    pub async fn switch_database(&self, path: &Path) -> Result<()> {
        validate_database_path(path)?;
        tracing::info!("switching database");
        self.open(path).await
    }

    async fn open(&self, path: &Path) -> Result<()> {
        let mut state = self.state.lock().await;
        if let Some(previous) = state.connection.take() {
            previous.close().await?;
            tracing::debug!("previous connection released");
        }
        state.path = Some(path.to_path_buf());

        let connection = self.driver.connect(path).await.map_err(|e| {
            tracing::error!(error = %e, "failed to connect");
            e
        })?;
        state.connection = Some(connection);
        tracing::info!("connection established");
        Ok(())
    }

    /// The open engine handle, connecting to the selected path first if needed
    pub async fn connection(&self) -> Result<Arc<dyn Connection>> {
        let mut state = self.state.lock().await;
        if let Some(conn) = &state.connection {
            return Ok(conn.clone());
        }

        let path = state
            .path
            .clone()
            .ok_or_else(|| DuckportError::InvalidPath("no database selected".to_string()))?;
        tracing::debug!(path = %path.display(), "opening connection lazily");
        let connection = self.driver.connect(&path).await?;
        state.connection = Some(connection.clone());
        Ok(connection)
    }

    /// Release the handle and forget the selected path. Closing twice is a no-op.
    #[tracing::instrument(skip(self))]
    pub async fn close(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        state.path = None;
        if let Some(conn) = state.connection.take() {
            tracing::info!("closing connection");
            conn.close().await?;
        }
        Ok(())
    }

    /// Table names in listing order
    pub async fn list_tables(&self) -> Result<Vec<String>> {
        let conn = self.connection().await?;
        introspection(conn.as_ref())?.list_tables().await
    }

    /// Exact row count of `table`
    pub async fn row_count(&self, table: &str) -> Result<u64> {
        let conn = self.connection().await?;
        introspection(conn.as_ref())?.row_count(table).await
    }

    /// The engine's own create-statement for `table`
    pub async fn table_definition(&self, table: &str) -> Result<String> {
        let conn = self.connection().await?;
        introspection(conn.as_ref())?.table_definition(table).await
    }

    /// Every table with its row count
    #[tracing::instrument(skip(self))]
    pub async fn table_summaries(&self) -> Result<Vec<TableSummary>> {
        let conn = self.connection().await?;
        let schema = introspection(conn.as_ref())?;

        let mut summaries = Vec::new();
        for name in schema.list_tables().await? {
            let row_count = schema.row_count(&name).await?;
            summaries.push(TableSummary { name, row_count });
        }
        Ok(summaries)
    }

    /// Table names containing `query`, ignoring case
    pub async fn filter_tables(&self, query: &str) -> Result<Vec<String>> {
        let needle = query.to_lowercase();
        Ok(self
            .list_tables()
            .await?
            .into_iter()
            .filter(|name| name.to_lowercase().contains(&needle))
            .collect())
    }

    /// First `limit` rows of `table` in scan order, or every row
    #[tracing::instrument(skip(self))]
    pub async fn preview(&self, table: &str, limit: Option<usize>) -> Result<QueryResult> {
        let conn = self.connection().await?;
        introspection(conn.as_ref())?.describe_table(table).await?;

        let mut sql = format!("SELECT * FROM {}", quote_identifier(table));
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }
        conn.query(&sql, &[]).await
    }

    /// Snapshot the whole database as `schema.sql` + `load.sql` with CSV
    /// data files, creating `dir` if needed
    #[tracing::instrument(skip(self, dir), fields(path = %dir.display()))]
    pub async fn export_database_sql(&self, dir: &Path) -> Result<()> {
        let conn = self.connection().await?;
        native_export(conn.as_ref())?
            .export_database(dir, SnapshotFormat::Sql)
            .await
    }

    /// Snapshot the whole database with Parquet data files, creating `dir`
    /// if needed
    #[tracing::instrument(skip(self, dir), fields(path = %dir.display()))]
    pub async fn copy_database(&self, dir: &Path) -> Result<()> {
        let conn = self.connection().await?;
        native_export(conn.as_ref())?
            .export_database(dir, SnapshotFormat::Parquet)
            .await
    }

    /// A table exporter sharing this manager's connection
    pub async fn exporter(&self) -> Result<TableExporter> {
        Ok(TableExporter::new(self.connection().await?))
    }
}

fn introspection(conn: &dyn Connection) -> Result<&dyn SchemaIntrospection> {
    conn.as_schema_introspection().ok_or_else(|| {
        DuckportError::NotSupported(format!(
            "{} connections do not support schema introspection",
            conn.driver_name()
        ))
    })
}

fn native_export(conn: &dyn Connection) -> Result<&dyn NativeExport> {
    conn.as_native_export().ok_or_else(|| {
        DuckportError::NotSupported(format!(
            "{} connections cannot export a database snapshot",
            conn.driver_name()
        ))
    })
}
