//! Integration tests for DatabaseManager against real DuckDB files

use async_trait::async_trait;
use duckport_connection::DatabaseManager;
use duckport_core::{Connection, DatabaseDriver, DuckportError, Result, TableSummary, Value};
use duckport_driver_duckdb::{DuckDbConnection, DuckDbDriver};
use duckport_interchange::ExportFormat;
use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

/// DuckDB driver that counts how many handles it opened
#[derive(Default)]
struct CountingDriver {
    inner: DuckDbDriver,
    opened: AtomicUsize,
}

#[async_trait]
impl DatabaseDriver for CountingDriver {
    fn id(&self) -> &'static str {
        "counting-duckdb"
    }

    async fn connect(&self, path: &Path) -> Result<Arc<dyn Connection>> {
        let conn = self.inner.connect(path).await?;
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(conn)
    }
}

async fn create_database(dir: &TempDir, name: &str, sql: &str) -> PathBuf {
    let path = dir.path().join(name);
    let conn = DuckDbConnection::open(&path).expect("create database");
    conn.execute_batch(sql).await.expect("seed database");
    conn.close().await.expect("close seed connection");
    path
}

async fn sample(dir: &TempDir) -> PathBuf {
    create_database(
        dir,
        "sample.duckdb",
        r#"
        CREATE TABLE customers (id INTEGER NOT NULL, name VARCHAR);
        INSERT INTO customers VALUES (1, 'Ada'), (2, 'Grace'), (3, NULL);
        CREATE TABLE customer_notes (customer_id INTEGER, note VARCHAR);
        CREATE TABLE orders (id INTEGER, total DOUBLE);
        INSERT INTO orders VALUES (10, 9.5);
        "#,
    )
    .await
}

fn manager() -> (Arc<CountingDriver>, DatabaseManager) {
    let driver = Arc::new(CountingDriver::default());
    let manager = DatabaseManager::new(driver.clone());
    (driver, manager)
}

#[tokio::test]
async fn test_connect_rejects_invalid_paths() {
    let dir = tempfile::tempdir().unwrap();
    let (driver, manager) = manager();

    let err = manager.connect(Path::new("")).await.unwrap_err();
    assert!(matches!(err, DuckportError::InvalidPath(_)));

    let err = manager
        .connect(&dir.path().join("missing.duckdb"))
        .await
        .unwrap_err();
    assert!(matches!(err, DuckportError::InvalidPath(_)));

    assert_eq!(driver.opened.load(Ordering::SeqCst), 0);
    assert!(!manager.is_connected().await);
}

#[tokio::test]
async fn test_reads_without_selection_fail() {
    let (_driver, manager) = manager();
    let err = manager.list_tables().await.unwrap_err();
    assert!(matches!(err, DuckportError::InvalidPath(_)));
}

#[tokio::test]
async fn test_lazy_connect_opens_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = sample(&dir).await;
    let driver = Arc::new(CountingDriver::default());
    let manager = DatabaseManager::with_path(driver.clone(), &path);

    assert!(!manager.is_connected().await);
    assert_eq!(
        manager.list_tables().await.unwrap(),
        vec!["customer_notes", "customers", "orders"]
    );
    assert_eq!(manager.row_count("customers").await.unwrap(), 3);
    assert!(manager.is_connected().await);
    assert_eq!(driver.opened.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_table_definition() {
    let dir = tempfile::tempdir().unwrap();
    let path = sample(&dir).await;
    let (_driver, manager) = manager();
    manager.connect(&path).await.unwrap();

    let sql = manager.table_definition("orders").await.unwrap();
    assert!(sql.starts_with("CREATE TABLE"));
    assert!(sql.contains("orders"));

    let err = manager.table_definition("nope").await.unwrap_err();
    assert!(matches!(err, DuckportError::TableNotFound(_)));
}

#[tokio::test]
async fn test_table_summaries_and_filter() {
    let dir = tempfile::tempdir().unwrap();
    let path = sample(&dir).await;
    let (_driver, manager) = manager();
    manager.connect(&path).await.unwrap();

    assert_eq!(
        manager.table_summaries().await.unwrap(),
        vec![
            TableSummary {
                name: "customer_notes".into(),
                row_count: 0
            },
            TableSummary {
                name: "customers".into(),
                row_count: 3
            },
            TableSummary {
                name: "orders".into(),
                row_count: 1
            },
        ]
    );

    assert_eq!(
        manager.filter_tables("CUSTOMER").await.unwrap(),
        vec!["customer_notes", "customers"]
    );
    assert_eq!(manager.filter_tables("").await.unwrap().len(), 3);
    assert!(manager.filter_tables("invoices").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_preview() {
    let dir = tempfile::tempdir().unwrap();
    let path = sample(&dir).await;
    let (_driver, manager) = manager();
    manager.connect(&path).await.unwrap();

    let preview = manager.preview("customers", Some(2)).await.unwrap();
    assert_eq!(preview.column_names(), vec!["id", "name"]);
    assert_eq!(preview.row_count(), 2);

    let all = manager.preview("customers", None).await.unwrap();
    assert_eq!(all.row_count(), 3);
    assert_eq!(all.rows[2].get_by_name("name"), Some(&Value::Null));

    let err = manager.preview("nope", Some(5)).await.unwrap_err();
    assert!(matches!(err, DuckportError::TableNotFound(_)));
}

#[tokio::test]
async fn test_switch_database() {
    let dir = tempfile::tempdir().unwrap();
    let first = sample(&dir).await;
    let second = create_database(&dir, "second.duckdb", "CREATE TABLE only_here (x INTEGER);").await;
    let (driver, manager) = manager();

    manager.connect(&first).await.unwrap();
    let old = manager.connection().await.unwrap();
    manager.switch_database(&second).await.unwrap();

    assert!(old.is_closed());
    assert_eq!(manager.path().await, Some(second.clone()));
    assert_eq!(manager.list_tables().await.unwrap(), vec!["only_here"]);
    assert_eq!(driver.opened.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_switch_to_missing_file_keeps_current_database() {
    let dir = tempfile::tempdir().unwrap();
    let first = sample(&dir).await;
    let missing = dir.path().join("missing.duckdb");
    let (driver, manager) = manager();

    manager.connect(&first).await.unwrap();
    let current = manager.connection().await.unwrap();

    let err = manager.switch_database(&missing).await.unwrap_err();
    assert!(matches!(err, DuckportError::InvalidPath(_)));
    assert!(!missing.exists());

    assert!(!current.is_closed());
    assert_eq!(manager.path().await, Some(first));
    assert_eq!(manager.row_count("customers").await.unwrap(), 3);
    assert_eq!(driver.opened.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_close_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = sample(&dir).await;
    let (_driver, manager) = manager();
    manager.connect(&path).await.unwrap();
    let conn = manager.connection().await.unwrap();

    manager.close().await.unwrap();
    assert!(conn.is_closed());
    assert_eq!(manager.path().await, None);
    assert!(!manager.is_connected().await);

    manager.close().await.unwrap();

    // Path was cleared, so reads no longer reconnect
    let err = manager.list_tables().await.unwrap_err();
    assert!(matches!(err, DuckportError::InvalidPath(_)));

    // The file lock is gone; another handle can open the file
    let reopened = DuckDbConnection::open(&path).unwrap();
    reopened.close().await.unwrap();
}

#[tokio::test]
async fn test_export_database_sql() {
    let dir = tempfile::tempdir().unwrap();
    let path = sample(&dir).await;
    let (_driver, manager) = manager();
    manager.connect(&path).await.unwrap();

    let out = dir.path().join("exports").join("sql");
    manager.export_database_sql(&out).await.unwrap();

    let schema = std::fs::read_to_string(out.join("schema.sql")).unwrap();
    assert!(schema.contains("customers"));
    assert!(out.join("load.sql").exists());
}

#[tokio::test]
async fn test_copy_database_parquet() {
    let dir = tempfile::tempdir().unwrap();
    let path = sample(&dir).await;
    let (_driver, manager) = manager();
    manager.connect(&path).await.unwrap();

    let out = dir.path().join("exports").join("parquet");
    manager.copy_database(&out).await.unwrap();

    let parquet_files = std::fs::read_dir(&out)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "parquet"))
        .count();
    assert!(parquet_files > 0);
    assert!(out.join("schema.sql").exists());
}

#[tokio::test]
async fn test_exporter_shares_connection() {
    let dir = tempfile::tempdir().unwrap();
    let path = sample(&dir).await;
    let (driver, manager) = manager();
    manager.connect(&path).await.unwrap();

    let exporter = manager.exporter().await.unwrap();
    assert!(Arc::ptr_eq(
        exporter.connection(),
        &manager.connection().await.unwrap()
    ));

    let dest = dir.path().join("customers.sql");
    let summary = exporter
        .export("customers", &dest, ExportFormat::Sql)
        .await
        .unwrap();
    assert_eq!(summary.rows, 3);
    assert_eq!(driver.opened.load(Ordering::SeqCst), 1);
}
