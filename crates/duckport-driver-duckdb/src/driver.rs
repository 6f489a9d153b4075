//! DuckDB driver implementation

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use duckdb::arrow::datatypes::DataType;
use duckdb::types::{TimeUnit, Value as DuckValue};
use duckport_core::{
    ColumnMeta, Connection, DatabaseDriver, DuckportError, NativeExport, QueryResult, Result, Row,
    SchemaIntrospection, StatementResult, Value, validate_database_path,
};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// DuckDB database driver
///
/// DuckDB is an embeddable analytical database designed for OLAP workloads.
/// The driver only opens existing database files; it never creates one.
pub struct DuckDbDriver;

impl DuckDbDriver {
    /// Create a new DuckDB driver instance
    pub fn new() -> Self {
        tracing::debug!("DuckDB driver initialized");
        Self
    }
}

impl Default for DuckDbDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseDriver for DuckDbDriver {
    fn id(&self) -> &'static str {
        "duckdb"
    }

    fn display_name(&self) -> &'static str {
        "DuckDB"
    }

    async fn connect(&self, path: &Path) -> Result<Arc<dyn Connection>> {
        validate_database_path(path)?;
        let conn = DuckDbConnection::open(path)?;
        Ok(Arc::new(conn))
    }
}

/// DuckDB connection wrapper
///
/// The engine handle lives behind a mutex so the connection can be shared
/// between the accessor and the exporter. `close` drops the handle, which
/// releases the file lock.
pub struct DuckDbConnection {
    connection: Mutex<Option<duckdb::Connection>>,
    path: PathBuf,
    closed: AtomicBool,
}

impl DuckDbConnection {
    /// Open (or create) a DuckDB database file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::info!(path = %path.display(), "opening DuckDB database");
        let connection = duckdb::Connection::open(path).map_err(|e| {
            DuckportError::Connection(format!("Failed to open {}: {}", path.display(), e))
        })?;
        Ok(Self::new(connection, path.to_path_buf()))
    }

    /// Open a transient in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let connection = duckdb::Connection::open_in_memory().map_err(|e| {
            DuckportError::Connection(format!("Failed to open in-memory database: {}", e))
        })?;
        Ok(Self::new(connection, PathBuf::from(":memory:")))
    }

    /// Create a new DuckDB connection wrapper
    pub fn new(connection: duckdb::Connection, path: PathBuf) -> Self {
        Self {
            connection: Mutex::new(Some(connection)),
            path,
            closed: AtomicBool::new(false),
        }
    }

    /// Run `f` against the open engine handle
    pub(crate) fn with_connection<T>(
        &self,
        f: impl FnOnce(&duckdb::Connection) -> Result<T>,
    ) -> Result<T> {
        let guard = self.connection.lock();
        match guard.as_ref() {
            Some(conn) => f(conn),
            None => Err(DuckportError::Connection("Connection is closed".to_string())),
        }
    }
}

#[async_trait]
impl Connection for DuckDbConnection {
    fn driver_name(&self) -> &str {
        "duckdb"
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> Result<StatementResult> {
        let start = std::time::Instant::now();
        let params = values_to_duckdb(params);

        let affected = self.with_connection(|conn| {
            conn.execute(sql, duckdb::params_from_iter(params.iter()))
                .map_err(|e| DuckportError::Query(format!("Execute failed: {}", e)))
        })?;

        tracing::debug!(
            affected_rows = affected,
            duration_ms = start.elapsed().as_millis() as u64,
            "execute completed"
        );

        Ok(StatementResult {
            affected_rows: affected as u64,
        })
    }

    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        let start = std::time::Instant::now();
        let params = values_to_duckdb(params);

        let (column_names, raw_rows) = self.with_connection(|conn| {
            let mut stmt = conn
                .prepare(sql)
                .map_err(|e| DuckportError::Query(format!("Prepare failed: {}", e)))?;

            // Execute query first, then get column info
            let mut duckdb_rows = stmt
                .query(duckdb::params_from_iter(params.iter()))
                .map_err(|e| DuckportError::Query(format!("Query failed: {}", e)))?;

            let column_names: Vec<String> = duckdb_rows
                .as_ref()
                .map(|s| s.column_names().iter().map(|n| n.to_string()).collect())
                .unwrap_or_default();
            let column_count = column_names.len();
            let zoned: Vec<bool> = match duckdb_rows.as_ref() {
                Some(stmt) => (0..column_count)
                    .map(|i| matches!(stmt.column_type(i), DataType::Timestamp(_, Some(_))))
                    .collect(),
                None => vec![false; column_count],
            };

            let mut raw_rows: Vec<Vec<Value>> = Vec::new();
            while let Some(row) = duckdb_rows
                .next()
                .map_err(|e| DuckportError::Query(format!("Row fetch failed: {}", e)))?
            {
                let mut values = Vec::with_capacity(column_count);
                for (i, &with_time_zone) in zoned.iter().enumerate() {
                    values.push(row_to_value(row, i, with_time_zone)?);
                }
                raw_rows.push(values);
            }
            Ok((column_names, raw_rows))
        })?;

        let columns: Vec<ColumnMeta> = column_names
            .iter()
            .enumerate()
            .map(|(idx, name)| ColumnMeta {
                name: name.clone(),
                data_type: String::new(),
                ordinal: idx,
            })
            .collect();

        let shared_names: Arc<[String]> = column_names.into();
        let rows: Vec<Row> = raw_rows
            .into_iter()
            .map(|values| Row::new(shared_names.clone(), values))
            .collect();

        let execution_time_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(
            row_count = rows.len(),
            duration_ms = execution_time_ms,
            "query completed"
        );

        Ok(QueryResult {
            columns,
            rows,
            execution_time_ms,
        })
    }

    async fn execute_batch(&self, sql: &str) -> Result<()> {
        self.with_connection(|conn| {
            conn.execute_batch(sql)
                .map_err(|e| DuckportError::Query(format!("Batch failed: {}", e)))
        })
    }

    async fn close(&self) -> Result<()> {
        let handle = self.connection.lock().take();
        self.closed.store(true, Ordering::SeqCst);
        if let Some(conn) = handle {
            conn.close().map_err(|(_, e)| {
                DuckportError::Connection(format!("Failed to close database: {}", e))
            })?;
            tracing::debug!(path = %self.path.display(), "DuckDB connection closed");
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn as_schema_introspection(&self) -> Option<&dyn SchemaIntrospection> {
        Some(self)
    }

    fn as_native_export(&self) -> Option<&dyn NativeExport> {
        Some(self)
    }
}

impl std::fmt::Debug for DuckDbConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuckDbConnection")
            .field("path", &self.path)
            .field("closed", &self.closed.load(Ordering::SeqCst))
            .finish()
    }
}

/// Read one column. TIMESTAMPTZ arrives as a plain UTC timestamp, so the
/// column type decides whether it keeps its offset.
fn row_to_value(row: &duckdb::Row, idx: usize, with_time_zone: bool) -> Result<Value> {
    let value: DuckValue = row
        .get(idx)
        .map_err(|e| DuckportError::Query(format!("Failed to read column {}: {}", idx, e)))?;
    match value {
        DuckValue::Timestamp(unit, v) if with_time_zone => {
            Ok(Value::DateTimeUtc(timestamp_from_micros(to_micros(unit, v))?))
        }
        other => convert_value(other),
    }
}

pub(crate) fn convert_value(value: DuckValue) -> Result<Value> {
    Ok(match value {
        DuckValue::Null => Value::Null,
        DuckValue::Boolean(b) => Value::Bool(b),
        DuckValue::TinyInt(n) => Value::Int8(n),
        DuckValue::SmallInt(n) => Value::Int16(n),
        DuckValue::Int(n) => Value::Int32(n),
        DuckValue::BigInt(n) => Value::Int64(n),
        DuckValue::HugeInt(n) => Value::Int128(n),
        DuckValue::UTinyInt(n) => Value::UInt8(n),
        DuckValue::USmallInt(n) => Value::UInt16(n),
        DuckValue::UInt(n) => Value::UInt32(n),
        DuckValue::UBigInt(n) => Value::UInt64(n),
        DuckValue::Float(n) => Value::Float32(n),
        DuckValue::Double(n) => Value::Float64(n),
        DuckValue::Decimal(d) => Value::Decimal(d.to_string()),
        DuckValue::Text(s) => Value::String(s),
        DuckValue::Enum(s) => Value::String(s),
        DuckValue::Blob(b) => Value::Bytes(b),
        DuckValue::Date32(days) => Value::Date(date_from_days(days)?),
        DuckValue::Time64(unit, v) => Value::Time(time_from_micros(to_micros(unit, v))?),
        DuckValue::Timestamp(unit, v) => {
            Value::DateTime(timestamp_from_micros(to_micros(unit, v))?.naive_utc())
        }
        DuckValue::Interval {
            months,
            days,
            nanos,
        } => Value::Interval {
            months,
            days,
            micros: nanos / 1_000,
        },
        DuckValue::List(items) | DuckValue::Array(items) => Value::List(
            items
                .into_iter()
                .map(convert_value)
                .collect::<Result<Vec<_>>>()?,
        ),
        DuckValue::Struct(fields) => Value::Struct(
            fields
                .iter()
                .map(|(name, value)| Ok((name.clone(), convert_value(value.clone())?)))
                .collect::<Result<Vec<_>>>()?,
        ),
        DuckValue::Map(entries) => Value::Map(
            entries
                .iter()
                .map(|(key, value)| {
                    Ok((convert_value(key.clone())?, convert_value(value.clone())?))
                })
                .collect::<Result<Vec<_>>>()?,
        ),
        DuckValue::Union(inner) => convert_value(*inner)?,
    })
}

fn timestamp_from_micros(micros: i64) -> Result<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_micros(micros).ok_or_else(|| {
        DuckportError::UnsupportedValue(format!("timestamp out of range: {}", micros))
    })
}

fn to_micros(unit: TimeUnit, value: i64) -> i64 {
    match unit {
        TimeUnit::Second => value * 1_000_000,
        TimeUnit::Millisecond => value * 1_000,
        TimeUnit::Microsecond => value,
        TimeUnit::Nanosecond => value / 1_000,
    }
}

fn date_from_days(days: i32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(1970, 1, 1)
        .and_then(|epoch| epoch.checked_add_signed(chrono::Duration::days(days as i64)))
        .ok_or_else(|| DuckportError::UnsupportedValue(format!("date out of range: {}", days)))
}

fn time_from_micros(micros: i64) -> Result<NaiveTime> {
    let secs = micros.div_euclid(1_000_000);
    let nanos = micros.rem_euclid(1_000_000) * 1_000;
    NaiveTime::from_num_seconds_from_midnight_opt(secs as u32, nanos as u32)
        .ok_or_else(|| DuckportError::UnsupportedValue(format!("time out of range: {}", micros)))
}

fn values_to_duckdb(values: &[Value]) -> Vec<DuckValue> {
    values.iter().map(value_to_duckdb).collect()
}

fn value_to_duckdb(value: &Value) -> DuckValue {
    match value {
        Value::Null => DuckValue::Null,
        Value::Bool(b) => DuckValue::Boolean(*b),
        Value::Int8(i) => DuckValue::TinyInt(*i),
        Value::Int16(i) => DuckValue::SmallInt(*i),
        Value::Int32(i) => DuckValue::Int(*i),
        Value::Int64(i) => DuckValue::BigInt(*i),
        Value::Int128(i) => DuckValue::HugeInt(*i),
        Value::UInt8(i) => DuckValue::UTinyInt(*i),
        Value::UInt16(i) => DuckValue::USmallInt(*i),
        Value::UInt32(i) => DuckValue::UInt(*i),
        Value::UInt64(i) => DuckValue::UBigInt(*i),
        Value::Float32(f) => DuckValue::Float(*f),
        Value::Float64(f) => DuckValue::Double(*f),
        Value::Bytes(b) => DuckValue::Blob(b.clone()),
        // Text-like values are bound as strings and cast by the engine
        other => DuckValue::Text(other.to_string()),
    }
}
