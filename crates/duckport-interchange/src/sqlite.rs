//! SQLite file writer
//!
//! Tables are created from the reconstructed DDL and filled with
//! parameterized inserts, one transaction per table. When an insert fails
//! the rows written before it are still committed.

use duckport_core::{Row, TableDescriptor, Value};
use rusqlite::types::Value as SqliteValue;
use std::path::{Path, PathBuf};

use crate::ddl::{insert_placeholders, sqlite_create_table_sql};

pub(crate) struct SqliteWriter {
    connection: rusqlite::Connection,
    path: PathBuf,
}

impl SqliteWriter {
    /// Open (or create) the destination database file
    pub(crate) fn open(path: &Path) -> rusqlite::Result<Self> {
        let connection = rusqlite::Connection::open(path)?;
        tracing::debug!(path = %path.display(), "opened SQLite export target");
        Ok(Self {
            connection,
            path: path.to_path_buf(),
        })
    }

    /// Create `table` and insert every row, returning the number inserted
    pub(crate) fn write_table(
        &mut self,
        table: &TableDescriptor,
        rows: &[Row],
    ) -> rusqlite::Result<u64> {
        let ddl = sqlite_create_table_sql(table);
        self.connection.execute(ddl.trim_end_matches(';'), [])?;

        let tx = self.connection.transaction()?;
        let outcome = insert_rows(&tx, table, rows);
        tx.commit()?;

        let inserted = outcome?;
        tracing::debug!(table = %table.name, rows = inserted, "table written to SQLite");
        Ok(inserted)
    }

    /// Close the file, releasing the handle even when closing reports an error
    pub(crate) fn close(self) -> rusqlite::Result<()> {
        let path = self.path;
        self.connection.close().map_err(|(_, e)| e)?;
        tracing::debug!(path = %path.display(), "closed SQLite export target");
        Ok(())
    }
}

fn insert_rows(
    tx: &rusqlite::Transaction<'_>,
    table: &TableDescriptor,
    rows: &[Row],
) -> rusqlite::Result<u64> {
    if rows.is_empty() {
        return Ok(0);
    }
    let mut stmt = tx.prepare(&insert_placeholders(table))?;
    let mut inserted = 0;
    for row in rows {
        stmt.execute(rusqlite::params_from_iter(
            row.values.iter().map(value_to_rusqlite),
        ))?;
        inserted += 1;
    }
    Ok(inserted)
}

/// Convert a value to the closest SQLite storage class
pub(crate) fn value_to_rusqlite(value: &Value) -> SqliteValue {
    match value {
        Value::Null => SqliteValue::Null,
        Value::Bool(b) => SqliteValue::Integer(if *b { 1 } else { 0 }),
        Value::Int8(i) => SqliteValue::Integer(*i as i64),
        Value::Int16(i) => SqliteValue::Integer(*i as i64),
        Value::Int32(i) => SqliteValue::Integer(*i as i64),
        Value::Int64(i) => SqliteValue::Integer(*i),
        Value::UInt8(i) => SqliteValue::Integer(*i as i64),
        Value::UInt16(i) => SqliteValue::Integer(*i as i64),
        Value::UInt32(i) => SqliteValue::Integer(*i as i64),
        Value::UInt64(i) => match i64::try_from(*i) {
            Ok(n) => SqliteValue::Integer(n),
            Err(_) => SqliteValue::Text(i.to_string()),
        },
        Value::Int128(i) => match i64::try_from(*i) {
            Ok(n) => SqliteValue::Integer(n),
            Err(_) => SqliteValue::Text(i.to_string()),
        },
        Value::Float32(f) => SqliteValue::Real(*f as f64),
        Value::Float64(f) => SqliteValue::Real(*f),
        Value::Decimal(d) => SqliteValue::Text(d.clone()),
        Value::String(s) => SqliteValue::Text(s.clone()),
        Value::Bytes(b) => SqliteValue::Blob(b.clone()),
        Value::List(_) | Value::Struct(_) | Value::Map(_) => {
            SqliteValue::Text(value.to_json().to_string())
        }
        other => SqliteValue::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duckport_core::ColumnDescriptor;
    use std::sync::Arc;

    fn table() -> TableDescriptor {
        TableDescriptor::new(
            "t",
            vec![
                ColumnDescriptor::new("id", "INTEGER").not_null(),
                ColumnDescriptor::new("name", "VARCHAR"),
            ],
        )
    }

    fn row(id: i32, name: Value) -> Row {
        let columns: Arc<[String]> = vec!["id".to_string(), "name".to_string()].into();
        Row::new(columns, vec![Value::Int32(id), name])
    }

    #[test]
    fn test_write_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.sqlite");

        let mut writer = SqliteWriter::open(&path).unwrap();
        let rows = vec![row(1, Value::String("A".into())), row(2, Value::Null)];
        assert_eq!(writer.write_table(&table(), &rows).unwrap(), 2);
        writer.close().unwrap();

        let conn = rusqlite::Connection::open(&path).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM t WHERE name IS NULL", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_failed_insert_keeps_earlier_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.sqlite");

        let mut writer = SqliteWriter::open(&path).unwrap();
        let columns: Arc<[String]> = vec!["id".to_string(), "name".to_string()].into();
        let rows = vec![
            row(1, Value::String("A".into())),
            Row::new(columns, vec![Value::Null, Value::String("B".into())]),
        ];
        assert!(writer.write_table(&table(), &rows).is_err());
        writer.close().unwrap();

        let conn = rusqlite::Connection::open(&path).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM t", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_value_to_rusqlite() {
        assert_eq!(value_to_rusqlite(&Value::Bool(true)), SqliteValue::Integer(1));
        assert_eq!(
            value_to_rusqlite(&Value::UInt64(u64::MAX)),
            SqliteValue::Text(u64::MAX.to_string())
        );
        assert_eq!(
            value_to_rusqlite(&Value::List(vec![Value::Int32(1), Value::String("a".into())])),
            SqliteValue::Text("[1,\"a\"]".to_string())
        );
        assert_eq!(value_to_rusqlite(&Value::Null), SqliteValue::Null);
        assert_eq!(
            value_to_rusqlite(&Value::Struct(vec![
                ("a".into(), Value::Int32(1)),
                ("b".into(), Value::String("x".into())),
            ])),
            SqliteValue::Text("{\"a\":1,\"b\":\"x\"}".to_string())
        );
        assert_eq!(
            value_to_rusqlite(&Value::Map(vec![(Value::String("k".into()), Value::Int32(2))])),
            SqliteValue::Text("{\"k\":2}".to_string())
        );
    }

    #[test]
    fn test_write_nested_columns_and_expression_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.sqlite");
        let table = TableDescriptor::new(
            "nested",
            vec![
                ColumnDescriptor::new("id", "INTEGER").with_default_expression("nextval('s')"),
                ColumnDescriptor::new("meta", "STRUCT(a INTEGER)"),
                ColumnDescriptor::new("point", "INTEGER[2]"),
            ],
        );
        let columns: Arc<[String]> =
            vec!["id".to_string(), "meta".to_string(), "point".to_string()].into();
        let rows = vec![Row::new(
            columns,
            vec![
                Value::Int32(1),
                Value::Struct(vec![("a".into(), Value::Int32(5))]),
                Value::List(vec![Value::Int32(3), Value::Int32(4)]),
            ],
        )];

        let mut writer = SqliteWriter::open(&path).unwrap();
        assert_eq!(writer.write_table(&table, &rows).unwrap(), 1);
        writer.close().unwrap();

        let conn = rusqlite::Connection::open(&path).unwrap();
        let (meta, point): (String, String) = conn
            .query_row("SELECT meta, point FROM nested", [], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })
            .unwrap();
        assert_eq!(meta, "{\"a\":5}");
        assert_eq!(point, "[3,4]");
    }
}
