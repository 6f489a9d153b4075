//! DuckDB schema introspection implementation

use async_trait::async_trait;
use duckport_core::{
    ColumnDefault, ColumnDescriptor, Connection, DuckportError, Result, SchemaIntrospection,
    Value, quote_identifier,
};

use super::DuckDbConnection;

const TABLE_SCOPE: &str =
    "database_name = current_database() AND schema_name = current_schema() AND NOT internal";

#[async_trait]
impl SchemaIntrospection for DuckDbConnection {
    async fn list_tables(&self) -> Result<Vec<String>> {
        let result = self
            .query(
                &format!(
                    "SELECT table_name FROM duckdb_tables() WHERE {} ORDER BY table_name",
                    TABLE_SCOPE
                ),
                &[],
            )
            .await?;

        Ok(result
            .rows
            .iter()
            .filter_map(|row| row.get(0).and_then(|v| v.as_str()).map(|s| s.to_string()))
            .collect())
    }

    async fn row_count(&self, table: &str) -> Result<u64> {
        let result = self
            .query(
                &format!("SELECT COUNT(*) FROM {}", quote_identifier(table)),
                &[],
            )
            .await?;

        Ok(result
            .scalar()
            .and_then(|v| v.as_i64())
            .map(|n| n.max(0) as u64)
            .unwrap_or(0))
    }

    async fn get_columns(&self, table: &str) -> Result<Vec<ColumnDescriptor>> {
        let result = self
            .query(
                "SELECT column_name, data_type, is_nullable, column_default, column_index
                 FROM duckdb_columns()
                 WHERE database_name = current_database()
                   AND schema_name = current_schema()
                   AND lower(table_name) = lower(?)
                 ORDER BY column_index",
                &[Value::String(table.to_string())],
            )
            .await?;

        Ok(result
            .rows
            .iter()
            .map(|row| ColumnDescriptor {
                name: row
                    .get(0)
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_string(),
                data_type: row
                    .get(1)
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_string(),
                not_null: !row.get(2).and_then(|v| v.as_bool()).unwrap_or(true),
                default_value: row
                    .get(3)
                    .and_then(|v| v.as_str())
                    .map(parse_default),
                ordinal: row
                    .get(4)
                    .and_then(|v| v.as_i64())
                    .map(|i| (i - 1).max(0) as usize)
                    .unwrap_or(0),
            })
            .collect())
    }

    async fn table_definition(&self, table: &str) -> Result<String> {
        let result = self
            .query(
                &format!(
                    "SELECT sql FROM duckdb_tables() WHERE {} AND lower(table_name) = lower(?)",
                    TABLE_SCOPE
                ),
                &[Value::String(table.to_string())],
            )
            .await?;

        result
            .scalar()
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| DuckportError::TableNotFound(table.to_string()))
    }
}

/// Classify the engine's default expression text.
///
/// Quoted strings, numbers, booleans and NULL become literal values; any
/// other expression (function calls, casts, special registers) is kept as
/// SQL text.
pub(crate) fn parse_default(expr: &str) -> ColumnDefault {
    let trimmed = expr.trim();
    let literal = if let Some(inner) = trimmed
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        && !inner.replace("''", "").contains('\'')
    {
        Value::String(inner.replace("''", "'"))
    } else if trimmed.eq_ignore_ascii_case("null") {
        Value::Null
    } else if trimmed.eq_ignore_ascii_case("true") {
        Value::Bool(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Value::Bool(false)
    } else if let Ok(n) = trimmed.parse::<i64>() {
        Value::Int64(n)
    } else if let Ok(f) = trimmed.parse::<f64>()
        && f.is_finite()
    {
        Value::Float64(f)
    } else {
        return ColumnDefault::Expression(trimmed.to_string());
    };
    ColumnDefault::Literal(literal)
}
