//! CREATE TABLE reconstruction and INSERT statement generation

use duckport_core::{ColumnDefault, ColumnDescriptor, TableDescriptor, Value};

use crate::value_encoding::{sql_identifier, sql_literal};

/// Rebuild a `CREATE TABLE` statement from introspected column metadata.
///
/// One column clause per line, indented four spaces, in native column order:
///
/// ```text
/// CREATE TABLE users (
///     id INTEGER NOT NULL,
///     status VARCHAR DEFAULT 'pending'
/// );
/// ```
pub fn create_table_sql(table: &TableDescriptor) -> String {
    let columns: Vec<String> = table
        .columns
        .iter()
        .map(|column| {
            column_clause(
                column,
                &column.data_type,
                column.default_value.as_ref().map(default_sql),
            )
        })
        .collect();
    build_create_table(table, &columns)
}

/// `CREATE TABLE` in SQLite's dialect.
///
/// Nested types (lists, fixed arrays, structs, maps, unions) are declared as
/// TEXT since their values are stored as JSON. Clock defaults become SQLite's
/// `CURRENT_*` keywords; other default expressions, such as `nextval(...)`,
/// are left out.
pub(crate) fn sqlite_create_table_sql(table: &TableDescriptor) -> String {
    let columns: Vec<String> = table
        .columns
        .iter()
        .map(|column| {
            let default = match &column.default_value {
                Some(ColumnDefault::Expression(expr)) => {
                    sqlite_time_keyword(expr).map(str::to_string)
                }
                Some(default) => Some(default_sql(default)),
                None => None,
            };
            column_clause(column, sqlite_type(&column.data_type), default)
        })
        .collect();
    build_create_table(table, &columns)
}

fn build_create_table(table: &TableDescriptor, columns: &[String]) -> String {
    format!(
        "CREATE TABLE {} (\n    {}\n);",
        sql_identifier(&table.name),
        columns.join(",\n    ")
    )
}

fn column_clause(column: &ColumnDescriptor, data_type: &str, default: Option<String>) -> String {
    let mut clause = format!("{} {}", sql_identifier(&column.name), data_type);
    clause.truncate(clause.trim_end().len());
    if column.not_null {
        clause.push_str(" NOT NULL");
    }
    if let Some(default) = default {
        clause.push_str(" DEFAULT ");
        clause.push_str(&default);
    }
    clause
}

fn default_sql(default: &ColumnDefault) -> String {
    match default {
        ColumnDefault::Literal(value) => sql_literal(value),
        ColumnDefault::Expression(expr) => expr.clone(),
    }
}

fn sqlite_type(data_type: &str) -> &str {
    let upper = data_type.trim().to_ascii_uppercase();
    let nested = upper.ends_with(']')
        || ["STRUCT", "MAP", "UNION"]
            .iter()
            .any(|prefix| upper.starts_with(prefix));
    if nested { "TEXT" } else { data_type }
}

/// The SQLite keyword for a clock default, under any of the engine's spellings
fn sqlite_time_keyword(expr: &str) -> Option<&'static str> {
    let normalized = expr.trim().to_ascii_lowercase();
    match normalized.trim_end_matches("()") {
        "current_timestamp" | "now" | "get_current_timestamp" => Some("CURRENT_TIMESTAMP"),
        "current_date" => Some("CURRENT_DATE"),
        "current_time" => Some("CURRENT_TIME"),
        _ => None,
    }
}

fn column_list(table: &TableDescriptor) -> String {
    table
        .columns
        .iter()
        .map(|c| sql_identifier(&c.name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// One `INSERT INTO t (cols) VALUES (...);` statement for a row
pub fn insert_statement(table: &TableDescriptor, values: &[Value]) -> String {
    let values: Vec<String> = values.iter().map(sql_literal).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({});",
        sql_identifier(&table.name),
        column_list(table),
        values.join(", ")
    )
}

/// Parameterized insert with one `?` per column
pub(crate) fn insert_placeholders(table: &TableDescriptor) -> String {
    let placeholders = vec!["?"; table.column_count()].join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        sql_identifier(&table.name),
        column_list(table),
        placeholders
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn users() -> TableDescriptor {
        TableDescriptor::new(
            "users",
            vec![
                ColumnDescriptor::new("id", "INTEGER").not_null(),
                ColumnDescriptor::new("name", "VARCHAR"),
                ColumnDescriptor::new("status", "VARCHAR")
                    .not_null()
                    .with_default(Value::String("it's new".into())),
                ColumnDescriptor::new("score", "DOUBLE").with_default(Value::Float64(0.5)),
            ],
        )
    }

    #[test]
    fn test_create_table_sql() {
        assert_eq!(
            create_table_sql(&users()),
            "CREATE TABLE users (\n    id INTEGER NOT NULL,\n    name VARCHAR,\n    status VARCHAR NOT NULL DEFAULT 'it''s new',\n    score DOUBLE DEFAULT 0.5\n);"
        );
    }

    #[test]
    fn test_not_null_clause_has_no_trailing_default() {
        let sql = create_table_sql(&users());
        assert!(sql.contains("    id INTEGER NOT NULL,\n"));
        assert!(!sql.contains("  NOT NULL"));
        assert!(!sql.contains("NOT NULL ,"));
    }

    #[test]
    fn test_null_default_is_rendered() {
        let table = TableDescriptor::new(
            "t",
            vec![ColumnDescriptor::new("note", "VARCHAR").with_default(Value::Null)],
        );
        assert_eq!(
            create_table_sql(&table),
            "CREATE TABLE t (\n    note VARCHAR DEFAULT NULL\n);"
        );
    }

    #[test]
    fn test_odd_identifiers_are_quoted() {
        let table = TableDescriptor::new(
            "order items",
            vec![ColumnDescriptor::new("unit price", "DECIMAL(10,2)")],
        );
        assert_eq!(
            create_table_sql(&table),
            "CREATE TABLE \"order items\" (\n    \"unit price\" DECIMAL(10,2)\n);"
        );
    }

    #[test]
    fn test_default_expression_is_written_raw() {
        let table = TableDescriptor::new(
            "events",
            vec![
                ColumnDescriptor::new("id", "INTEGER").with_default_expression("nextval('event_seq')"),
                ColumnDescriptor::new("created", "TIMESTAMP")
                    .with_default_expression("CURRENT_TIMESTAMP"),
            ],
        );
        assert_eq!(
            create_table_sql(&table),
            "CREATE TABLE events (\n    id INTEGER DEFAULT nextval('event_seq'),\n    created TIMESTAMP DEFAULT CURRENT_TIMESTAMP\n);"
        );
    }

    #[test]
    fn test_sqlite_create_table_sql() {
        let table = TableDescriptor::new(
            "events",
            vec![
                ColumnDescriptor::new("id", "INTEGER").with_default_expression("nextval('event_seq')"),
                ColumnDescriptor::new("created", "TIMESTAMP")
                    .with_default_expression("current_timestamp"),
                ColumnDescriptor::new("status", "VARCHAR").with_default(Value::String("new".into())),
                ColumnDescriptor::new("seen", "TIMESTAMPTZ").with_default_expression("now()"),
                ColumnDescriptor::new("tags", "VARCHAR[]"),
                ColumnDescriptor::new("point", "INTEGER[3]"),
                ColumnDescriptor::new("meta", "STRUCT(a INTEGER, b VARCHAR)"),
                ColumnDescriptor::new("attrs", "MAP(VARCHAR, INTEGER)"),
            ],
        );
        assert_eq!(
            sqlite_create_table_sql(&table),
            "CREATE TABLE events (\n    id INTEGER,\n    created TIMESTAMP DEFAULT CURRENT_TIMESTAMP,\n    status VARCHAR DEFAULT 'new',\n    seen TIMESTAMPTZ DEFAULT CURRENT_TIMESTAMP,\n    tags TEXT,\n    point TEXT,\n    meta TEXT,\n    attrs TEXT\n);"
        );
    }

    #[test]
    fn test_insert_statement() {
        let table = TableDescriptor::new(
            "t",
            vec![
                ColumnDescriptor::new("id", "INTEGER"),
                ColumnDescriptor::new("name", "VARCHAR"),
            ],
        );
        assert_eq!(
            insert_statement(&table, &[Value::Int32(2), Value::Null]),
            "INSERT INTO t (id, name) VALUES (2, NULL);"
        );
        assert_eq!(
            insert_statement(&table, &[Value::Int32(1), Value::String("O'Brien".into())]),
            "INSERT INTO t (id, name) VALUES (1, 'O''Brien');"
        );
        assert_eq!(
            insert_placeholders(&table),
            "INSERT INTO t (id, name) VALUES (?, ?)"
        );
    }
}
