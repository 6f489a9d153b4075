//! Terminal tables for command output

use comfy_table::{Cell, ContentArrangement, Table, presets::UTF8_FULL};
use duckport_core::{QueryResult, TableDescriptor, TableSummary};

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub fn summaries_table(summaries: &[TableSummary]) -> Table {
    let mut table = new_table(vec!["Table", "Rows"]);
    for summary in summaries {
        table.add_row(vec![
            Cell::new(&summary.name),
            Cell::new(summary.row_count),
        ]);
    }
    table
}

pub fn columns_table(descriptor: &TableDescriptor) -> Table {
    let mut table = new_table(vec!["#", "Column", "Type", "Not null", "Default"]);
    for column in &descriptor.columns {
        table.add_row(vec![
            Cell::new(column.ordinal + 1),
            Cell::new(&column.name),
            Cell::new(&column.data_type),
            Cell::new(if column.not_null { "yes" } else { "" }),
            Cell::new(
                column
                    .default_value
                    .as_ref()
                    .map(|value| value.to_string())
                    .unwrap_or_default(),
            ),
        ]);
    }
    table
}

/// Rows of a query result; NULLs render as `NULL`
pub fn result_table(result: &QueryResult) -> Table {
    let mut table = new_table(result.columns.iter().map(|c| c.name.as_str()).collect());
    for row in &result.rows {
        table.add_row(row.values.iter().map(|value| Cell::new(value.to_string())));
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use duckport_core::{ColumnDescriptor, ColumnMeta, Row, Value};
    use std::sync::Arc;

    #[test]
    fn test_summaries_table() {
        let rendered = summaries_table(&[
            TableSummary {
                name: "orders".into(),
                row_count: 12,
            },
            TableSummary {
                name: "users".into(),
                row_count: 0,
            },
        ])
        .to_string();

        assert!(rendered.contains("Table"));
        assert!(rendered.contains("orders"));
        assert!(rendered.contains("12"));
        assert!(rendered.contains("users"));
    }

    #[test]
    fn test_columns_table() {
        let descriptor = TableDescriptor::new(
            "users",
            vec![
                ColumnDescriptor::new("id", "INTEGER").not_null(),
                ColumnDescriptor {
                    ordinal: 1,
                    ..ColumnDescriptor::new("status", "VARCHAR")
                        .with_default(Value::String("active".into()))
                },
            ],
        );

        let rendered = columns_table(&descriptor).to_string();
        assert!(rendered.contains("INTEGER"));
        assert!(rendered.contains("yes"));
        assert!(rendered.contains("active"));
    }

    #[test]
    fn test_result_table_shows_null() {
        let result = QueryResult {
            columns: vec![
                ColumnMeta {
                    name: "id".into(),
                    data_type: "INTEGER".into(),
                    ordinal: 0,
                },
                ColumnMeta {
                    name: "name".into(),
                    data_type: "VARCHAR".into(),
                    ordinal: 1,
                },
            ],
            rows: vec![Row::new(
                Arc::from(vec!["id".to_string(), "name".to_string()]),
                vec![Value::Int32(7), Value::Null],
            )],
            execution_time_ms: 0,
        };

        let rendered = result_table(&result).to_string();
        assert!(rendered.contains("name"));
        assert!(rendered.contains('7'));
        assert!(rendered.contains("NULL"));
    }
}
