//! Schema introspection traits and types

use crate::{DuckportError, Result, Value};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Schema introspection interface
#[async_trait]
pub trait SchemaIntrospection: Send + Sync {
    /// List table names in the order the engine reports them
    async fn list_tables(&self) -> Result<Vec<String>>;

    /// Exact row count for a table
    async fn row_count(&self, table: &str) -> Result<u64>;

    /// Column metadata for a table, in native column order.
    /// Returns an empty list when the table does not exist.
    async fn get_columns(&self, table: &str) -> Result<Vec<ColumnDescriptor>>;

    /// The engine's canonical create-statement for a table
    async fn table_definition(&self, table: &str) -> Result<String>;

    /// Build a table descriptor, failing when the engine reports no columns
    async fn describe_table(&self, table: &str) -> Result<TableDescriptor> {
        let columns = self.get_columns(table).await?;
        if columns.is_empty() {
            return Err(DuckportError::TableNotFound(table.to_string()));
        }
        Ok(TableDescriptor {
            name: table.to_string(),
            columns,
        })
    }
}

/// Column metadata as reported by engine introspection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ColumnDescriptor {
    /// Column name
    pub name: String,
    /// Engine-native type name
    pub data_type: String,
    /// Whether the column carries a NOT NULL constraint
    pub not_null: bool,
    /// Declared default, if any
    pub default_value: Option<ColumnDefault>,
    /// Column ordinal position (0-based)
    pub ordinal: usize,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            ..Default::default()
        }
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(ColumnDefault::Literal(value));
        self
    }

    pub fn with_default_expression(mut self, expression: impl Into<String>) -> Self {
        self.default_value = Some(ColumnDefault::Expression(expression.into()));
        self
    }
}

/// A column default: either a constant or an expression the engine evaluates
/// on insert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnDefault {
    Literal(Value),
    /// Engine SQL text, e.g. `nextval('seq')` or `CURRENT_TIMESTAMP`
    Expression(String),
}

impl std::fmt::Display for ColumnDefault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnDefault::Literal(value) => write!(f, "{}", value),
            ColumnDefault::Expression(expr) => f.write_str(expr),
        }
    }
}

/// A table name plus its ordered columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDescriptor {
    /// Table name
    pub name: String,
    /// Columns in native order
    pub columns: Vec<ColumnDescriptor>,
}

impl TableDescriptor {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Column names in native order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

/// Table name with its exact row count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSummary {
    pub name: String,
    pub row_count: u64,
}
