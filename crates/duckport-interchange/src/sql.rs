//! SQL script writer

use duckport_core::{Row, TableDescriptor};
use std::io::{self, Write};

use crate::ddl::{create_table_sql, insert_statement};

/// Write the reconstructed `CREATE TABLE` statement followed by a newline
pub(crate) fn write_structure<W: Write>(out: &mut W, table: &TableDescriptor) -> io::Result<()> {
    writeln!(out, "{}", create_table_sql(table))
}

/// Write the `CREATE TABLE` statement, a blank line, then one `INSERT` per row
pub(crate) fn write_table<W: Write>(
    out: &mut W,
    table: &TableDescriptor,
    rows: &[Row],
) -> io::Result<()> {
    write!(out, "{}\n\n", create_table_sql(table))?;
    for row in rows {
        writeln!(out, "{}", insert_statement(table, &row.values))?;
    }
    Ok(())
}
