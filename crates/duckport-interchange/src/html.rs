//! HTML table writer

use duckport_core::{Row, TableDescriptor};
use std::io::{self, Write};

use crate::value_encoding::{escape_markup, escape_markup_text};

pub(crate) const SINGLE_TABLE_TITLE: &str = "Table Export";
pub(crate) const ALL_TABLES_TITLE: &str = "All Tables Export";

pub(crate) const SINGLE_TABLE_STYLESHEET: &str = "\
table { border-collapse: collapse; width: 100%; }
th, td { border: 1px solid #ddd; padding: 8px; text-align: left; }
th { background-color: #f2f2f2; }
tr:nth-child(even) { background-color: #f9f9f9; }
";

pub(crate) const ALL_TABLES_STYLESHEET: &str = "\
table { border-collapse: collapse; width: 100%; margin-bottom: 20px; }
th, td { border: 1px solid #ddd; padding: 8px; text-align: left; white-space: pre-wrap; }
th { background-color: #f2f2f2; }
tr:nth-child(even) { background-color: #f9f9f9; }
";

/// Doctype, head with title and stylesheet, and the opening `<body>`
pub(crate) fn write_head<W: Write>(out: &mut W, title: &str, stylesheet: &str) -> io::Result<()> {
    out.write_all(b"<!DOCTYPE html>\n<html>\n<head>\n")?;
    writeln!(out, "<title>{}</title>", title)?;
    write!(out, "<style>\n{}</style>\n", stylesheet)?;
    out.write_all(b"</head>\n<body>\n")
}

/// One `<h2>` heading and `<table>` with a header row and a row per record
pub(crate) fn write_table<W: Write>(
    out: &mut W,
    table: &TableDescriptor,
    rows: &[Row],
) -> io::Result<()> {
    writeln!(out, "<h2>Table: {}</h2>", escape_markup_text(&table.name))?;
    out.write_all(b"<table>\n")?;

    out.write_all(b"<tr>\n")?;
    for column in &table.columns {
        writeln!(out, "<th>{}</th>", escape_markup_text(&column.name))?;
    }
    out.write_all(b"</tr>\n")?;

    for row in rows {
        out.write_all(b"<tr>\n")?;
        for value in &row.values {
            writeln!(out, "<td>{}</td>", escape_markup(value))?;
        }
        out.write_all(b"</tr>\n")?;
    }

    out.write_all(b"</table>\n")
}

/// Close the document. No newline follows `</html>`.
pub(crate) fn write_tail<W: Write>(out: &mut W) -> io::Result<()> {
    out.write_all(b"</body>\n</html>")
}

/// Write a complete single-table document
pub(crate) fn write_document<W: Write>(
    out: &mut W,
    table: &TableDescriptor,
    rows: &[Row],
) -> io::Result<()> {
    write_head(out, SINGLE_TABLE_TITLE, SINGLE_TABLE_STYLESHEET)?;
    write_table(out, table, rows)?;
    write_tail(out)
}
