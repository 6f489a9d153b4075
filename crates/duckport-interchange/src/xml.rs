//! XML document writer

use duckport_core::{Row, TableDescriptor};
use std::io::{self, Write};

use crate::value_encoding::{escape_markup, escape_markup_text};

/// Write a table as an XML document.
///
/// Each record becomes a `<row>` holding one child element per column, named
/// after the column.
pub(crate) fn write_document<W: Write>(
    out: &mut W,
    table: &TableDescriptor,
    rows: &[Row],
) -> io::Result<()> {
    let elements: Vec<String> = table.columns.iter().map(|c| element_name(&c.name)).collect();

    out.write_all(b"<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n")?;
    writeln!(out, "<table name=\"{}\">", escape_markup_text(&table.name))?;

    out.write_all(b"  <columns>\n")?;
    for column in &table.columns {
        writeln!(out, "    <column>{}</column>", escape_markup_text(&column.name))?;
    }
    out.write_all(b"  </columns>\n")?;

    out.write_all(b"  <rows>\n")?;
    for row in rows {
        out.write_all(b"    <row>\n")?;
        for (element, value) in elements.iter().zip(&row.values) {
            writeln!(
                out,
                "      <{}>{}</{}>",
                element,
                escape_markup(value),
                element
            )?;
        }
        out.write_all(b"    </row>\n")?;
    }
    out.write_all(b"  </rows>\n")?;

    out.write_all(b"</table>\n")
}

/// Map a column name onto a well-formed element name. Characters that may
/// not appear in a name become `_`; a name that cannot start an element gets
/// a leading `_`.
pub(crate) fn element_name(column: &str) -> String {
    let mut name: String = column
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if !name
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
    {
        name.insert(0, '_');
    }
    name
}
