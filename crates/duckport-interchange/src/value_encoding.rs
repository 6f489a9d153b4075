//! Value rendering for SQL and markup targets
//!
//! SQL literals double embedded single quotes and wrap text-like values in
//! quotes. Markup text replaces `& < > " '` in that order so entities
//! introduced by one substitution are never escaped again.

use duckport_core::{Value, quote_identifier, quote_literal};

/// Render a value as a SQL literal
pub fn sql_literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::String(s) => quote_literal(s),
        Value::Float32(f) if !f.is_finite() => quote_literal(float_special_label(*f as f64)),
        Value::Float64(f) if !f.is_finite() => quote_literal(float_special_label(*f)),
        Value::List(items) => {
            let items: Vec<String> = items.iter().map(sql_literal).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Struct(fields) => {
            let fields: Vec<String> = fields
                .iter()
                .map(|(name, value)| format!("{}: {}", quote_literal(name), sql_literal(value)))
                .collect();
            format!("{{{}}}", fields.join(", "))
        }
        Value::Map(entries) => {
            let entries: Vec<String> = entries
                .iter()
                .map(|(key, value)| format!("{}: {}", sql_literal(key), sql_literal(value)))
                .collect();
            format!("MAP {{{}}}", entries.join(", "))
        }
        other if other.is_text_like() => quote_literal(&other.to_string()),
        other => other.to_string(),
    }
}

fn float_special_label(value: f64) -> &'static str {
    if value.is_nan() {
        "NaN"
    } else if value.is_sign_positive() {
        "Infinity"
    } else {
        "-Infinity"
    }
}

/// Render a value as markup text. NULL becomes the literal text `NULL`.
pub fn escape_markup(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        other => escape_markup_text(&other.to_string()),
    }
}

/// Replace the five markup metacharacters with entity references
pub fn escape_markup_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Render a table or column name for generated SQL.
///
/// Plain identifiers are written bare; anything else is double-quoted.
pub fn sql_identifier(name: &str) -> String {
    let mut chars = name.chars();
    let plain = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain {
        name.to_string()
    } else {
        quote_identifier(name)
    }
}
