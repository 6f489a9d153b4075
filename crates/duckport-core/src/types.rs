//! Core types for duckport

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A database value as read from the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// NULL value
    Null,
    /// Boolean
    Bool(bool),
    /// 8-bit signed integer
    Int8(i8),
    /// 16-bit signed integer
    Int16(i16),
    /// 32-bit signed integer
    Int32(i32),
    /// 64-bit signed integer
    Int64(i64),
    /// 128-bit signed integer (HUGEINT)
    Int128(i128),
    /// 8-bit unsigned integer
    UInt8(u8),
    /// 16-bit unsigned integer
    UInt16(u16),
    /// 32-bit unsigned integer
    UInt32(u32),
    /// 64-bit unsigned integer
    UInt64(u64),
    /// 32-bit floating point
    Float32(f32),
    /// 64-bit floating point
    Float64(f64),
    /// Decimal/Numeric (stored as string for precision)
    Decimal(String),
    /// UTF-8 string
    String(String),
    /// Binary data
    Bytes(Vec<u8>),
    /// Date
    Date(NaiveDate),
    /// Time of day
    Time(NaiveTime),
    /// Timestamp without timezone
    DateTime(NaiveDateTime),
    /// Timestamp with time zone, normalized to UTC
    DateTimeUtc(DateTime<Utc>),
    /// Calendar interval
    Interval { months: i32, days: i32, micros: i64 },
    /// List of values (variable or fixed length)
    List(Vec<Value>),
    /// Struct fields in declaration order
    Struct(Vec<(String, Value)>),
    /// Map entries in engine order
    Map(Vec<(Value, Value)>),
}

impl Value {
    /// Try to get as a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as i64
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int8(v) => Some(*v as i64),
            Value::Int16(v) => Some(*v as i64),
            Value::Int32(v) => Some(*v as i64),
            Value::Int64(v) => Some(*v),
            Value::Int128(v) => i64::try_from(*v).ok(),
            Value::UInt8(v) => Some(*v as i64),
            Value::UInt16(v) => Some(*v as i64),
            Value::UInt32(v) => Some(*v as i64),
            Value::UInt64(v) => i64::try_from(*v).ok(),
            Value::String(s) => s.parse::<i64>().ok(),
            _ => None,
        }
    }

    /// Try to get as f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float32(v) => Some(*v as f64),
            Value::Float64(v) => Some(*v),
            Value::Decimal(s) | Value::String(s) => s.parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Try to get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// True for values whose SQL literal form is a quoted string
    /// (strings, blobs, temporal values and intervals).
    pub fn is_text_like(&self) -> bool {
        matches!(
            self,
            Value::String(_)
                | Value::Bytes(_)
                | Value::Date(_)
                | Value::Time(_)
                | Value::DateTime(_)
                | Value::DateTimeUtc(_)
                | Value::Interval { .. }
        )
    }

    /// Render as a JSON value. Numbers that do not fit a JSON number
    /// become strings.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Value::Null => Json::Null,
            Value::Bool(v) => Json::Bool(*v),
            Value::Int8(v) => Json::from(*v),
            Value::Int16(v) => Json::from(*v),
            Value::Int32(v) => Json::from(*v),
            Value::Int64(v) => Json::from(*v),
            Value::UInt8(v) => Json::from(*v),
            Value::UInt16(v) => Json::from(*v),
            Value::UInt32(v) => Json::from(*v),
            Value::UInt64(v) => Json::from(*v),
            Value::Int128(v) => match i64::try_from(*v) {
                Ok(n) => Json::from(n),
                Err(_) => Json::String(v.to_string()),
            },
            Value::Float32(v) => serde_json::Number::from_f64(*v as f64)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::Float64(v) => serde_json::Number::from_f64(*v)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::String(s) => Json::String(s.clone()),
            Value::List(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Struct(fields) => Json::Object(
                fields
                    .iter()
                    .map(|(name, value)| (name.clone(), value.to_json()))
                    .collect(),
            ),
            Value::Map(entries) => Json::Object(
                entries
                    .iter()
                    .map(|(key, value)| (map_key_text(key), value.to_json()))
                    .collect(),
            ),
            other => Json::String(other.to_string()),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int8(v) => write!(f, "{}", v),
            Value::Int16(v) => write!(f, "{}", v),
            Value::Int32(v) => write!(f, "{}", v),
            Value::Int64(v) => write!(f, "{}", v),
            Value::Int128(v) => write!(f, "{}", v),
            Value::UInt8(v) => write!(f, "{}", v),
            Value::UInt16(v) => write!(f, "{}", v),
            Value::UInt32(v) => write!(f, "{}", v),
            Value::UInt64(v) => write!(f, "{}", v),
            Value::Float32(v) => write!(f, "{}", v),
            Value::Float64(v) => write!(f, "{}", v),
            Value::Decimal(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "{}", v),
            Value::Bytes(v) => f.write_str(&blob_to_text(v)),
            Value::Date(v) => write!(f, "{}", v),
            Value::Time(v) => write!(f, "{}", v),
            Value::DateTime(v) => write!(f, "{}", v),
            Value::DateTimeUtc(v) => write!(f, "{}", v.format("%Y-%m-%d %H:%M:%S%.f+00")),
            Value::Interval {
                months,
                days,
                micros,
            } => f.write_str(&interval_to_text(*months, *days, *micros)),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Struct(fields) => {
                f.write_str("{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "'{}': {}", name, value)?;
                }
                f.write_str("}")
            }
            Value::Map(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}={}", key, value)?;
                }
                f.write_str("}")
            }
        }
    }
}

/// JSON object keys are strings; a string key is used as-is
fn map_key_text(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Blob text form: printable ASCII as-is, everything else as `\xHH`.
/// The engine casts this form back to the same bytes.
fn blob_to_text(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        if (0x20..=0x7e).contains(&b) && !matches!(b, b'\\' | b'\'' | b'"') {
            out.push(b as char);
        } else {
            out.push_str(&format!("\\x{:02X}", b));
        }
    }
    out
}

fn interval_to_text(months: i32, days: i32, micros: i64) -> String {
    let mut parts = Vec::new();
    let years = months / 12;
    let months = months % 12;
    if years != 0 {
        parts.push(plural(years as i64, "year"));
    }
    if months != 0 {
        parts.push(plural(months as i64, "month"));
    }
    if days != 0 {
        parts.push(plural(days as i64, "day"));
    }
    if micros != 0 || parts.is_empty() {
        let sign = if micros < 0 { "-" } else { "" };
        let total = micros.unsigned_abs();
        let secs = total / 1_000_000;
        let frac = total % 1_000_000;
        let mut clock = format!(
            "{}{:02}:{:02}:{:02}",
            sign,
            secs / 3600,
            (secs / 60) % 60,
            secs % 60
        );
        if frac != 0 {
            clock.push_str(&format!(".{:06}", frac));
        }
        parts.push(clock);
    }
    parts.join(" ")
}

fn plural(n: i64, unit: &str) -> String {
    if n.abs() == 1 {
        format!("{} {}", n, unit)
    } else {
        format!("{} {}s", n, unit)
    }
}

/// A row from a query result
#[derive(Debug, Clone)]
pub struct Row {
    /// Column values
    pub values: Vec<Value>,
    /// Column names (shared with every row of the result)
    columns: Arc<[String]>,
}

impl Row {
    /// Create a new row
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        Self { values, columns }
    }

    /// Get a value by column index
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Get a value by column name
    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == name)
            .and_then(|idx| self.values.get(idx))
    }

    /// Number of values in the row
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Result column metadata
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ColumnMeta {
    /// Column name
    #[serde(default)]
    pub name: String,
    /// Engine type name, when the engine reports it
    #[serde(default)]
    pub data_type: String,
    /// Column ordinal position (0-based)
    #[serde(default)]
    pub ordinal: usize,
}

/// Query result
#[derive(Debug, Clone)]
pub struct QueryResult {
    /// Column metadata
    pub columns: Vec<ColumnMeta>,
    /// Result rows
    pub rows: Vec<Row>,
    /// Execution time in milliseconds
    pub execution_time_ms: u64,
}

impl QueryResult {
    /// Get the number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Column names in result order
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// First value of the first row, if any
    pub fn scalar(&self) -> Option<&Value> {
        self.rows.first().and_then(|row| row.get(0))
    }
}

/// Result of a statement that does not return rows
#[derive(Debug, Clone, Default)]
pub struct StatementResult {
    /// Rows affected (for DML statements)
    pub affected_rows: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_scalars() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Int64(-42).to_string(), "-42");
        assert_eq!(Value::Float64(1.5).to_string(), "1.5");
        assert_eq!(Value::Decimal("12.340".into()).to_string(), "12.340");
        assert_eq!(Value::String("O'Brien".into()).to_string(), "O'Brien");
    }

    #[test]
    fn test_display_temporal() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let time = NaiveTime::from_hms_opt(14, 30, 45).unwrap();
        assert_eq!(Value::Date(date).to_string(), "2024-06-15");
        assert_eq!(Value::Time(time).to_string(), "14:30:45");
        assert_eq!(
            Value::DateTime(date.and_time(time)).to_string(),
            "2024-06-15 14:30:45"
        );
    }

    #[test]
    fn test_display_interval() {
        let value = Value::Interval {
            months: 14,
            days: 3,
            micros: 3_723_500_000,
        };
        assert_eq!(value.to_string(), "1 year 2 months 3 days 01:02:03.500000");

        let zero = Value::Interval {
            months: 0,
            days: 0,
            micros: 0,
        };
        assert_eq!(zero.to_string(), "00:00:00");
    }

    #[test]
    fn test_display_blob_and_list() {
        assert_eq!(Value::Bytes(vec![b'a', 0x00, 0xff]).to_string(), "a\\x00\\xFF");
        let list = Value::List(vec![Value::Int32(1), Value::Null, Value::Int32(3)]);
        assert_eq!(list.to_string(), "[1, NULL, 3]");
    }

    #[test]
    fn test_display_nested() {
        let value = Value::Struct(vec![
            ("a".into(), Value::Int32(1)),
            ("b".into(), Value::String("x".into())),
        ]);
        assert_eq!(value.to_string(), "{'a': 1, 'b': x}");

        let map = Value::Map(vec![
            (Value::String("k".into()), Value::Int32(1)),
            (Value::String("j".into()), Value::Null),
        ]);
        assert_eq!(map.to_string(), "{k=1, j=NULL}");
    }

    #[test]
    fn test_display_timestamp_with_time_zone() {
        let ts = DateTime::<Utc>::from_timestamp(1_718_461_845, 250_000_000).unwrap();
        assert_eq!(
            Value::DateTimeUtc(ts).to_string(),
            "2024-06-15 14:30:45.250+00"
        );
        let whole = DateTime::<Utc>::from_timestamp(1_718_461_845, 0).unwrap();
        assert_eq!(Value::DateTimeUtc(whole).to_string(), "2024-06-15 14:30:45+00");
    }

    #[test]
    fn test_nested_to_json() {
        let value = Value::Struct(vec![
            ("a".into(), Value::Int32(1)),
            (
                "m".into(),
                Value::Map(vec![(Value::Int32(3), Value::String("c".into()))]),
            ),
        ]);
        assert_eq!(value.to_json(), serde_json::json!({"a": 1, "m": {"3": "c"}}));
    }

    #[test]
    fn test_to_json() {
        assert_eq!(Value::Null.to_json(), serde_json::Value::Null);
        assert_eq!(Value::Int32(7).to_json(), serde_json::json!(7));
        assert_eq!(Value::Float64(f64::NAN).to_json(), serde_json::Value::Null);
        assert_eq!(
            Value::List(vec![Value::String("a".into()), Value::Bool(false)]).to_json(),
            serde_json::json!(["a", false])
        );
        assert_eq!(
            Value::Int128(i128::MAX).to_json(),
            serde_json::json!(i128::MAX.to_string())
        );
    }

    #[test]
    fn test_row_lookup() {
        let columns: Arc<[String]> = vec!["id".to_string(), "name".to_string()].into();
        let row = Row::new(columns, vec![Value::Int32(1), Value::String("A".into())]);
        assert_eq!(row.len(), 2);
        assert_eq!(row.get_by_name("name"), Some(&Value::String("A".into())));
        assert_eq!(row.get_by_name("missing"), None);
    }

    #[test]
    fn test_as_i64_conversions() {
        assert_eq!(Value::UInt64(5).as_i64(), Some(5));
        assert_eq!(Value::UInt64(u64::MAX).as_i64(), None);
        assert_eq!(Value::String("12".into()).as_i64(), Some(12));
        assert_eq!(Value::Float64(1.0).as_i64(), None);
    }
}
