//! Value conversion between Gridline and SQLite
//!
//! SQLite stores everything as one of five storage classes. The declared
//! column type is used to recover booleans and temporal values.

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::{Value as SqliteValue, ValueRef};

use gridline_core::{GridlineError, Result, Value};

pub(crate) fn values_to_sqlite(values: &[Value]) -> Vec<SqliteValue> {
    values.iter().map(value_to_sqlite).collect()
}

fn value_to_sqlite(value: &Value) -> SqliteValue {
    match value {
        Value::Null => SqliteValue::Null,
        Value::Bool(b) => SqliteValue::Integer(i64::from(*b)),
        Value::Int32(i) => SqliteValue::Integer(i64::from(*i)),
        Value::Int64(i) => SqliteValue::Integer(*i),
        Value::Float64(f) => SqliteValue::Real(*f),
        Value::Decimal(d) => SqliteValue::Text(d.clone()),
        Value::String(s) => SqliteValue::Text(s.clone()),
        Value::Bytes(b) => SqliteValue::Blob(b.clone()),
        Value::Uuid(u) => SqliteValue::Text(u.to_string()),
        Value::Date(d) => SqliteValue::Text(d.to_string()),
        Value::Time(t) => SqliteValue::Text(t.to_string()),
        Value::DateTime(dt) => SqliteValue::Text(dt.to_string()),
        Value::DateTimeUtc(dt) => SqliteValue::Text(dt.to_rfc3339()),
        Value::Json(j) => SqliteValue::Text(j.to_string()),
        Value::Enum(e) => SqliteValue::Text(e.case.clone()),
    }
}

/// Declared-type affinity relevant for conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Affinity {
    Boolean,
    Date,
    DateTime,
    Other,
}

impl Affinity {
    fn of(decl_type: &str) -> Self {
        let upper = decl_type.to_ascii_uppercase();
        if upper.starts_with("BOOL") {
            Self::Boolean
        } else if upper.starts_with("DATETIME") || upper.starts_with("TIMESTAMP") {
            Self::DateTime
        } else if upper == "DATE" {
            Self::Date
        } else {
            Self::Other
        }
    }
}

pub(crate) fn sqlite_to_value(row: &rusqlite::Row, idx: usize, decl_type: &str) -> Result<Value> {
    let value_ref = row
        .get_ref(idx)
        .map_err(|e| GridlineError::Query(e.to_string()))?;

    let affinity = Affinity::of(decl_type);
    let value = match value_ref {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) if affinity == Affinity::Boolean => Value::Bool(i != 0),
        ValueRef::Integer(i) => Value::Int64(i),
        ValueRef::Real(f) => Value::Float64(f),
        ValueRef::Text(bytes) => text_value(&String::from_utf8_lossy(bytes), affinity),
        // BLOBs written by other tools often hold text
        ValueRef::Blob(b) => match std::str::from_utf8(b) {
            Ok(s) => Value::String(s.to_string()),
            Err(_) => Value::Bytes(b.to_vec()),
        },
    };
    Ok(value)
}

fn text_value(text: &str, affinity: Affinity) -> Value {
    match affinity {
        Affinity::Date => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map(Value::Date)
            .unwrap_or_else(|_| Value::String(text.to_string())),
        Affinity::DateTime => parse_datetime(text)
            .map(Value::DateTime)
            .unwrap_or_else(|| Value::String(text.to_string())),
        Affinity::Boolean | Affinity::Other => Value::String(text.to_string()),
    }
}

fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
}
