//! Parameter and result value model.
//!
//! Everything the metadata protocol reads or writes goes through [`Value`],
//! so literal values are always bound as parameters, never spliced into SQL
//! text. Only identifier quoting is string composition.

use crate::error::{DbError, DbResult};
use chrono::{DateTime, Utc};

/// A single bound parameter or result cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

/// One result row.
pub type Row = Vec<Value>;

impl Value {
    /// Text value, or `Null` when `opt` is `None`.
    pub fn opt_text(opt: Option<&str>) -> Self {
        match opt {
            Some(s) => Value::Text(s.to_string()),
            None => Value::Null,
        }
    }

    pub fn as_i64(&self) -> DbResult<i64> {
        match self {
            Value::Int(n) => Ok(*n),
            // Drivers without a native boolean return 0/1 integers and
            // vice versa; tolerate the common crossover.
            Value::Bool(b) => Ok(*b as i64),
            other => Err(type_mismatch("integer", other)),
        }
    }

    pub fn as_bool(&self) -> DbResult<bool> {
        match self {
            Value::Bool(b) => Ok(*b),
            Value::Int(n) => Ok(*n != 0),
            other => Err(type_mismatch("boolean", other)),
        }
    }

    pub fn as_str(&self) -> DbResult<&str> {
        match self {
            Value::Text(s) => Ok(s),
            other => Err(type_mismatch("text", other)),
        }
    }

    /// Text or NULL; anything else is a type mismatch.
    pub fn as_opt_str(&self) -> DbResult<Option<&str>> {
        match self {
            Value::Null => Ok(None),
            Value::Text(s) => Ok(Some(s)),
            other => Err(type_mismatch("text or null", other)),
        }
    }

    pub fn as_timestamp(&self) -> DbResult<DateTime<Utc>> {
        match self {
            Value::Timestamp(ts) => Ok(*ts),
            other => Err(type_mismatch("timestamp", other)),
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Text(_) => "text",
            Value::Timestamp(_) => "timestamp",
        }
    }
}

fn type_mismatch(expected: &'static str, actual: &Value) -> DbError {
    DbError::TypeMismatch {
        expected,
        actual: actual.type_name().to_string(),
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(ts: DateTime<Utc>) -> Self {
        Value::Timestamp(ts)
    }
}

#[cfg(test)]
#[path = "value_test.rs"]
mod tests;
