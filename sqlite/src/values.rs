//! Owned SQLite value type and its JSON conversions

use serde_json::{Number, Value};

#[cfg(feature = "rusqlite")]
use rusqlite::types::FromSql;

/// Represents a SQLite value (owned version)
#[derive(Debug, Clone, PartialEq, PartialOrd, Default)]
pub enum OwnedSQLiteValue {
    /// Integer value (i64)
    Integer(i64),
    /// Real value (f64)
    Real(f64),
    /// Text value (owned string)
    Text(String),
    /// Blob value (owned binary data)
    Blob(Box<[u8]>),
    /// NULL value
    #[default]
    Null,
}

impl OwnedSQLiteValue {
    /// Returns true if this value is NULL.
    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, OwnedSQLiteValue::Null)
    }
}

impl std::fmt::Display for OwnedSQLiteValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            OwnedSQLiteValue::Integer(i) => i.to_string(),
            OwnedSQLiteValue::Real(r) => r.to_string(),
            OwnedSQLiteValue::Text(s) => s.clone(),
            OwnedSQLiteValue::Blob(b) => String::from_utf8_lossy(b).to_string(),
            OwnedSQLiteValue::Null => String::new(),
        };
        write!(f, "{value}")
    }
}

//------------------------------------------------------------------------------
// JSON conversions
//------------------------------------------------------------------------------

/// Parameter binding: booleans bind as 0/1, nested values as JSON text.
impl From<&Value> for OwnedSQLiteValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => OwnedSQLiteValue::Null,
            Value::Bool(b) => OwnedSQLiteValue::Integer(i64::from(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => OwnedSQLiteValue::Integer(i),
                None => n
                    .as_f64()
                    .map(OwnedSQLiteValue::Real)
                    .unwrap_or(OwnedSQLiteValue::Null),
            },
            Value::String(s) => OwnedSQLiteValue::Text(s.clone()),
            nested => OwnedSQLiteValue::Text(nested.to_string()),
        }
    }
}

impl From<Value> for OwnedSQLiteValue {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => OwnedSQLiteValue::Text(s),
            other => OwnedSQLiteValue::from(&other),
        }
    }
}

/// Column decoding: blobs become lossy UTF-8 text, non-finite reals become null.
impl From<OwnedSQLiteValue> for Value {
    fn from(value: OwnedSQLiteValue) -> Self {
        match value {
            OwnedSQLiteValue::Integer(i) => Value::from(i),
            OwnedSQLiteValue::Real(r) => Number::from_f64(r).map_or(Value::Null, Value::Number),
            OwnedSQLiteValue::Text(s) => Value::String(s),
            OwnedSQLiteValue::Blob(b) => Value::String(String::from_utf8_lossy(&b).into_owned()),
            OwnedSQLiteValue::Null => Value::Null,
        }
    }
}

//------------------------------------------------------------------------------
// Database Driver Implementations
//------------------------------------------------------------------------------

// Implement rusqlite::ToSql for OwnedSQLiteValue when the rusqlite feature is enabled
#[cfg(feature = "rusqlite")]
impl rusqlite::ToSql for OwnedSQLiteValue {
    fn to_sql(&self) -> ::rusqlite::Result<::rusqlite::types::ToSqlOutput<'_>> {
        match self {
            OwnedSQLiteValue::Null => Ok(rusqlite::types::ToSqlOutput::Owned(
                rusqlite::types::Value::Null,
            )),
            OwnedSQLiteValue::Integer(i) => Ok(rusqlite::types::ToSqlOutput::Owned(
                rusqlite::types::Value::Integer(*i),
            )),
            OwnedSQLiteValue::Real(f) => Ok(rusqlite::types::ToSqlOutput::Owned(
                rusqlite::types::Value::Real(*f),
            )),
            OwnedSQLiteValue::Text(s) => Ok(rusqlite::types::ToSqlOutput::Borrowed(
                rusqlite::types::ValueRef::Text(s.as_bytes()),
            )),
            OwnedSQLiteValue::Blob(b) => Ok(rusqlite::types::ToSqlOutput::Borrowed(
                rusqlite::types::ValueRef::Blob(b.as_ref()),
            )),
        }
    }
}

#[cfg(feature = "rusqlite")]
impl FromSql for OwnedSQLiteValue {
    fn column_result(value: rusqlite::types::ValueRef<'_>) -> rusqlite::types::FromSqlResult<Self> {
        Ok(OwnedSQLiteValue::from(value))
    }
}

#[cfg(feature = "rusqlite")]
impl From<rusqlite::types::ValueRef<'_>> for OwnedSQLiteValue {
    fn from(value: rusqlite::types::ValueRef<'_>) -> Self {
        match value {
            rusqlite::types::ValueRef::Null => OwnedSQLiteValue::Null,
            rusqlite::types::ValueRef::Integer(i) => OwnedSQLiteValue::Integer(i),
            rusqlite::types::ValueRef::Real(r) => OwnedSQLiteValue::Real(r),
            rusqlite::types::ValueRef::Text(items) => {
                OwnedSQLiteValue::Text(String::from_utf8_lossy(items).into_owned())
            }
            rusqlite::types::ValueRef::Blob(items) => {
                OwnedSQLiteValue::Blob(items.to_vec().into_boxed_slice())
            }
        }
    }
}
