//! Declared-type coercion for the `typed` field transform.

use sculpt_core::field::{cast, datetime};
use sculpt_core::{Result, TypeConverter};
use sculpt_types::ColumnType;
use serde_json::Value;

/// Converts raw SQLite column values according to their declared SQL type.
///
/// SQLite stores values by affinity, so a `BOOLEAN` column hands back `0`/`1`
/// and a `DATETIME` column hands back text. The declared type restores the
/// intended JSON representation.
#[derive(Debug, Default, Clone, Copy)]
pub struct SQLiteTypeConverter;

impl SQLiteTypeConverter {
    pub fn new() -> Self {
        Self
    }
}

impl TypeConverter for SQLiteTypeConverter {
    fn convert(&self, value: &Value, type_code: &str) -> Result<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }

        Ok(match ColumnType::from_sql_type(type_code) {
            ColumnType::Integer => Value::from(cast::to_i64(value)),
            ColumnType::Real => cast::float_value(cast::to_f64(value)),
            ColumnType::Numeric => numeric(value),
            ColumnType::Text | ColumnType::Blob => text(value),
            ColumnType::Boolean => Value::Bool(cast::truthy(value)),
            ColumnType::DateTime => datetime::normalize(value),
            ColumnType::Json => match value {
                Value::String(raw) => serde_json::from_str(raw).unwrap_or(Value::Null),
                other => other.clone(),
            },
        })
    }
}

/// NUMERIC affinity keeps integers integral.
fn numeric(value: &Value) -> Value {
    match value {
        Value::Number(_) => value.clone(),
        Value::String(raw) => match raw.trim().parse::<i64>() {
            Ok(i) => Value::from(i),
            Err(_) => cast::float_value(cast::to_f64(value)),
        },
        other => Value::from(cast::to_i64(other)),
    }
}

fn text(value: &Value) -> Value {
    match value {
        Value::String(_) => value.clone(),
        Value::Number(n) => Value::String(n.to_string()),
        Value::Bool(b) => Value::String(b.to_string()),
        other => Value::String(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn convert(value: Value, type_code: &str) -> Value {
        SQLiteTypeConverter.convert(&value, type_code).unwrap()
    }

    #[test]
    fn integer_and_real() {
        assert_eq!(convert(json!("42"), "BIGINT"), json!(42));
        assert_eq!(convert(json!(3.9), "INTEGER"), json!(3));
        assert_eq!(convert(json!("2.5"), "DOUBLE"), json!(2.5));
        assert_eq!(convert(json!(2), "REAL"), json!(2.0));
    }

    #[test]
    fn numeric_affinity() {
        assert_eq!(convert(json!("10"), "DECIMAL(10,2)"), json!(10));
        assert_eq!(convert(json!("10.25"), "NUMERIC"), json!(10.25));
        assert_eq!(convert(json!(7), "NUMERIC"), json!(7));
    }

    #[test]
    fn text_and_blob() {
        assert_eq!(convert(json!(5), "VARCHAR(20)"), json!("5"));
        assert_eq!(convert(json!("raw"), "BLOB"), json!("raw"));
    }

    #[test]
    fn boolean_datetime_json() {
        assert_eq!(convert(json!(1), "BOOLEAN"), json!(true));
        assert_eq!(convert(json!(0), "BOOL"), json!(false));
        assert_eq!(
            convert(json!("2016-03-01 12:30:00"), "DATETIME"),
            json!("2016-03-01T12:30:00Z")
        );
        assert_eq!(convert(json!("0000-00-00 00:00:00"), "TIMESTAMP"), Value::Null);
        assert_eq!(convert(json!("[1,2]"), "JSON"), json!([1, 2]));
        assert_eq!(convert(json!("{"), "JSON"), Value::Null);
    }

    #[test]
    fn null_passes_through() {
        assert_eq!(convert(Value::Null, "INTEGER"), Value::Null);
    }
}
