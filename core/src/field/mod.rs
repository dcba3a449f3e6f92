//! Field transforms: leaf converters from a context value to a rendered value.
//!
//! Every keyed transform reads one source column from the current row. A
//! missing column, or a column holding `null`, renders `null`: absent data is
//! never an error here.

pub mod cast;
pub mod datetime;
mod format;

use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::context::Context;
use crate::error::Result;

pub use format::FormatPattern;

/// Default delimiter of the `csv` transform.
pub const DEFAULT_DELIMITER: &str = ",";

/// Converts a raw value using a backend-declared column type.
pub trait TypeConverter: fmt::Debug {
    fn convert(&self, value: &Value, type_code: &str) -> Result<Value>;
}

/// A user supplied conversion applied to the source value.
#[derive(Clone)]
pub struct Callback(Rc<dyn Fn(&Value) -> Result<Value>>);

impl Callback {
    pub fn new(f: impl Fn(&Value) -> Result<Value> + 'static) -> Self {
        Self(Rc::new(f))
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback(..)")
    }
}

#[derive(Debug, Clone)]
pub enum FieldTransform {
    Boolean(String),
    Integer(String),
    Number(String),
    Csv {
        key: String,
        delimiter: String,
    },
    Json(String),
    DateTime(String),
    /// Constant output, independent of the context.
    Value(Value),
    Callback {
        key: String,
        callback: Callback,
    },
    Format {
        key: String,
        pattern: FormatPattern,
    },
    Typed {
        key: String,
        type_code: String,
        converter: Rc<dyn TypeConverter>,
    },
}

impl FieldTransform {
    pub fn boolean(key: impl Into<String>) -> Self {
        Self::Boolean(key.into())
    }

    pub fn integer(key: impl Into<String>) -> Self {
        Self::Integer(key.into())
    }

    pub fn number(key: impl Into<String>) -> Self {
        Self::Number(key.into())
    }

    pub fn csv(key: impl Into<String>) -> Self {
        Self::csv_with(key, DEFAULT_DELIMITER)
    }

    pub fn csv_with(key: impl Into<String>, delimiter: impl Into<String>) -> Self {
        Self::Csv {
            key: key.into(),
            delimiter: delimiter.into(),
        }
    }

    pub fn json(key: impl Into<String>) -> Self {
        Self::Json(key.into())
    }

    pub fn date_time(key: impl Into<String>) -> Self {
        Self::DateTime(key.into())
    }

    pub fn value(value: impl Into<Value>) -> Self {
        Self::Value(value.into())
    }

    pub fn callback(
        key: impl Into<String>,
        f: impl Fn(&Value) -> Result<Value> + 'static,
    ) -> Self {
        Self::Callback {
            key: key.into(),
            callback: Callback::new(f),
        }
    }

    pub fn format(key: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::Format {
            key: key.into(),
            pattern: FormatPattern::new(pattern),
        }
    }

    pub fn typed(
        key: impl Into<String>,
        type_code: impl Into<String>,
        converter: Rc<dyn TypeConverter>,
    ) -> Self {
        Self::Typed {
            key: key.into(),
            type_code: type_code.into(),
            converter,
        }
    }

    /// The transform kind, as spelled in JSON documents where one exists.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Number(_) => "number",
            Self::Csv { .. } => "csv",
            Self::Json(_) => "json",
            Self::DateTime(_) => "datetime",
            Self::Value(_) => "value",
            Self::Callback { .. } => "callback",
            Self::Format { .. } => "format",
            Self::Typed { .. } => "typed",
        }
    }

    /// The source column, if this transform reads one.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Boolean(key)
            | Self::Integer(key)
            | Self::Number(key)
            | Self::Json(key)
            | Self::DateTime(key)
            | Self::Csv { key, .. }
            | Self::Callback { key, .. }
            | Self::Format { key, .. }
            | Self::Typed { key, .. } => Some(key),
            Self::Value(_) => None,
        }
    }

    /// Renders this transform against `context`.
    pub fn apply(&self, context: &dyn Context) -> Result<Value> {
        let key = match self {
            Self::Value(constant) => return Ok(constant.clone()),
            other => other.key().unwrap_or_default(),
        };

        let source = match context.lookup(key) {
            None | Some(Value::Null) => return Ok(Value::Null),
            Some(source) => source,
        };

        Ok(match self {
            Self::Boolean(_) => Value::Bool(cast::truthy(source)),
            Self::Integer(_) => Value::from(cast::to_i64(source)),
            Self::Number(_) => cast::float_value(cast::to_f64(source)),
            Self::Csv { delimiter, .. } => split(source, delimiter),
            Self::Json(_) => parse_json(source),
            Self::DateTime(_) => datetime::normalize(source),
            Self::Callback { callback, .. } => (callback.0)(source)?,
            Self::Format { pattern, .. } => Value::String(pattern.render(context)),
            Self::Typed {
                type_code,
                converter,
                ..
            } => converter.convert(source, type_code)?,
            Self::Value(_) => unreachable!("constant handled above"),
        })
    }
}

fn split(source: &Value, delimiter: &str) -> Value {
    let text = match source {
        Value::Array(_) => return source.clone(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    };
    if text.is_empty() {
        return Value::Array(Vec::new());
    }
    if delimiter.is_empty() {
        return Value::Array(vec![Value::String(text)]);
    }
    Value::Array(
        text.split(delimiter)
            .map(|part| Value::String(part.to_string()))
            .collect(),
    )
}

fn parse_json(source: &Value) -> Value {
    match source {
        Value::String(text) => serde_json::from_str(text).unwrap_or_else(|_err| {
            #[cfg(feature = "tracing")]
            tracing::debug!(error = %_err, "sculpt.field.json: unparseable source");
            Value::Null
        }),
        other => other.clone(),
    }
}
