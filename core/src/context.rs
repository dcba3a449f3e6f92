//! Row-scoped lookup used by column references, transforms and parameters.

use std::collections::HashMap;

use serde_json::{Map, Value};

/// One fetched row: an ordered, string-keyed mapping.
pub type Row = Map<String, Value>;

/// The in-scope row during evaluation.
///
/// Everything that reads from "the current row" goes through [`Context::lookup`],
/// so any ordered or unordered string-keyed container can drive a build.
pub trait Context {
    /// Returns the value stored under `key`, if any.
    fn lookup(&self, key: &str) -> Option<&Value>;

    /// The whole context as a row, when it has one.
    fn to_row(&self) -> Option<Row> {
        None
    }
}

impl Context for Row {
    fn lookup(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }

    fn to_row(&self) -> Option<Row> {
        Some(self.clone())
    }
}

impl Context for HashMap<String, Value> {
    fn lookup(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }

    fn to_row(&self) -> Option<Row> {
        Some(self.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }
}

/// Only objects have keys; every other value is an empty context.
impl Context for Value {
    fn lookup(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|row| row.get(key))
    }

    fn to_row(&self) -> Option<Row> {
        self.as_object().cloned()
    }
}

/// A context with no keys, used when a transform is applied at the root.
pub(crate) struct EmptyContext;

impl Context for EmptyContext {
    fn lookup(&self, _key: &str) -> Option<&Value> {
        None
    }
}

/// `true` when a fetched value carries no data.
pub(crate) fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(row) => row.is_empty(),
        _ => false,
    }
}

/// Short label for a value's JSON type, used in error messages.
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lookup_on_row_and_value() {
        let value = json!({"id": 1, "title": "foo"});
        let row = value.as_object().cloned().unwrap();

        assert_eq!(row.lookup("id"), Some(&json!(1)));
        assert_eq!(value.lookup("title"), Some(&json!("foo")));
        assert_eq!(value.lookup("missing"), None);
        assert_eq!(json!([1, 2]).lookup("0"), None);
    }

    #[test]
    fn lookup_on_hash_map() {
        let mut map = HashMap::new();
        map.insert("authorId".to_string(), json!(7));
        assert_eq!(map.lookup("authorId"), Some(&json!(7)));
        assert_eq!(EmptyContext.lookup("authorId"), None);
    }

    #[test]
    fn emptiness() {
        assert!(is_empty(&Value::Null));
        assert!(is_empty(&json!([])));
        assert!(is_empty(&json!({})));
        assert!(!is_empty(&json!(0)));
        assert!(!is_empty(&json!("")));
    }
}
