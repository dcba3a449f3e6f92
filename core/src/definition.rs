//! The declarative output shape.

use serde_json::Value;

use crate::field::FieldTransform;
use crate::provider::{Collection, Provider};

/// A recursive description of the desired output.
///
/// Built once, by hand or by the JSON front-end, and never mutated.
///
/// ```
/// use sculpt_core::{Definition, FieldTransform};
/// use serde_json::json;
///
/// let definition = Definition::map([
///     ("id", Definition::from(FieldTransform::integer("id"))),
///     ("title", Definition::from("title")),
/// ]);
///
/// let rendered = sculpt_core::build(&definition, Some(&json!({"id": "1", "title": "foo"})))?;
/// assert_eq!(rendered, json!({"id": 1, "title": "foo"}));
/// # Ok::<(), sculpt_core::SculptError>(())
/// ```
#[derive(Debug, Clone)]
pub enum Definition {
    /// A string scalar names a column of the current row; without a row, or
    /// for non-string scalars, the scalar renders as itself.
    Scalar(Value),
    Field(FieldTransform),
    Provider(Box<Provider>),
    /// Ordered named children.
    Map(Vec<(String, Definition)>),
    /// The current row, every column unchanged.
    Row,
}

impl Definition {
    /// An ordered map definition.
    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, Definition)>) -> Self {
        Definition::Map(
            entries
                .into_iter()
                .map(|(key, definition)| (key.into(), definition))
                .collect(),
        )
    }

    /// A column reference.
    pub fn column(name: impl Into<String>) -> Self {
        Definition::Scalar(Value::String(name.into()))
    }

    pub const fn kind(&self) -> &'static str {
        match self {
            Definition::Scalar(_) => "scalar",
            Definition::Field(_) => "field",
            Definition::Provider(_) => "provider",
            Definition::Map(_) => "map",
            Definition::Row => "row",
        }
    }
}

impl From<&str> for Definition {
    fn from(value: &str) -> Self {
        Definition::column(value)
    }
}

impl From<String> for Definition {
    fn from(value: String) -> Self {
        Definition::column(value)
    }
}

impl From<Value> for Definition {
    fn from(value: Value) -> Self {
        Definition::Scalar(value)
    }
}

impl From<FieldTransform> for Definition {
    fn from(value: FieldTransform) -> Self {
        Definition::Field(value)
    }
}

impl From<Provider> for Definition {
    fn from(value: Provider) -> Self {
        Definition::Provider(Box::new(value))
    }
}

impl From<Collection> for Definition {
    fn from(value: Collection) -> Self {
        Definition::Provider(Box::new(Provider::Collection(value)))
    }
}

impl<K: Into<String>> FromIterator<(K, Definition)> for Definition {
    fn from_iter<I: IntoIterator<Item = (K, Definition)>>(iter: I) -> Self {
        Definition::map(iter)
    }
}
