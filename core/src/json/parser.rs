use std::fmt;
use std::rc::Rc;

use serde_json::{Map, Value};

use super::tag;
use crate::context::{Context, type_name};
use crate::definition::Definition;
use crate::error::{Result, SculptError};
use crate::field::FieldTransform;
use crate::params::{ParamValue, Parameters, Reference};
use crate::provider::Provider;
use crate::source::{Client, Pager, Source};

type Object = Map<String, Value>;

/// Translates JSON definition documents into [`Definition`] trees.
///
/// Parsing is eager: every malformed node is reported as a
/// [`SculptError::Configuration`] before anything is fetched. `$context`
/// tags are resolved against the context handed to [`JsonParser::parse`].
#[derive(Default, Clone)]
pub struct JsonParser {
    client: Option<Rc<dyn Client>>,
    pager: Option<Rc<dyn Pager>>,
}

impl JsonParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Client used by `$collection`, `$entity`, `$column` and `$value` nodes.
    pub fn with_client(mut self, client: Rc<dyn Client>) -> Self {
        self.client = Some(client);
        self
    }

    /// Pager used for `$limit` and `$offset`.
    pub fn with_pager(mut self, pager: impl Pager + 'static) -> Self {
        self.pager = Some(Rc::new(pager));
        self
    }

    pub fn parse(&self, document: &Value, context: Option<&dyn Context>) -> Result<Definition> {
        Node {
            parser: self,
            context,
        }
        .parse(document, None, "")
    }

    pub fn parse_str(&self, document: &str, context: Option<&dyn Context>) -> Result<Definition> {
        let document: Value = serde_json::from_str(document)?;
        self.parse(&document, context)
    }
}

impl fmt::Debug for JsonParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonParser")
            .field("client", &self.client.is_some())
            .field("pager", &self.pager.is_some())
            .finish()
    }
}

/// One parse run: the parser plus the top-level context.
struct Node<'a> {
    parser: &'a JsonParser,
    context: Option<&'a dyn Context>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Collection,
    Entity,
    Column,
    Value,
    Field,
    Context,
}

impl Kind {
    const fn tag(self) -> &'static str {
        match self {
            Kind::Collection => tag::COLLECTION,
            Kind::Entity => tag::ENTITY,
            Kind::Column => tag::COLUMN,
            Kind::Value => tag::VALUE,
            Kind::Field => tag::FIELD,
            Kind::Context => tag::CONTEXT,
        }
    }

    /// Tags accepted next to the primary tag.
    fn accepts(self, key: &str, object: &Object) -> bool {
        match self {
            Kind::Collection => matches!(
                key,
                tag::PARAMS | tag::DEFINITION | tag::KEY | tag::LIMIT | tag::OFFSET
            ),
            Kind::Column => matches!(key, tag::PARAMS | tag::DEFINITION | tag::LIMIT | tag::OFFSET),
            Kind::Entity | Kind::Value => matches!(key, tag::PARAMS | tag::DEFINITION),
            Kind::Context => key == tag::DEFAULT,
            Kind::Field => match key {
                tag::KEY => true,
                tag::DELIMITER => object.get(tag::FIELD) == Some(&Value::from("csv")),
                tag::FORMAT => object.get(tag::FIELD) == Some(&Value::from("format")),
                tag::VALUE => object.get(tag::FIELD) == Some(&Value::from("value")),
                _ => false,
            },
        }
    }
}

impl Node<'_> {
    fn parse(&self, value: &Value, name: Option<&str>, path: &str) -> Result<Definition> {
        match value {
            Value::String(column) => Ok(Definition::column(column.as_str())),
            Value::Array(_) => Err(invalid(path, "arrays are not valid definitions")),
            Value::Object(object) => self.object(object, name, path),
            scalar => Ok(Definition::Scalar(scalar.clone())),
        }
    }

    fn object(&self, object: &Object, name: Option<&str>, path: &str) -> Result<Definition> {
        let tagged = object.keys().filter(|key| tag::is_tag(key)).count();
        if tagged == 0 {
            let mut entries = Vec::with_capacity(object.len());
            for (key, child) in object {
                let definition = self.parse(child, Some(key), &join(path, key))?;
                entries.push((key.clone(), definition));
            }
            return Ok(Definition::Map(entries));
        }
        if tagged != object.len() {
            let plain = object.keys().find(|key| !tag::is_tag(key));
            return Err(invalid(
                path,
                format!(
                    "'{}' cannot be mixed with tagged keys",
                    plain.map(String::as_str).unwrap_or_default()
                ),
            ));
        }
        if let Some(unknown) = object.keys().find(|key| !tag::NODE_TAGS.contains(&key.as_str())) {
            return Err(invalid(path, format!("unknown tag '{unknown}'")));
        }

        let Some(kind) = self.kind(object, path)? else {
            // Only `$key` left: a plain column lookup.
            return match object.get(tag::KEY) {
                Some(Value::String(column)) if object.len() == 1 => {
                    Ok(Definition::column(column.as_str()))
                }
                Some(other) if object.len() == 1 => Err(expected(path, tag::KEY, "a string", other)),
                _ => Err(invalid(path, "object carries no definition tag")),
            };
        };

        if let Some(stray) = object
            .keys()
            .find(|key| key.as_str() != kind.tag() && !kind.accepts(key, object))
        {
            return Err(invalid(
                path,
                format!("'{stray}' is not valid with '{}'", kind.tag()),
            ));
        }

        match kind {
            Kind::Field => self.field(object, name, path),
            Kind::Context => Ok(FieldTransform::value(self.context_value(object, path)?).into()),
            provider => self.provider(provider, object, path),
        }
    }

    /// The primary tag of a tagged object, if any.
    fn kind(&self, object: &Object, path: &str) -> Result<Option<Kind>> {
        let has_field = object.contains_key(tag::FIELD);
        let mut found = [
            Kind::Collection,
            Kind::Entity,
            Kind::Column,
            Kind::Value,
            Kind::Field,
            Kind::Context,
        ]
        .into_iter()
        .filter(|kind| object.contains_key(kind.tag()))
        // `$value` is the field constant once `$field` is present.
        .filter(|kind| !(has_field && *kind == Kind::Value));

        let first = found.next();
        if let Some(second) = found.next() {
            let first = first.map(Kind::tag).unwrap_or_default();
            return Err(invalid(
                path,
                format!("'{first}' and '{}' are mutually exclusive", second.tag()),
            ));
        }
        Ok(first)
    }

    fn provider(&self, kind: Kind, object: &Object, path: &str) -> Result<Definition> {
        let sql = match object.get(kind.tag()) {
            Some(Value::String(sql)) => sql.as_str(),
            Some(other) => return Err(expected(path, kind.tag(), "SQL text", other)),
            None => unreachable!("kind derived from a present tag"),
        };
        let client = self.parser.client.clone().ok_or_else(|| {
            invalid(path, format!("'{}' requires a database client", kind.tag()))
        })?;

        // Without `$definition` every row renders as fetched.
        let definition = match object.get(tag::DEFINITION) {
            Some(definition) => self.parse(definition, None, &join(path, tag::DEFINITION))?,
            None => Definition::Row,
        };

        let limit = self.non_negative(object, tag::LIMIT, path)?;
        let offset = self.non_negative(object, tag::OFFSET, path)?;
        let sql = if limit.is_some() || offset.is_some() {
            let pager = self.parser.pager.as_ref().ok_or_else(|| {
                invalid(path, "'$limit' and '$offset' require a pager")
            })?;
            pager.paginate(sql, limit, offset)
        } else {
            sql.to_string()
        };

        let parameters = match object.get(tag::PARAMS) {
            Some(params) => self.params(params, &join(path, tag::PARAMS))?,
            None => Parameters::new(),
        };
        let source = Source::query(sql, client);
        let provider: Provider = match kind {
            Kind::Collection => {
                let collection = Provider::collection(source, definition).with_params(parameters);
                match object.get(tag::KEY) {
                    Some(Value::String(column)) => collection.key_by(column.as_str()).into(),
                    Some(other) => return Err(expected(path, tag::KEY, "a column name", other)),
                    None => collection.into(),
                }
            }
            Kind::Entity => Provider::entity(source, definition).with_params(parameters),
            Kind::Column => Provider::column(source, definition).with_params(parameters),
            Kind::Value => Provider::value(source, definition).with_params(parameters),
            Kind::Field | Kind::Context => unreachable!("not a provider tag"),
        };
        Ok(provider.into())
    }

    fn field(&self, object: &Object, name: Option<&str>, path: &str) -> Result<Definition> {
        let kind = match object.get(tag::FIELD) {
            Some(Value::String(kind)) => kind.as_str(),
            Some(other) => return Err(expected(path, tag::FIELD, "a field kind", other)),
            None => unreachable!("kind derived from a present tag"),
        };
        if kind == "value" {
            let constant = object
                .get(tag::VALUE)
                .ok_or_else(|| invalid(path, "value field requires '$value'"))?;
            return Ok(FieldTransform::value(constant.clone()).into());
        }

        let key = match object.get(tag::KEY) {
            Some(Value::String(key)) => key.as_str(),
            Some(other) => return Err(expected(path, tag::KEY, "a column name", other)),
            None => name.ok_or_else(|| {
                invalid(path, format!("{kind} field has no '$key' and no enclosing key"))
            })?,
        };

        let field = match kind {
            "boolean" => FieldTransform::boolean(key),
            "integer" => FieldTransform::integer(key),
            "number" => FieldTransform::number(key),
            "json" => FieldTransform::json(key),
            "datetime" => FieldTransform::date_time(key),
            "csv" => match object.get(tag::DELIMITER) {
                None => FieldTransform::csv(key),
                Some(Value::String(delimiter)) => FieldTransform::csv_with(key, delimiter.as_str()),
                Some(other) => return Err(expected(path, tag::DELIMITER, "a string", other)),
            },
            "format" => match object.get(tag::FORMAT) {
                Some(Value::String(pattern)) => FieldTransform::format(key, pattern.as_str()),
                Some(other) => return Err(expected(path, tag::FORMAT, "a string", other)),
                None => return Err(invalid(path, "format field requires '$format'")),
            },
            other => return Err(invalid(path, format!("unknown field kind '{other}'"))),
        };
        Ok(field.into())
    }

    /// Resolves a `$context` object against the top-level context.
    fn context_value(&self, object: &Object, path: &str) -> Result<Value> {
        let key = match object.get(tag::CONTEXT) {
            Some(Value::String(key)) => key,
            Some(other) => return Err(expected(path, tag::CONTEXT, "a context key", other)),
            None => unreachable!("kind derived from a present tag"),
        };
        Ok(self
            .context
            .and_then(|context| context.lookup(key))
            .or_else(|| object.get(tag::DEFAULT))
            .cloned()
            .unwrap_or(Value::Null))
    }

    fn params(&self, params: &Value, path: &str) -> Result<Parameters> {
        let mut parameters = Parameters::new();
        match params {
            Value::Object(named) => {
                for (name, value) in named {
                    let value = self.param_value(value, &join(path, name))?;
                    parameters.push(Some(name.clone()), value);
                }
            }
            Value::Array(positional) => {
                for (index, value) in positional.iter().enumerate() {
                    let value = self.param_value(value, &join(path, &index.to_string()))?;
                    parameters.push(None, value);
                }
            }
            other => return Err(expected(path, tag::PARAMS, "an object or an array", other)),
        }
        Ok(parameters)
    }

    fn param_value(&self, value: &Value, path: &str) -> Result<ParamValue> {
        let object = match value {
            Value::Object(object) => object,
            Value::Array(_) => return Err(invalid(path, "parameters cannot be arrays")),
            literal => return Ok(ParamValue::Literal(literal.clone())),
        };

        if let Some(name) = object.get(tag::REF) {
            if object.len() != 1 {
                return Err(invalid(path, "'$ref' cannot carry other keys"));
            }
            return match name {
                Value::String(name) => Ok(Reference::new(name.as_str()).into()),
                other => Err(expected(path, tag::REF, "a context key", other)),
            };
        }
        if object.contains_key(tag::CONTEXT) {
            if let Some(stray) = object
                .keys()
                .find(|key| !matches!(key.as_str(), tag::CONTEXT | tag::DEFAULT))
            {
                return Err(invalid(path, format!("'{stray}' is not valid with '$context'")));
            }
            return Ok(ParamValue::Literal(self.context_value(object, path)?));
        }
        Err(invalid(path, "parameter objects must carry '$ref' or '$context'"))
    }

    fn non_negative(&self, object: &Object, key: &str, path: &str) -> Result<Option<u64>> {
        match object.get(key) {
            None => Ok(None),
            Some(value) => value
                .as_u64()
                .map(Some)
                .ok_or_else(|| expected(path, key, "a non-negative integer", value)),
        }
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn invalid(path: &str, message: impl fmt::Display) -> SculptError {
    if path.is_empty() {
        SculptError::configuration(message.to_string())
    } else {
        SculptError::configuration(format!("{path}: {message}"))
    }
}

fn expected(path: &str, key: &str, what: &str, found: &Value) -> SculptError {
    invalid(
        path,
        format!("'{key}' must be {what}, found {}", type_name(found)),
    )
}
