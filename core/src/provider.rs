//! Providers: data-fetch units bound to a sub-definition.

use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::context::{Row, type_name};
use crate::definition::Definition;
use crate::error::{Result, SculptError};
use crate::params::Parameters;
use crate::source::Source;

/// Source, raw parameters and per-row definition shared by every provider.
#[derive(Debug, Clone)]
pub struct Fetch {
    pub source: Source,
    pub parameters: Parameters,
    pub definition: Definition,
}

impl Fetch {
    pub fn new(source: impl Into<Source>, definition: impl Into<Definition>) -> Self {
        Self {
            source: source.into(),
            parameters: Parameters::new(),
            definition: definition.into(),
        }
    }

    pub fn with_params(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }
}

/// Computes the map key of a raw fetched row.
#[derive(Clone)]
pub struct KeyFn(Rc<dyn Fn(&Row) -> Result<String>>);

impl KeyFn {
    pub fn new(f: impl Fn(&Row) -> Result<String> + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Keys rows by the raw value of `column`.
    pub fn column(column: impl Into<String>) -> Self {
        let column = column.into();
        Self::new(move |row| match row.get(&column) {
            None => Err(SculptError::UnknownContextKey(column.clone())),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            Some(Value::Bool(b)) => Ok(b.to_string()),
            Some(other) => Err(SculptError::Shape(format!(
                "collection key '{column}' must be a scalar, found {}",
                type_name(other)
            ))),
        })
    }

    pub fn key(&self, row: &Row) -> Result<String> {
        (self.0)(row)
    }
}

impl fmt::Debug for KeyFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KeyFn(..)")
    }
}

/// A fully rendered collection, as handed to a [`Filter`].
#[derive(Debug, Clone, PartialEq)]
pub enum Collected {
    List(Vec<Value>),
    Keyed(Row),
}

impl Collected {
    pub fn len(&self) -> usize {
        match self {
            Collected::List(items) => items.len(),
            Collected::Keyed(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keeps the entries matching `keep`, in their current order.
    pub fn retain(&mut self, mut keep: impl FnMut(&Value) -> bool) {
        match self {
            Collected::List(items) => items.retain(|item| keep(item)),
            Collected::Keyed(map) => map.retain(|_, item| keep(&*item)),
        }
    }
}

impl From<Collected> for Value {
    fn from(collected: Collected) -> Self {
        match collected {
            Collected::List(items) => Value::Array(items),
            Collected::Keyed(map) => Value::Object(map),
        }
    }
}

/// A whole-collection pass applied after every row has been rendered.
#[derive(Clone)]
pub struct Filter(Rc<dyn Fn(Collected) -> Result<Collected>>);

impl Filter {
    pub fn new(f: impl Fn(Collected) -> Result<Collected> + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Keeps only the rendered entries matching `keep`.
    pub fn retain(keep: impl Fn(&Value) -> bool + 'static) -> Self {
        Self::new(move |mut collected| {
            collected.retain(&keep);
            Ok(collected)
        })
    }

    pub fn apply(&self, collected: Collected) -> Result<Collected> {
        (self.0)(collected)
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Filter(..)")
    }
}

/// A provider of many rows, rendered to a list or a keyed map.
#[derive(Debug, Clone)]
pub struct Collection {
    pub fetch: Fetch,
    pub key: Option<KeyFn>,
    pub filter: Option<Filter>,
}

impl Collection {
    pub fn new(fetch: Fetch) -> Self {
        Self {
            fetch,
            key: None,
            filter: None,
        }
    }

    /// Replaces the raw parameters.
    pub fn with_params(mut self, parameters: Parameters) -> Self {
        self.fetch.parameters = parameters;
        self
    }

    pub fn key(mut self, key: KeyFn) -> Self {
        self.key = Some(key);
        self
    }

    /// Keys rows by the raw value of `column`.
    pub fn key_by(self, column: impl Into<String>) -> Self {
        self.key(KeyFn::column(column))
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// The empty result: `{}` when keyed, `[]` otherwise.
    pub fn empty(&self) -> Collected {
        match self.key {
            Some(_) => Collected::Keyed(Row::new()),
            None => Collected::List(Vec::new()),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Provider {
    /// A single row rendered through the definition; a bare scalar passes through.
    Value(Fetch),
    /// A single row rendered through the definition.
    Entity(Fetch),
    /// Every row rendered through the definition into a flat list.
    Column(Fetch),
    Collection(Collection),
}

impl Provider {
    pub fn value(source: impl Into<Source>, definition: impl Into<Definition>) -> Self {
        Provider::Value(Fetch::new(source, definition))
    }

    pub fn entity(source: impl Into<Source>, definition: impl Into<Definition>) -> Self {
        Provider::Entity(Fetch::new(source, definition))
    }

    pub fn column(source: impl Into<Source>, definition: impl Into<Definition>) -> Self {
        Provider::Column(Fetch::new(source, definition))
    }

    /// A collection builder; key and filter are configured on the returned [`Collection`].
    pub fn collection(source: impl Into<Source>, definition: impl Into<Definition>) -> Collection {
        Collection::new(Fetch::new(source, definition))
    }

    /// Replaces the raw parameters.
    pub fn with_params(mut self, parameters: Parameters) -> Self {
        self.fetch_mut().parameters = parameters;
        self
    }

    pub fn fetch(&self) -> &Fetch {
        match self {
            Provider::Value(fetch) | Provider::Entity(fetch) | Provider::Column(fetch) => fetch,
            Provider::Collection(collection) => &collection.fetch,
        }
    }

    fn fetch_mut(&mut self) -> &mut Fetch {
        match self {
            Provider::Value(fetch) | Provider::Entity(fetch) | Provider::Column(fetch) => fetch,
            Provider::Collection(collection) => &mut collection.fetch,
        }
    }

    pub const fn kind(&self) -> &'static str {
        match self {
            Provider::Value(_) => "value",
            Provider::Entity(_) => "entity",
            Provider::Column(_) => "column",
            Provider::Collection(_) => "collection",
        }
    }
}

impl From<Collection> for Provider {
    fn from(collection: Collection) -> Self {
        Provider::Collection(collection)
    }
}
