//! Provider parameters and their resolution against the current row.
//!
//! A provider carries raw [`Parameters`]: literals plus [`Reference`]s to keys
//! of the row being rendered. Right before a fetch they are resolved into
//! [`BoundParams`], which a backend binds in order.

use std::fmt;

use serde_json::Value;
use smallvec::SmallVec;

use crate::context::Context;
use crate::error::{Result, SculptError};

/// A named pointer into the current context, resolved at parameter-build time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    name: String,
}

impl Reference {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The context key this reference points at.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reads the referenced value out of `context`.
    ///
    /// A missing key, or a missing context, is a [`SculptError::ReferenceResolution`].
    pub fn resolve(&self, context: Option<&dyn Context>) -> Result<Value> {
        context
            .and_then(|ctx| ctx.lookup(&self.name))
            .cloned()
            .ok_or_else(|| SculptError::ReferenceResolution(self.name.clone()))
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$ref:{}", self.name)
    }
}

/// Shorthand for [`Reference::new`].
pub fn reference(name: impl Into<String>) -> Reference {
    Reference::new(name)
}

/// A raw parameter value: either a literal or a deferred reference.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Literal(Value),
    Reference(Reference),
}

impl From<Reference> for ParamValue {
    fn from(value: Reference) -> Self {
        ParamValue::Reference(value)
    }
}

impl From<Value> for ParamValue {
    fn from(value: Value) -> Self {
        ParamValue::Literal(value)
    }
}

/// One raw parameter. Entries without a name bind positionally.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: Option<String>,
    pub value: ParamValue,
}

/// Ordered raw parameters of a provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    entries: SmallVec<[Parameter; 4]>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional literal.
    pub fn bind(mut self, value: impl Into<Value>) -> Self {
        self.push(None, ParamValue::Literal(value.into()));
        self
    }

    /// Appends a positional reference to `key` of the current row.
    pub fn bind_ref(mut self, key: impl Into<String>) -> Self {
        self.push(None, ParamValue::Reference(Reference::new(key)));
        self
    }

    /// Appends a named literal.
    pub fn named(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(Some(name.into()), ParamValue::Literal(value.into()));
        self
    }

    /// Appends a named reference to `key` of the current row.
    pub fn named_ref(mut self, name: impl Into<String>, key: impl Into<String>) -> Self {
        self.push(Some(name.into()), ParamValue::Reference(Reference::new(key)));
        self
    }

    pub fn push(&mut self, name: Option<String>, value: ParamValue) {
        self.entries.push(Parameter { name, value });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.entries.iter()
    }

    /// Resolves every reference against `context`, preserving order.
    pub fn resolve(&self, context: Option<&dyn Context>) -> Result<BoundParams> {
        let mut bound = BoundParams::default();
        for Parameter { name, value } in &self.entries {
            let value = match value {
                ParamValue::Literal(literal) => literal.clone(),
                ParamValue::Reference(reference) => reference.resolve(context)?,
            };
            bound.entries.push(BoundParam {
                name: name.clone(),
                value,
            });
        }
        Ok(bound)
    }
}

impl FromIterator<(Option<String>, ParamValue)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (Option<String>, ParamValue)>>(iter: I) -> Self {
        let mut params = Parameters::new();
        for (name, value) in iter {
            params.push(name, value);
        }
        params
    }
}

/// A resolved parameter, ready to be bound.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundParam {
    pub name: Option<String>,
    pub value: Value,
}

/// Concrete parameters handed to a data source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundParams {
    entries: SmallVec<[BoundParam; 4]>,
}

impl BoundParams {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BoundParam> {
        self.entries.iter()
    }

    /// Values in binding order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|param| &param.value)
    }

    /// Looks up a named parameter.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|param| param.name.as_deref() == Some(name))
            .map(|param| &param.value)
    }
}
