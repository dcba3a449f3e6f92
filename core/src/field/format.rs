//! `{column}` string templates.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;

use crate::context::Context;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern is valid")
});

/// A string template whose `{name}` placeholders read from the current row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatPattern {
    pattern: String,
}

impl FormatPattern {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Names of every placeholder, in order of appearance.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        PLACEHOLDER
            .captures_iter(&self.pattern)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
    }

    /// Substitutes placeholders from `context`. Missing or null values render as empty text.
    pub fn render(&self, context: &dyn Context) -> String {
        PLACEHOLDER
            .replace_all(&self.pattern, |caps: &Captures<'_>| {
                context.lookup(&caps[1]).map(display).unwrap_or_default()
            })
            .into_owned()
    }
}

fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}
