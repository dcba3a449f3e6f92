//! Renders named definition documents from a definitions directory.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use sculpt_core::{Client, Context, Definition, JsonParser, SculptError};
use sculpt_types::Dialect;
use serde_json::Value;
use thiserror::Error;

#[cfg(feature = "rusqlite")]
use crate::config::Config;
use crate::config::ConfigError;

/// Errors raised while loading or rendering a named definition
#[derive(Debug, Error)]
pub enum ShaperError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Sculpt(#[from] SculptError),

    #[error("definition not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),

    #[error("invalid definition name '{0}'")]
    InvalidName(String),

    #[error("config has no database")]
    MissingDatabase,

    #[error("no built-in client for the {0} dialect")]
    UnsupportedDialect(Dialect),
}

/// A definitions directory bound to a database client.
///
/// `<dir>/<name>.json` documents are parsed on every call, so edits to a
/// document are picked up without rebuilding the shaper.
#[derive(Debug)]
pub struct Shaper {
    parser: JsonParser,
    definitions: PathBuf,
}

impl Shaper {
    /// Uses `client` for every provider and `dialect` for `$limit`/`$offset`.
    pub fn new(client: Rc<dyn Client>, dialect: Dialect, definitions: impl Into<PathBuf>) -> Self {
        Self {
            parser: JsonParser::new().with_client(client).with_pager(dialect),
            definitions: definitions.into(),
        }
    }

    /// Opens the configured SQLite database.
    #[cfg(feature = "rusqlite")]
    pub fn from_config(config: &Config) -> Result<Self, ShaperError> {
        use crate::config::Database;
        use sculpt_sqlite::SQLiteClient;

        if config.dialect != Dialect::SQLite {
            return Err(ShaperError::UnsupportedDialect(config.dialect));
        }
        let client = match config.database().ok_or(ShaperError::MissingDatabase)? {
            Database::InMemory => SQLiteClient::open_in_memory()?,
            Database::File(path) => SQLiteClient::open(path)?,
        };
        Ok(Self::new(
            Rc::new(client),
            config.dialect,
            config.definitions_dir(),
        ))
    }

    /// Loads the config at `path` and opens its database.
    #[cfg(feature = "rusqlite")]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ShaperError> {
        Self::from_config(&Config::load(path)?)
    }

    pub fn parser(&self) -> &JsonParser {
        &self.parser
    }

    pub fn definitions_dir(&self) -> &Path {
        &self.definitions
    }

    /// Parses `<definitions>/<name>.json`, resolving `$context` tags against `context`.
    pub fn definition(
        &self,
        name: &str,
        context: Option<&dyn Context>,
    ) -> Result<Definition, ShaperError> {
        let path = self.path_of(name)?;
        let document = std::fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ShaperError::NotFound(path.clone())
            } else {
                ShaperError::Io(path.clone(), e)
            }
        })?;
        Ok(self.parser.parse_str(&document, context)?)
    }

    /// Parses and builds `<definitions>/<name>.json`.
    ///
    /// `context` feeds both the `$context` tags and the root of the build.
    pub fn render(&self, name: &str, context: Option<&dyn Context>) -> Result<Value, ShaperError> {
        #[cfg(feature = "tracing")]
        tracing::debug!(name, "sculpt.render");

        let definition = self.definition(name, context)?;
        Ok(sculpt_core::build(&definition, context)?)
    }

    fn path_of(&self, name: &str) -> Result<PathBuf, ShaperError> {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
            && !name.starts_with('.');
        if !valid {
            return Err(ShaperError::InvalidName(name.to_string()));
        }
        Ok(self.definitions.join(format!("{name}.json")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sculpt_core::{BoundParams, Row};

    #[derive(Debug)]
    struct NoRows;

    impl Client for NoRows {
        fn query(&self, _sql: &str, _params: &BoundParams) -> sculpt_core::Result<Vec<Row>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn rejects_path_like_names() {
        let shaper = Shaper::new(Rc::new(NoRows), Dialect::SQLite, "/nowhere");
        for name in ["", "../secret", "a/b", ".hidden", "a\\b"] {
            assert!(
                matches!(shaper.definition(name, None), Err(ShaperError::InvalidName(_))),
                "{name}"
            );
        }
        assert!(matches!(
            shaper.definition("news", None),
            Err(ShaperError::NotFound(path)) if path == Path::new("/nowhere/news.json")
        ));
    }
}
