//! Configuration for Sculpt
//!
//! Handles loading `sculpt.config.toml`.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use sculpt_types::Dialect;

pub const CONFIG_FILE: &str = "sculpt.config.toml";

/// Database name SQLite reserves for a private in-memory database.
const MEMORY: &str = ":memory:";

// ============================================================================
// Configuration
// ============================================================================

/// Main configuration structure
///
/// ```toml
/// dialect = "sqlite"
/// database = "./app.db"
/// definitions = "./shapes"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub dialect: Dialect,

    #[serde(default)]
    database: Option<String>,

    #[serde(default = "default_definitions")]
    definitions: PathBuf,

    /// Directory relative paths resolve against.
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

fn default_definitions() -> PathBuf {
    PathBuf::from("./definitions")
}

/// Where the configured database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Database {
    InMemory,
    File(PathBuf),
}

// ============================================================================
// Config implementation
// ============================================================================

impl Config {
    /// Load from a specific path. Relative paths in the file resolve against
    /// the file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.into())
            } else {
                ConfigError::Io(path.into(), e)
            }
        })?;

        let config: Self =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(path.into(), e))?;

        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(config.with_base_dir(base_dir))
    }

    /// Parse configuration text. Relative paths resolve against the current directory.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Searches `dir` and its ancestors for [`CONFIG_FILE`].
    pub fn discover(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let dir = dir.as_ref();
        for candidate in dir.ancestors().map(|ancestor| ancestor.join(CONFIG_FILE)) {
            if candidate.is_file() {
                return Self::load(candidate);
            }
        }
        Err(ConfigError::NotFound(dir.join(CONFIG_FILE)))
    }

    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// The configured database, if any.
    pub fn database(&self) -> Option<Database> {
        let database = self.database.as_deref()?;
        Some(if database == MEMORY {
            Database::InMemory
        } else {
            Database::File(self.resolve(Path::new(database)))
        })
    }

    /// Directory holding the `<name>.json` definition documents.
    pub fn definitions_dir(&self) -> PathBuf {
        self.resolve(&self.definitions)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to parse {}: {}", .0.display(), .1)]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),
}

// ============================================================================
// Tests
// ============================================================================
