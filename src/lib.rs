//! # Sculpt
//!
//! Declarative result shaping for relational data: describe the nested output
//! you want as a tree of providers and field transforms, and render it against
//! live or in-memory data sources into ordered JSON records.
//!
//! ## Quick Start
//!
//! ```rust
//! # #[cfg(feature = "rusqlite")]
//! # fn main() -> sculpt::Result<()> {
//! use std::rc::Rc;
//!
//! use sculpt::prelude::*;
//! use sculpt::sqlite::SQLiteClient;
//! use serde_json::json;
//!
//! let client = SQLiteClient::open_in_memory()?;
//! client.connection().execute_batch(
//!     "CREATE TABLE author (id INTEGER PRIMARY KEY, name TEXT);
//!      CREATE TABLE news (id INTEGER PRIMARY KEY, author_id INTEGER, title TEXT);
//!      INSERT INTO author VALUES (1, 'Jane');
//!      INSERT INTO news VALUES (1, 1, 'foo'), (2, 1, 'bar');",
//! )?;
//! let client: Rc<dyn Client> = Rc::new(client);
//!
//! let author = Provider::entity(
//!     Source::query("SELECT name FROM author WHERE id = :id", client.clone()),
//!     Definition::map([("name", "name".into())]),
//! )
//! .with_params(Parameters::new().named_ref("id", "author_id"));
//!
//! let definition = Definition::map([
//!     (
//!         "totalEntries",
//!         Provider::value(
//!             Source::query("SELECT COUNT(*) AS cnt FROM news", client.clone()),
//!             FieldTransform::integer("cnt"),
//!         )
//!         .into(),
//!     ),
//!     (
//!         "entries",
//!         Provider::collection(
//!             Source::query("SELECT * FROM news ORDER BY id", client),
//!             Definition::map([
//!                 ("id", FieldTransform::integer("id").into()),
//!                 ("title", "title".into()),
//!                 ("author", author.into()),
//!             ]),
//!         )
//!         .into(),
//!     ),
//! ]);
//!
//! let rendered = sculpt::build(&definition, None)?;
//! assert_eq!(
//!     rendered,
//!     json!({
//!         "totalEntries": 2,
//!         "entries": [
//!             {"id": 1, "title": "foo", "author": {"name": "Jane"}},
//!             {"id": 2, "title": "bar", "author": {"name": "Jane"}},
//!         ]
//!     })
//! );
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "rusqlite"))]
//! # fn main() {}
//! ```
//!
//! ## Backend Support
//!
//! | Database | Driver   | Feature Flag | Status |
//! |----------|----------|--------------|--------|
//! | SQLite   | rusqlite | `rusqlite`   | ✅     |
//!
//! Any other data source plugs in through [`Client`] or [`Source::from_fn`].

mod config;
mod shaper;

// =============================================================================
// Root-level exports
// =============================================================================

/// Result type for definition building and rendering
pub use sculpt_core::Result;

/// Rendering entry points
pub use sculpt_core::{Builder, build};

/// Database dialect enum
pub use sculpt_types::{ColumnType, Dialect};

pub use config::{CONFIG_FILE, Config, ConfigError, Database};
pub use shaper::{Shaper, ShaperError};

pub use sculpt_core::{
    BoundParams, Client, Collected, Collection, Context, Definition, Fetch, FetchFn, FieldTransform,
    Filter, JsonParser, KeyFn, Pager, ParamValue, Parameters, Provider, Reference, Row, Source,
    TypeConverter, reference,
};

/// Error types
pub mod error {
    pub use crate::config::ConfigError;
    pub use crate::shaper::ShaperError;
    pub use sculpt_core::error::SculptError;
}

/// Field transform helpers: loose casts and date-time normalization.
pub mod field {
    pub use sculpt_core::field::{Callback, DEFAULT_DELIMITER, FormatPattern, cast, datetime};
}

/// Reserved keys of JSON definition documents.
pub use sculpt_core::json::tag;

// =============================================================================
// SQLite module
// =============================================================================

/// SQLite value conversion, type converter and client.
#[cfg(feature = "sqlite")]
#[cfg_attr(docsrs, doc(cfg(feature = "sqlite")))]
pub mod sqlite {
    pub use sculpt_sqlite::{OwnedSQLiteValue, SQLiteTypeConverter, values};

    #[cfg(feature = "rusqlite")]
    #[cfg_attr(docsrs, doc(cfg(feature = "rusqlite")))]
    pub use sculpt_sqlite::SQLiteClient;

    /// The `rusqlite` crate, for opening and seeding connections.
    #[cfg(feature = "rusqlite")]
    pub use rusqlite;
}

/// Prelude - import this for building definitions.
pub mod prelude {
    pub use crate::{
        Client, Collection, Context, Definition, Dialect, FieldTransform, Filter, JsonParser,
        KeyFn, Parameters, Provider, Shaper, Source, build, reference,
    };
    pub use sculpt_core::error::SculptError;
}
