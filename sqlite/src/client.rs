//! Synchronous SQLite client using [`rusqlite`].
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//!
//! use sculpt_core::{Definition, FieldTransform, Provider, Source};
//! use sculpt_sqlite::SQLiteClient;
//! use serde_json::json;
//!
//! # fn main() -> sculpt_core::Result<()> {
//! let client = SQLiteClient::open_in_memory()?;
//! client.connection().execute_batch(
//!     "CREATE TABLE news (id INTEGER PRIMARY KEY, title TEXT);
//!      INSERT INTO news (title) VALUES ('foo'), ('bar');",
//! )?;
//! let client = Rc::new(client);
//!
//! let definition: Definition = Provider::collection(
//!     Source::query("SELECT id, title FROM news ORDER BY id", client),
//!     Definition::map([
//!         ("id", FieldTransform::integer("id").into()),
//!         ("title", "title".into()),
//!     ]),
//! )
//! .into();
//!
//! let rendered = sculpt_core::build(&definition, None)?;
//! assert_eq!(rendered, json!([{"id": 1, "title": "foo"}, {"id": 2, "title": "bar"}]));
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use rusqlite::{Connection, Statement};
use sculpt_core::{BoundParams, Client, Result, Row, SculptError};
use serde_json::Value;

use crate::values::OwnedSQLiteValue;

/// Prefixes SQLite accepts for named parameters.
const NAMED_PREFIXES: [char; 3] = [':', '@', '$'];

/// A [`Client`] backed by a single [`rusqlite::Connection`].
#[derive(Debug)]
pub struct SQLiteClient {
    conn: Connection,
}

impl SQLiteClient {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Opens (or creates) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(Connection::open(path)?))
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(Connection::open_in_memory()?))
    }

    /// Gets a reference to the underlying connection
    #[inline]
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn into_inner(self) -> Connection {
        self.conn
    }
}

impl From<Connection> for SQLiteClient {
    fn from(conn: Connection) -> Self {
        Self::new(conn)
    }
}

impl Client for SQLiteClient {
    fn query(&self, sql: &str, params: &BoundParams) -> Result<Vec<Row>> {
        #[cfg(feature = "tracing")]
        tracing::debug!(sql, params = params.len(), "sculpt.sqlite.query");

        let mut stmt = self.conn.prepare(sql)?;
        bind(&mut stmt, params)?;

        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let mut rows = stmt.raw_query();
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = Row::new();
            for (idx, name) in columns.iter().enumerate() {
                let value = OwnedSQLiteValue::from(row.get_ref(idx)?);
                record.insert(name.clone(), Value::from(value));
            }
            records.push(record);
        }
        Ok(records)
    }
}

/// Binds named entries to matching `:name` placeholders first, then fills
/// the remaining slots with every other entry, lowest index first.
fn bind(stmt: &mut Statement<'_>, params: &BoundParams) -> Result<()> {
    let expected = stmt.parameter_count();
    if params.len() != expected {
        return Err(rusqlite::Error::InvalidParameterCount(params.len(), expected).into());
    }

    let mut slots: Vec<Option<&Value>> = vec![None; expected];
    let mut positional = Vec::new();
    for param in params.iter() {
        let named = match param.name.as_deref() {
            Some(name) => named_index(stmt, name)?,
            None => None,
        };
        match named {
            Some(index) => slots[index - 1] = Some(&param.value),
            None => positional.push(&param.value),
        }
    }

    let mut positional = positional.into_iter();
    for (offset, slot) in slots.into_iter().enumerate() {
        let index = offset + 1;
        let value = slot.or_else(|| positional.next()).ok_or_else(|| {
            SculptError::Configuration(format!("no value bound for parameter {index}"))
        })?;
        stmt.raw_bind_parameter(index, OwnedSQLiteValue::from(value))?;
    }
    Ok(())
}

fn named_index(stmt: &Statement<'_>, name: &str) -> Result<Option<usize>> {
    if name.starts_with(NAMED_PREFIXES) {
        return Ok(stmt.parameter_index(name)?);
    }
    for prefix in NAMED_PREFIXES {
        if let Some(index) = stmt.parameter_index(&format!("{prefix}{name}"))? {
            return Ok(Some(index));
        }
    }
    Ok(None)
}
