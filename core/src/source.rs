//! Data sources a provider can fetch from.

use std::fmt;
use std::rc::Rc;

use sculpt_types::Dialect;
use serde_json::Value;

use crate::context::Row;
use crate::error::Result;
use crate::params::BoundParams;

/// A database client that executes SQL text with bound parameters.
///
/// Implementations return every row of the result set, fully materialized.
pub trait Client {
    fn query(&self, sql: &str, params: &BoundParams) -> Result<Vec<Row>>;
}

impl<C: Client + ?Sized> Client for Rc<C> {
    fn query(&self, sql: &str, params: &BoundParams) -> Result<Vec<Row>> {
        (**self).query(sql, params)
    }
}

/// Appends a paging window to query text.
///
/// The JSON front-end delegates `$limit`/`$offset` to a pager.
pub trait Pager {
    fn paginate(&self, sql: &str, limit: Option<u64>, offset: Option<u64>) -> String;
}

impl Pager for Dialect {
    fn paginate(&self, sql: &str, limit: Option<u64>, offset: Option<u64>) -> String {
        Dialect::paginate(self, sql, limit, offset)
    }
}

/// A user supplied fetch function.
#[derive(Clone)]
pub struct FetchFn(Rc<dyn Fn(&BoundParams) -> Result<Value>>);

impl FetchFn {
    pub fn new(f: impl Fn(&BoundParams) -> Result<Value> + 'static) -> Self {
        Self(Rc::new(f))
    }
}

impl fmt::Debug for FetchFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FetchFn(..)")
    }
}

/// Where a provider's data comes from.
#[derive(Clone)]
pub enum Source {
    /// SQL text executed through a database client.
    Query { sql: String, client: Rc<dyn Client> },
    /// A static in-memory value (rows, one row, or a scalar).
    Static(Value),
    /// A callable producing the data from the bound parameters.
    Callable(FetchFn),
}

impl Source {
    pub fn query(sql: impl Into<String>, client: Rc<dyn Client>) -> Self {
        Source::Query {
            sql: sql.into(),
            client,
        }
    }

    pub fn from_fn(f: impl Fn(&BoundParams) -> Result<Value> + 'static) -> Self {
        Source::Callable(FetchFn::new(f))
    }

    /// Fetches the raw data.
    ///
    /// Query sources always produce an array of row objects. Static data is
    /// returned as-is and ignores the parameters.
    pub fn fetch(&self, params: &BoundParams) -> Result<Value> {
        match self {
            Source::Query { sql, client } => {
                let rows = client.query(sql, params)?;
                Ok(Value::Array(rows.into_iter().map(Value::Object).collect()))
            }
            Source::Static(value) => Ok(value.clone()),
            Source::Callable(f) => (f.0)(params),
        }
    }

    /// A short label for diagnostics.
    pub fn label(&self) -> &str {
        match self {
            Source::Query { sql, .. } => sql,
            Source::Static(_) => "<static>",
            Source::Callable(_) => "<callable>",
        }
    }
}

impl From<Value> for Source {
    fn from(value: Value) -> Self {
        Source::Static(value)
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Query { sql, .. } => f.debug_struct("Query").field("sql", sql).finish(),
            Source::Static(value) => f.debug_tuple("Static").field(value).finish(),
            Source::Callable(func) => f.debug_tuple("Callable").field(func).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::params::Parameters;
    use serde_json::json;

    struct Recording {
        calls: RefCell<Vec<(String, Vec<Value>)>>,
    }

    impl Client for Recording {
        fn query(&self, sql: &str, params: &BoundParams) -> Result<Vec<Row>> {
            self.calls
                .borrow_mut()
                .push((sql.to_string(), params.values().cloned().collect()));
            Ok(vec![json!({"id": 1}).as_object().cloned().unwrap()])
        }
    }

    #[test]
    fn query_source_wraps_rows() {
        let client = Rc::new(Recording {
            calls: RefCell::new(Vec::new()),
        });
        let source = Source::query("SELECT id FROM news WHERE id = ?", client.clone());
        let params = Parameters::new().bind(1).resolve(None).unwrap();

        assert_eq!(source.fetch(&params).unwrap(), json!([{"id": 1}]));
        assert_eq!(
            client.calls.borrow().as_slice(),
            &[("SELECT id FROM news WHERE id = ?".to_string(), vec![json!(1)])]
        );
    }

    #[test]
    fn static_and_callable_sources() {
        let params = Parameters::new().named("id", 3).resolve(None).unwrap();

        let source = Source::from(json!({"cnt": 2}));
        assert_eq!(source.fetch(&params).unwrap(), json!({"cnt": 2}));
        assert_eq!(source.label(), "<static>");

        let source = Source::from_fn(|params| Ok(json!({"id": params.get("id").cloned()})));
        assert_eq!(source.fetch(&params).unwrap(), json!({"id": 3}));
    }

    #[test]
    fn dialect_is_a_pager() {
        let pager: &dyn Pager = &Dialect::PostgreSQL;
        assert_eq!(
            pager.paginate("SELECT * FROM news", Some(5), Some(10)),
            "SELECT * FROM news LIMIT 5 OFFSET 10"
        );
    }
}
