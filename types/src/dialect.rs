//! Database dialect enum
//!
//! Identifies the SQL dialect a query source speaks. The only dialect-specific
//! behavior Sculpt needs is how a `LIMIT`/`OFFSET` window is appended to an
//! existing query.

/// Largest row count MySQL accepts in a `LIMIT` clause.
const MYSQL_MAX_ROWS: u64 = u64::MAX;

/// SQL dialect for database-specific behavior
///
/// # Examples
///
/// ```
/// use sculpt_types::Dialect;
///
/// let sql = Dialect::SQLite.paginate("SELECT * FROM news", Some(10), Some(20));
/// assert_eq!(sql, "SELECT * FROM news LIMIT 10 OFFSET 20");
///
/// let sql = Dialect::MySQL.paginate("SELECT * FROM news", Some(10), Some(20));
/// assert_eq!(sql, "SELECT * FROM news LIMIT 20, 10");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Dialect {
    /// SQLite - offset without limit needs `LIMIT -1`
    #[default]
    #[cfg_attr(feature = "serde", serde(alias = "turso", alias = "libsql"))]
    SQLite,

    /// PostgreSQL - `LIMIT` and `OFFSET` are independent clauses
    #[cfg_attr(feature = "serde", serde(alias = "postgres", alias = "pg"))]
    PostgreSQL,

    /// MySQL - uses the `LIMIT offset, count` form
    #[cfg_attr(feature = "serde", serde(alias = "mariadb"))]
    MySQL,
}

impl Dialect {
    /// Parse a dialect from a string (case-insensitive)
    ///
    /// Supports various common aliases:
    /// - SQLite: `"sqlite"`, `"turso"`, `"libsql"`
    /// - PostgreSQL: `"postgresql"`, `"postgres"`, `"pg"`
    /// - MySQL: `"mysql"`, `"mariadb"`
    ///
    /// # Examples
    ///
    /// ```
    /// use sculpt_types::Dialect;
    ///
    /// assert_eq!(Dialect::parse("sqlite"), Some(Dialect::SQLite));
    /// assert_eq!(Dialect::parse("pg"), Some(Dialect::PostgreSQL));
    /// assert_eq!(Dialect::parse("unknown"), None);
    /// ```
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("sqlite")
            || s.eq_ignore_ascii_case("turso")
            || s.eq_ignore_ascii_case("libsql")
        {
            Some(Dialect::SQLite)
        } else if s.eq_ignore_ascii_case("postgresql")
            || s.eq_ignore_ascii_case("postgres")
            || s.eq_ignore_ascii_case("pg")
        {
            Some(Dialect::PostgreSQL)
        } else if s.eq_ignore_ascii_case("mysql") || s.eq_ignore_ascii_case("mariadb") {
            Some(Dialect::MySQL)
        } else {
            None
        }
    }

    /// Get the dialect name as a lowercase string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Dialect::SQLite => "sqlite",
            Dialect::PostgreSQL => "postgresql",
            Dialect::MySQL => "mysql",
        }
    }

    /// Renders the paging clause for this dialect, without a leading space.
    ///
    /// Returns an empty string when neither `limit` nor `offset` is set.
    #[must_use]
    pub fn limit_clause(&self, limit: Option<u64>, offset: Option<u64>) -> String {
        match (self, limit, offset) {
            (_, None, None) => String::new(),
            (_, Some(limit), None) => format!("LIMIT {limit}"),
            (Dialect::SQLite | Dialect::PostgreSQL, Some(limit), Some(offset)) => {
                format!("LIMIT {limit} OFFSET {offset}")
            }
            (Dialect::SQLite, None, Some(offset)) => format!("LIMIT -1 OFFSET {offset}"),
            (Dialect::PostgreSQL, None, Some(offset)) => format!("OFFSET {offset}"),
            (Dialect::MySQL, Some(limit), Some(offset)) => format!("LIMIT {offset}, {limit}"),
            (Dialect::MySQL, None, Some(offset)) => format!("LIMIT {offset}, {MYSQL_MAX_ROWS}"),
        }
    }

    /// Appends the paging clause to `sql`.
    ///
    /// Trailing whitespace and statement terminators are dropped from the
    /// source query before the clause is appended.
    #[must_use]
    pub fn paginate(&self, sql: &str, limit: Option<u64>, offset: Option<u64>) -> String {
        let clause = self.limit_clause(limit, offset);
        let base = sql.trim_end().trim_end_matches(';').trim_end();
        if clause.is_empty() {
            return base.to_string();
        }
        format!("{base} {clause}")
    }
}

impl core::fmt::Display for Dialect {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for Dialect {
    type Err = DialectParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dialect::parse(s).ok_or(DialectParseError)
    }
}

/// Error returned when parsing an unknown dialect string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialectParseError;

impl core::fmt::Display for DialectParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("unknown dialect")
    }
}

impl std::error::Error for DialectParseError {}
