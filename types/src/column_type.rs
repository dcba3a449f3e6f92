//! Declared column type classification
//!
//! Backends report the declared type of a result column as free text
//! (`"VARCHAR(255)"`, `"BIGINT"`, `"DATETIME"`). [`ColumnType`] folds those
//! declarations into the handful of categories a type converter cares about.

/// Category of a declared SQL column type.
///
/// # Examples
///
/// ```
/// use sculpt_types::ColumnType;
///
/// assert_eq!(ColumnType::from_sql_type("INTEGER"), ColumnType::Integer);
/// assert_eq!(ColumnType::from_sql_type("VARCHAR(255)"), ColumnType::Text);
/// assert_eq!(ColumnType::from_sql_type("DATETIME"), ColumnType::DateTime);
/// assert_eq!(ColumnType::from_sql_type("jsonb"), ColumnType::Json);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ColumnType {
    /// INT, INTEGER, BIGINT, SMALLINT, ... (anything containing `INT`)
    Integer,
    /// REAL, DOUBLE, FLOAT
    Real,
    /// NUMERIC, DECIMAL and undeclared affinities
    Numeric,
    /// TEXT, VARCHAR, CHARACTER, CLOB, UUID
    Text,
    /// BLOB, BYTEA and untyped columns
    Blob,
    /// BOOL, BOOLEAN
    Boolean,
    /// DATE, DATETIME, TIMESTAMP, TIMESTAMPTZ
    DateTime,
    /// JSON, JSONB
    Json,
}

const BOOLEAN_TYPES: &[&str] = &["bool", "boolean"];

const DATETIME_TYPES: &[&str] = &[
    "date",
    "datetime",
    "timestamp",
    "timestamptz",
    "timestamp with time zone",
    "timestamp without time zone",
];

const JSON_TYPES: &[&str] = &["json", "jsonb"];

const TEXT_TYPES: &[&str] = &["uuid", "citext", "string"];

const BLOB_TYPES: &[&str] = &["bytea", "binary", "varbinary"];

impl ColumnType {
    /// Determine the category for a declared SQL type string.
    ///
    /// Exact names for booleans, timestamps and JSON are matched first; the
    /// remaining declarations follow SQLite's column affinity rules.
    #[must_use]
    pub fn from_sql_type(sql_type: &str) -> Self {
        let declared = sql_type.trim();
        // Strip any size/precision suffix: VARCHAR(255) -> VARCHAR
        let base = declared
            .split_once('(')
            .map_or(declared, |(name, _)| name)
            .trim();

        let matches_any = |names: &[&str]| names.iter().any(|n| base.eq_ignore_ascii_case(n));

        if matches_any(BOOLEAN_TYPES) {
            return Self::Boolean;
        }
        if matches_any(DATETIME_TYPES) {
            return Self::DateTime;
        }
        if matches_any(JSON_TYPES) {
            return Self::Json;
        }
        if matches_any(TEXT_TYPES) {
            return Self::Text;
        }
        if matches_any(BLOB_TYPES) {
            return Self::Blob;
        }

        let upper = base.to_ascii_uppercase();
        if upper.contains("INT") {
            Self::Integer
        } else if upper.contains("CHAR") || upper.contains("CLOB") || upper.contains("TEXT") {
            Self::Text
        } else if upper.is_empty() || upper.contains("BLOB") {
            Self::Blob
        } else if upper.contains("REAL") || upper.contains("FLOA") || upper.contains("DOUB") {
            Self::Real
        } else {
            Self::Numeric
        }
    }

    /// Get the category name as a lowercase string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Real => "real",
            Self::Numeric => "numeric",
            Self::Text => "text",
            Self::Blob => "blob",
            Self::Boolean => "boolean",
            Self::DateTime => "datetime",
            Self::Json => "json",
        }
    }
}

impl core::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affinity_rules() {
        assert_eq!(ColumnType::from_sql_type("INT"), ColumnType::Integer);
        assert_eq!(ColumnType::from_sql_type("bigint"), ColumnType::Integer);
        assert_eq!(ColumnType::from_sql_type("UNSIGNED BIG INT"), ColumnType::Integer);
        assert_eq!(ColumnType::from_sql_type("int8"), ColumnType::Integer);
        assert_eq!(ColumnType::from_sql_type("NVARCHAR(100)"), ColumnType::Text);
        assert_eq!(ColumnType::from_sql_type("clob"), ColumnType::Text);
        assert_eq!(ColumnType::from_sql_type("BLOB"), ColumnType::Blob);
        assert_eq!(ColumnType::from_sql_type(""), ColumnType::Blob);
        assert_eq!(ColumnType::from_sql_type("DOUBLE PRECISION"), ColumnType::Real);
        assert_eq!(ColumnType::from_sql_type("float"), ColumnType::Real);
        assert_eq!(ColumnType::from_sql_type("DECIMAL(10,5)"), ColumnType::Numeric);
        assert_eq!(ColumnType::from_sql_type("money"), ColumnType::Numeric);
    }

    #[test]
    fn test_named_types() {
        assert_eq!(ColumnType::from_sql_type("BOOLEAN"), ColumnType::Boolean);
        assert_eq!(ColumnType::from_sql_type("bool"), ColumnType::Boolean);
        assert_eq!(ColumnType::from_sql_type("DATE"), ColumnType::DateTime);
        assert_eq!(ColumnType::from_sql_type("timestamptz"), ColumnType::DateTime);
        assert_eq!(ColumnType::from_sql_type("JSON"), ColumnType::Json);
        assert_eq!(ColumnType::from_sql_type("uuid"), ColumnType::Text);
        assert_eq!(ColumnType::from_sql_type("bytea"), ColumnType::Blob);
    }

    #[test]
    fn test_display() {
        assert_eq!(ColumnType::DateTime.to_string(), "datetime");
        assert_eq!(ColumnType::Integer.to_string(), "integer");
    }
}
