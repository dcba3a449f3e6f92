//! Reserved document keys.

pub const COLLECTION: &str = "$collection";
pub const ENTITY: &str = "$entity";
pub const COLUMN: &str = "$column";
pub const VALUE: &str = "$value";
pub const FIELD: &str = "$field";
pub const PARAMS: &str = "$params";
pub const DEFINITION: &str = "$definition";
pub const KEY: &str = "$key";
pub const DELIMITER: &str = "$delimiter";
pub const FORMAT: &str = "$format";
pub const LIMIT: &str = "$limit";
pub const OFFSET: &str = "$offset";
pub const REF: &str = "$ref";
pub const CONTEXT: &str = "$context";
pub const DEFAULT: &str = "$default";

/// Tags that may appear on a definition node. `$ref` is only valid inside `$params`.
pub const NODE_TAGS: &[&str] = &[
    COLLECTION, ENTITY, COLUMN, VALUE, FIELD, PARAMS, DEFINITION, KEY, DELIMITER, FORMAT, LIMIT,
    OFFSET, CONTEXT, DEFAULT,
];

/// `true` for keys reserved by the document format.
pub fn is_tag(key: &str) -> bool {
    key.starts_with('$')
}
