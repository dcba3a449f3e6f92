//! JSON definition documents.
//!
//! A document is an ordinary JSON object tree. Objects carrying one of the
//! `$`-prefixed tags below become providers, field transforms or context
//! constants; every other object is a map whose keys become output keys.
//! Strings name columns of the current row, and numbers, booleans and `null`
//! render as themselves.
//!
//! ```json
//! {
//!   "totalEntries": {"$value": "SELECT COUNT(*) AS cnt FROM news",
//!                    "$definition": {"$field": "integer", "$key": "cnt"}},
//!   "entries": {
//!     "$collection": "SELECT id, title, authorId FROM news",
//!     "$limit": 10,
//!     "$definition": {
//!       "id": {"$field": "integer"},
//!       "title": "title",
//!       "author": {
//!         "$entity": "SELECT name FROM author WHERE id = :id",
//!         "$params": {"id": {"$ref": "authorId"}},
//!         "$definition": {"name": "name"}
//!       }
//!     }
//!   }
//! }
//! ```

mod parser;
pub mod tag;

pub use parser::JsonParser;
