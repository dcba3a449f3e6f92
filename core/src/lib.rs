//! Declarative result shaping.
//!
//! A [`Definition`] describes the nested output wanted from one or more data
//! sources. [`build`] walks it depth-first: providers fetch rows, field
//! transforms convert columns, and maps assemble ordered records. Definitions
//! are built in code or parsed from JSON documents with [`JsonParser`].

pub mod builder;
pub mod context;
pub mod definition;
pub mod error;
pub mod field;
pub mod json;
pub mod params;
pub mod provider;
pub mod source;
mod trace;

// Re-export key types and traits
pub use builder::{Builder, build};
pub use context::{Context, Row};
pub use definition::Definition;
pub use error::{Result, SculptError};
pub use field::{Callback, FieldTransform, FormatPattern, TypeConverter};
pub use json::JsonParser;
pub use params::{BoundParam, BoundParams, ParamValue, Parameter, Parameters, Reference, reference};
pub use provider::{Collected, Collection, Fetch, Filter, KeyFn, Provider};
pub use source::{Client, FetchFn, Pager, Source};
