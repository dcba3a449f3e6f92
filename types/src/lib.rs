//! Shared type definitions for Sculpt
//!
//! This crate provides the small vocabulary shared by the Sculpt crates:
//!
//! - [`Dialect`] - SQL dialect identification and paging clause rendering
//! - [`ColumnType`] - classification of declared SQL column types, used by
//!   backend type converters
//!
//! # Features
//!
//! - `serde` - Enable serde serialization/deserialization

mod column_type;
mod dialect;

pub use column_type::ColumnType;
pub use dialect::{Dialect, DialectParseError};

/// Prelude module for commonly used types
pub mod prelude {
    pub use crate::{ColumnType, Dialect};
}
