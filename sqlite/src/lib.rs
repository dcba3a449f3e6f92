//! SQLite backend for Sculpt
//!
//! This crate provides the SQLite value conversions, a declared-type converter
//! for `typed` fields and, behind the `rusqlite` feature, a [`Client`] that
//! executes provider queries on a [`rusqlite::Connection`].
//!
//! [`Client`]: sculpt_core::Client

#[cfg(feature = "rusqlite")]
mod client;
mod type_converter;
pub mod values;

#[cfg(feature = "rusqlite")]
pub use client::SQLiteClient;
pub use type_converter::SQLiteTypeConverter;
pub use values::OwnedSQLiteValue;
