//! DuckDB driver for duckport
//!
//! DuckDB is an in-process analytical database management system.
//! This crate wraps a single DuckDB file handle behind the core
//! `Connection`, `SchemaIntrospection` and `NativeExport` traits.

mod driver;
#[cfg(test)]
mod driver_tests;
mod native;
mod schema;

pub use driver::*;
