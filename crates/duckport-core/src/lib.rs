//! Duckport Core - Core abstractions shared by the exporter crates
//!
//! This crate provides the fundamental traits and types that all other
//! duckport crates depend on. It defines:
//!
//! - `DatabaseDriver` - Factory trait that opens database files
//! - `Connection` - Trait for an open database connection
//! - `SchemaIntrospection` - Trait for table listing and column metadata
//! - `NativeExport` - Trait for the engine's own bulk export paths
//! - Common types like `Value`, `Row`, `ColumnDescriptor`, etc.

mod connection;
mod driver;
mod error;
mod schema;
mod types;

pub use connection::*;
pub use driver::*;
pub use error::*;
pub use schema::*;
pub use types::*;
