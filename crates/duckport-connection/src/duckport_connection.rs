//! Duckport Connection - database file lifecycle
//!
//! `DatabaseManager` owns the single engine handle for the selected database
//! file. It opens the handle lazily on first use, replaces it when the file
//! changes, and hands the same handle to the table exporter.

mod manager;

pub use manager::DatabaseManager;
