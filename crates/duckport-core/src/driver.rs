//! Driver trait: the factory that turns a database path into a connection

use crate::{Connection, DuckportError, Result};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

/// Core driver trait that all database drivers must implement
#[async_trait]
pub trait DatabaseDriver: Send + Sync {
    /// Unique identifier for this driver (e.g., "duckdb")
    fn id(&self) -> &'static str;

    /// Display name for UI
    fn display_name(&self) -> &'static str {
        self.id()
    }

    /// Open a connection to the database file at `path`
    async fn connect(&self, path: &Path) -> Result<Arc<dyn Connection>>;
}

/// Check that `path` names an existing database file
pub fn validate_database_path(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(DuckportError::InvalidPath(
            "no database path selected".to_string(),
        ));
    }
    if !path.exists() {
        return Err(DuckportError::InvalidPath(format!(
            "{} does not exist",
            path.display()
        )));
    }
    if path.is_dir() {
        return Err(DuckportError::InvalidPath(format!(
            "{} is a directory",
            path.display()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_empty_path_is_invalid() {
        let err = validate_database_path(&PathBuf::new()).unwrap_err();
        assert!(matches!(err, DuckportError::InvalidPath(_)));
    }

    #[test]
    fn test_missing_path_is_invalid() {
        let path = std::env::temp_dir().join("duckport-definitely-missing.duckdb");
        let err = validate_database_path(&path).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_directory_is_invalid() {
        let err = validate_database_path(&std::env::temp_dir()).unwrap_err();
        assert!(matches!(err, DuckportError::InvalidPath(_)));
    }
}
