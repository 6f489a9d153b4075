//! Formats written by the engine's own serializer

use duckport_core::{Connection, NativeFormat};
use std::path::Path;

use crate::exporter::ExportError;

/// Hand `table` to the engine's `COPY` path
pub(crate) async fn copy_table(
    connection: &dyn Connection,
    table: &str,
    dest: &Path,
    format: NativeFormat,
) -> Result<(), ExportError> {
    let native = connection.as_native_export().ok_or_else(|| {
        ExportError::Query(format!(
            "{} connections cannot write {:?} files",
            connection.driver_name(),
            format
        ))
    })?;
    native.copy_table(table, dest, format).await?;
    Ok(())
}
