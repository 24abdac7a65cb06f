//! Error helpers for checkvault-store
//!
//! Map rusqlite and I/O failures onto the backup failure taxonomy.

use checkvault_core::errors::{ExError, ExErrorKind};
use std::path::Path;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// The store could not be opened or did not look like a database
pub fn store_unreachable(target: &str, err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::StoreUnreachable)
        .with_op("store_connect")
        .with_message(format!("cannot open store '{}': {}", target, err))
}

/// The native snapshot command failed
pub fn export_failure(destination: &Path, err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::ExportFailure)
        .with_op("snapshot_export")
        .with_path(destination)
        .with_message(err.to_string())
}

/// The snapshot command reported success but left nothing usable behind
pub fn empty_export(destination: &Path) -> ExError {
    ExError::new(ExErrorKind::ExportFailure)
        .with_op("snapshot_export")
        .with_path(destination)
        .with_message("export produced an empty file")
}

/// A file that must be created fresh is already there
pub fn already_exists(operation: &str, path: &Path) -> ExError {
    ExError::new(ExErrorKind::AlreadyExists)
        .with_op(operation.to_string())
        .with_path(path)
        .with_message("refusing to overwrite an existing file")
}

/// Create a filesystem error
pub fn io_error(operation: &str, path: &Path, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Filesystem)
        .with_op(operation.to_string())
        .with_path(path)
        .with_message(err.to_string())
}
