//! Provenance recorder
//!
//! Writes the descriptor that explains an artifact. Called after retention.

use checkvault_core::model::{BackupArtifact, ProvenanceRecord};
use std::path::PathBuf;
use tracing::debug;

use crate::errors::Result;
use crate::fs::write_new;

/// Write the descriptor for `artifact`
///
/// # Errors
///
/// - `AlreadyExists` if a descriptor with that name is already present
/// - `Filesystem` if the file cannot be written
pub fn write_descriptor(artifact: &BackupArtifact, record: &ProvenanceRecord) -> Result<PathBuf> {
    let path = artifact.descriptor_path();
    let text = record.render();
    write_new(&path, text.as_bytes())?;
    debug!(descriptor = %path.display(), bytes = text.len(), "descriptor written");
    Ok(path)
}
