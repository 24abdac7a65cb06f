//! Snapshot execution
//!
//! The export is written to `<artifact>.partial` and only renamed to the
//! artifact name once the store reported success and the file is non-empty.
//! A failed export therefore never leaves a file that retention would count.

#![allow(clippy::result_large_err)]

use checkvault_core::model::{ArtifactName, BackupArtifact};
use chrono::NaiveDateTime;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::errors::{already_exists, empty_export, io_error, Result};
use crate::snapshot::connector::StoreConnector;

/// Pick the artifact name for a snapshot taken at `timestamp`
///
/// The plain timestamped name is used unless an artifact, descriptor, or
/// staging file already claims it, in which case `_1`, `_2`, ... are tried.
pub fn allocate_name(dir: &Path, timestamp: NaiveDateTime, extension: &str) -> Result<ArtifactName> {
    let base = ArtifactName::new(timestamp, extension);
    (0..=u32::MAX)
        .map(|seq| base.clone().with_sequence(seq))
        .find(|name| {
            !name.path_in(dir).exists()
                && !name.descriptor_path_in(dir).exists()
                && !name.staging_path_in(dir).exists()
        })
        .ok_or_else(|| already_exists("allocate_artifact_name", &base.path_in(dir)))
}

/// Export the store into `dir` under `name`
///
/// # Errors
///
/// - `StoreUnreachable` if no connection could be opened
/// - `ExportFailure` if the export failed or produced an empty file
/// - `Filesystem` if the staged file could not be inspected or renamed
/// - `AlreadyExists` if the artifact name was claimed in the meantime
pub fn execute_snapshot(
    connector: &dyn StoreConnector,
    dir: &Path,
    name: &ArtifactName,
) -> Result<BackupArtifact> {
    let target = name.path_in(dir);
    let staging = StagingFile::new(name.staging_path_in(dir));

    {
        let mut conn = connector.connect()?;
        conn.export_snapshot(staging.path())?;
    }

    let size_bytes = fs::metadata(staging.path())
        .map_err(|e| io_error("inspect_snapshot", staging.path(), e))?
        .len();
    if size_bytes == 0 {
        return Err(empty_export(staging.path()));
    }
    if target.exists() {
        return Err(already_exists("publish_snapshot", &target));
    }

    staging.persist(&target)?;
    debug!(artifact = %target.display(), size_bytes, "snapshot published");

    let path = fs::canonicalize(&target).unwrap_or(target);
    Ok(BackupArtifact {
        name: name.clone(),
        path,
        size_bytes,
    })
}

/// Staged export that is removed unless it was persisted
struct StagingFile {
    path: PathBuf,
    persisted: bool,
}

impl StagingFile {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            persisted: false,
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn persist(mut self, target: &Path) -> Result<()> {
        fs::rename(&self.path, target).map_err(|e| io_error("publish_snapshot", target, e))?;
        self.persisted = true;
        Ok(())
    }
}

impl Drop for StagingFile {
    fn drop(&mut self) {
        if self.persisted {
            return;
        }
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(staging = %self.path.display(), "removed staged export"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(staging = %self.path.display(), error = %e, "cannot remove staged export"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 2)
            .unwrap()
            .and_hms_opt(3, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_allocate_plain_name_when_free() {
        let temp_dir = TempDir::new().unwrap();
        let name = allocate_name(temp_dir.path(), ts(), "db").unwrap();
        assert_eq!(name.file_name(), "backup_2026-01-02_03-00-00.db");
    }

    #[test]
    fn test_allocate_skips_claimed_names() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        fs::write(dir.join("backup_2026-01-02_03-00-00.db"), b"x").unwrap();
        fs::write(dir.join("backup_2026-01-02_03-00-00_1.txt"), b"orphan").unwrap();
        fs::write(dir.join("backup_2026-01-02_03-00-00_2.db.partial"), b"").unwrap();

        let name = allocate_name(dir, ts(), "db").unwrap();
        assert_eq!(name.file_name(), "backup_2026-01-02_03-00-00_3.db");
    }
}
