//! Retention manager
//!
//! Keeps the newest `keep_count` artifacts in the backup directory and
//! deletes the rest together with their descriptors. Also sweeps descriptor
//! files whose artifact is gone.

#![allow(clippy::result_large_err)]

use checkvault_core::errors::ExError;
use checkvault_core::model::{ArtifactName, DESCRIPTOR_EXTENSION};
use checkvault_core::{select_for_deletion, RetentionPolicy};
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::errors::{io_error, Result};
use crate::fs::directory::{file_names, list_artifacts};
use crate::fs::{FileRemover, FsMetadata, FsRemover, MetadataSource};

/// What one retention pass did
#[derive(Debug, Default)]
pub struct RetentionOutcome {
    /// Artifacts removed, oldest first
    pub deleted: Vec<PathBuf>,
    /// Artifacts selected for deletion that could not be removed
    pub failed: Vec<(PathBuf, ExError)>,
    /// Artifacts left alone because their modification time was unreadable
    pub unorderable: usize,
    /// Descriptors removed because their artifact no longer exists
    pub orphans_removed: usize,
}

impl RetentionOutcome {
    pub fn deleted_count(&self) -> usize {
        self.deleted.len()
    }
}

pub struct RetentionManager<M = FsMetadata, R = FsRemover> {
    dir: PathBuf,
    extension: String,
    policy: RetentionPolicy,
    metadata: M,
    remover: R,
}

impl RetentionManager<FsMetadata, FsRemover> {
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>, policy: RetentionPolicy) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
            policy,
            metadata: FsMetadata,
            remover: FsRemover,
        }
    }
}

impl<M: MetadataSource, R: FileRemover> RetentionManager<M, R> {
    /// Swap the modification-time source
    pub fn with_metadata<N: MetadataSource>(self, metadata: N) -> RetentionManager<N, R> {
        RetentionManager {
            dir: self.dir,
            extension: self.extension,
            policy: self.policy,
            metadata,
            remover: self.remover,
        }
    }

    /// Swap what actually deletes files
    pub fn with_remover<S: FileRemover>(self, remover: S) -> RetentionManager<M, S> {
        RetentionManager {
            dir: self.dir,
            extension: self.extension,
            policy: self.policy,
            metadata: self.metadata,
            remover,
        }
    }

    pub fn policy(&self) -> RetentionPolicy {
        self.policy
    }

    /// Delete excess artifacts, oldest first, then sweep orphaned descriptors
    ///
    /// A failure to delete one artifact is recorded and the pass continues.
    ///
    /// # Errors
    ///
    /// `Filesystem` when the directory cannot be listed.
    pub fn apply(&self) -> Result<RetentionOutcome> {
        let entries = list_artifacts(&self.dir, &self.extension, &self.metadata)?;
        let mut outcome = RetentionOutcome {
            unorderable: entries.iter().filter(|e| !e.is_orderable()).count(),
            ..RetentionOutcome::default()
        };

        let doomed = select_for_deletion(&entries, self.policy.keep_count());
        debug!(
            artifacts = entries.len(),
            keep_count = self.policy.keep_count(),
            selected = doomed.len(),
            "retention selection"
        );

        for path in doomed {
            match self.delete_artifact(&path) {
                Ok(()) => outcome.deleted.push(path),
                Err(e) => {
                    warn!(artifact = %path.display(), error = %e, "cannot delete old backup");
                    outcome.failed.push((path, e));
                }
            }
        }

        outcome.orphans_removed = self.sweep_orphaned_descriptors()?;
        Ok(outcome)
    }

    /// Remove descriptors that no longer sit next to any artifact
    ///
    /// Only files that parse as artifacts of the configured extension keep a
    /// descriptor attached. Leftover temp files and operator copies do not.
    ///
    /// # Errors
    ///
    /// `Filesystem` when the directory cannot be listed.
    pub fn sweep_orphaned_descriptors(&self) -> Result<usize> {
        let names = file_names(&self.dir)?;
        let live_stems: HashSet<String> = names
            .iter()
            .filter_map(|n| ArtifactName::parse(n, &self.extension).ok())
            .map(|name| name.stem())
            .collect();

        let mut removed = 0;
        for name in &names {
            let Some(stem) = ArtifactName::descriptor_stem(name) else {
                continue;
            };
            if live_stems.contains(stem) {
                continue;
            }
            let path = self.dir.join(name);
            match self.remover.remove(&path) {
                Ok(()) => {
                    info!(descriptor = %path.display(), "removed orphaned backup descriptor");
                    removed += 1;
                }
                Err(e) => warn!(descriptor = %path.display(), error = %e, "cannot remove orphaned descriptor"),
            }
        }
        Ok(removed)
    }

    /// Delete one artifact and then its descriptor
    ///
    /// A missing or undeletable descriptor does not fail the artifact's
    /// deletion; the next sweep retries it.
    fn delete_artifact(&self, artifact: &Path) -> Result<()> {
        self.remover
            .remove(artifact)
            .map_err(|e| io_error("delete_artifact", artifact, e))?;
        info!(artifact = %artifact.display(), "deleted old backup");

        let descriptor = artifact.with_extension(DESCRIPTOR_EXTENSION);
        match self.remover.remove(&descriptor) {
            Ok(()) => debug!(descriptor = %descriptor.display(), "deleted backup descriptor"),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(descriptor = %descriptor.display(), "backup had no descriptor")
            }
            Err(e) => warn!(descriptor = %descriptor.display(), error = %e, "cannot delete backup descriptor"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_sweep_keeps_attached_descriptors() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        for name in [
            "backup_2026-01-02_03-00-00.db",
            "backup_2026-01-02_03-00-00.txt",
            "backup_2025-01-02_03-00-00.zip",
            "backup_2025-01-02_03-00-00.txt",
            "backup_2024-01-02_03-00-00.txt",
            "backup_2023-01-02_03-00-00.db.partial",
            "backup_2023-01-02_03-00-00.txt",
            "notes.txt",
        ] {
            fs::write(dir.join(name), b"x").unwrap();
        }

        let manager = RetentionManager::new(dir, "db", RetentionPolicy::default());
        assert_eq!(manager.sweep_orphaned_descriptors().unwrap(), 3);

        assert!(dir.join("backup_2026-01-02_03-00-00.txt").exists());
        assert!(!dir.join("backup_2025-01-02_03-00-00.txt").exists());
        assert!(!dir.join("backup_2024-01-02_03-00-00.txt").exists());
        assert!(!dir.join("backup_2023-01-02_03-00-00.txt").exists());
        assert!(dir.join("backup_2025-01-02_03-00-00.zip").exists());
        assert!(dir.join("notes.txt").exists());
    }

    #[test]
    fn test_sweep_ignores_leftovers_sharing_a_stem() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        for name in [
            "backup_2024-01-02_03-00-00.txt",
            "backup_2024-01-02_03-00-00.txt.tmp",
            "backup_2022-01-02_03-00-00.txt",
            "backup_2022-01-02_03-00-00.bak",
        ] {
            fs::write(dir.join(name), b"x").unwrap();
        }

        let manager = RetentionManager::new(dir, "db", RetentionPolicy::default());
        assert_eq!(manager.sweep_orphaned_descriptors().unwrap(), 2);

        assert!(!dir.join("backup_2024-01-02_03-00-00.txt").exists());
        assert!(!dir.join("backup_2022-01-02_03-00-00.txt").exists());
        assert!(dir.join("backup_2024-01-02_03-00-00.txt.tmp").exists());
        assert!(dir.join("backup_2022-01-02_03-00-00.bak").exists());
    }
}
