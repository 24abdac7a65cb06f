//! Backup directory listing
//!
//! Only files whose names parse as artifact names for the configured
//! extension are artifacts. Descriptors, staging files, and anything an
//! operator dropped into the directory are ignored.

use chrono::{DateTime, Local, NaiveDateTime};
use checkvault_core::model::ArtifactName;
use checkvault_core::ArtifactEntry;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};

use crate::errors::{io_error, Result};

/// Source of artifact modification times
///
/// Retention orders by what this returns; tests substitute a fake to
/// exercise unreadable or colliding times.
pub trait MetadataSource: Send + Sync {
    fn modified(&self, path: &Path) -> io::Result<SystemTime>;
}

/// Modification times straight from the filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsMetadata;

impl MetadataSource for FsMetadata {
    fn modified(&self, path: &Path) -> io::Result<SystemTime> {
        fs::metadata(path)?.modified()
    }
}

/// Deletes files on behalf of the retention pass
pub trait FileRemover: Send + Sync {
    fn remove(&self, path: &Path) -> io::Result<()>;
}

/// Plain `remove_file`
#[derive(Debug, Clone, Copy, Default)]
pub struct FsRemover;

impl FileRemover for FsRemover {
    fn remove(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}

/// Make sure the backup directory exists
///
/// Returns `true` when the directory had to be created.
pub fn ensure_backup_dir(dir: &Path) -> Result<bool> {
    if dir.is_dir() {
        return Ok(false);
    }
    fs::create_dir_all(dir).map_err(|e| io_error("ensure_backup_dir", dir, e))?;
    Ok(true)
}

/// Artifact files in `dir` with their modification times
///
/// An unreadable time is logged and recorded as `None`; such entries are
/// never selected for deletion.
pub fn list_artifacts(
    dir: &Path,
    extension: &str,
    metadata: &dyn MetadataSource,
) -> Result<Vec<ArtifactEntry>> {
    let files = artifact_files(dir, extension)?;
    let entries = files
        .into_iter()
        .map(|(name, path)| {
            let modified = match metadata.modified(&path) {
                Ok(t) => Some(t),
                Err(e) => {
                    warn!(artifact = %path.display(), error = %e, "cannot read modification time, artifact left alone");
                    None
                }
            };
            ArtifactEntry {
                path,
                file_name: name.file_name(),
                modified,
            }
        })
        .collect();
    Ok(entries)
}

/// Number of artifacts currently in `dir`
pub fn count_artifacts(dir: &Path, extension: &str) -> Result<usize> {
    Ok(artifact_files(dir, extension)?.len())
}

/// One artifact as reported by `checkvault list`
#[derive(Debug, Clone, Serialize)]
pub struct BackupListing {
    pub name: ArtifactName,
    pub path: PathBuf,
    pub size_bytes: Option<u64>,
    pub modified: Option<NaiveDateTime>,
    pub has_descriptor: bool,
}

/// Describe every artifact in `dir`, oldest name first
///
/// A missing directory simply has no backups yet.
pub fn list_backups(dir: &Path, extension: &str) -> Result<Vec<BackupListing>> {
    if !dir.exists() {
        debug!(backup_dir = %dir.display(), "backup directory does not exist yet");
        return Ok(Vec::new());
    }

    let mut listings: Vec<BackupListing> = artifact_files(dir, extension)?
        .into_iter()
        .map(|(name, path)| {
            let meta = fs::metadata(&path).ok();
            let has_descriptor = name.descriptor_path_in(dir).is_file();
            BackupListing {
                size_bytes: meta.as_ref().map(|m| m.len()),
                modified: meta
                    .and_then(|m| m.modified().ok())
                    .map(|t| DateTime::<Local>::from(t).naive_local()),
                has_descriptor,
                name,
                path,
            }
        })
        .collect();
    listings.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(listings)
}

pub(crate) fn artifact_files(dir: &Path, extension: &str) -> Result<Vec<(ArtifactName, PathBuf)>> {
    let mut found = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| io_error("list_backup_dir", dir, e))? {
        let entry = entry.map_err(|e| io_error("list_backup_dir", dir, e))?;
        let path = entry.path();
        let Some(file_name) = entry.file_name().to_str().map(str::to_owned) else {
            continue;
        };
        let Ok(name) = ArtifactName::parse(&file_name, extension) else {
            continue;
        };
        if path.is_file() {
            found.push((name, path));
        }
    }
    Ok(found)
}

/// Names of every plain file in `dir`
pub(crate) fn file_names(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| io_error("list_backup_dir", dir, e))? {
        let entry = entry.map_err(|e| io_error("list_backup_dir", dir, e))?;
        if let Some(name) = entry.file_name().to_str() {
            if entry.path().is_file() {
                names.push(name.to_owned());
            }
        }
    }
    Ok(names)
}
