//! Atomic write primitives
//!
//! Content is written to a sibling temp file and renamed into place, so a
//! reader never sees a half-written file under the final name.

#![allow(clippy::result_large_err)]

use crate::errors::{already_exists, io_error, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Atomically create `target_path` with `content`
///
/// Fails with `AlreadyExists` instead of replacing an existing file. The
/// parent directory must already exist.
pub fn write_new(target_path: &Path, content: &[u8]) -> Result<()> {
    if target_path.exists() {
        return Err(already_exists("write_new", target_path));
    }

    let temp_path = temp_path_for(target_path);
    let written = write_temp(&temp_path, content).and_then(|_| {
        fs::rename(&temp_path, target_path).map_err(|e| io_error("rename_temp", target_path, e))
    });

    if written.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    written
}

fn write_temp(temp_path: &Path, content: &[u8]) -> Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(temp_path)
        .map_err(|e| io_error("create_temp", temp_path, e))?;
    file.write_all(content)
        .map_err(|e| io_error("write_temp", temp_path, e))?;
    file.sync_all()
        .map_err(|e| io_error("sync_temp", temp_path, e))
}

/// `name.txt` -> `name.txt.tmp`
fn temp_path_for(target_path: &Path) -> PathBuf {
    let mut name = target_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    target_path.with_file_name(name)
}
