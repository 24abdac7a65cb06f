//! Retention manager against a real backup directory

use checkvault_core::{ExErrorKind, RetentionPolicy};
use checkvault_store::fs::{count_artifacts, FileRemover, MetadataSource};
use checkvault_store::RetentionManager;
use filetime::{set_file_mtime, FileTime};
use std::fs;
use std::io;
use std::path::Path;
use std::time::SystemTime;
use tempfile::TempDir;

/// Write an artifact (and optionally its descriptor) with a fixed mtime
fn seed(dir: &Path, stem: &str, mtime_secs: i64, with_descriptor: bool) {
    let artifact = dir.join(format!("{}.db", stem));
    fs::write(&artifact, b"snapshot").unwrap();
    set_file_mtime(&artifact, FileTime::from_unix_time(mtime_secs, 0)).unwrap();
    if with_descriptor {
        fs::write(dir.join(format!("{}.txt", stem)), b"Backup information\n").unwrap();
    }
}

/// 2021-01-02 03:00:00 UTC plus whole years, roughly
fn annual(year: i64) -> i64 {
    1_609_556_400 + (year - 2021) * 365 * 86_400
}

#[test]
fn test_annual_history_keeps_last_five() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    for year in 2021..=2026 {
        seed(dir, &format!("backup_{}-01-02_03-00-00", year), annual(year), true);
    }

    let manager = RetentionManager::new(dir, "db", RetentionPolicy::default());
    let outcome = manager.apply().unwrap();

    assert_eq!(outcome.deleted_count(), 1);
    assert!(outcome.failed.is_empty());
    assert_eq!(
        outcome.deleted[0].file_name().unwrap(),
        "backup_2021-01-02_03-00-00.db"
    );
    assert!(!dir.join("backup_2021-01-02_03-00-00.txt").exists());
    assert!(dir.join("backup_2022-01-02_03-00-00.txt").exists());
    assert_eq!(count_artifacts(dir, "db").unwrap(), 5);
}

#[test]
fn test_ordering_uses_mtime_not_name() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    // newest name, oldest mtime
    seed(dir, "backup_2030-01-02_03-00-00", annual(2021), false);
    seed(dir, "backup_2022-01-02_03-00-00", annual(2022), false);
    seed(dir, "backup_2023-01-02_03-00-00", annual(2023), false);

    let manager = RetentionManager::new(dir, "db", RetentionPolicy::new(2).unwrap());
    let outcome = manager.apply().unwrap();

    assert_eq!(
        outcome.deleted[0].file_name().unwrap(),
        "backup_2030-01-02_03-00-00.db"
    );
}

#[test]
fn test_deletes_oldest_first_when_far_over() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    for year in 2016..=2026 {
        seed(dir, &format!("backup_{}-01-02_03-00-00", year), annual(year), year % 2 == 0);
    }

    let manager = RetentionManager::new(dir, "db", RetentionPolicy::default());
    let outcome = manager.apply().unwrap();

    let deleted: Vec<_> = outcome
        .deleted
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        deleted,
        (2016..=2021)
            .map(|y| format!("backup_{}-01-02_03-00-00.db", y))
            .collect::<Vec<_>>()
    );
    assert_eq!(count_artifacts(dir, "db").unwrap(), 5);
    // descriptors of the deleted even years went with them
    assert!(!dir.join("backup_2016-01-02_03-00-00.txt").exists());
    assert!(dir.join("backup_2026-01-02_03-00-00.txt").exists());
}

#[test]
fn test_under_limit_deletes_nothing_but_sweeps_orphans() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    seed(dir, "backup_2026-01-02_03-00-00", annual(2026), true);
    fs::write(dir.join("backup_2019-01-02_03-00-00.txt"), b"stale").unwrap();

    let manager = RetentionManager::new(dir, "db", RetentionPolicy::default());
    let outcome = manager.apply().unwrap();

    assert_eq!(outcome.deleted_count(), 0);
    assert_eq!(outcome.orphans_removed, 1);
    assert!(dir.join("backup_2026-01-02_03-00-00.txt").exists());
}

#[test]
fn test_unrelated_files_are_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    for year in 2020..=2026 {
        seed(dir, &format!("backup_{}-01-02_03-00-00", year), annual(year), false);
    }
    fs::write(dir.join("operator-notes.txt"), b"do not delete").unwrap();
    fs::write(dir.join("manual-copy.db"), b"keep me").unwrap();
    set_file_mtime(dir.join("manual-copy.db"), FileTime::from_unix_time(0, 0)).unwrap();

    let manager = RetentionManager::new(dir, "db", RetentionPolicy::default());
    manager.apply().unwrap();

    assert!(dir.join("operator-notes.txt").exists());
    assert!(dir.join("manual-copy.db").exists());
    assert_eq!(count_artifacts(dir, "db").unwrap(), 5);
}

/// Reports one artifact's mtime as unreadable
struct BlindSpot(&'static str);

impl MetadataSource for BlindSpot {
    fn modified(&self, path: &Path) -> io::Result<SystemTime> {
        if path.file_name().and_then(|n| n.to_str()) == Some(self.0) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "stat denied"));
        }
        fs::metadata(path)?.modified()
    }
}

#[test]
fn test_unorderable_artifact_is_left_alone() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    for year in 2020..=2026 {
        seed(dir, &format!("backup_{}-01-02_03-00-00", year), annual(year), false);
    }

    let manager = RetentionManager::new(dir, "db", RetentionPolicy::default())
        .with_metadata(BlindSpot("backup_2020-01-02_03-00-00.db"));
    let outcome = manager.apply().unwrap();

    assert_eq!(outcome.unorderable, 1);
    assert_eq!(
        outcome.deleted[0].file_name().unwrap(),
        "backup_2021-01-02_03-00-00.db"
    );
    assert!(dir.join("backup_2020-01-02_03-00-00.db").exists());
    // six orderable remain minus one deleted, plus the unorderable one
    assert_eq!(count_artifacts(dir, "db").unwrap(), 6);
}

/// Refuses to delete one artifact
struct Pinned(&'static str);

impl FileRemover for Pinned {
    fn remove(&self, path: &Path) -> io::Result<()> {
        if path.file_name().and_then(|n| n.to_str()) == Some(self.0) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "file is locked"));
        }
        fs::remove_file(path)
    }
}

#[test]
fn test_failed_deletion_does_not_stop_the_pass() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    for year in 2018..=2026 {
        seed(dir, &format!("backup_{}-01-02_03-00-00", year), annual(year), true);
    }

    let manager = RetentionManager::new(dir, "db", RetentionPolicy::default())
        .with_remover(Pinned("backup_2019-01-02_03-00-00.db"));
    let outcome = manager.apply().unwrap();

    assert_eq!(outcome.failed.len(), 1);
    assert_eq!(
        outcome.failed[0].0.file_name().unwrap(),
        "backup_2019-01-02_03-00-00.db"
    );
    assert_eq!(outcome.failed[0].1.kind(), ExErrorKind::Filesystem);

    let deleted: Vec<_> = outcome
        .deleted
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        deleted,
        vec![
            "backup_2018-01-02_03-00-00.db",
            "backup_2020-01-02_03-00-00.db",
            "backup_2021-01-02_03-00-00.db",
        ]
    );

    // the pinned artifact keeps its descriptor
    assert!(dir.join("backup_2019-01-02_03-00-00.db").exists());
    assert!(dir.join("backup_2019-01-02_03-00-00.txt").exists());
    assert!(!dir.join("backup_2021-01-02_03-00-00.txt").exists());
    assert_eq!(count_artifacts(dir, "db").unwrap(), 6);
}

#[test]
fn test_missing_directory_is_filesystem_error() {
    let temp_dir = TempDir::new().unwrap();
    let manager = RetentionManager::new(
        temp_dir.path().join("absent"),
        "db",
        RetentionPolicy::default(),
    );
    let err = manager.apply().unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Filesystem);
}
