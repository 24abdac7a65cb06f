//! Shared fixtures for engine tests

#![allow(dead_code)]

use checkvault_core::schedule::{ANNUAL_BACKUP, EVERY_SECOND};
use checkvault_core::{CronExpr, RetentionPolicy};
use checkvault_engine::BackupJob;
use checkvault_store::{SqliteConnector, StoreConnector};
use filetime::{set_file_mtime, FileTime};
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A small SQLite store with a couple of rows
pub fn seeded_store(dir: &Path) -> PathBuf {
    let path = dir.join("checkdb.sqlite");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE applications (id INTEGER PRIMARY KEY, applicant TEXT NOT NULL);
         INSERT INTO applications (applicant) VALUES ('Ada'), ('Grace');",
    )
    .unwrap();
    path
}

pub fn sqlite_connector(store: &Path) -> Arc<dyn StoreConnector> {
    Arc::new(SqliteConnector::new(store.to_str().unwrap(), "sa"))
}

pub fn annual_job(connector: Arc<dyn StoreConnector>, backup_dir: &Path) -> BackupJob {
    BackupJob::new(
        connector,
        backup_dir,
        "db",
        RetentionPolicy::default(),
        CronExpr::parse(ANNUAL_BACKUP).unwrap(),
    )
}

pub fn every_second_job(connector: Arc<dyn StoreConnector>, backup_dir: &Path) -> BackupJob {
    BackupJob::new(
        connector,
        backup_dir,
        "db",
        RetentionPolicy::default(),
        CronExpr::parse(EVERY_SECOND).unwrap(),
    )
}

/// Seed one old artifact per year with a descriptor and an mtime in that year
pub fn seed_annual_history(dir: &Path, years: std::ops::RangeInclusive<i32>) {
    fs::create_dir_all(dir).unwrap();
    for year in years {
        let stem = format!("backup_{}-01-02_03-00-00", year);
        let artifact = dir.join(format!("{}.db", stem));
        fs::write(&artifact, b"old snapshot").unwrap();
        fs::write(dir.join(format!("{}.txt", stem)), b"Backup information\n").unwrap();
        let secs = 1_609_556_400 + i64::from(year - 2021) * 365 * 86_400;
        set_file_mtime(&artifact, FileTime::from_unix_time(secs, 0)).unwrap();
    }
}

pub fn names_with_suffix(dir: &Path, suffix: &str) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(suffix))
        .collect();
    names.sort();
    names
}
