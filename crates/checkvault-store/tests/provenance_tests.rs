//! Descriptor writing

use checkvault_core::model::{ArtifactName, BackupArtifact};
use checkvault_core::{ExErrorKind, ProvenanceRecord, StoreIdentity, TriggerKind};
use checkvault_store::provenance::write_descriptor;
use chrono::NaiveDate;
use std::fs;
use tempfile::TempDir;

fn artifact_in(dir: &std::path::Path) -> BackupArtifact {
    let ts = NaiveDate::from_ymd_opt(2026, 1, 2)
        .unwrap()
        .and_hms_opt(3, 0, 0)
        .unwrap();
    let name = ArtifactName::new(ts, "db");
    let path = name.path_in(dir);
    fs::write(&path, vec![0u8; 3072]).unwrap();
    BackupArtifact {
        name,
        path,
        size_bytes: 3072,
    }
}

fn record_for(artifact: &BackupArtifact) -> ProvenanceRecord {
    ProvenanceRecord::for_artifact(
        artifact,
        artifact.name.timestamp(),
        TriggerKind::Scheduled,
        "0 0 3 2 1 ?",
        5,
        StoreIdentity {
            target: "data/checkdb.sqlite".to_string(),
            principal: "sa".to_string(),
        },
    )
}

#[test]
fn test_descriptor_written_next_to_artifact() {
    let temp_dir = TempDir::new().unwrap();
    let artifact = artifact_in(temp_dir.path());

    let path = write_descriptor(&artifact, &record_for(&artifact)).unwrap();

    assert_eq!(path, temp_dir.path().join("backup_2026-01-02_03-00-00.txt"));
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("File: backup_2026-01-02_03-00-00.db"));
    assert!(text.contains("Size: 3072 bytes (3.00 KiB)"));
    assert!(text.contains("Created: 02.01.2026 03:00:00"));
}

#[test]
fn test_existing_descriptor_is_not_overwritten() {
    let temp_dir = TempDir::new().unwrap();
    let artifact = artifact_in(temp_dir.path());
    fs::write(artifact.descriptor_path(), b"hand-written notes").unwrap();

    let err = write_descriptor(&artifact, &record_for(&artifact)).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::AlreadyExists);
    assert_eq!(
        fs::read_to_string(artifact.descriptor_path()).unwrap(),
        "hand-written notes"
    );
}
