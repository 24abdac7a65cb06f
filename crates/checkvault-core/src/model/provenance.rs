//! Provenance descriptor content
//!
//! A descriptor is a short human-readable text file that sits next to an
//! artifact and explains where it came from. It never contains secrets.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;

use crate::model::artifact::BackupArtifact;

const CREATED_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

/// What started the tick that produced an artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    Scheduled,
    Manual,
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerKind::Scheduled => f.write_str("automatic scheduled backup"),
            TriggerKind::Manual => f.write_str("manual backup"),
        }
    }
}

/// Identity of the store a snapshot was taken from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreIdentity {
    /// Connection target (path or URI)
    pub target: String,
    /// Principal the connection was opened as
    pub principal: String,
}

/// Everything written into one provenance descriptor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProvenanceRecord {
    pub artifact_file_name: String,
    pub size_bytes: u64,
    pub created_at: NaiveDateTime,
    pub trigger: TriggerKind,
    pub schedule: String,
    pub keep_count: usize,
    pub store: StoreIdentity,
}

impl ProvenanceRecord {
    pub fn for_artifact(
        artifact: &BackupArtifact,
        created_at: NaiveDateTime,
        trigger: TriggerKind,
        schedule: impl Into<String>,
        keep_count: usize,
        store: StoreIdentity,
    ) -> Self {
        Self {
            artifact_file_name: artifact.name.file_name(),
            size_bytes: artifact.size_bytes,
            created_at,
            trigger,
            schedule: schedule.into(),
            keep_count,
            store,
        }
    }

    pub fn size_kib(&self) -> f64 {
        self.size_bytes as f64 / 1024.0
    }

    /// Render the descriptor text
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("Backup information\n");
        out.push_str("==================\n");
        out.push_str(&format!("File: {}\n", self.artifact_file_name));
        out.push_str(&format!(
            "Created: {}\n",
            self.created_at.format(CREATED_FORMAT)
        ));
        out.push_str(&format!("Type: {}\n", self.trigger));
        out.push_str(&format!("Schedule: {}\n", self.schedule));
        out.push_str(&format!(
            "Size: {} bytes ({:.2} KiB)\n",
            self.size_bytes,
            self.size_kib()
        ));
        out.push_str(&format!("Store: {}\n", self.store.target));
        out.push_str(&format!("Principal: {}\n", self.store.principal));
        out.push_str(&format!(
            "Retention: last {} backups, older ones removed automatically\n",
            self.keep_count
        ));
        out.push_str(
            "Restore: stop the application and replace the store file with this artifact\n",
        );
        out
    }
}
