//! One backup tick
//!
//! ## Stages (in order)
//! 1. Ensure the backup directory exists
//! 2. Snapshot the store into a fresh artifact
//! 3. Apply retention (oldest first, then orphaned descriptors)
//! 4. Write the provenance descriptor for the new artifact
//! 5. Count what is left
//!
//! A failure in stages 1-3 ends the tick as `Failed`. A descriptor that
//! cannot be written is reported in the outcome but does not fail the tick.

#![allow(clippy::result_large_err)]

use checkvault_core::errors::{ExError, ExErrorKind};
use checkvault_core::{log_op_end, log_op_error, log_op_start};
use checkvault_core::{BackupArtifact, ProvenanceRecord, TriggerKind};
use checkvault_core_types::TickId;
use checkvault_store::fs::{count_artifacts, ensure_backup_dir};
use checkvault_store::provenance::write_descriptor;
use checkvault_store::snapshot::{allocate_name, execute_snapshot};
use checkvault_store::RetentionManager;
use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

use crate::job::BackupJob;

/// Pipeline stage a tick failed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    EnsureDirectory,
    Snapshot,
    Retention,
    Provenance,
    /// The tick did not return normally (panic or cancelled task)
    Unexpected,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::EnsureDirectory => "ensure_directory",
            Stage::Snapshot => "snapshot",
            Stage::Retention => "retention",
            Stage::Provenance => "provenance",
            Stage::Unexpected => "unexpected",
        };
        f.write_str(s)
    }
}

/// What happened to the descriptor of this tick's artifact
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum DescriptorStatus {
    NotAttempted,
    Written(PathBuf),
    Failed(#[serde(serialize_with = "serialize_display")] ExError),
}

/// Everything observable about one tick
#[derive(Debug, Clone, Serialize)]
pub struct TickReport {
    pub tick_id: TickId,
    pub trigger: TriggerKind,
    pub started_at: NaiveDateTime,
    pub duration_ms: u64,
    pub directory_created: bool,
    pub artifact: Option<BackupArtifact>,
    pub deleted: Vec<PathBuf>,
    pub deletion_failures: usize,
    pub orphaned_descriptors_removed: usize,
    pub descriptor: DescriptorStatus,
    /// Artifacts left in the directory after the tick, when countable
    pub retained: Option<usize>,
}

impl TickReport {
    fn new(tick_id: TickId, trigger: TriggerKind, started_at: NaiveDateTime) -> Self {
        Self {
            tick_id,
            trigger,
            started_at,
            duration_ms: 0,
            directory_created: false,
            artifact: None,
            deleted: Vec::new(),
            deletion_failures: 0,
            orphaned_descriptors_removed: 0,
            descriptor: DescriptorStatus::NotAttempted,
            retained: None,
        }
    }
}

/// Result of one tick as seen by the scheduler
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TickOutcome {
    Completed(TickReport),
    Failed {
        stage: Stage,
        #[serde(serialize_with = "serialize_display")]
        error: ExError,
        /// Absent only when the tick never returned a report
        report: Option<TickReport>,
    },
    Skipped {
        reason: String,
    },
}

impl TickOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, TickOutcome::Completed(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, TickOutcome::Skipped { .. })
    }

    pub fn report(&self) -> Option<&TickReport> {
        match self {
            TickOutcome::Completed(report) => Some(report),
            TickOutcome::Failed { report, .. } => report.as_ref(),
            TickOutcome::Skipped { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&ExError> {
        match self {
            TickOutcome::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

fn serialize_display<T: fmt::Display, S: Serializer>(value: &T, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(value)
}

/// Run one full backup tick synchronously
///
/// Never panics on store or filesystem failures and never returns an error:
/// every failure is logged and folded into the outcome.
pub fn run_tick(job: &BackupJob, trigger: TriggerKind) -> TickOutcome {
    let tick_id = TickId::new();
    let started_at = job.clock().now();
    let start = Instant::now();

    log_op_start!(
        "backup_tick",
        tick_id = %tick_id,
        trigger = %trigger,
        backup_dir = %job.backup_dir().display()
    );
    info!(tick_id = %tick_id, "===== starting {} =====", trigger);

    let mut report = TickReport::new(tick_id.clone(), trigger, started_at);
    let result = run_stages(job, &mut report);
    report.duration_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(()) => {
            log_op_end!(
                "backup_tick",
                duration_ms = report.duration_ms,
                tick_id = %tick_id,
                deleted = report.deleted.len(),
                retained = report.retained
            );
            if let Some(artifact) = &report.artifact {
                info!(
                    tick_id = %tick_id,
                    artifact = %artifact.path.display(),
                    "===== {} finished =====",
                    trigger
                );
            }
            TickOutcome::Completed(report)
        }
        Err((stage, err)) => {
            let error = err.with_tick_id(tick_id.clone());
            log_op_error!(
                "backup_tick",
                error.clone(),
                duration_ms = report.duration_ms,
                tick_id = %tick_id,
                stage = %stage
            );
            TickOutcome::Failed {
                stage,
                error,
                report: Some(report),
            }
        }
    }
}

fn at(stage: Stage) -> impl FnOnce(ExError) -> (Stage, ExError) {
    move |e| (stage, e)
}

fn run_stages(job: &BackupJob, report: &mut TickReport) -> Result<(), (Stage, ExError)> {
    let dir = job.backup_dir();
    let ext = job.extension();

    report.directory_created = ensure_backup_dir(dir).map_err(at(Stage::EnsureDirectory))?;
    if report.directory_created {
        info!(tick_id = %report.tick_id, backup_dir = %dir.display(), "created backup directory");
    }

    let name = allocate_name(dir, report.started_at, ext).map_err(at(Stage::Snapshot))?;
    let artifact = execute_snapshot(job.connector(), dir, &name).map_err(at(Stage::Snapshot))?;
    info!(
        tick_id = %report.tick_id,
        artifact = %artifact.path.display(),
        size_bytes = artifact.size_bytes,
        size_kib = %format!("{:.2}", artifact.size_kib()),
        "snapshot written"
    );
    report.artifact = Some(artifact.clone());

    let retention = RetentionManager::new(dir, ext, job.policy())
        .apply()
        .map_err(at(Stage::Retention))?;
    report.deletion_failures = retention.failed.len();
    report.orphaned_descriptors_removed = retention.orphans_removed;
    if retention.unorderable > 0 {
        warn!(
            tick_id = %report.tick_id,
            unorderable = retention.unorderable,
            "some backups have unreadable modification times and were not considered"
        );
    }
    report.deleted = retention.deleted;

    report.descriptor = record_provenance(job, report, &artifact);

    report.retained = match count_artifacts(dir, ext) {
        Ok(n) => Some(n),
        Err(e) => {
            warn!(tick_id = %report.tick_id, error = %e, "cannot count remaining backups");
            None
        }
    };
    info!(
        tick_id = %report.tick_id,
        retained = report.retained,
        keep_count = job.policy().keep_count(),
        deleted = report.deleted.len(),
        "retention applied"
    );

    Ok(())
}

fn record_provenance(
    job: &BackupJob,
    report: &TickReport,
    artifact: &BackupArtifact,
) -> DescriptorStatus {
    let record = ProvenanceRecord::for_artifact(
        artifact,
        report.started_at,
        report.trigger,
        job.schedule().as_str(),
        job.policy().keep_count(),
        job.connector().identity(),
    );

    match write_descriptor(artifact, &record) {
        Ok(path) => {
            info!(tick_id = %report.tick_id, descriptor = %path.display(), "descriptor written");
            DescriptorStatus::Written(path)
        }
        Err(e) => {
            let e = e.with_tick_id(report.tick_id.clone());
            warn!(
                tick_id = %report.tick_id,
                stage = %Stage::Provenance,
                err.code = e.code(),
                error = %e,
                "descriptor not written, artifact kept"
            );
            DescriptorStatus::Failed(e)
        }
    }
}

/// Failure for a tick whose task died before producing an outcome
pub(crate) fn unexpected_failure(message: impl Into<String>) -> TickOutcome {
    let error = ExError::new(ExErrorKind::Unexpected)
        .with_op("backup_tick")
        .with_message(message);
    log_op_error!(
        "backup_tick",
        error.clone(),
        duration_ms = 0u64,
        stage = %Stage::Unexpected
    );
    TickOutcome::Failed {
        stage: Stage::Unexpected,
        error,
        report: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_display_matches_serde() {
        for stage in [
            Stage::EnsureDirectory,
            Stage::Snapshot,
            Stage::Retention,
            Stage::Provenance,
            Stage::Unexpected,
        ] {
            let json = serde_json::to_value(stage).unwrap();
            assert_eq!(json, serde_json::Value::String(stage.to_string()));
        }
    }

    #[test]
    fn test_skipped_outcome_serializes_with_tag() {
        let outcome = TickOutcome::Skipped {
            reason: "busy".to_string(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "skipped");
        assert_eq!(json["reason"], "busy");
        assert!(outcome.report().is_none());
        assert!(outcome.is_skipped());
    }

    #[test]
    fn test_unexpected_failure_has_no_report() {
        let outcome = unexpected_failure("worker panicked");
        assert!(matches!(
            outcome,
            TickOutcome::Failed {
                stage: Stage::Unexpected,
                report: None,
                ..
            }
        ));
        assert_eq!(outcome.error().unwrap().kind(), ExErrorKind::Unexpected);
    }
}
