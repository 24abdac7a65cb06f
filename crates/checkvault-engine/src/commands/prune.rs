//! Retention on demand, without taking a snapshot

#![allow(clippy::result_large_err)]

use checkvault_core::{log_op_end, log_op_error, log_op_start, RetentionPolicy};
use checkvault_store::errors::Result;
use checkvault_store::{RetentionManager, RetentionOutcome};
use std::path::Path;
use tracing::debug;

/// Apply the retention policy to `dir` once
///
/// A directory that does not exist yet has nothing to prune.
///
/// # Errors
///
/// `Filesystem` when the directory cannot be listed.
pub fn prune_backups(dir: &Path, extension: &str, policy: RetentionPolicy) -> Result<RetentionOutcome> {
    log_op_start!("backup_prune", backup_dir = %dir.display(), keep_count = policy.keep_count());
    let start = std::time::Instant::now();

    if !dir.exists() {
        debug!(backup_dir = %dir.display(), "nothing to prune");
        log_op_end!("backup_prune", duration_ms = start.elapsed().as_millis() as u64, deleted = 0usize);
        return Ok(RetentionOutcome::default());
    }

    let outcome = RetentionManager::new(dir, extension, policy)
        .apply()
        .map_err(|e| {
            log_op_error!(
                "backup_prune",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

    log_op_end!(
        "backup_prune",
        duration_ms = start.elapsed().as_millis() as u64,
        deleted = outcome.deleted_count(),
        failed = outcome.failed.len(),
        orphans_removed = outcome.orphans_removed
    );

    Ok(outcome)
}
