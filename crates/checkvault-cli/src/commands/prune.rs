//! Prune command
//!
//! Usage: checkvault prune [--keep-count N]

use checkvault_core::CheckvaultConfig;
use checkvault_engine::prune_backups;

pub fn execute(config: &CheckvaultConfig) -> anyhow::Result<()> {
    let outcome = prune_backups(
        &config.backup.dir,
        &config.backup.extension,
        config.retention_policy()?,
    )?;

    for path in &outcome.deleted {
        println!("Deleted: {}", path.display());
    }
    for (path, e) in &outcome.failed {
        println!("Failed:  {} ({})", path.display(), e);
    }
    println!(
        "{} deleted, {} orphaned descriptors removed",
        outcome.deleted_count(),
        outcome.orphans_removed
    );
    Ok(())
}
