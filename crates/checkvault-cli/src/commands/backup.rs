//! Backup command
//!
//! Usage: checkvault backup [--json]
//!
//! Exits non-zero when the tick fails or is skipped.

use anyhow::bail;
use checkvault_core::CheckvaultConfig;
use checkvault_engine::{BackupJob, BackupScheduler, DescriptorStatus, TickOutcome};
use clap::Args;

#[derive(Debug, Args)]
pub struct BackupArgs {
    /// Print the tick outcome as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn execute(args: BackupArgs, config: &CheckvaultConfig) -> anyhow::Result<()> {
    let scheduler = BackupScheduler::new(BackupJob::from_config(config)?);
    let outcome = scheduler.trigger_now().await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_summary(&outcome);
    }

    match &outcome {
        TickOutcome::Completed(_) => Ok(()),
        TickOutcome::Failed { stage, error, .. } => {
            bail!("backup failed during {}: {}", stage, error)
        }
        TickOutcome::Skipped { reason } => bail!("backup skipped: {}", reason),
    }
}

fn print_summary(outcome: &TickOutcome) {
    let Some(report) = outcome.report() else {
        return;
    };
    if let Some(artifact) = &report.artifact {
        println!(
            "Backup:     {} ({} bytes)",
            artifact.path.display(),
            artifact.size_bytes
        );
    }
    match &report.descriptor {
        DescriptorStatus::Written(path) => println!("Descriptor: {}", path.display()),
        DescriptorStatus::Failed(e) => println!("Descriptor: not written ({})", e),
        DescriptorStatus::NotAttempted => {}
    }
    for path in &report.deleted {
        println!("Deleted:    {}", path.display());
    }
    if let Some(retained) = report.retained {
        println!("Retained:   {}", retained);
    }
}
