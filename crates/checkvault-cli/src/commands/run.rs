//! Run command
//!
//! Usage: checkvault run [--now]

use anyhow::Context;
use checkvault_core::CheckvaultConfig;
use checkvault_engine::{BackupJob, BackupScheduler};
use clap::Args;
use tracing::info;

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Also take a manual backup right after startup
    #[arg(long)]
    pub now: bool,
}

pub async fn execute(args: RunArgs, config: &CheckvaultConfig) -> anyhow::Result<()> {
    let job = BackupJob::from_config(config)?;
    let mut scheduler = BackupScheduler::new(job);

    match scheduler.next_occurrence() {
        Some(next) => info!(next_run = %next, "backup job configured"),
        None => info!("schedule never fires; only manual backups will run"),
    }

    scheduler.start()?;

    if args.now {
        let outcome = scheduler.trigger_now().await;
        info!(completed = outcome.is_completed(), "startup backup finished");
    }

    tokio::signal::ctrl_c()
        .await
        .context("cannot listen for shutdown signal")?;
    info!("shutdown requested");
    scheduler.stop().await;
    Ok(())
}
