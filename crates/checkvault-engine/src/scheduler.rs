//! Backup scheduler
//!
//! Fires a tick at every occurrence of the job's calendar expression. At
//! most one tick runs at a time: an occurrence or manual trigger that
//! arrives while a tick is in flight is skipped, not queued. Occurrences
//! missed while the process was down or busy are not caught up.
//!
//! Ticks run on the blocking pool since the export and all file work is
//! synchronous. Whatever a tick does, including panicking, the loop logs it
//! and waits for the next occurrence.

#![allow(clippy::result_large_err)]

use checkvault_core::errors::{ExError, ExErrorKind};
use checkvault_core::TriggerKind;
use chrono::NaiveDateTime;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error, info, warn};

use crate::commands::backup_tick::{run_tick, unexpected_failure, TickOutcome};
use crate::job::BackupJob;

/// Longest single sleep before re-reading the clock
///
/// The clock is re-read after each sleep, so wall-clock jumps are picked up.
const DEFAULT_MAX_SLEEP: Duration = Duration::from_secs(60);

/// Runs ticks under the shared non-reentrancy guard
#[derive(Clone, Debug)]
pub struct TickRunner {
    job: BackupJob,
    guard: Arc<Mutex<()>>,
}

impl TickRunner {
    pub fn new(job: BackupJob) -> Self {
        Self {
            job,
            guard: Arc::new(Mutex::new(())),
        }
    }

    pub fn job(&self) -> &BackupJob {
        &self.job
    }

    /// Whether a tick currently holds the guard
    pub fn is_busy(&self) -> bool {
        self.guard.try_lock().is_err()
    }

    /// Run one tick unless another is already in flight
    pub async fn run(&self, trigger: TriggerKind) -> TickOutcome {
        let Ok(permit) = Arc::clone(&self.guard).try_lock_owned() else {
            warn!(trigger = %trigger, "previous backup still running, tick skipped");
            return TickOutcome::Skipped {
                reason: "a backup tick is already in progress".to_string(),
            };
        };

        let job = self.job.clone();
        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            run_tick(&job, trigger)
        });

        match handle.await {
            Ok(outcome) => outcome,
            Err(e) => unexpected_failure(join_error_message(e)),
        }
    }
}

fn join_error_message(err: JoinError) -> String {
    if err.is_cancelled() {
        return "backup tick was cancelled".to_string();
    }
    let payload = err.into_panic();
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("backup tick panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("backup tick panicked: {}", s)
    } else {
        "backup tick panicked".to_string()
    }
}

/// Calendar-driven trigger for a backup job
#[derive(Debug)]
pub struct BackupScheduler {
    runner: TickRunner,
    max_sleep: Duration,
    shutdown: Option<broadcast::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl BackupScheduler {
    pub fn new(job: BackupJob) -> Self {
        Self {
            runner: TickRunner::new(job),
            max_sleep: DEFAULT_MAX_SLEEP,
            shutdown: None,
            handle: None,
        }
    }

    pub fn with_max_sleep(mut self, max_sleep: Duration) -> Self {
        self.max_sleep = max_sleep.max(Duration::from_millis(10));
        self
    }

    /// Handle for firing manual ticks from other tasks
    pub fn runner(&self) -> TickRunner {
        self.runner.clone()
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Next time the calendar fires, measured from the job's clock
    pub fn next_occurrence(&self) -> Option<NaiveDateTime> {
        let job = self.runner.job();
        job.schedule().next_after(&job.clock().now())
    }

    /// Start the trigger loop on the current tokio runtime
    ///
    /// # Errors
    ///
    /// `TickInProgress` if the loop is already running.
    pub fn start(&mut self) -> Result<(), ExError> {
        if self.is_running() {
            return Err(ExError::new(ExErrorKind::TickInProgress)
                .with_op("scheduler_start")
                .with_message("scheduler is already running"));
        }

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let runner = self.runner.clone();
        let max_sleep = self.max_sleep;
        self.handle = Some(tokio::spawn(run_loop(runner, shutdown_rx, max_sleep)));
        self.shutdown = Some(shutdown_tx);
        Ok(())
    }

    /// Stop the trigger loop
    ///
    /// Returns once the loop has exited. A tick already in flight is allowed
    /// to finish first.
    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                error!(error = %e, "backup scheduler loop ended abnormally");
            }
        }
    }

    /// Fire a manual tick now, subject to the same guard as scheduled ticks
    pub async fn trigger_now(&self) -> TickOutcome {
        self.runner.run(TriggerKind::Manual).await
    }
}

async fn run_loop(runner: TickRunner, mut shutdown: broadcast::Receiver<()>, max_sleep: Duration) {
    let job = runner.job().clone();
    info!(
        schedule = job.schedule().as_str(),
        backup_dir = %job.backup_dir().display(),
        keep_count = job.policy().keep_count(),
        "backup scheduler started"
    );

    loop {
        let Some(next) = job.schedule().next_after(&job.clock().now()) else {
            warn!(
                schedule = job.schedule().as_str(),
                "schedule never fires again, scheduler idle until stopped"
            );
            let _ = shutdown.recv().await;
            break;
        };
        info!(next_run = %next, "next backup scheduled");

        loop {
            let now = job.clock().now();
            if now >= next {
                break;
            }
            let wait = (next - now)
                .to_std()
                .unwrap_or(Duration::ZERO)
                .min(max_sleep);
            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = shutdown.recv() => {
                    info!("backup scheduler stopped");
                    return;
                }
            }
        }

        match runner.run(TriggerKind::Scheduled).await {
            TickOutcome::Completed(report) => {
                debug!(tick_id = %report.tick_id, "scheduled tick completed")
            }
            TickOutcome::Failed { stage, .. } => {
                debug!(stage = %stage, "scheduled tick failed, waiting for next occurrence")
            }
            TickOutcome::Skipped { .. } => {}
        }
    }

    info!("backup scheduler stopped");
}
