//! Everything a tick needs, bundled once at startup

#![allow(clippy::result_large_err)]

use checkvault_core::config::CheckvaultConfig;
use checkvault_core::errors::ExError;
use checkvault_core::{Clock, CronExpr, RetentionPolicy, SystemClock};
use checkvault_store::{SqliteConnector, StoreConnector};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A configured backup job
///
/// Cheap to clone; the scheduler hands a clone to every tick.
#[derive(Clone)]
pub struct BackupJob {
    connector: Arc<dyn StoreConnector>,
    clock: Arc<dyn Clock>,
    backup_dir: PathBuf,
    extension: String,
    policy: RetentionPolicy,
    schedule: CronExpr,
}

impl BackupJob {
    pub fn new(
        connector: Arc<dyn StoreConnector>,
        backup_dir: impl Into<PathBuf>,
        extension: impl Into<String>,
        policy: RetentionPolicy,
        schedule: CronExpr,
    ) -> Self {
        Self {
            connector,
            clock: Arc::new(SystemClock),
            backup_dir: backup_dir.into(),
            extension: extension.into(),
            policy,
            schedule,
        }
    }

    /// Build the production job from validated configuration
    ///
    /// # Errors
    ///
    /// `InvalidConfig` or `InvalidSchedule` when the configuration is unusable.
    pub fn from_config(config: &CheckvaultConfig) -> Result<Self, ExError> {
        config.validate()?;
        Ok(Self::new(
            Arc::new(SqliteConnector::from_config(&config.store)),
            config.backup.dir.clone(),
            config.backup.extension.clone(),
            config.retention_policy()?,
            config.schedule()?,
        ))
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn connector(&self) -> &dyn StoreConnector {
        self.connector.as_ref()
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn policy(&self) -> RetentionPolicy {
        self.policy
    }

    pub fn schedule(&self) -> &CronExpr {
        &self.schedule
    }
}

impl std::fmt::Debug for BackupJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackupJob")
            .field("store", &self.connector.identity())
            .field("backup_dir", &self.backup_dir)
            .field("extension", &self.extension)
            .field("policy", &self.policy)
            .field("schedule", &self.schedule.as_str())
            .finish()
    }
}
