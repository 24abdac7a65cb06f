//! Configuration loading
//!
//! Layers, lowest precedence first:
//! 1. built-in defaults
//! 2. a TOML file (`checkvault.toml` unless another path is given)
//! 3. environment variables such as `CHECKVAULT__BACKUP__KEEP_COUNT=7`
//!
//! The CLI applies its own flag overrides on top and then calls `validate`.

use checkvault_core_types::Sensitive;
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::errors::{ConfigError, ExError};
use crate::model::{StoreIdentity, DESCRIPTOR_EXTENSION, STAGING_SUFFIX};
use crate::retention::{RetentionPolicy, DEFAULT_KEEP_COUNT};
use crate::schedule::{CronExpr, ANNUAL_BACKUP};

pub const DEFAULT_CONFIG_FILE: &str = "checkvault.toml";
pub const ENV_PREFIX: &str = "CHECKVAULT";

/// Complete configuration bundle for the backup job
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckvaultConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub backup: BackupSettings,
}

/// Where the durable store lives and who connects to it
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_url")]
    pub url: String,
    #[serde(default = "default_principal")]
    pub principal: String,
    #[serde(default)]
    pub password: Option<Sensitive<String>>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: default_store_url(),
            principal: default_principal(),
            password: None,
        }
    }
}

impl StoreConfig {
    /// Identity recorded in provenance descriptors; never includes the password
    pub fn identity(&self) -> StoreIdentity {
        StoreIdentity {
            target: self.url.clone(),
            principal: self.principal.clone(),
        }
    }
}

/// Backup directory, retention, and trigger settings
#[derive(Debug, Clone, Deserialize)]
pub struct BackupSettings {
    #[serde(default = "default_backup_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_keep_count")]
    pub keep_count: usize,
    #[serde(default = "default_schedule")]
    pub schedule: String,
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl Default for BackupSettings {
    fn default() -> Self {
        Self {
            dir: default_backup_dir(),
            keep_count: default_keep_count(),
            schedule: default_schedule(),
            extension: default_extension(),
        }
    }
}

fn default_store_url() -> String {
    "data/checkdb.sqlite".to_string()
}

fn default_principal() -> String {
    "sa".to_string()
}

fn default_backup_dir() -> PathBuf {
    PathBuf::from("backups")
}

fn default_keep_count() -> usize {
    DEFAULT_KEEP_COUNT
}

fn default_schedule() -> String {
    ANNUAL_BACKUP.to_string()
}

fn default_extension() -> String {
    "db".to_string()
}

impl CheckvaultConfig {
    /// Load configuration from defaults, a TOML file, and the environment.
    ///
    /// An explicitly given file must exist; the default file is optional.
    ///
    /// # Errors
    ///
    /// `ConfigError::Load` when a source cannot be read or deserialized.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(p) => File::from(p).format(FileFormat::Toml).required(true),
            None => File::new(DEFAULT_CONFIG_FILE, FileFormat::Toml).required(false),
        };

        let loaded: Self = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(loaded)
    }

    /// Parse configuration from TOML text alone (no environment layer).
    ///
    /// # Errors
    ///
    /// `ConfigError::Load` when the text is not valid configuration.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let loaded: Self = Config::builder()
            .add_source(File::from_str(text, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        Ok(loaded)
    }

    /// # Errors
    ///
    /// `ConfigError::InvalidField` naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.url.trim().is_empty() {
            return Err(invalid("store.url", "must not be empty"));
        }
        if self.backup.dir.as_os_str().is_empty() {
            return Err(invalid("backup.dir", "must not be empty"));
        }
        if self.backup.keep_count == 0 {
            return Err(invalid("backup.keep_count", "must be at least 1"));
        }

        let ext = self.backup.extension.as_str();
        if ext.is_empty() {
            return Err(invalid("backup.extension", "must not be empty"));
        }
        if ext.contains(['.', '/', '\\']) {
            return Err(invalid(
                "backup.extension",
                "must be a bare extension without dots or separators",
            ));
        }
        if ext.eq_ignore_ascii_case(DESCRIPTOR_EXTENSION) || ext.eq_ignore_ascii_case(STAGING_SUFFIX)
        {
            return Err(invalid(
                "backup.extension",
                "collides with the descriptor or staging extension",
            ));
        }

        if let Err(e) = CronExpr::parse(&self.backup.schedule) {
            return Err(invalid("backup.schedule", &e.to_string()));
        }

        Ok(())
    }

    /// # Errors
    ///
    /// `InvalidSchedule` when the expression does not parse.
    pub fn schedule(&self) -> Result<CronExpr, ExError> {
        Ok(CronExpr::parse(&self.backup.schedule)?)
    }

    /// # Errors
    ///
    /// `InvalidConfig` when `keep_count` is zero.
    pub fn retention_policy(&self) -> Result<RetentionPolicy, ExError> {
        RetentionPolicy::new(self.backup.keep_count)
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidField {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
