//! Store connections
//!
//! A connection is opened per snapshot and released when it goes out of
//! scope, on success and on every error path alike.

use checkvault_core::config::StoreConfig;
use checkvault_core::StoreIdentity;
use checkvault_core_types::Sensitive;
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::db;
use crate::errors::{export_failure, Result};

const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(30);

/// Opens connections to the store being backed up
pub trait StoreConnector: Send + Sync {
    /// Target and principal, for logs and descriptors
    fn identity(&self) -> StoreIdentity;

    /// # Errors
    ///
    /// `StoreUnreachable` when the store cannot be opened.
    fn connect(&self) -> Result<Box<dyn StoreConnection>>;
}

/// One live connection able to run the native snapshot command
pub trait StoreConnection {
    /// Write a complete snapshot to `destination`, which must not exist
    ///
    /// # Errors
    ///
    /// `ExportFailure` when the store rejects or aborts the export.
    fn export_snapshot(&mut self, destination: &Path) -> Result<()>;
}

/// Connector for a SQLite store file
///
/// SQLite has no principal authentication; the principal is carried for
/// identification only and the password is never sent anywhere.
#[derive(Debug, Clone)]
pub struct SqliteConnector {
    target: String,
    principal: String,
    password: Option<Sensitive<String>>,
    busy_timeout: Duration,
}

impl SqliteConnector {
    pub fn new(target: impl Into<String>, principal: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            principal: principal.into(),
            password: None,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    pub fn from_config(store: &StoreConfig) -> Self {
        Self {
            password: store.password.clone(),
            ..Self::new(store.url.clone(), store.principal.clone())
        }
    }

    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }

    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }
}

impl StoreConnector for SqliteConnector {
    fn identity(&self) -> StoreIdentity {
        StoreIdentity {
            target: self.target.clone(),
            principal: self.principal.clone(),
        }
    }

    fn connect(&self) -> Result<Box<dyn StoreConnection>> {
        let conn = db::open_existing(&self.target)?;
        db::configure(&conn, &self.target, self.busy_timeout)?;
        let objects = db::probe(&conn, &self.target)?;
        debug!(store = %self.target, principal = %self.principal, objects, "store connection opened");

        Ok(Box::new(SqliteConnection {
            conn,
            target: self.target.clone(),
        }))
    }
}

struct SqliteConnection {
    conn: Connection,
    target: String,
}

impl StoreConnection for SqliteConnection {
    fn export_snapshot(&mut self, destination: &Path) -> Result<()> {
        let dest = destination.to_string_lossy();
        self.conn
            .execute("VACUUM INTO ?1", [dest.as_ref()])
            .map_err(|e| export_failure(destination, e))?;
        Ok(())
    }
}

impl Drop for SqliteConnection {
    fn drop(&mut self) {
        debug!(store = %self.target, "store connection released");
    }
}
